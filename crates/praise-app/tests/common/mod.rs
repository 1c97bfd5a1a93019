#![allow(dead_code)]

use praise_client::{ApiClient, ApiConfig, Session};
use praise_harness::{StubBackend, StubState};
use praise_types::models::Praise;

pub const CHRIS: i64 = 1;
pub const SARAH: i64 = 2;

pub async fn backend() -> StubBackend {
    StubBackend::spawn().await.unwrap()
}

pub fn client(backend: &StubBackend, session: Session) -> ApiClient {
    ApiClient::new(ApiConfig::with_base_url(backend.url()), session).unwrap()
}

/// Client whose session already holds a valid token for `user_id`.
pub fn logged_in(backend: &StubBackend, user_id: i64) -> ApiClient {
    let session = Session::in_memory();
    session.set_token(&backend.token_for(user_id)).unwrap();
    client(backend, session)
}

/// Client carrying a token the backend has never issued.
pub fn stale_session(backend: &StubBackend) -> ApiClient {
    let session = Session::in_memory();
    session.set_token("expired-token").unwrap();
    client(backend, session)
}

/// Praise records from the seeded fixture, without a server.
pub fn fixture_praise() -> Vec<Praise> {
    StubState::seeded().praise
}

/// A client that is never called; for views driven purely through setters.
pub fn offline_client() -> ApiClient {
    ApiClient::new(ApiConfig::with_base_url("http://127.0.0.1:9"), Session::in_memory()).unwrap()
}
