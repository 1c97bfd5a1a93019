//! In-process stub of the praise backend.
//!
//! Serves the same REST surface as the real API from a [`StubState`] held in
//! memory, bound to an ephemeral localhost port. Every request is recorded so
//! tests can assert on exactly what the client sent, and failures can be
//! queued per route to exercise error paths.

pub mod routes;
pub mod state;

use std::net::SocketAddr;
use std::sync::{Arc, Mutex, MutexGuard};

use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tracing::info;

pub use axum::http::{Method, StatusCode};
pub use routes::SharedState;
pub use state::{POINTS_PER_PRAISE, RecordedRequest, StubState};

pub struct StubBackend {
    addr: SocketAddr,
    state: SharedState,
    server: JoinHandle<()>,
}

impl StubBackend {
    /// Start a backend seeded with [`StubState::seeded`].
    pub async fn spawn() -> std::io::Result<Self> {
        Self::spawn_with(StubState::seeded()).await
    }

    pub async fn spawn_with(state: StubState) -> std::io::Result<Self> {
        let state: SharedState = Arc::new(Mutex::new(state));
        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;

        let app = routes::router(state.clone());
        let server = tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, app).await {
                tracing::warn!("Stub backend stopped: {}", e);
            }
        });

        info!("Stub backend listening on {}", addr);
        Ok(Self {
            addr,
            state,
            server,
        })
    }

    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn state(&self) -> MutexGuard<'_, StubState> {
        routes::lock(&self.state)
    }

    /// Mint a valid token for `user_id` without going through login.
    pub fn token_for(&self, user_id: i64) -> String {
        self.state().issue_token(user_id)
    }

    /// Make the next `method path` request fail with `status` and `detail`.
    pub fn fail_next(&self, method: Method, path: &str, status: StatusCode, detail: Option<&str>) {
        self.state().fail_next(method, path, status, detail);
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.state().requests.clone()
    }

    /// Recorded requests to `path`, any method.
    pub fn requests_to(&self, path: &str) -> Vec<RecordedRequest> {
        self.state()
            .requests
            .iter()
            .filter(|r| r.path == path)
            .cloned()
            .collect()
    }

    pub fn balance_of(&self, user_id: i64) -> Option<i64> {
        self.state().user(user_id).map(|u| u.points_balance)
    }
}

impl Drop for StubBackend {
    fn drop(&mut self) {
        self.server.abort();
    }
}
