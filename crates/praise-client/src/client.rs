//! Typed client for the praise REST API.
//!
//! One method per backend operation. Every call is fire-once: no retries, no
//! timeout policy beyond the transport defaults, no de-duplication. The
//! session token, when present, rides along as a bearer credential.

use reqwest::{Client, Method, RequestBuilder, Url};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use praise_types::api::{
    CreatePraiseRequest, ErrorBody, LoginRequest, RedeemRequest, RegisterRequest, TokenResponse,
};
use praise_types::models::{CoreValue, Praise, Redemption, Reward, User};

use crate::error::ApiError;
use crate::session::Session;

pub const DEFAULT_API_URL: &str = "http://localhost:8000";

#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub base_url: String,
    pub user_agent: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_API_URL.into(),
            user_agent: concat!("praise-client/", env!("CARGO_PKG_VERSION")).into(),
        }
    }
}

impl ApiConfig {
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone)]
pub struct ApiClient {
    http: Client,
    base_url: String,
    session: Session,
}

impl ApiClient {
    pub fn new(config: ApiConfig, session: Session) -> Result<Self, ApiError> {
        let base_url = config.base_url.trim_end_matches('/').to_string();
        Url::parse(&base_url).map_err(|_| ApiError::InvalidUrl(config.base_url.clone()))?;

        let http = Client::builder()
            .user_agent(config.user_agent)
            .build()
            .map_err(ApiError::Transport)?;

        Ok(Self {
            http,
            base_url,
            session,
        })
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    // -- Auth --

    pub async fn login(&self, email: &str, password: &str) -> Result<TokenResponse, ApiError> {
        let body = LoginRequest {
            email: email.to_string(),
            password: password.to_string(),
        };
        self.call(Method::POST, "/auth/login", Some(&body)).await
    }

    pub async fn register(&self, req: &RegisterRequest) -> Result<User, ApiError> {
        self.call(Method::POST, "/auth/register", Some(req)).await
    }

    // -- Praise --

    pub async fn list_praise(&self) -> Result<Vec<Praise>, ApiError> {
        self.call(Method::GET, "/praise", None::<&()>).await
    }

    pub async fn create_praise(&self, req: &CreatePraiseRequest) -> Result<Praise, ApiError> {
        self.call(Method::POST, "/praise", Some(req)).await
    }

    pub async fn list_core_values(&self) -> Result<Vec<CoreValue>, ApiError> {
        self.call(Method::GET, "/core-values", None::<&()>).await
    }

    // -- Rewards --

    pub async fn list_rewards(&self) -> Result<Vec<Reward>, ApiError> {
        self.call(Method::GET, "/rewards", None::<&()>).await
    }

    pub async fn redeem_reward(&self, reward_id: i64) -> Result<Redemption, ApiError> {
        let body = RedeemRequest { reward_id };
        self.call(Method::POST, "/rewards/redeem", Some(&body)).await
    }

    pub async fn my_redemptions(&self) -> Result<Vec<Redemption>, ApiError> {
        self.call(Method::GET, "/redemptions/me", None::<&()>).await
    }

    // -- Users --

    pub async fn current_user(&self) -> Result<User, ApiError> {
        self.call(Method::GET, "/users/me", None::<&()>).await
    }

    /// Everyone praise can be sent to.
    pub async fn list_users(&self) -> Result<Vec<User>, ApiError> {
        self.call(Method::GET, "/users", None::<&()>).await
    }

    // -- Plumbing --

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let url = format!("{}{}", self.base_url, path);
        let builder = self.http.request(method, url);
        match self.session.token().filter(|t| !t.is_empty()) {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    async fn call<B, T>(&self, method: Method, path: &str, body: Option<&B>) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        debug!("{} {}", method, path);
        let mut builder = self.request(method.clone(), path);
        if let Some(body) = body {
            builder = builder.json(body);
        }

        let response = builder.send().await.map_err(|e| {
            warn!("{} {} failed: {}", method, path, e);
            ApiError::Transport(e)
        })?;

        let status = response.status();
        if status.is_success() {
            return response.json::<T>().await.map_err(|e| {
                warn!("{} {} returned an unreadable body: {}", method, path, e);
                ApiError::Decode(e)
            });
        }

        // Bodies on error responses are best-effort: anything unreadable just
        // means there is no detail to show.
        let detail = match response.bytes().await {
            Ok(raw) => serde_json::from_slice::<ErrorBody>(&raw)
                .ok()
                .and_then(|b| b.detail_text()),
            Err(_) => None,
        };
        warn!(
            "{} {} -> {} ({})",
            method,
            path,
            status,
            detail.as_deref().unwrap_or("no detail")
        );
        Err(ApiError::from_status(status, detail))
    }
}
