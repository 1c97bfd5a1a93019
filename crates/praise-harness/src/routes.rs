use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use axum::{
    Extension, Json, Router,
    body::{Body, to_bytes},
    extract::{Request, State},
    http::{StatusCode, header},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde::de::DeserializeOwned;
use serde_json::{Value, json};

use praise_types::api::{
    CreatePraiseRequest, ErrorBody, LoginRequest, RedeemRequest, RegisterRequest, TokenResponse,
};
use praise_types::models::User;

use crate::state::{RecordedRequest, StubState};

pub type SharedState = Arc<Mutex<StubState>>;

#[derive(Debug, Clone, Copy)]
struct CurrentUser(i64);

pub(crate) fn lock(state: &SharedState) -> MutexGuard<'_, StubState> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

pub fn router(state: SharedState) -> Router {
    let public_routes = Router::new()
        .route("/auth/login", post(login))
        .route("/auth/register", post(register));

    let protected_routes = Router::new()
        .route("/praise", get(list_praise).post(create_praise))
        .route("/core-values", get(list_core_values))
        .route("/rewards", get(list_rewards))
        .route("/rewards/redeem", post(redeem_reward))
        .route("/redemptions/me", get(my_redemptions))
        .route("/users", get(list_users))
        .route("/users/me", get(current_user))
        .layer(middleware::from_fn_with_state(state.clone(), require_auth));

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .layer(middleware::from_fn_with_state(state.clone(), record))
        .with_state(state)
}

fn error(status: StatusCode, detail: Option<&str>) -> Response {
    let body = match detail {
        Some(detail) => ErrorBody::message(detail),
        None => ErrorBody { detail: None },
    };
    (status, Json(body)).into_response()
}

fn parse<T: DeserializeOwned>(body: Value) -> Result<T, Response> {
    serde_json::from_value(body).map_err(|e| {
        (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(json!({ "detail": [{ "loc": ["body"], "msg": e.to_string(), "type": "value_error" }] })),
        )
            .into_response()
    })
}

/// Log every request, then short-circuit with a forced failure if one was queued.
async fn record(State(state): State<SharedState>, req: Request, next: Next) -> Response {
    let (parts, body) = req.into_parts();
    let Ok(bytes) = to_bytes(body, usize::MAX).await else {
        return error(StatusCode::BAD_REQUEST, Some("Unreadable body"));
    };

    let forced = {
        let mut s = lock(&state);
        s.requests.push(RecordedRequest {
            method: parts.method.clone(),
            path: parts.uri.path().to_string(),
            authorization: parts
                .headers
                .get(header::AUTHORIZATION)
                .and_then(|v| v.to_str().ok())
                .map(str::to_string),
            body: serde_json::from_slice(&bytes).ok(),
        });
        s.take_failure(&parts.method, parts.uri.path())
    };

    if let Some(failure) = forced {
        tracing::debug!("Forcing {} on {} {}", failure.status, parts.method, parts.uri.path());
        return error(failure.status, failure.detail.as_deref());
    }

    next.run(Request::from_parts(parts, Body::from(bytes))).await
}

async fn require_auth(State(state): State<SharedState>, mut req: Request, next: Next) -> Response {
    let user_id = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .and_then(|token| lock(&state).tokens.get(token).copied());

    match user_id {
        Some(id) => {
            req.extensions_mut().insert(CurrentUser(id));
            next.run(req).await
        }
        None => error(StatusCode::UNAUTHORIZED, Some("Could not validate credentials")),
    }
}

// -- Auth --

async fn login(State(state): State<SharedState>, Json(body): Json<Value>) -> Response {
    let req: LoginRequest = match parse(body) {
        Ok(req) => req,
        Err(resp) => return resp,
    };

    let mut s = lock(&state);
    let matches = s.passwords.get(&req.email).is_some_and(|p| *p == req.password);
    let Some(user_id) = s.user_by_email(&req.email).map(|u| u.id).filter(|_| matches) else {
        return error(StatusCode::UNAUTHORIZED, Some("Invalid credentials"));
    };

    let access_token = s.issue_token(user_id);
    Json(TokenResponse {
        access_token,
        token_type: "bearer".into(),
    })
    .into_response()
}

async fn register(State(state): State<SharedState>, Json(body): Json<Value>) -> Response {
    let req: RegisterRequest = match parse(body) {
        Ok(req) => req,
        Err(resp) => return resp,
    };

    let mut s = lock(&state);
    if s.user_by_email(&req.email).is_some() {
        return error(StatusCode::BAD_REQUEST, Some("Email already registered"));
    }

    let id = s.alloc_id();
    s.add_user(id, &req.email, &req.password, &req.first_name, &req.last_name, 0);
    match s.user(id) {
        Some(user) => Json(user.clone()).into_response(),
        None => error(StatusCode::INTERNAL_SERVER_ERROR, None),
    }
}

// -- Praise --

async fn list_praise(State(state): State<SharedState>) -> Response {
    let mut praise = lock(&state).praise.clone();
    praise.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    Json(praise).into_response()
}

async fn create_praise(
    State(state): State<SharedState>,
    Extension(CurrentUser(giver_id)): Extension<CurrentUser>,
    Json(body): Json<Value>,
) -> Response {
    let req: CreatePraiseRequest = match parse(body) {
        Ok(req) => req,
        Err(resp) => return resp,
    };

    let mut s = lock(&state);
    if s.user(req.receiver_id).is_none() {
        return error(StatusCode::NOT_FOUND, Some("Receiver not found"));
    }
    if req.receiver_id == giver_id {
        return error(StatusCode::BAD_REQUEST, Some("You cannot praise yourself"));
    }
    if !s.core_values.iter().any(|c| c.id == req.core_value_id) {
        return error(StatusCode::NOT_FOUND, Some("Core value not found"));
    }

    let Some(record) = s.build_praise(giver_id, req.receiver_id, req.core_value_id, &req.message)
    else {
        return error(StatusCode::INTERNAL_SERVER_ERROR, None);
    };
    if let Some(receiver) = s.user_mut(req.receiver_id) {
        receiver.points_balance += record.points_awarded;
    }
    s.praise.push(record.clone());
    Json(record).into_response()
}

async fn list_core_values(State(state): State<SharedState>) -> Response {
    Json(lock(&state).core_values.clone()).into_response()
}

// -- Rewards --

async fn list_rewards(State(state): State<SharedState>) -> Response {
    let rewards: Vec<_> = lock(&state)
        .rewards
        .iter()
        .filter(|r| r.is_active)
        .cloned()
        .collect();
    Json(rewards).into_response()
}

async fn redeem_reward(
    State(state): State<SharedState>,
    Extension(CurrentUser(user_id)): Extension<CurrentUser>,
    Json(body): Json<Value>,
) -> Response {
    let req: RedeemRequest = match parse(body) {
        Ok(req) => req,
        Err(resp) => return resp,
    };

    let mut s = lock(&state);
    let Some(reward) = s
        .rewards
        .iter()
        .find(|r| r.id == req.reward_id && r.is_active)
        .cloned()
    else {
        return error(StatusCode::NOT_FOUND, Some("Reward not found"));
    };

    let Some(user) = s.user_mut(user_id) else {
        return error(StatusCode::NOT_FOUND, Some("User not found"));
    };
    if user.points_balance < reward.point_cost {
        return error(StatusCode::BAD_REQUEST, Some("Not enough points"));
    }
    user.points_balance -= reward.point_cost;

    let redemption = s.build_redemption(user_id, reward);
    s.redemptions.push(redemption.clone());
    Json(redemption).into_response()
}

async fn my_redemptions(
    State(state): State<SharedState>,
    Extension(CurrentUser(user_id)): Extension<CurrentUser>,
) -> Response {
    let mut mine: Vec<_> = lock(&state)
        .redemptions
        .iter()
        .filter(|r| r.user_id == user_id)
        .cloned()
        .collect();
    mine.sort_by(|a, b| b.id.cmp(&a.id));
    Json(mine).into_response()
}

// -- Users --

async fn current_user(
    State(state): State<SharedState>,
    Extension(CurrentUser(user_id)): Extension<CurrentUser>,
) -> Response {
    match lock(&state).user(user_id) {
        Some(user) => Json(user.clone()).into_response(),
        None => error(StatusCode::NOT_FOUND, Some("User not found")),
    }
}

async fn list_users(State(state): State<SharedState>) -> Response {
    let users: Vec<User> = lock(&state).users.clone();
    Json(users).into_response()
}
