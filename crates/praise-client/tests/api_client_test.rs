//! Exercises every client operation against the in-process stub backend.

use praise_client::{ApiClient, ApiConfig, ApiError, ErrorKind, Session};
use praise_harness::{Method, POINTS_PER_PRAISE, StatusCode, StubBackend};
use praise_types::api::{CreatePraiseRequest, RegisterRequest};
use praise_types::models::RedemptionStatus;

async fn setup() -> (StubBackend, ApiClient) {
    let backend = StubBackend::spawn().await.unwrap();
    let client = ApiClient::new(ApiConfig::with_base_url(backend.url()), Session::in_memory()).unwrap();
    (backend, client)
}

async fn logged_in_as(email: &str, password: &str) -> (StubBackend, ApiClient) {
    let (backend, client) = setup().await;
    let token = client.login(email, password).await.unwrap();
    client.session().set_token(&token.access_token).unwrap();
    (backend, client)
}

#[tokio::test]
async fn login_returns_token_without_bearer() {
    let (backend, client) = setup().await;

    let token = client.login("chris@example.com", "password1").await.unwrap();
    assert!(token.access_token.starts_with("token-1-"));
    assert_eq!(token.token_type, "bearer");

    let sent = backend.requests_to("/auth/login");
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].authorization, None);
    assert_eq!(
        sent[0].body,
        Some(serde_json::json!({"email": "chris@example.com", "password": "password1"}))
    );
}

#[tokio::test]
async fn bad_credentials_carry_server_detail() {
    let (_backend, client) = setup().await;

    let err = client.login("chris@example.com", "wrong").await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Auth);
    assert_eq!(err.status(), Some(StatusCode::UNAUTHORIZED));
    assert_eq!(err.detail(), Some("Invalid credentials"));
}

#[tokio::test]
async fn stored_token_is_sent_as_bearer() {
    let (backend, client) = logged_in_as("chris@example.com", "password1").await;
    let token = client.session().token().unwrap();

    client.list_praise().await.unwrap();

    let sent = backend.requests_to("/praise");
    assert_eq!(sent[0].bearer(), Some(token.as_str()));
}

#[tokio::test]
async fn protected_call_without_token_is_auth_failure() {
    let (_backend, client) = setup().await;

    let err = client.current_user().await.unwrap_err();
    assert!(err.is_auth());
    assert_eq!(err.message_or("fallback"), "Could not validate credentials");
}

#[tokio::test]
async fn register_creates_user_with_zero_balance() {
    let (backend, client) = setup().await;

    let user = client
        .register(&RegisterRequest {
            first_name: "Dana".into(),
            last_name: "Lee".into(),
            email: "dana@example.com".into(),
            password: "hunter22".into(),
        })
        .await
        .unwrap();
    assert_eq!(user.full_name(), "Dana Lee");
    assert_eq!(user.points_balance, 0);
    assert!(backend.state().user_by_email("dana@example.com").is_some());

    let again = client
        .register(&RegisterRequest {
            first_name: "Dana".into(),
            last_name: "Lee".into(),
            email: "dana@example.com".into(),
            password: "hunter22".into(),
        })
        .await
        .unwrap_err();
    assert_eq!(again.kind(), ErrorKind::Validation);
    assert_eq!(again.detail(), Some("Email already registered"));
}

#[tokio::test]
async fn praise_feed_embeds_people_and_core_value() {
    let (_backend, client) = logged_in_as("chris@example.com", "password1").await;

    let praise = client.list_praise().await.unwrap();
    assert_eq!(praise.len(), 3);
    // newest first
    assert_eq!(praise[0].message, "Great call with the customer");
    assert_eq!(praise[0].giver.full_name(), "Chris Smith");
    assert_eq!(praise[0].core_value.name, "Customer Focus");
}

#[tokio::test]
async fn create_praise_sends_numeric_ids_and_credits_receiver() {
    let (backend, client) = logged_in_as("chris@example.com", "password1").await;
    let before = backend.balance_of(2).unwrap();

    let created = client
        .create_praise(&CreatePraiseRequest {
            receiver_id: 2,
            message: "Great work".into(),
            core_value_id: 1,
        })
        .await
        .unwrap();
    assert_eq!(created.receiver_id, 2);
    assert_eq!(created.points_awarded, POINTS_PER_PRAISE);
    assert_eq!(backend.balance_of(2), Some(before + POINTS_PER_PRAISE));

    let posted: Vec<_> = backend
        .requests_to("/praise")
        .into_iter()
        .filter(|r| r.method == Method::POST)
        .collect();
    assert_eq!(
        posted[0].body,
        Some(serde_json::json!({"receiver_id": 2, "message": "Great work", "core_value_id": 1}))
    );
}

#[tokio::test]
async fn praising_yourself_is_a_validation_failure() {
    let (_backend, client) = logged_in_as("chris@example.com", "password1").await;

    let err = client
        .create_praise(&CreatePraiseRequest {
            receiver_id: 1,
            message: "Me!".into(),
            core_value_id: 1,
        })
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Validation);
    assert_eq!(err.detail(), Some("You cannot praise yourself"));
}

#[tokio::test]
async fn catalog_lists_only_active_rewards_and_core_values() {
    let (_backend, client) = logged_in_as("chris@example.com", "password1").await;

    let rewards = client.list_rewards().await.unwrap();
    let names: Vec<_> = rewards.iter().map(|r| r.name.as_str()).collect();
    assert_eq!(names, ["Coffee Voucher", "Extra Day Off"]);

    let values = client.list_core_values().await.unwrap();
    assert_eq!(values.len(), 3);

    let users = client.list_users().await.unwrap();
    assert_eq!(users.len(), 2);
}

#[tokio::test]
async fn redeem_deducts_points_and_shows_in_history() {
    let (backend, client) = logged_in_as("sarah@example.com", "password2").await;

    let redemption = client.redeem_reward(2).await.unwrap();
    assert_eq!(redemption.points_spent, 100);
    assert_eq!(redemption.status, RedemptionStatus::Pending);

    let me = client.current_user().await.unwrap();
    assert_eq!(me.points_balance, 50);
    assert_eq!(backend.balance_of(2), Some(50));

    let history = client.my_redemptions().await.unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].reward.name, "Extra Day Off");
}

#[tokio::test]
async fn insufficient_points_is_rejected_by_backend() {
    let (_backend, client) = logged_in_as("chris@example.com", "password1").await;

    let err = client.redeem_reward(2).await.unwrap_err();
    assert_eq!(err.detail(), Some("Not enough points"));
    assert_eq!(err.message_or("Failed to redeem reward"), "Not enough points");
}

#[tokio::test]
async fn server_errors_without_detail_fall_back() {
    let (backend, client) = logged_in_as("chris@example.com", "password1").await;
    backend.fail_next(Method::GET, "/rewards", StatusCode::INTERNAL_SERVER_ERROR, None);

    let err = client.list_rewards().await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Server);
    assert_eq!(err.message_or("Failed to load rewards"), "Failed to load rewards");

    // fire-once: the next call goes through
    assert!(client.list_rewards().await.is_ok());
    assert_eq!(backend.requests_to("/rewards").len(), 2);
}

#[tokio::test]
async fn unreachable_backend_is_network_failure() {
    // Reserve a port, then release it so nothing is listening there.
    let addr = std::net::TcpListener::bind("127.0.0.1:0")
        .unwrap()
        .local_addr()
        .unwrap();

    let client =
        ApiClient::new(ApiConfig::with_base_url(format!("http://{addr}")), Session::in_memory())
            .unwrap();
    let err = client.list_praise().await.unwrap_err();
    assert!(matches!(err, ApiError::Transport(_)));
    assert_eq!(err.kind(), ErrorKind::Network);
    assert_eq!(err.message_or("Failed to load praise"), "Failed to load praise");
}
