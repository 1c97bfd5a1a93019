mod common;

use std::time::Duration;

use tokio::time::Instant;

use praise_app::give_praise::PraiseForm;
use praise_app::{GivePraiseView, PendingRedirect, REDIRECT_DELAY, Route};
use praise_harness::{Method, POINTS_PER_PRAISE};

use common::{CHRIS, SARAH, backend, logged_in, stale_session};

fn fill(view: &mut GivePraiseView, receiver: &str, core_value: &str, message: &str) {
    *view.form_mut() = PraiseForm {
        receiver_id: receiver.into(),
        core_value_id: core_value.into(),
        message: message.into(),
    };
}

fn praise_posts(backend: &praise_harness::StubBackend) -> Vec<praise_harness::RecordedRequest> {
    backend
        .requests_to("/praise")
        .into_iter()
        .filter(|r| r.method == Method::POST)
        .collect()
}

#[tokio::test]
async fn mount_loads_recipients_and_core_values_from_backend() {
    let backend = backend().await;
    let mut view = GivePraiseView::new(logged_in(&backend, CHRIS));

    assert_eq!(view.mount().await, None);
    assert_eq!(view.core_values().len(), 3);
    assert_eq!(view.recipients().len(), 2);

    let screen = view.render();
    let labels: Vec<_> = screen.recipients.iter().map(|c| c.label.as_str()).collect();
    assert_eq!(labels, ["Chris Smith", "Sarah Johnson"]);
    assert_eq!(screen.core_values[0].value, "1");
    assert_eq!(screen.core_values[0].label, "Teamwork");
    assert_eq!(screen.button, "Send Praise");

    assert_eq!(backend.requests_to("/users").len(), 1);
    assert_eq!(backend.requests_to("/core-values").len(), 1);
}

#[tokio::test]
async fn recipients_come_from_the_user_listing() {
    let backend = backend().await;
    backend
        .state()
        .add_user(3, "alex@example.com", "pw", "Alex", "Kim", 0);
    let mut view = GivePraiseView::new(logged_in(&backend, CHRIS));
    view.mount().await;

    assert!(view.recipients().iter().any(|u| u.full_name() == "Alex Kim"));
}

#[tokio::test]
async fn submit_sends_numeric_ids_and_resets_form() {
    let backend = backend().await;
    let mut view = GivePraiseView::new(logged_in(&backend, CHRIS));
    view.mount().await;
    let before = backend.balance_of(SARAH).unwrap();

    fill(&mut view, "2", "1", "Great work");
    let redirect = view.submit().await.expect("redirect after success");

    let posts = praise_posts(&backend);
    assert_eq!(posts.len(), 1);
    assert_eq!(
        posts[0].body,
        Some(serde_json::json!({"receiver_id": 2, "core_value_id": 1, "message": "Great work"}))
    );
    assert_eq!(backend.balance_of(SARAH), Some(before + POINTS_PER_PRAISE));

    assert!(view.is_success());
    assert_eq!(view.form(), &PraiseForm::default());
    assert_eq!(view.error(), None);
    assert_eq!(
        view.render().success,
        Some("Praise sent successfully! Redirecting to dashboard...")
    );

    assert_eq!(redirect.route(), Route::Dashboard);
    tokio::time::pause();
    assert!(redirect.deadline() > Instant::now());
    assert_eq!(redirect.wait().await, Route::Dashboard);
}

#[tokio::test(start_paused = true)]
async fn redirect_fires_after_two_seconds() {
    let start = Instant::now();
    let redirect = PendingRedirect::after(Route::Dashboard, REDIRECT_DELAY);
    assert_eq!(redirect.deadline(), start + Duration::from_millis(2000));

    let waiting = tokio::spawn(redirect.wait());
    tokio::time::sleep(Duration::from_millis(1999)).await;
    assert!(!waiting.is_finished());

    tokio::time::sleep(Duration::from_millis(2)).await;
    assert_eq!(waiting.await.unwrap(), Route::Dashboard);
    assert!(Instant::now() >= start + REDIRECT_DELAY);
}

#[tokio::test]
async fn server_rejection_keeps_entered_values() {
    let backend = backend().await;
    let mut view = GivePraiseView::new(logged_in(&backend, CHRIS));
    view.mount().await;

    fill(&mut view, "1", "2", "Praising myself");
    assert_eq!(view.submit().await, None);

    assert_eq!(view.error(), Some("You cannot praise yourself"));
    assert!(!view.is_success());
    assert_eq!(view.form().receiver_id, "1");
    assert_eq!(view.form().core_value_id, "2");
    assert_eq!(view.form().message, "Praising myself");
}

#[tokio::test]
async fn unselected_fields_never_reach_the_backend() {
    let backend = backend().await;
    let mut view = GivePraiseView::new(logged_in(&backend, CHRIS));

    fill(&mut view, "", "1", "Nice");
    assert_eq!(view.submit().await, None);
    assert_eq!(view.error(), Some("Please select a person to praise"));

    fill(&mut view, "2", "abc", "Nice");
    assert_eq!(view.submit().await, None);
    assert_eq!(view.error(), Some("Please select a core value"));

    fill(&mut view, "2", "1", "   ");
    assert_eq!(view.submit().await, None);
    assert_eq!(view.error(), Some("Please write a message"));

    assert!(praise_posts(&backend).is_empty());
}

#[tokio::test]
async fn load_failure_shows_generic_message() {
    let backend = backend().await;
    backend.fail_next(
        Method::GET,
        "/users",
        praise_harness::StatusCode::INTERNAL_SERVER_ERROR,
        Some("database down"),
    );
    let mut view = GivePraiseView::new(logged_in(&backend, CHRIS));

    assert_eq!(view.mount().await, None);
    assert_eq!(view.error(), Some("Failed to load data"));
}

#[tokio::test]
async fn expired_session_redirects_to_login_immediately() {
    let backend = backend().await;
    let client = stale_session(&backend);
    let session = client.session().clone();
    let mut view = GivePraiseView::new(client);

    fill(&mut view, "2", "1", "Great work");
    let redirect = view.submit().await.expect("logout redirect");
    assert_eq!(redirect.route(), Route::Login);
    assert!(redirect.deadline() <= Instant::now());
    assert!(!session.is_authenticated());
    assert_eq!(view.error(), Some("Could not validate credentials"));
    assert_eq!(view.form().message, "Great work");
}

#[tokio::test]
async fn button_shows_sending_while_submission_runs() {
    let backend = backend().await;
    let mut view = GivePraiseView::new(logged_in(&backend, CHRIS));
    view.mount().await;
    fill(&mut view, "2", "3", "Thanks for the demo");

    let submission = view.begin_submit().expect("valid form");
    assert!(view.is_loading());
    assert_eq!(view.render().button, "Sending...");
    assert_eq!(submission.request().receiver_id, SARAH);

    let result = submission.send().await;
    let redirect = view.finish_submit(result).expect("redirect after success");
    assert_eq!(redirect.route(), Route::Dashboard);
    assert!(!view.is_loading());
    assert_eq!(view.render().button, "Send Praise");
}

#[tokio::test]
async fn invalid_form_never_enters_sending_state() {
    let backend = backend().await;
    let mut view = GivePraiseView::new(logged_in(&backend, CHRIS));

    fill(&mut view, "", "1", "Nice");
    assert!(view.begin_submit().is_none());
    assert!(!view.is_loading());
    assert_eq!(view.render().button, "Send Praise");
}
