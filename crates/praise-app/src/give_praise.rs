//! Give-praise form.

use std::time::Duration;

use tokio::time::{Instant, sleep_until};
use tracing::{debug, info};

use praise_client::{ApiClient, ApiError};
use praise_types::api::CreatePraiseRequest;
use praise_types::models::{CoreValue, Praise, User};

use crate::route::{Route, logout_on_auth_failure};

/// How long the confirmation stays up before moving to the dashboard.
pub const REDIRECT_DELAY: Duration = Duration::from_secs(2);

const LOAD_ERROR: &str = "Failed to load data";
const SUBMIT_ERROR: &str = "Failed to give praise";
const SUCCESS_MESSAGE: &str = "Praise sent successfully! Redirecting to dashboard...";

/// Navigation that should happen at a fixed point in time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PendingRedirect {
    to: Route,
    at: Instant,
}

impl PendingRedirect {
    pub fn after(to: Route, delay: Duration) -> Self {
        Self {
            to,
            at: Instant::now() + delay,
        }
    }

    pub fn now(to: Route) -> Self {
        Self::after(to, Duration::ZERO)
    }

    pub fn route(&self) -> Route {
        self.to
    }

    pub fn deadline(&self) -> Instant {
        self.at
    }

    /// Sleep until the deadline, then yield the target route.
    pub async fn wait(self) -> Route {
        sleep_until(self.at).await;
        self.to
    }
}

/// Selection fields hold the raw option values, as typed or picked.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PraiseForm {
    pub receiver_id: String,
    pub core_value_id: String,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Choice {
    pub value: String,
    pub label: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GivePraiseScreen {
    pub recipients: Vec<Choice>,
    pub core_values: Vec<Choice>,
    pub form: PraiseForm,
    pub button: &'static str,
    pub success: Option<&'static str>,
    pub error: Option<String>,
}

/// A validated praise on its way to the backend.
pub struct PraiseSubmission {
    client: ApiClient,
    req: CreatePraiseRequest,
}

impl PraiseSubmission {
    pub fn request(&self) -> &CreatePraiseRequest {
        &self.req
    }

    pub async fn send(self) -> Result<Praise, ApiError> {
        self.client.create_praise(&self.req).await
    }
}

pub struct GivePraiseView {
    client: ApiClient,
    recipients: Vec<User>,
    core_values: Vec<CoreValue>,
    form: PraiseForm,
    loading: bool,
    success: bool,
    error: Option<String>,
}

impl GivePraiseView {
    pub fn new(client: ApiClient) -> Self {
        Self {
            client,
            recipients: Vec::new(),
            core_values: Vec::new(),
            form: PraiseForm::default(),
            loading: false,
            success: false,
            error: None,
        }
    }

    /// Load the selectable core values and recipients.
    pub async fn mount(&mut self) -> Option<Route> {
        let loaded = tokio::try_join!(self.client.list_core_values(), self.client.list_users());
        match loaded {
            Ok((core_values, recipients)) => {
                debug!(
                    "Loaded {} core values and {} recipients",
                    core_values.len(),
                    recipients.len()
                );
                self.core_values = core_values;
                self.recipients = recipients;
                None
            }
            Err(e) => {
                self.error = Some(LOAD_ERROR.to_string());
                logout_on_auth_failure(self.client.session(), &e)
            }
        }
    }

    pub fn recipients(&self) -> &[User] {
        &self.recipients
    }

    pub fn core_values(&self) -> &[CoreValue] {
        &self.core_values
    }

    pub fn form(&self) -> &PraiseForm {
        &self.form
    }

    pub fn form_mut(&mut self) -> &mut PraiseForm {
        &mut self.form
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn is_success(&self) -> bool {
        self.success
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    fn build_request(&self) -> Result<CreatePraiseRequest, String> {
        let receiver_id = self
            .form
            .receiver_id
            .trim()
            .parse()
            .map_err(|_| "Please select a person to praise".to_string())?;
        let core_value_id = self
            .form
            .core_value_id
            .trim()
            .parse()
            .map_err(|_| "Please select a core value".to_string())?;
        if self.form.message.trim().is_empty() {
            return Err("Please write a message".into());
        }

        Ok(CreatePraiseRequest {
            receiver_id,
            message: self.form.message.clone(),
            core_value_id,
        })
    }

    /// Send the praise.
    ///
    /// Success clears the form and returns a redirect to the dashboard due in
    /// [`REDIRECT_DELAY`]. A rejected session returns an immediate redirect to
    /// login. Any other failure keeps the form as entered and returns `None`.
    pub async fn submit(&mut self) -> Option<PendingRedirect> {
        let submission = self.begin_submit()?;
        let result = submission.send().await;
        self.finish_submit(result)
    }

    /// Validate the form and enter the sending state. `None` means the form
    /// was rejected locally and the error is already set.
    pub fn begin_submit(&mut self) -> Option<PraiseSubmission> {
        self.error = None;
        self.success = false;

        match self.build_request() {
            Ok(req) => {
                self.loading = true;
                Some(PraiseSubmission {
                    client: self.client.clone(),
                    req,
                })
            }
            Err(message) => {
                self.error = Some(message);
                None
            }
        }
    }

    pub fn finish_submit(&mut self, result: Result<Praise, ApiError>) -> Option<PendingRedirect> {
        self.loading = false;
        match result {
            Ok(praise) => {
                info!("Praise {} sent to user {}", praise.id, praise.receiver_id);
                self.success = true;
                self.form = PraiseForm::default();
                Some(PendingRedirect::after(Route::Dashboard, REDIRECT_DELAY))
            }
            Err(e) => {
                self.error = Some(e.message_or(SUBMIT_ERROR));
                logout_on_auth_failure(self.client.session(), &e).map(PendingRedirect::now)
            }
        }
    }

    pub fn render(&self) -> GivePraiseScreen {
        GivePraiseScreen {
            recipients: self
                .recipients
                .iter()
                .map(|u| Choice {
                    value: u.id.to_string(),
                    label: u.full_name(),
                })
                .collect(),
            core_values: self
                .core_values
                .iter()
                .map(|c| Choice {
                    value: c.id.to_string(),
                    label: c.name.clone(),
                })
                .collect(),
            form: self.form.clone(),
            button: if self.loading { "Sending..." } else { "Send Praise" },
            success: self.success.then_some(SUCCESS_MESSAGE),
            error: self.error.clone(),
        }
    }
}
