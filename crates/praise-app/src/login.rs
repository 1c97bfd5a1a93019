//! Login / register screen.

use tracing::info;

use praise_client::{ApiClient, ApiError};
use praise_types::api::RegisterRequest;

use crate::route::Route;

const GENERIC_ERROR: &str = "An error occurred";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginMode {
    Login,
    Register,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
    /// Register mode only.
    pub first_name: String,
    /// Register mode only.
    pub last_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginScreen {
    pub title: &'static str,
    pub heading: &'static str,
    pub fields: Vec<&'static str>,
    pub button: &'static str,
    pub toggle_prompt: &'static str,
    pub toggle_link: &'static str,
    pub error: Option<String>,
}

/// An in-flight login or registration, detached from the view.
pub struct LoginAttempt {
    client: ApiClient,
    mode: LoginMode,
    form: LoginForm,
}

impl LoginAttempt {
    /// Register first in register mode, then log in and store the token.
    /// The error is the text the view shows.
    pub async fn run(self) -> Result<(), String> {
        let shown = |e: ApiError| e.message_or(GENERIC_ERROR);

        if self.mode == LoginMode::Register {
            let req = RegisterRequest {
                first_name: self.form.first_name.clone(),
                last_name: self.form.last_name.clone(),
                email: self.form.email.clone(),
                password: self.form.password.clone(),
            };
            let user = self.client.register(&req).await.map_err(shown)?;
            info!("Registered user {}", user.id);
        }

        let token = self
            .client
            .login(&self.form.email, &self.form.password)
            .await
            .map_err(shown)?;

        self.client
            .session()
            .set_token(&token.access_token)
            .map_err(|e| format!("Could not save session: {e}"))?;
        info!("Logged in as {}", self.form.email);
        Ok(())
    }
}

pub struct LoginView {
    client: ApiClient,
    mode: LoginMode,
    form: LoginForm,
    error: Option<String>,
    loading: bool,
}

impl LoginView {
    pub fn new(client: ApiClient) -> Self {
        Self {
            client,
            mode: LoginMode::Login,
            form: LoginForm::default(),
            error: None,
            loading: false,
        }
    }

    pub fn mode(&self) -> LoginMode {
        self.mode
    }

    pub fn form(&self) -> &LoginForm {
        &self.form
    }

    pub fn form_mut(&mut self) -> &mut LoginForm {
        &mut self.form
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    /// Switch between login and register. Field values are kept.
    pub fn toggle_mode(&mut self) {
        self.mode = match self.mode {
            LoginMode::Login => LoginMode::Register,
            LoginMode::Register => LoginMode::Login,
        };
    }

    /// Submit the form for the current mode.
    ///
    /// On success the session holds the new token and the dashboard route is
    /// returned. On failure the error is shown and the form is left as typed.
    pub async fn submit(&mut self) -> Option<Route> {
        let attempt = self.begin_submit();
        let outcome = attempt.run().await;
        self.finish_submit(outcome)
    }

    /// First half of [`submit`](Self::submit): enter the loading state and
    /// snapshot the form. The view can be rendered while the attempt runs.
    pub fn begin_submit(&mut self) -> LoginAttempt {
        self.error = None;
        self.loading = true;
        LoginAttempt {
            client: self.client.clone(),
            mode: self.mode,
            form: self.form.clone(),
        }
    }

    /// Second half of [`submit`](Self::submit).
    pub fn finish_submit(&mut self, outcome: Result<(), String>) -> Option<Route> {
        self.loading = false;
        match outcome {
            Ok(()) => Some(Route::Dashboard),
            Err(message) => {
                self.error = Some(message);
                None
            }
        }
    }

    pub fn render(&self) -> LoginScreen {
        let (heading, fields, toggle_prompt, toggle_link) = match self.mode {
            LoginMode::Login => (
                "Login",
                vec!["email", "password"],
                "Don't have an account? ",
                "Register",
            ),
            LoginMode::Register => (
                "Register",
                vec!["first_name", "last_name", "email", "password"],
                "Already have an account? ",
                "Login",
            ),
        };
        let button = if self.loading { "Loading..." } else { heading };

        LoginScreen {
            title: "Praise App",
            heading,
            fields,
            button,
            toggle_prompt,
            toggle_link,
            error: self.error.clone(),
        }
    }
}
