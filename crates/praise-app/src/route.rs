use std::fmt;

use tracing::{info, warn};

use praise_client::{ApiError, Session};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Route {
    /// Entry point; resolves to Dashboard or Login.
    Root,
    Login,
    Dashboard,
    GivePraise,
    Rewards,
}

impl Route {
    pub fn path(self) -> &'static str {
        match self {
            Self::Root => "/",
            Self::Login => "/login",
            Self::Dashboard => "/dashboard",
            Self::GivePraise => "/give-praise",
            Self::Rewards => "/rewards",
        }
    }

    pub fn is_protected(self) -> bool {
        matches!(self, Self::Dashboard | Self::GivePraise | Self::Rewards)
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}

/// Outcome of a navigation attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Guarded {
    Render(Route),
    Redirect(Route),
}

/// Decide what a navigation to `route` shows, from the session as it is now.
pub fn guard(session: &Session, route: Route) -> Guarded {
    let authenticated = session.is_authenticated();
    match route {
        Route::Root if authenticated => Guarded::Redirect(Route::Dashboard),
        Route::Root => Guarded::Redirect(Route::Login),
        r if r.is_protected() && !authenticated => Guarded::Redirect(Route::Login),
        r => Guarded::Render(r),
    }
}

/// For protected views: an authorization failure ends the session and sends
/// the user back to login. Other failures leave navigation alone.
pub(crate) fn logout_on_auth_failure(session: &Session, err: &ApiError) -> Option<Route> {
    if !err.is_auth() {
        return None;
    }
    info!("Session rejected by backend, logging out");
    if let Err(e) = session.remove_token() {
        warn!("Failed to clear rejected session: {}", e);
    }
    Some(Route::Login)
}
