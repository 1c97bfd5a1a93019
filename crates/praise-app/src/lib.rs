//! Screens of the praise client as state machines.
//!
//! Each view owns its local state, talks to the backend through an
//! [`praise_client::ApiClient`], and exposes a render model for whatever front-end
//! draws it. Navigation is expressed as [`Route`] values returned from view
//! actions; [`guard`] decides whether a route may be shown at all.

pub mod dashboard;
pub mod give_praise;
pub mod login;
pub mod rewards;
pub mod route;

pub use dashboard::{DashboardScreen, DashboardView, ROTATION_PERIOD};
pub use give_praise::{GivePraiseView, PendingRedirect, PraiseSubmission, REDIRECT_DELAY};
pub use login::{LoginAttempt, LoginMode, LoginView};
pub use rewards::{BANNER_TTL, Banner, BannerKind, RewardsView};
pub use route::{Guarded, Route, guard};
