//! Session handling and the typed HTTP client for the praise backend.

pub mod client;
pub mod error;
pub mod session;

pub use client::{ApiClient, ApiConfig};
pub use error::{ApiError, ErrorKind, SessionError};
pub use session::{FileTokenStore, MemoryTokenStore, Session, TokenStore};
pub use reqwest::StatusCode;
