use std::fmt;

use reqwest::StatusCode;
use thiserror::Error;

/// Broad failure category, so callers can react differently to, say, an
/// expired session versus a rejected form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The request never produced a response.
    Network,
    /// 401 or 403: missing, invalid or expired token.
    Auth,
    /// 400 or 422: the backend rejected the request body.
    Validation,
    /// Any other 4xx: a business rule said no (not enough points, duplicate, missing record).
    Business,
    /// 5xx.
    Server,
    /// Success status with a body that did not parse.
    Decode,
}

impl ErrorKind {
    pub fn from_status(status: StatusCode) -> Self {
        match status.as_u16() {
            401 | 403 => Self::Auth,
            400 | 422 => Self::Validation,
            400..=499 => Self::Business,
            _ => Self::Server,
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Network => "network",
            Self::Auth => "auth",
            Self::Validation => "validation",
            Self::Business => "business",
            Self::Server => "server",
            Self::Decode => "decode",
        };
        f.write_str(name)
    }
}

/// Failure of a single API call.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("request failed: {0}")]
    Transport(#[source] reqwest::Error),

    #[error("{status}: {}", detail.as_deref().unwrap_or("no detail"))]
    Status {
        status: StatusCode,
        kind: ErrorKind,
        detail: Option<String>,
    },

    #[error("unexpected response body: {0}")]
    Decode(#[source] reqwest::Error),

    #[error("invalid API URL '{0}'")]
    InvalidUrl(String),
}

impl ApiError {
    pub fn from_status(status: StatusCode, detail: Option<String>) -> Self {
        Self::Status {
            status,
            kind: ErrorKind::from_status(status),
            detail,
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Transport(_) | Self::InvalidUrl(_) => ErrorKind::Network,
            Self::Status { kind, .. } => *kind,
            Self::Decode(_) => ErrorKind::Decode,
        }
    }

    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Server-supplied human-readable detail, when there was one.
    pub fn detail(&self) -> Option<&str> {
        match self {
            Self::Status { detail, .. } => detail.as_deref(),
            _ => None,
        }
    }

    /// The text a view shows for this failure.
    pub fn message_or(&self, fallback: &str) -> String {
        self.detail().unwrap_or(fallback).to_string()
    }

    pub fn is_auth(&self) -> bool {
        self.kind() == ErrorKind::Auth
    }
}

/// Token persistence failure.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("session storage I/O failed for {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("session file {path} is malformed: {source}")]
    Malformed {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}
