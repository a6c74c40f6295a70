use reqwest::StatusCode;
use thiserror::Error;

use crate::provider::ProviderId;

/// Everything that can go wrong during a single fetch.
///
/// The display string is what ends up under the `error` key of a failed
/// envelope.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    #[error("Request timeout while fetching {}", .0.subject())]
    Timeout(ProviderId),

    #[error("Connection error while accessing {}", .0.api_name())]
    Connection(ProviderId),

    #[error("HTTP error {status}: {reason}")]
    Status { status: u16, reason: String },

    #[error("Request failed: {0}")]
    Request(String),

    #[error("Invalid response format from {}", .0.api_name())]
    InvalidResponse(ProviderId),

    #[error("Unexpected error: {0}")]
    Unexpected(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FetchErrorKind {
    Timeout,
    Connection,
    Status,
    Request,
    InvalidResponse,
    Unexpected,
}

impl FetchError {
    pub fn kind(&self) -> FetchErrorKind {
        match self {
            FetchError::Timeout(_) => FetchErrorKind::Timeout,
            FetchError::Connection(_) => FetchErrorKind::Connection,
            FetchError::Status { .. } => FetchErrorKind::Status,
            FetchError::Request(_) => FetchErrorKind::Request,
            FetchError::InvalidResponse(_) => FetchErrorKind::InvalidResponse,
            FetchError::Unexpected(_) => FetchErrorKind::Unexpected,
        }
    }

    pub fn from_status(status: StatusCode) -> Self {
        FetchError::Status {
            status: status.as_u16(),
            reason: status.canonical_reason().unwrap_or("Unknown").to_string(),
        }
    }

    /// Maps a client error onto the taxonomy. First match wins.
    pub fn from_transport(provider: ProviderId, err: reqwest::Error) -> Self {
        if err.is_timeout() {
            FetchError::Timeout(provider)
        } else if err.is_connect() {
            FetchError::Connection(provider)
        } else if let Some(status) = err.status() {
            FetchError::from_status(status)
        } else {
            FetchError::Request(err.to_string())
        }
    }
}
