use std::time::Duration;

use shared::domain::SpreadId;
use thiserror::Error;

/// Coarse classification used by callers that only care about how a call
/// failed, not where.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The request never completed: connect/DNS failure, timeout, or a
    /// non-2xx status.
    Network,
    /// The body was not the expected JSON shape.
    Protocol,
    /// The backend answered `success: false`.
    Application,
    NotFound,
    InvalidInput,
}

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("request to {endpoint} failed: {message}")]
    Network { endpoint: String, message: String },
    #[error("request to {endpoint} returned HTTP {status}")]
    HttpStatus { endpoint: String, status: u16 },
    #[error("request timed out after {0:?}")]
    Timeout(Duration),
    #[error("malformed response from {endpoint}: {message}")]
    Protocol { endpoint: String, message: String },
    #[error("backend reported failure: {0}")]
    Application(String),
    #[error("spread not found: {0}")]
    NotFound(SpreadId),
    #[error("invalid request: {0}")]
    InvalidInput(String),
}

impl ClientError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Network { .. } | Self::HttpStatus { .. } | Self::Timeout(_) => ErrorKind::Network,
            Self::Protocol { .. } => ErrorKind::Protocol,
            Self::Application(_) => ErrorKind::Application,
            Self::NotFound(_) => ErrorKind::NotFound,
            Self::InvalidInput(_) => ErrorKind::InvalidInput,
        }
    }

    pub(crate) fn network(endpoint: &str, source: reqwest::Error) -> Self {
        if source.is_timeout() {
            return Self::Network {
                endpoint: endpoint.to_string(),
                message: format!("timed out: {source}"),
            };
        }
        Self::Network {
            endpoint: endpoint.to_string(),
            message: source.to_string(),
        }
    }

    pub(crate) fn protocol(endpoint: &str, message: impl Into<String>) -> Self {
        Self::Protocol {
            endpoint: endpoint.to_string(),
            message: message.into(),
        }
    }
}
