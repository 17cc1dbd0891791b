use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Status fields the backend attaches to every JSON body. Failures carry
/// `success: false` plus a human readable `error`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ApiStatus {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub success: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ApiStatus {
    /// Returns the reported failure when the body says `success: false`.
    /// A missing `success` field counts as success.
    pub fn into_failure(self) -> Option<ApiException> {
        match self.success {
            Some(false) => Some(ApiException::new(
                self.error
                    .unwrap_or_else(|| "backend reported failure without a message".to_string()),
            )),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct ApiException {
    pub message: String,
}

impl ApiException {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}
