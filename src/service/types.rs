//! Service-facing types and error definitions.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Message used when a failed response carries none of its own.
pub const FALLBACK_MESSAGE: &str = "Please try again later.";

/// A password reset request. Lives only as long as one attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResetRequest {
    pub email: String,
}

impl ResetRequest {
    pub fn new(email: impl Into<String>) -> Self {
        Self {
            email: email.into(),
        }
    }
}

/// JSON body the service answers with.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ServiceBody {
    #[serde(default)]
    pub message: Option<String>,
}

/// A response that made it back from the service, whatever its status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceResponse {
    /// HTTP status code.
    pub status: u16,
    /// `message` field of the body, if the body was JSON and had one.
    pub message: Option<String>,
}

impl ServiceResponse {
    pub fn new(status: u16, message: Option<String>) -> Self {
        Self { status, message }
    }

    /// Only a plain 200 counts; the service answers nothing else on success.
    pub fn is_success(&self) -> bool {
        self.status == 200
    }

    /// Body message, or the fallback when the service sent none.
    pub fn message_or_fallback(&self) -> String {
        self.message
            .clone()
            .unwrap_or_else(|| FALLBACK_MESSAGE.to_string())
    }
}

/// The call never produced a response.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    #[error("request failed: {0}")]
    Connect(String),

    #[error("request timed out after {0} seconds")]
    Timeout(u64),
}

/// Why a reset request was not accepted.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SubmissionError {
    /// No response from the service.
    #[error("network error: {0}")]
    Network(String),

    /// The service rejected the email.
    #[error("validation error: {0}")]
    Validation(String),

    /// Any other non-success status.
    #[error("Status: {0} - {1}")]
    Unknown(u16, String),
}
