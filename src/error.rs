//! Errors surfaced by the reset flow.

use thiserror::Error;

use crate::email::EmailError;
use crate::service::types::SubmissionError;

/// Why a submit or resend did not start a session.
///
/// By the time one of these is returned the user has already been
/// notified, except for `Cancelled`, which is silent.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResetError {
    #[error(transparent)]
    InvalidEmail(#[from] EmailError),

    #[error(transparent)]
    Submission(#[from] SubmissionError),

    /// The flow was cancelled while the request was in flight.
    #[error("Request cancelled before confirmation started")]
    Cancelled,
}

/// Result type for controller operations.
pub type ResetResult<T> = Result<T, ResetError>;
