//! Remote reset service subsystem.
//!
//! # Data Flow
//! ```text
//! ResetRequest
//!     → submitter.rs (single call, classify status)
//!     → client.rs (HTTP POST with timeout)
//!     → ServiceResponse { status, message } | TransportError
//! ```
//!
//! # Design Decisions
//! - The client never interprets statuses; submitter and poller do
//! - Every call has a deadline even though the poller bounds total time

pub mod client;
pub mod submitter;
pub mod types;

pub use client::{HttpResetService, ResetService};
pub use submitter::submit;
pub use types::{ResetRequest, ServiceResponse, SubmissionError, TransportError};
