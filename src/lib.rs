//! Password reset email confirmation watcher.
//!
//! Submits a password reset request, then polls the reset service until the
//! user confirms the email, while running a countdown that gates resending.

pub mod collaborators;
pub mod config;
pub mod confirmation;
pub mod email;
pub mod error;
pub mod observability;
pub mod service;
pub mod session;

pub use config::ResetConfig;
pub use error::{ResetError, ResetResult};
pub use service::HttpResetService;
pub use session::ResetController;
