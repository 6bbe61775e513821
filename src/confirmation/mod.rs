//! Email confirmation subsystem.
//!
//! # Data Flow
//! ```text
//! accepted ResetRequest
//!     → poller.rs (initial delay, bounded checks, fixed interval)
//!     → PollObserver (state + per-attempt reports)
//!     → PollResolution { Confirmed | Exhausted | Cancelled }
//! ```
//!
//! # Design Decisions
//! - One poller per session, consumed by its run
//! - Single check failures are swallowed; the attempt bound is the timeout
//! - Cancellation is checked at every suspension point

pub mod poller;
pub mod types;

pub use poller::ConfirmationPoller;
pub use types::{
    ConfirmationSession, PollAttempt, PollObserver, PollOutcome, PollResolution, PollerState,
};
