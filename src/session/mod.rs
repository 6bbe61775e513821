//! Session subsystem.
//!
//! # Data Flow
//! ```text
//! submit(email) / resend()
//!     → controller.rs (teardown old, submit, start new)
//!     → guard.rs (new SessionId becomes current)
//!     → countdown.rs + confirmation poller (spawned, share a CancelSignal)
//!     → every tick / result applied through the guard
//!     → resolution → notice or navigation
//! ```
//!
//! # Design Decisions
//! - One active session per controller; starting one supersedes the last
//! - Stale callbacks are dropped by id comparison, not by timing
//! - Cancellation reaches every suspension point of both tasks

pub mod cancel;
pub mod controller;
pub mod countdown;
pub mod guard;

pub use cancel::{CancelListener, CancelSignal};
pub use controller::ResetController;
pub use countdown::{CountdownState, CountdownTimer};
pub use guard::{SessionGuard, SessionId};
