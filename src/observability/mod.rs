//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! submitter / poller / controller produce:
//!     → logging.rs (structured tracing events)
//!     → metrics.rs (counters through the `metrics` facade)
//! ```
//!
//! # Design Decisions
//! - Session id and email travel as structured fields
//! - The library never installs a metrics recorder; the host decides

pub mod logging;
pub mod metrics;
