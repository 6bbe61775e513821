//! Metrics collection.
//!
//! # Metrics
//! - `reset_submissions_total` (counter): reset requests by outcome
//! - `reset_poll_attempts_total` (counter): confirmation checks by outcome
//! - `reset_sessions_total` (counter): sessions by resolution

use metrics::counter;

pub fn record_submission(outcome: &'static str) {
    counter!("reset_submissions_total", "outcome" => outcome).increment(1);
}

pub fn record_poll_attempt(outcome: &'static str) {
    counter!("reset_poll_attempts_total", "outcome" => outcome).increment(1);
}

pub fn record_session(resolution: &'static str) {
    counter!("reset_sessions_total", "resolution" => resolution).increment(1);
}
