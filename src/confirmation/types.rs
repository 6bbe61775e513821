//! Confirmation polling types.

use std::time::Duration;

use serde::Serialize;
use tokio::time::Instant;

use crate::config::PollingConfig;
use crate::session::guard::SessionId;

/// Result of one confirmation check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum PollOutcome {
    /// Issued, no answer yet.
    Pending,
    /// The service reported the email as confirmed.
    Confirmed,
    /// The service answered, but not with the confirmation phrase.
    NotYetConfirmed,
    /// No usable answer: transport failure or error status.
    TransientError,
}

impl PollOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            PollOutcome::Pending => "pending",
            PollOutcome::Confirmed => "confirmed",
            PollOutcome::NotYetConfirmed => "not_yet_confirmed",
            PollOutcome::TransientError => "transient_error",
        }
    }
}

/// One confirmation check. Not retained once reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollAttempt {
    /// 1-based.
    pub attempt_number: u32,
    pub issued_at: Instant,
    pub outcome: PollOutcome,
}

impl PollAttempt {
    pub fn issue(attempt_number: u32) -> Self {
        Self {
            attempt_number,
            issued_at: Instant::now(),
            outcome: PollOutcome::Pending,
        }
    }
}

/// Poller state machine.
///
/// ```text
/// Idle → WaitingInitialDelay → Polling → Confirmed
///                                      → Exhausted
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum PollerState {
    Idle,
    WaitingInitialDelay,
    Polling { attempt: u32 },
    Confirmed,
    Exhausted,
}

impl PollerState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, PollerState::Confirmed | PollerState::Exhausted)
    }
}

/// How a poller run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollResolution {
    Confirmed { attempts: u32 },
    Exhausted { attempts: u32 },
    /// Superseded or torn down; the caller must discard it.
    Cancelled,
}

impl PollResolution {
    pub fn as_str(&self) -> &'static str {
        match self {
            PollResolution::Confirmed { .. } => "confirmed",
            PollResolution::Exhausted { .. } => "exhausted",
            PollResolution::Cancelled => "cancelled",
        }
    }
}

/// Everything one poller owns for the life of one confirmation attempt.
#[derive(Debug, Clone)]
pub struct ConfirmationSession {
    pub id: SessionId,
    pub email: String,
    pub started_at: Instant,
    pub attempts_made: u32,
    pub max_attempts: u32,
    pub poll_interval: Duration,
    pub initial_delay: Duration,
}

impl ConfirmationSession {
    pub fn new(id: SessionId, email: impl Into<String>, config: &PollingConfig) -> Self {
        Self {
            id,
            email: email.into(),
            started_at: Instant::now(),
            attempts_made: 0,
            max_attempts: config.max_attempts,
            poll_interval: config.interval(),
            initial_delay: config.initial_delay(),
        }
    }

    pub fn is_exhausted(&self) -> bool {
        self.attempts_made >= self.max_attempts
    }
}

/// Receives poller progress. Implementations decide whether it still
/// matters, the poller reports unconditionally.
pub trait PollObserver: Send + Sync {
    fn on_state(&self, state: PollerState);

    fn on_attempt(&self, _attempt: &PollAttempt) {}
}
