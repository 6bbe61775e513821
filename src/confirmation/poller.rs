//! Bounded confirmation polling.
//!
//! Waits out the initial delay, then asks the service up to `max_attempts`
//! times whether the email is confirmed, sleeping `poll_interval` after
//! each non-confirming answer. Any failure of a single check counts as
//! "not yet": only `Confirmed` and `Exhausted` leave the loop.

use std::sync::Arc;

use tokio::time::sleep;

use crate::config::PollingConfig;
use crate::confirmation::types::{
    ConfirmationSession, PollAttempt, PollObserver, PollOutcome, PollResolution, PollerState,
};
use crate::observability::metrics;
use crate::service::client::ResetService;
use crate::service::types::{ServiceResponse, TransportError};
use crate::session::cancel::CancelListener;
use crate::session::guard::SessionId;

/// Polls for one session. Consumed by [`ConfirmationPoller::run`].
pub struct ConfirmationPoller {
    session: ConfirmationSession,
    service: Arc<dyn ResetService>,
    phrase: String,
}

impl ConfirmationPoller {
    pub fn new(
        id: SessionId,
        email: impl Into<String>,
        config: &PollingConfig,
        service: Arc<dyn ResetService>,
    ) -> Self {
        Self {
            session: ConfirmationSession::new(id, email, config),
            service,
            phrase: config.confirmation_phrase.trim().to_lowercase(),
        }
    }

    /// Drive the session to a resolution.
    ///
    /// Every wait and every in-flight check races `cancel`; a cancelled run
    /// returns [`PollResolution::Cancelled`] without reporting further state.
    pub async fn run(
        mut self,
        mut cancel: CancelListener,
        observer: &dyn PollObserver,
    ) -> PollResolution {
        let id = self.session.id;

        tracing::info!(
            session = %id,
            email = %self.session.email,
            max_attempts = self.session.max_attempts,
            "Waiting for email confirmation"
        );

        observer.on_state(PollerState::WaitingInitialDelay);
        tokio::select! {
            _ = sleep(self.session.initial_delay) => {}
            _ = cancel.cancelled() => return PollResolution::Cancelled,
        }

        while !self.session.is_exhausted() {
            let mut attempt = PollAttempt::issue(self.session.attempts_made + 1);
            observer.on_state(PollerState::Polling {
                attempt: attempt.attempt_number,
            });

            let result = tokio::select! {
                result = self.service.check_email_confirmed(&self.session.email) => result,
                _ = cancel.cancelled() => return PollResolution::Cancelled,
            };

            attempt.outcome = classify(result, &self.phrase);
            metrics::record_poll_attempt(attempt.outcome.as_str());
            observer.on_attempt(&attempt);

            if attempt.outcome == PollOutcome::Confirmed {
                tracing::info!(
                    session = %id,
                    attempt = attempt.attempt_number,
                    elapsed_ms = self.session.started_at.elapsed().as_millis() as u64,
                    "Email confirmed"
                );
                observer.on_state(PollerState::Confirmed);
                return PollResolution::Confirmed {
                    attempts: attempt.attempt_number,
                };
            }

            self.session.attempts_made += 1;

            tokio::select! {
                _ = sleep(self.session.poll_interval) => {}
                _ = cancel.cancelled() => return PollResolution::Cancelled,
            }
        }

        tracing::warn!(
            session = %id,
            attempts = self.session.attempts_made,
            "Email confirmation not completed in time"
        );
        observer.on_state(PollerState::Exhausted);
        PollResolution::Exhausted {
            attempts: self.session.attempts_made,
        }
    }
}

/// Decide what one check means. `phrase` must already be trimmed and
/// lowercased.
pub fn classify(result: Result<ServiceResponse, TransportError>, phrase: &str) -> PollOutcome {
    match result {
        Ok(response) if response.is_success() => {
            let confirmed = response
                .message
                .as_deref()
                .is_some_and(|message| message.trim().to_lowercase() == phrase);
            if confirmed {
                PollOutcome::Confirmed
            } else {
                PollOutcome::NotYetConfirmed
            }
        }
        Ok(response) => {
            tracing::debug!(status = response.status, "Confirmation check returned error status");
            PollOutcome::TransientError
        }
        Err(e) => {
            tracing::debug!(error = %e, "Confirmation check failed");
            PollOutcome::TransientError
        }
    }
}
