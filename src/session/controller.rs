//! Reset flow controller and resend gate.
//!
//! # Responsibilities
//! - Validate, submit, and start one confirmation session at a time
//! - Run the countdown and the poller side by side for that session
//! - Decide when a resend is allowed and perform it as one cycle
//! - Turn session resolutions into notices and navigation
//!
//! # Concurrency
//! ```text
//! submit / resend ──(cycle lock)──▶ teardown old ─▶ submit ─▶ start new
//!                                                             │
//!                       ┌─────────────────────────────────────┤
//!                       ▼                                     ▼
//!                 countdown task                         poller task
//!                 (guarded ticks)                 (guarded state, resolve)
//! ```
//! Only one submit/resend cycle runs at a time. Teardown and resolution
//! both take the `active` lock and end the session in the guard, so exactly
//! one of them wins for a given session.
//!
//! A cancel can land while a cycle is waiting on the service. Each cycle
//! records the cancellation epoch it started under and only installs its
//! session if the epoch is unchanged, checked under the `active` lock.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, Weak};

use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::collaborators::{EmailStore, Navigator, Notice, Notifier};
use crate::config::ResetConfig;
use crate::confirmation::{
    ConfirmationPoller, PollAttempt, PollObserver, PollResolution, PollerState,
};
use crate::email;
use crate::error::{ResetError, ResetResult};
use crate::observability::metrics;
use crate::service::client::ResetService;
use crate::service::submitter;
use crate::service::types::ResetRequest;
use crate::session::cancel::CancelSignal;
use crate::session::countdown::{CountdownState, CountdownTimer};
use crate::session::guard::{SessionGuard, SessionId};

/// Drives the password reset confirmation flow.
///
/// Cheap to clone; clones share the same session.
#[derive(Clone)]
pub struct ResetController {
    inner: Arc<Inner>,
}

struct Inner {
    config: ResetConfig,
    service: Arc<dyn ResetService>,
    notifier: Arc<dyn Notifier>,
    navigator: Arc<dyn Navigator>,
    store: Arc<dyn EmailStore>,
    guard: SessionGuard,
    countdown: CountdownTimer,
    phase: watch::Sender<PollerState>,
    active: Mutex<Option<ActiveSession>>,
    /// Serializes submit and resend cycles across their network call.
    cycle: tokio::sync::Mutex<()>,
    /// Bumped by every cancel, under the `active` lock.
    epoch: AtomicU64,
}

struct ActiveSession {
    id: SessionId,
    email: String,
    cancel: CancelSignal,
    poller: JoinHandle<()>,
    ticker: JoinHandle<()>,
}

impl ActiveSession {
    fn stop(self) {
        self.cancel.trigger();
        self.poller.abort();
        self.ticker.abort();
    }
}

impl ResetController {
    pub fn new(
        config: ResetConfig,
        service: Arc<dyn ResetService>,
        notifier: Arc<dyn Notifier>,
        navigator: Arc<dyn Navigator>,
        store: Arc<dyn EmailStore>,
    ) -> Self {
        let countdown = CountdownTimer::new(&config.countdown);
        let (phase, _) = watch::channel(PollerState::Idle);

        Self {
            inner: Arc::new(Inner {
                config,
                service,
                notifier,
                navigator,
                store,
                guard: SessionGuard::new(),
                countdown,
                phase,
                active: Mutex::new(None),
                cycle: tokio::sync::Mutex::new(()),
                epoch: AtomicU64::new(0),
            }),
        }
    }

    /// Request a reset for `email` and start waiting for its confirmation.
    ///
    /// Any session already running is superseded before the request goes
    /// out. Invalid emails never reach the service. A [`cancel`] issued
    /// before the session starts makes this return [`ResetError::Cancelled`].
    ///
    /// [`cancel`]: ResetController::cancel
    pub async fn submit(&self, email: &str) -> ResetResult<SessionId> {
        if let Err(e) = email::check(email) {
            tracing::debug!(error = %e, "Rejected email before submission");
            self.inner.notifier.notify(Notice::invalid_email(e));
            return Err(e.into());
        }

        let epoch = self.inner.epoch.load(Ordering::SeqCst);
        let _cycle = self.inner.cycle.lock().await;

        {
            let mut active = self.inner.lock_active();
            if self.inner.epoch.load(Ordering::SeqCst) != epoch {
                tracing::debug!("Submission cancelled before it was sent");
                return Err(ResetError::Cancelled);
            }
            if let Some((old, _)) = self.inner.teardown_locked(&mut active, "superseded") {
                tracing::info!(session = %old, "Session superseded by new submission");
            }
        }

        self.inner.run_cycle(email, epoch).await
    }

    /// Whether a resend is currently allowed: the countdown is at zero and
    /// the session is still waiting on confirmation.
    pub fn can_resend(&self) -> bool {
        let active = self.inner.lock_active();
        self.inner.resend_allowed(&active)
    }

    /// Resend the reset email and restart the session.
    ///
    /// Returns `Ok(None)` without side effects when a resend is not allowed
    /// or another cycle is already in flight.
    pub async fn resend(&self) -> ResetResult<Option<SessionId>> {
        let Ok(_cycle) = self.inner.cycle.try_lock() else {
            tracing::debug!("Resend ignored, a submission is already in flight");
            return Ok(None);
        };

        let (email, epoch) = {
            let mut active = self.inner.lock_active();
            if !self.inner.resend_allowed(&active) {
                return Ok(None);
            }
            let epoch = self.inner.epoch.load(Ordering::SeqCst);
            match self.inner.teardown_locked(&mut active, "superseded") {
                Some((old, email)) => {
                    tracing::info!(session = %old, "Session superseded by resend");
                    (email, epoch)
                }
                None => return Ok(None),
            }
        };

        self.inner.run_cycle(&email, epoch).await.map(Some)
    }

    /// Stop the current session without telling the user anything.
    ///
    /// A submit or resend still waiting on the service is cancelled too: its
    /// answer is dropped and no session starts from it.
    pub fn cancel(&self) -> Option<SessionId> {
        let mut active = self.inner.lock_active();
        self.inner.epoch.fetch_add(1, Ordering::SeqCst);
        let old = self
            .inner
            .teardown_locked(&mut active, "cancelled")
            .map(|(id, _)| id);
        if let Some(id) = old {
            tracing::info!(session = %id, "Session cancelled");
        }
        old
    }

    /// Leave the flow for the login screen.
    pub fn back_to_login(&self) {
        self.cancel();
        self.inner.navigator.back_to_login();
    }

    /// Countdown updates.
    pub fn countdown(&self) -> watch::Receiver<CountdownState> {
        self.inner.countdown.subscribe()
    }

    /// Poller state updates for the current session.
    pub fn phase(&self) -> watch::Receiver<PollerState> {
        self.inner.phase.subscribe()
    }

    pub fn current_session(&self) -> Option<SessionId> {
        self.inner.lock_active().as_ref().map(|s| s.id)
    }

    /// A session is running, i.e. the flow is waiting on the user.
    pub fn is_awaiting_confirmation(&self) -> bool {
        self.inner.lock_active().is_some()
    }

    /// The email of the most recent accepted request, if any.
    pub fn last_email(&self) -> Option<String> {
        match self.inner.store.last_email() {
            Ok(email) => email,
            Err(e) => {
                tracing::warn!(error = %e, "Failed to read last attempted email");
                None
            }
        }
    }
}

impl Inner {
    fn lock_active(&self) -> std::sync::MutexGuard<'_, Option<ActiveSession>> {
        self.active.lock().expect("active session mutex poisoned")
    }

    fn resend_allowed(&self, active: &Option<ActiveSession>) -> bool {
        active.is_some()
            && self.countdown.state().is_exhausted()
            && !self.phase.borrow().is_terminal()
    }

    /// Stop the running session, recording `reason` as how it ended.
    fn teardown_locked(
        &self,
        active: &mut Option<ActiveSession>,
        reason: &'static str,
    ) -> Option<(SessionId, String)> {
        let session = active.take()?;
        let id = session.id;
        let email = session.email.clone();

        self.guard.end(id);
        session.stop();
        self.countdown.reset();
        self.phase.send_replace(PollerState::Idle);
        metrics::record_session(reason);

        Some((id, email))
    }

    /// Submit, then start a session if the request was accepted and no
    /// cancel has happened since `epoch` was read.
    async fn run_cycle(self: &Arc<Self>, email: &str, epoch: u64) -> ResetResult<SessionId> {
        let request = ResetRequest::new(email);
        let submitted = submitter::submit(self.service.as_ref(), &request).await;

        let id = {
            let mut active = self.lock_active();
            if self.epoch.load(Ordering::SeqCst) != epoch {
                tracing::info!(email = %email, "Discarding submission answer, flow was cancelled");
                return Err(ResetError::Cancelled);
            }
            match submitted {
                Ok(()) => self.start_session(&mut active, request.email),
                Err(e) => {
                    drop(active);
                    self.notifier.notify(Notice::submission_failed(&e));
                    return Err(e.into());
                }
            }
        };

        self.notifier.notify(Notice::email_sent());
        if let Err(e) = self.store.save_last_email(email) {
            tracing::warn!(error = %e, "Failed to persist last attempted email");
        }

        Ok(id)
    }

    /// Install a new session in `active`, which must be empty.
    fn start_session(
        self: &Arc<Self>,
        active: &mut Option<ActiveSession>,
        email: String,
    ) -> SessionId {
        let id = self.guard.begin();
        let cancel = CancelSignal::new();
        self.phase.send_replace(PollerState::Idle);

        let ticker = self
            .countdown
            .start(id, self.guard.clone(), cancel.subscribe());

        let poller =
            ConfirmationPoller::new(id, email.clone(), &self.config.polling, self.service.clone());
        let listener = cancel.subscribe();
        let weak = Arc::downgrade(self);
        let poller = tokio::spawn(async move {
            let observer = SessionObserver {
                id,
                inner: weak.clone(),
            };
            let resolution = poller.run(listener, &observer).await;
            if let Some(inner) = weak.upgrade() {
                inner.resolve(id, resolution);
            }
        });

        tracing::info!(session = %id, email = %email, "Confirmation session started");
        *active = Some(ActiveSession {
            id,
            email,
            cancel,
            poller,
            ticker,
        });

        id
    }

    /// Apply a poller resolution if its session is still current.
    fn resolve(&self, id: SessionId, resolution: PollResolution) {
        if resolution == PollResolution::Cancelled {
            return;
        }

        {
            let mut active = self.lock_active();
            if !self.guard.end(id) {
                tracing::debug!(session = %id, "Discarding stale session resolution");
                return;
            }
            if let Some(session) = active.take() {
                // This runs on the poller task itself; only stop the ticker.
                session.cancel.trigger();
                session.ticker.abort();
            }
            self.countdown.reset();
            metrics::record_session(resolution.as_str());
        }

        match resolution {
            PollResolution::Confirmed { .. } => self.navigator.email_confirmed(),
            PollResolution::Exhausted { .. } => self.notifier.notify(Notice::timed_out()),
            PollResolution::Cancelled => {}
        }
    }
}

/// Forwards poller progress to the controller while its session is current.
struct SessionObserver {
    id: SessionId,
    inner: Weak<Inner>,
}

impl PollObserver for SessionObserver {
    fn on_state(&self, state: PollerState) {
        if let Some(inner) = self.inner.upgrade() {
            inner.guard.apply(self.id, || {
                inner.phase.send_replace(state);
            });
        }
    }

    fn on_attempt(&self, attempt: &PollAttempt) {
        tracing::debug!(
            session = %self.id,
            attempt = attempt.attempt_number,
            outcome = attempt.outcome.as_str(),
            "Confirmation check finished"
        );
    }
}
