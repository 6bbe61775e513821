//! User-facing countdown.
//!
//! Ticks once per period from `start_secs` down to zero while a session is
//! active. Runs beside the poller, never waits on it. Hitting zero only
//! stops the ticking; the session and its poller keep going.

use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{self, Instant};

use crate::config::CountdownConfig;
use crate::session::cancel::CancelListener;
use crate::session::guard::{SessionGuard, SessionId};

/// What the countdown shows right now.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CountdownState {
    pub seconds_remaining: u32,
    pub running: bool,
}

impl CountdownState {
    /// Full counter, not ticking.
    pub fn idle(start_secs: u32) -> Self {
        Self {
            seconds_remaining: start_secs,
            running: false,
        }
    }

    pub fn is_exhausted(&self) -> bool {
        self.seconds_remaining == 0
    }
}

/// Publishes [`CountdownState`] through a watch channel.
#[derive(Debug)]
pub struct CountdownTimer {
    tx: Arc<watch::Sender<CountdownState>>,
    start_secs: u32,
    tick: Duration,
}

impl CountdownTimer {
    pub fn new(config: &CountdownConfig) -> Self {
        let (tx, _) = watch::channel(CountdownState::idle(config.start_secs));
        Self {
            tx: Arc::new(tx),
            start_secs: config.start_secs,
            tick: config.tick(),
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<CountdownState> {
        self.tx.subscribe()
    }

    pub fn state(&self) -> CountdownState {
        *self.tx.borrow()
    }

    /// Stop showing progress and go back to the full counter.
    pub fn reset(&self) {
        self.tx.send_replace(CountdownState::idle(self.start_secs));
    }

    /// Restart from the full counter for session `id` and spawn its ticker.
    ///
    /// Each tick is applied through `guard`, so once `id` stops being
    /// current the ticker exits without touching the published state.
    pub fn start(
        &self,
        id: SessionId,
        guard: SessionGuard,
        mut cancel: CancelListener,
    ) -> JoinHandle<()> {
        let start_secs = self.start_secs;
        guard.apply(id, || {
            self.tx.send_replace(CountdownState {
                seconds_remaining: start_secs,
                running: true,
            });
        });

        let tx = Arc::clone(&self.tx);
        let tick = self.tick;

        tokio::spawn(async move {
            let mut ticker = time::interval_at(Instant::now() + tick, tick);

            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        let finished = guard.apply(id, || {
                            let mut finished = false;
                            tx.send_modify(|state| {
                                state.seconds_remaining = state.seconds_remaining.saturating_sub(1);
                                if state.seconds_remaining == 0 {
                                    state.running = false;
                                    finished = true;
                                }
                            });
                            finished
                        });

                        match finished {
                            Some(false) => {}
                            Some(true) => {
                                tracing::info!(session = %id, "Countdown finished, resend available");
                                break;
                            }
                            None => break,
                        }
                    }
                    _ = cancel.cancelled() => {
                        tracing::debug!(session = %id, "Countdown cancelled");
                        break;
                    }
                }
            }
        })
    }
}
