//! Cancellation signal for one confirmation session.

use tokio::sync::watch;

/// Cancels the tasks of a single session.
///
/// Unlike a broadcast channel, a listener created after `trigger` still
/// observes the cancellation. Dropping the signal cancels as well.
#[derive(Debug)]
pub struct CancelSignal {
    tx: watch::Sender<bool>,
}

impl CancelSignal {
    pub fn new() -> Self {
        let (tx, _) = watch::channel(false);
        Self { tx }
    }

    /// Subscribe to the cancellation.
    pub fn subscribe(&self) -> CancelListener {
        CancelListener {
            rx: self.tx.subscribe(),
        }
    }

    /// Trigger the cancellation.
    pub fn trigger(&self) {
        self.tx.send_replace(true);
    }
}

impl Default for CancelSignal {
    fn default() -> Self {
        Self::new()
    }
}

/// Listening half of a [`CancelSignal`].
#[derive(Debug, Clone)]
pub struct CancelListener {
    rx: watch::Receiver<bool>,
}

impl CancelListener {
    /// Resolves once the session is cancelled or its signal is gone.
    pub async fn cancelled(&mut self) {
        let _ = self.rx.wait_for(|cancelled| *cancelled).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_late_listener_sees_trigger() {
        let signal = CancelSignal::new();
        signal.trigger();

        let mut listener = signal.subscribe();
        tokio::time::timeout(Duration::from_millis(100), listener.cancelled())
            .await
            .expect("listener should resolve immediately");
    }

    #[tokio::test]
    async fn test_drop_cancels() {
        let signal = CancelSignal::new();
        let mut listener = signal.subscribe();

        drop(signal);
        tokio::time::timeout(Duration::from_millis(100), listener.cancelled())
            .await
            .expect("dropping the signal should cancel");
    }

    #[tokio::test(start_paused = true)]
    async fn test_untriggered_listener_stays_pending() {
        let signal = CancelSignal::new();
        let mut listener = signal.subscribe();

        let waited = tokio::time::timeout(Duration::from_secs(60), listener.cancelled()).await;
        assert!(waited.is_err());

        signal.trigger();
        listener.cancelled().await;
    }
}
