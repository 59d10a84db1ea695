//! Bounded wait for a donor-side companion signal.
//!
//! Some handoffs must wait for the donor to finish tearing down an attached
//! transient panel. The wait is always bounded so a signal that never
//! arrives cannot stall a closing window.

use crate::error::SyncError;
use std::time::Duration;
use tokio::sync::oneshot;

/// How a companion wait ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompanionOutcome {
    Signalled,
    TimedOut,
    /// The signalling side was dropped without firing
    Abandoned,
}

/// Sending half handed to the donor side.
#[derive(Debug)]
pub struct CompanionSignal(oneshot::Sender<()>);

impl CompanionSignal {
    pub fn signal(self) {
        // Receiver may already have timed out
        let _ = self.0.send(());
    }
}

#[derive(Debug, Clone, Copy)]
pub struct CompanionWait {
    timeout: Duration,
}

impl CompanionWait {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn channel() -> (CompanionSignal, oneshot::Receiver<()>) {
        let (tx, rx) = oneshot::channel();
        (CompanionSignal(tx), rx)
    }

    pub async fn wait(&self, signal: oneshot::Receiver<()>) -> CompanionOutcome {
        match tokio::time::timeout(self.timeout, signal).await {
            Ok(Ok(())) => CompanionOutcome::Signalled,
            Ok(Err(_)) => {
                log::debug!("Companion signal dropped before firing");
                CompanionOutcome::Abandoned
            }
            Err(_) => {
                log::warn!("{}", SyncError::CompanionTimeout(self.timeout));
                CompanionOutcome::TimedOut
            }
        }
    }
}

impl Default for CompanionWait {
    fn default() -> Self {
        Self::new(Duration::from_millis(
            sidebar_sync_config::defaults::companion_timeout_ms(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_signal_before_timeout() {
        let waiter = CompanionWait::new(Duration::from_secs(3));
        let (tx, rx) = CompanionWait::channel();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(500)).await;
            tx.signal();
        });
        assert_eq!(waiter.wait(rx).await, CompanionOutcome::Signalled);
    }

    #[tokio::test(start_paused = true)]
    async fn test_missing_signal_times_out() {
        let waiter = CompanionWait::default();
        let (_tx, rx) = CompanionWait::channel();
        let start = tokio::time::Instant::now();
        assert_eq!(waiter.wait(rx).await, CompanionOutcome::TimedOut);
        assert_eq!(start.elapsed(), Duration::from_millis(3000));
    }

    #[tokio::test]
    async fn test_dropped_sender_is_abandoned() {
        let waiter = CompanionWait::new(Duration::from_secs(3));
        let (tx, rx) = CompanionWait::channel();
        drop(tx);
        assert_eq!(waiter.wait(rx).await, CompanionOutcome::Abandoned);
    }
}
