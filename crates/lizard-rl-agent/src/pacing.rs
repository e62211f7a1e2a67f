//! Step pacing and cancellation
//!
//! The learning loop itself never waits on a clock. Between steps it yields
//! to a [`Pacer`], which decides how long a renderer gets to show the
//! intermediate state, and checks a [`CancelToken`].

use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crate::observer::{NullObserver, SnapshotObserver};

/// Suspension point between steps
#[async_trait]
pub trait Pacer: Send {
    /// Called once after every step
    async fn pause(&mut self);
}

/// Yield to the scheduler and continue immediately
#[derive(Debug, Clone, Copy, Default)]
pub struct NoPacing;

#[async_trait]
impl Pacer for NoPacing {
    async fn pause(&mut self) {
        tokio::task::yield_now().await;
    }
}

/// Sleep a fixed time between steps
#[derive(Debug, Clone, Copy)]
pub struct FixedDelay(pub Duration);

impl FixedDelay {
    /// Delay in milliseconds
    #[must_use]
    pub fn from_millis(ms: u64) -> Self {
        Self(Duration::from_millis(ms))
    }
}

#[async_trait]
impl Pacer for FixedDelay {
    async fn pause(&mut self) {
        if self.0.is_zero() {
            tokio::task::yield_now().await;
        } else {
            tokio::time::sleep(self.0).await;
        }
    }
}

/// Shared flag checked at step boundaries
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    cancelled: Arc<AtomicBool>,
}

impl CancelToken {
    /// A token that has not fired
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Ask every holder of this token to stop at the next step boundary
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    /// Whether [`cancel`](Self::cancel) was called on any clone
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }

    /// `Err(Cancelled)` once the token has fired
    pub fn check(&self) -> lizard_rl_core::Result<()> {
        if self.is_cancelled() {
            Err(lizard_rl_core::RLError::Cancelled)
        } else {
            Ok(())
        }
    }
}

/// Collaborators of a run: where snapshots go, how steps are paced and
/// when to stop
pub struct RunHooks<'a> {
    /// Rendering collaborator
    pub observer: &'a mut dyn SnapshotObserver,
    /// Pacing between steps
    pub pacer: &'a mut dyn Pacer,
    /// Checked before every step
    pub cancel: CancelToken,
}

impl<'a> RunHooks<'a> {
    /// Hooks with a fresh cancel token
    pub fn new(observer: &'a mut dyn SnapshotObserver, pacer: &'a mut dyn Pacer) -> Self {
        Self {
            observer,
            pacer,
            cancel: CancelToken::new(),
        }
    }

    /// Share an existing cancel token
    #[must_use]
    pub fn with_cancel(mut self, cancel: CancelToken) -> Self {
        self.cancel = cancel;
        self
    }
}

/// No rendering, no pacing
pub(crate) struct Headless {
    pub(crate) observer: NullObserver,
    pub(crate) pacer: NoPacing,
}

impl Headless {
    pub(crate) fn new() -> Self {
        Self {
            observer: NullObserver,
            pacer: NoPacing,
        }
    }

    pub(crate) fn hooks(&mut self) -> RunHooks<'_> {
        RunHooks::new(&mut self.observer, &mut self.pacer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cancel_is_shared_between_clones() {
        let token = CancelToken::new();
        let clone = token.clone();
        assert!(token.check().is_ok());
        clone.cancel();
        assert!(token.is_cancelled());
        assert!(matches!(
            token.check(),
            Err(lizard_rl_core::RLError::Cancelled)
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn test_fixed_delay_sleeps() {
        let start = tokio::time::Instant::now();
        let mut pacer = FixedDelay::from_millis(500);
        pacer.pause().await;
        assert!(start.elapsed() >= Duration::from_millis(500));
    }

    #[tokio::test]
    async fn test_no_pacing_returns() {
        NoPacing.pause().await;
        FixedDelay::from_millis(0).pause().await;
    }
}
