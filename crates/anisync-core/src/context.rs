use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::Notify;

use crate::error::{Result, SyncError};

/// Cooperative cancellation/deadline token threaded into every I/O call and
/// every strategy invocation.
///
/// Cloning shares the underlying cancellation flag: cancelling any clone
/// cancels all of them. This is the one piece of state the engine, the
/// service adapters, and the retry transport all read without going through
/// a service boundary.
#[derive(Clone)]
pub struct Context {
    cancelled: Arc<std::sync::atomic::AtomicBool>,
    notify: Arc<Notify>,
    deadline: Option<Instant>,
}

impl Context {
    pub fn new() -> Self {
        Self {
            cancelled: Arc::new(std::sync::atomic::AtomicBool::new(false)),
            notify: Arc::new(Notify::new()),
            deadline: None,
        }
    }

    pub fn with_deadline(timeout: Duration) -> Self {
        Self {
            cancelled: Arc::new(std::sync::atomic::AtomicBool::new(false)),
            notify: Arc::new(Notify::new()),
            deadline: Some(Instant::now() + timeout),
        }
    }

    /// Signals cancellation to this context and every clone of it.
    pub fn cancel(&self) {
        self.cancelled.store(true, std::sync::atomic::Ordering::SeqCst);
        self.notify.notify_waiters();
    }

    pub fn is_cancelled(&self) -> bool {
        if self.cancelled.load(std::sync::atomic::Ordering::SeqCst) {
            return true;
        }
        matches!(self.deadline, Some(d) if Instant::now() >= d)
    }

    /// Returns immediately if already cancelled/expired, otherwise an error.
    /// Call at the start of every strategy and before every suspension point.
    pub fn check(&self) -> Result<()> {
        if self.is_cancelled() {
            Err(SyncError::Cancelled)
        } else {
            Ok(())
        }
    }

    /// Sleeps for `duration`, but returns [`SyncError::Cancelled`] immediately
    /// if the context is cancelled while waiting. Used by the retry transport's
    /// backoff delays so a cancelled sync never blocks on a sleep it no longer
    /// needs.
    pub async fn sleep(&self, duration: Duration) -> Result<()> {
        self.check()?;
        tokio::select! {
            _ = tokio::time::sleep(duration) => self.check(),
            _ = self.notify.notified() => Err(SyncError::Cancelled),
        }
    }
}

impl Default for Context {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_context_is_not_cancelled() {
        let ctx = Context::new();
        assert!(ctx.check().is_ok());
    }

    #[test]
    fn cancel_propagates_to_clones() {
        let ctx = Context::new();
        let clone = ctx.clone();
        clone.cancel();
        assert!(ctx.is_cancelled());
    }

    #[tokio::test]
    async fn sleep_returns_cancelled_when_cancelled_mid_wait() {
        let ctx = Context::new();
        let clone = ctx.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(5)).await;
            clone.cancel();
        });
        let result = ctx.sleep(Duration::from_secs(30)).await;
        assert!(matches!(result, Err(SyncError::Cancelled)));
    }

    #[test]
    fn expired_deadline_counts_as_cancelled() {
        let ctx = Context::with_deadline(Duration::from_millis(0));
        std::thread::sleep(Duration::from_millis(5));
        assert!(ctx.is_cancelled());
    }
}
