use core::fmt;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// Cloneable handle that cancels a [`QueueManager`] from anywhere.
///
/// Cancellation is a one-way broadcast observed by every worker loop at its
/// next task boundary. It never closes the queue, so it is safe to race with
/// [`QueueManager::wait`].
///
/// [`QueueManager`]: crate::QueueManager
/// [`QueueManager::wait`]: crate::QueueManager::wait
#[derive(Debug, Clone)]
pub struct CancelHandle {
    #[cfg_attr(not(feature = "tracing"), allow(dead_code))]
    name: Arc<str>,
    token: CancellationToken,
}

impl CancelHandle {
    pub(crate) fn new(name: &str, token: CancellationToken) -> Self {
        Self {
            name: Arc::from(name),
            token,
        }
    }

    /// Cancels the queue. Calling it again has no further effect beyond a log
    /// event.
    pub fn cancel(&self, _reason: impl fmt::Display) {
        if self.token.is_cancelled() {
            #[cfg(feature = "tracing")]
            tracing::debug!(queue = %self.name, "queue already cancelled: {_reason}");
        } else {
            #[cfg(feature = "tracing")]
            tracing::error!(queue = %self.name, "cancelling queue due to: {_reason}");
        }
        self.token.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Resolves once the queue is cancelled.
    pub async fn cancelled(&self) {
        self.token.cancelled().await;
    }

    /// A clone of the underlying token, e.g. to derive child tokens for work
    /// started by a worker.
    pub fn token(&self) -> CancellationToken {
        self.token.clone()
    }

    pub(crate) const fn as_token(&self) -> &CancellationToken {
        &self.token
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cancel_is_idempotent_and_shared() {
        let handle = CancelHandle::new("idempotent", CancellationToken::new());
        let other = handle.clone();
        assert!(!other.is_cancelled());

        handle.cancel("first");
        handle.cancel("second");
        assert!(handle.is_cancelled());
        assert!(other.is_cancelled());
        assert!(other.token().is_cancelled());
    }

    #[tokio::test]
    async fn cancelled_resolves_after_cancel() {
        let handle = CancelHandle::new("waiter", CancellationToken::new());
        let waiter = {
            let handle = handle.clone();
            tokio::spawn(async move { handle.cancelled().await })
        };
        handle.cancel("done");
        waiter.await.unwrap();
    }
}
