//! Error types for the task queue.
//!
//! The queue only surfaces call-order and lifecycle failures. Errors raised by
//! a [`Worker`] while processing a task belong to the worker and never pass
//! through here.
//!
//! ## Error Cases
//! - `Cancelled`: the cancellation signal was set before or during an enqueue.
//! - `InvalidConfig`: a [`QueueConfig`] or worker count was rejected.
//! - `WorkersAlreadyStarted`: `init_workers` was called a second time.
//! - `WorkersNotStarted`: `enqueue` was called before `init_workers`.
//! - `QueueClosed`: every worker went away while the queue was still open.
//!
//! [`Worker`]: crate::Worker
//! [`QueueConfig`]: crate::QueueConfig

pub type Result<T, E = Error> = core::result::Result<T, E>;

/// Unified error type for the task queue.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// The queue has been cancelled; the caller should stop producing.
    #[error("queue cancelled")]
    Cancelled,

    /// The configuration or worker count is unusable.
    #[error("invalid configuration: {reason}")]
    InvalidConfig { reason: String },

    /// Workers can only be started once per queue.
    #[error("workers already started")]
    WorkersAlreadyStarted,

    /// Tasks cannot be queued before any worker exists to drain them.
    #[error("workers not started")]
    WorkersNotStarted,

    /// The receiving side of the queue is gone.
    #[error("queue closed: {context}")]
    QueueClosed { context: String },
}

impl Error {
    pub(crate) fn invalid_config(reason: impl Into<String>) -> Self {
        Self::InvalidConfig {
            reason: reason.into(),
        }
    }
}
