use crate::{Error, Result};
use core::time::Duration;

/// Number of enqueued items between two progress log events.
pub const DEFAULT_PROGRESS_INTERVAL: u64 = 10_000;

/// Immutable configuration for a [`QueueManager`].
///
/// The value is built once, validated by [`QueueManager::new`], and never
/// changes afterwards, so there is no window in which workers observe a
/// different chunk size or pacing than the producer.
///
/// # Example
///
/// ```
/// use drainq::QueueConfig;
/// use std::time::Duration;
///
/// let config = QueueConfig::new(64)
///     .with_name("thumbnails")
///     .with_chunk_size(16)
///     .with_pacing(Duration::from_millis(5));
///
/// assert_eq!(config.name(), "thumbnails");
/// assert!(config.is_chunked());
/// ```
///
/// [`QueueManager`]: crate::QueueManager
/// [`QueueManager::new`]: crate::QueueManager::new
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct QueueConfig {
    /// Display name used in log events.
    pub name: Option<String>,

    /// Capacity of the bounded queue between the producer and the workers.
    ///
    /// A capacity of `0` makes the queue a handoff: each enqueue waits until
    /// a worker has taken the task.
    pub buffer_size: usize,

    /// Number of items grouped into one [`Task::Chunk`]. `1` disables
    /// batching and every item travels as a [`Task::Single`].
    ///
    /// [`Task::Chunk`]: crate::Task::Chunk
    /// [`Task::Single`]: crate::Task::Single
    pub chunk_size: usize,

    /// Delay each worker observes after processing a task. A zero delay only
    /// yields to the scheduler.
    ///
    /// Aggregate throughput is roughly `workers / pacing`, which keeps a pool
    /// under the rate limit of whatever the workers call downstream.
    pub pacing: Option<Duration>,

    /// Emit a progress event every `progress_interval` enqueued items. `0`
    /// disables progress events.
    pub progress_interval: u64,
}

impl Default for QueueConfig {
    fn default() -> Self {
        Self {
            name: None,
            buffer_size: 1,
            chunk_size: 1,
            pacing: None,
            progress_interval: DEFAULT_PROGRESS_INTERVAL,
        }
    }
}

impl QueueConfig {
    /// Creates a configuration with the given queue capacity and defaults for
    /// everything else.
    pub fn new(buffer_size: usize) -> Self {
        Self {
            buffer_size,
            ..Self::default()
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub const fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size;
        self
    }

    pub const fn with_pacing(mut self, pacing: Duration) -> Self {
        self.pacing = Some(pacing);
        self
    }

    pub const fn with_progress_interval(mut self, interval: u64) -> Self {
        self.progress_interval = interval;
        self
    }

    /// Display name, `"queue"` when none was set.
    pub fn name(&self) -> &str {
        self.name.as_deref().unwrap_or("queue")
    }

    /// Number of tasks the queue buffers, `0` for a handoff queue.
    pub const fn capacity(&self) -> usize {
        self.buffer_size
    }

    /// Returns `true` when the producer hands each task directly to a worker.
    pub const fn is_rendezvous(&self) -> bool {
        self.buffer_size == 0
    }

    /// Returns `true` when items are grouped into chunks.
    pub const fn is_chunked(&self) -> bool {
        self.chunk_size > 1
    }

    /// Checks the configuration for values the queue cannot run with.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfig`] if the chunk size is zero.
    pub fn validate(&self) -> Result<()> {
        if self.chunk_size == 0 {
            return Err(Error::invalid_config("chunk_size must be greater than 0"));
        }
        Ok(())
    }
}
