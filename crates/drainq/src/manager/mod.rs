//! Orchestration of the queue, the chunk aggregator and the worker pool.
//!
//! [`QueueManager`] is the producer-facing half of the system:
//!
//! - [`QueueManager::new`] validates a [`QueueConfig`] and builds the bounded
//!   queue and cancellation token.
//! - [`QueueManager::init_workers`] spawns the worker loops once.
//! - [`QueueManager::enqueue`] feeds items, batching them when chunking is
//!   enabled and blocking while the queue is full.
//! - [`QueueManager::wait`] flushes, closes the queue and waits for every
//!   worker loop to exit.
//! - [`QueueManager::cancel`] (or a [`CancelHandle`]) stops the pool early.
//!
//! `enqueue` borrows the manager mutably and `wait` consumes it, so a second
//! producer or an enqueue after shutdown is rejected by the compiler rather
//! than at runtime. `cancel` never closes the queue; only `wait` does.

mod cancel;

pub use cancel::CancelHandle;

use crate::{
    ChunkAggregator, Error, QueueConfig, Result, StatsSnapshot, Task, Worker,
    queue::{self, QueueSender, SharedReceiver},
    stats::QueueStats,
    worker::{WorkerHandle, worker_loop},
};
use core::{fmt, time::Duration};
use std::{sync::Arc, time::Instant};
use tokio_util::{sync::CancellationToken, task::TaskTracker};

/// Bounded, cancellable task queue drained by a fixed pool of workers.
///
/// # Example
///
/// ```
/// use drainq::{QueueConfig, QueueManager, Task};
/// use std::sync::{
///     Arc,
///     atomic::{AtomicUsize, Ordering},
/// };
/// use tokio_util::sync::CancellationToken;
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() -> drainq::Result<()> {
/// let processed = Arc::new(AtomicUsize::new(0));
///
/// let mut manager = QueueManager::<u32>::new(QueueConfig::new(1).with_name("example"))?;
/// let counter = Arc::clone(&processed);
/// manager.init_workers(10, move || {
///     let counter = Arc::clone(&counter);
///     move |_ctx: CancellationToken, task: Task<u32>| {
///         let counter = Arc::clone(&counter);
///         async move {
///             counter.fetch_add(task.len(), Ordering::Relaxed);
///         }
///     }
/// })?;
///
/// for i in 0..100 {
///     manager.enqueue(i).await?;
/// }
/// let summary = manager.wait().await;
///
/// assert_eq!(summary.enqueued, 100);
/// assert_eq!(processed.load(Ordering::Relaxed), 100);
/// # Ok(())
/// # }
/// ```
pub struct QueueManager<T> {
    config: QueueConfig,
    sender: QueueSender<T>,
    /// Held until the workers start; `None` afterwards.
    receiver: Option<SharedReceiver<T>>,
    chunks: Option<ChunkAggregator<T>>,
    cancel: CancelHandle,
    tracker: TaskTracker,
    stats: Arc<QueueStats>,
    started_at: Instant,
    workers: usize,
}

impl<T> fmt::Debug for QueueManager<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QueueManager")
            .field("config", &self.config)
            .field("workers", &self.workers)
            .field("cancelled", &self.cancel.is_cancelled())
            .field("stats", &self.stats.snapshot())
            .finish_non_exhaustive()
    }
}

impl<T> QueueManager<T>
where
    T: Send + 'static,
{
    /// Creates a queue with its own cancellation token.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfig`] if `config` fails
    /// [`QueueConfig::validate`].
    pub fn new(config: QueueConfig) -> Result<Self> {
        Self::with_token(config, CancellationToken::new())
    }

    /// Creates a queue whose cancellation token is a child of `parent`.
    ///
    /// Cancelling `parent` cancels the queue; cancelling the queue leaves
    /// `parent` untouched.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfig`] if `config` fails
    /// [`QueueConfig::validate`].
    pub fn with_parent(config: QueueConfig, parent: &CancellationToken) -> Result<Self> {
        Self::with_token(config, parent.child_token())
    }

    fn with_token(config: QueueConfig, token: CancellationToken) -> Result<Self> {
        config.validate()?;

        let (sender, receiver) = queue::bounded(config.capacity());
        let chunks = config
            .is_chunked()
            .then(|| ChunkAggregator::new(config.chunk_size));

        #[cfg(feature = "tracing")]
        tracing::debug!(
            queue = config.name(),
            capacity = config.capacity(),
            chunk_size = config.chunk_size,
            pacing = ?config.pacing,
            "queue created"
        );

        Ok(Self {
            cancel: CancelHandle::new(config.name(), token),
            sender,
            receiver: Some(receiver),
            chunks,
            tracker: TaskTracker::new(),
            stats: Arc::new(QueueStats::default()),
            started_at: Instant::now(),
            workers: 0,
            config,
        })
    }

    /// Builds `count` workers with `factory` and starts one worker loop per
    /// worker.
    ///
    /// Worker `i` is named `"worker # i"`, or `"sleeping (<pacing>) worker # i"`
    /// when pacing is configured, and receives that name through
    /// [`Worker::set_name`] before its loop starts.
    ///
    /// A worker whose `process` panics stops its loop. The panic is logged and
    /// counted in [`QueueSummary::failed_workers`]; the remaining workers keep
    /// draining the queue.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidConfig`] if `count` is zero.
    /// - [`Error::WorkersAlreadyStarted`] on a second call.
    ///
    /// # Panics
    ///
    /// Panics if called outside of a Tokio runtime.
    pub fn init_workers<W, F>(&mut self, count: usize, mut factory: F) -> Result<()>
    where
        W: Worker<T>,
        F: FnMut() -> W,
    {
        if count == 0 {
            return Err(Error::invalid_config("worker count must be greater than 0"));
        }
        let Some(receiver) = self.receiver.take() else {
            return Err(Error::WorkersAlreadyStarted);
        };

        for id in 0..count {
            let handle = WorkerHandle::new(id, factory(), self.config.pacing);

            #[cfg(feature = "tracing")]
            tracing::debug!(queue = self.name(), worker = handle.name(), "init worker");

            let _name = handle.name().to_string();
            let stats = Arc::clone(&self.stats);
            let worker = tokio::spawn(worker_loop(
                handle,
                receiver.clone(),
                self.cancel.token(),
                Arc::clone(&stats),
            ));
            self.tracker.spawn(async move {
                if let Err(_e) = worker.await {
                    stats.record_worker_failed();

                    #[cfg(feature = "tracing")]
                    tracing::error!(worker = %_name, "worker exited abnormally: {_e}");
                }
            });
        }
        self.workers = count;

        Ok(())
    }

    /// Queues one item.
    ///
    /// Without chunking the item is pushed as a [`Task::Single`]. With a chunk
    /// size of `K` it is buffered, and every `K`th call pushes the buffered
    /// items as one [`Task::Chunk`].
    ///
    /// A push waits while the queue is full; this is the only backpressure
    /// the producer sees. The wait ends early if the queue is cancelled, in
    /// which case the pending task is dropped.
    ///
    /// # Errors
    ///
    /// - [`Error::Cancelled`] if the queue was cancelled before or during the
    ///   call. Nothing is buffered or counted when the queue was already
    ///   cancelled on entry.
    /// - [`Error::WorkersNotStarted`] if [`Self::init_workers`] has not run.
    /// - [`Error::QueueClosed`] if every worker loop has exited.
    pub async fn enqueue(&mut self, item: T) -> Result<()> {
        if self.cancel.is_cancelled() {
            #[cfg(feature = "tracing")]
            tracing::error!(queue = self.name(), "enqueue failed: queue cancelled");
            return Err(Error::Cancelled);
        }
        if self.workers == 0 {
            return Err(Error::WorkersNotStarted);
        }

        let count = self.stats.record_enqueued();
        if self.config.progress_interval > 0 && count % self.config.progress_interval == 0 {
            #[cfg(feature = "tracing")]
            tracing::info!(queue = self.name(), count, "enqueued");
        }

        let task = match self.chunks.as_mut() {
            None => Task::Single(item),
            Some(chunks) => match chunks.push(item) {
                Some(chunk) => chunk,
                None => return Ok(()),
            },
        };

        self.sender.push(task, self.cancel.as_token()).await
    }

    /// Drains the queue and waits for every worker loop to exit.
    ///
    /// Flushes the partial chunk (if any), closes the queue so workers stop
    /// once it is empty, and waits for all of them. Without cancellation,
    /// every enqueued item has been processed when this returns.
    ///
    /// Cancellation does not deadlock the drain: workers stop at their next
    /// task boundary, and a partial chunk that cannot be pushed because the
    /// queue was cancelled is dropped and reported in
    /// [`QueueSummary::dropped`].
    pub async fn wait(self) -> QueueSummary {
        let Self {
            config,
            sender,
            receiver,
            mut chunks,
            cancel,
            tracker,
            stats,
            started_at,
            ..
        } = self;

        let mut dropped = 0;
        if let Some(partial) = chunks.as_mut().and_then(ChunkAggregator::flush) {
            let items = partial.len();
            if let Err(_e) = sender.push(partial, cancel.as_token()).await {
                dropped = items;

                #[cfg(feature = "tracing")]
                tracing::warn!(
                    queue = config.name(),
                    items,
                    "dropped final partial chunk: {_e}"
                );
            }
        }

        drop(sender);
        drop(receiver);
        #[cfg(feature = "tracing")]
        tracing::debug!(queue = config.name(), "closed queue");

        tracker.close();
        tracker.wait().await;
        #[cfg(feature = "tracing")]
        tracing::debug!(queue = config.name(), "all workers done");

        let snapshot = stats.snapshot();
        let summary = QueueSummary {
            name: config.name().to_string(),
            enqueued: snapshot.enqueued,
            dispatched: snapshot.dispatched,
            completed: snapshot.completed,
            failed_workers: snapshot.failed_workers,
            dropped,
            cancelled: cancel.is_cancelled(),
            elapsed: started_at.elapsed(),
        };

        #[cfg(feature = "tracing")]
        tracing::info!(
            queue = config.name(),
            elapsed = ?summary.elapsed,
            count = summary.enqueued,
            cancelled = summary.cancelled,
            "complete all the queued tasks"
        );

        summary
    }
}

impl<T> QueueManager<T> {
    /// Signals every worker loop to stop at its next task boundary.
    ///
    /// Idempotent: later calls only log. The queue is not closed and a task
    /// that is already being processed runs to completion.
    pub fn cancel(&self, reason: impl fmt::Display) {
        self.cancel.cancel(reason);
    }

    /// Returns a handle that can cancel this queue from another task, for
    /// example while the producer is blocked in [`Self::enqueue`] or
    /// [`Self::wait`].
    pub fn cancel_handle(&self) -> CancelHandle {
        self.cancel.clone()
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    pub fn name(&self) -> &str {
        self.config.name()
    }

    pub const fn config(&self) -> &QueueConfig {
        &self.config
    }

    /// Number of worker loops started, `0` before [`Self::init_workers`].
    pub const fn worker_count(&self) -> usize {
        self.workers
    }

    /// Items accepted by [`Self::enqueue`] so far.
    pub fn enqueued(&self) -> u64 {
        self.stats.snapshot().enqueued
    }

    /// Tasks currently buffered in the queue, waiting for a worker.
    pub fn queued(&self) -> usize {
        self.sender.len()
    }

    /// Items held back in the partial chunk.
    pub fn pending_in_chunk(&self) -> usize {
        self.chunks.as_ref().map_or(0, ChunkAggregator::pending)
    }

    pub fn stats(&self) -> StatsSnapshot {
        self.stats.snapshot()
    }
}

/// Outcome of [`QueueManager::wait`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueueSummary {
    /// Display name of the queue.
    pub name: String,
    /// Items accepted by `enqueue`.
    pub enqueued: u64,
    /// Tasks handed to a worker.
    pub dispatched: u64,
    /// Tasks whose processing returned.
    pub completed: u64,
    /// Worker loops that ended in a panic.
    pub failed_workers: u64,
    /// Items of a final partial chunk that could not be queued because the
    /// queue was cancelled.
    pub dropped: usize,
    /// Whether the queue was cancelled at the time it finished draining.
    pub cancelled: bool,
    /// Time from construction to the end of the drain.
    pub elapsed: Duration,
}
