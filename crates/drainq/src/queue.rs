//! Bounded transport between the producer and the worker pool.
//!
//! The queue is a Tokio [`mpsc`] channel whose receiver is shared by every
//! worker behind an async mutex. A worker only holds the mutex while it waits
//! for the next task, never while it processes one, so the pool drains the
//! channel in parallel while each task is handed to exactly one worker.
//!
//! A capacity of `0` turns the queue into a handoff. Tokio channels need at
//! least one slot, so each task carries a [`oneshot`] that the receiving
//! worker fires, and `push` does not return until it has.
//!
//! Both halves race the shared [`CancellationToken`] instead of polling it:
//! an idle worker parks until a task arrives or the token fires, and a
//! producer blocked on a full queue is released by cancellation.

use crate::{Error, Result, Task};
use std::sync::Arc;
use tokio::sync::{Mutex, mpsc, oneshot};
use tokio_util::sync::CancellationToken;

/// Creates a queue buffering at most `capacity` tasks, or a handoff queue
/// when `capacity` is zero.
pub(crate) fn bounded<T>(capacity: usize) -> (QueueSender<T>, SharedReceiver<T>) {
    let (tx, rx) = mpsc::channel(capacity.max(1));
    (
        QueueSender {
            tx,
            handoff: capacity == 0,
        },
        SharedReceiver {
            rx: Arc::new(Mutex::new(rx)),
        },
    )
}

/// A task in flight, with the acknowledgement a handoff producer waits on.
#[derive(Debug)]
struct Envelope<T> {
    task: Task<T>,
    taken: Option<oneshot::Sender<()>>,
}

/// Producer half. Dropping it closes the queue.
#[derive(Debug)]
pub(crate) struct QueueSender<T> {
    tx: mpsc::Sender<Envelope<T>>,
    handoff: bool,
}

impl<T> QueueSender<T> {
    /// Pushes a task, waiting for free capacity. On a handoff queue it also
    /// waits until a worker has taken the task.
    ///
    /// # Errors
    ///
    /// - [`Error::Cancelled`] if `cancel` fires before the push completes;
    ///   the task is dropped.
    /// - [`Error::QueueClosed`] if every receiver is gone.
    pub(crate) async fn push(&self, task: Task<T>, cancel: &CancellationToken) -> Result<()> {
        let (taken, handed_off) = if self.handoff {
            let (tx, rx) = oneshot::channel();
            (Some(tx), Some(rx))
        } else {
            (None, None)
        };

        tokio::select! {
            biased;
            () = cancel.cancelled() => return Err(Error::Cancelled),
            sent = self.tx.send(Envelope { task, taken }) => {
                sent.map_err(|_| closed(cancel))?;
            }
        }

        let Some(handed_off) = handed_off else {
            return Ok(());
        };
        // A worker that took the task before cancellation still counts.
        tokio::select! {
            biased;
            ack = handed_off => ack.map_err(|_| closed(cancel)),
            () = cancel.cancelled() => Err(Error::Cancelled),
        }
    }

    /// Number of tasks currently buffered.
    pub(crate) fn len(&self) -> usize {
        self.tx.max_capacity() - self.tx.capacity()
    }
}

fn closed(cancel: &CancellationToken) -> Error {
    if cancel.is_cancelled() {
        Error::Cancelled
    } else {
        Error::QueueClosed {
            context: "all workers have stopped".to_string(),
        }
    }
}

/// Outcome of a worker's wait on the queue.
#[derive(Debug)]
pub(crate) enum Received<T> {
    /// The next task, owned exclusively by the caller.
    Task(Task<T>),
    /// The queue is closed and drained.
    Closed,
    /// Cancellation was signalled.
    Cancelled,
}

/// Consumer half, cloned into every worker loop.
#[derive(Debug)]
pub(crate) struct SharedReceiver<T> {
    rx: Arc<Mutex<mpsc::Receiver<Envelope<T>>>>,
}

impl<T> Clone for SharedReceiver<T> {
    fn clone(&self) -> Self {
        Self {
            rx: Arc::clone(&self.rx),
        }
    }
}

impl<T> SharedReceiver<T> {
    /// Waits for the next task or for cancellation, whichever comes first.
    ///
    /// Cancellation takes priority: once the token is cancelled no further
    /// task is handed out, even if some are still buffered.
    pub(crate) async fn recv(&self, cancel: &CancellationToken) -> Received<T> {
        let mut rx = tokio::select! {
            biased;
            () = cancel.cancelled() => return Received::Cancelled,
            guard = self.rx.lock() => guard,
        };

        let envelope = tokio::select! {
            biased;
            () = cancel.cancelled() => return Received::Cancelled,
            envelope = rx.recv() => envelope,
        };

        match envelope {
            Some(Envelope { task, taken }) => {
                if let Some(taken) = taken {
                    let _ = taken.send(());
                }
                Received::Task(task)
            }
            None => Received::Closed,
        }
    }
}
