use super::{Worker, WorkerHandle};
use crate::{
    queue::{Received, SharedReceiver},
    stats::QueueStats,
};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// Why a worker loop stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Stopped {
    /// The queue was closed and every buffered task had been taken.
    Drained,
    /// The cancellation token fired.
    Cancelled,
}

/// Task driving a single [`Worker`] until the queue is drained or cancelled.
///
/// Each iteration parks on the shared queue until either a task arrives or
/// `cancel` fires; there is no polling branch, so an idle loop costs nothing.
/// A task that has been taken is processed to completion, then the loop
/// sleeps for the pacing delay (if any) before taking the next one.
///
/// This function is designed to be spawned on the queue's task tracker; the
/// loop leaves the tracker when it returns.
///
/// # Arguments
///
/// - `handle`: The worker together with its id, name and pacing delay.
/// - `queue`: Receiver shared with every other worker loop.
/// - `cancel`: The queue's cancellation token, also passed to
///   [`Worker::process`] as ambient context.
/// - `stats`: Counters updated on dispatch and completion.
pub(crate) async fn worker_loop<T, W>(
    mut handle: WorkerHandle<T, W>,
    queue: SharedReceiver<T>,
    cancel: CancellationToken,
    stats: Arc<QueueStats>,
) -> Stopped
where
    W: Worker<T>,
{
    #[cfg(feature = "tracing")]
    tracing::trace!(worker = handle.name(), "worker started");

    let stopped = loop {
        let task = match queue.recv(&cancel).await {
            Received::Task(task) => task,
            Received::Closed => break Stopped::Drained,
            Received::Cancelled => break Stopped::Cancelled,
        };
        stats.record_dispatched();

        #[cfg(feature = "tracing")]
        tracing::trace!(worker = handle.name(), items = task.len(), "processing task");

        handle.worker_mut().process(&cancel, task).await;
        stats.record_completed();

        if let Some(delay) = handle.pacing() {
            tokio::select! {
                biased;
                () = cancel.cancelled() => {}
                () = tokio::time::sleep(delay) => {}
            }
        }
    };

    #[cfg(feature = "tracing")]
    tracing::debug!(
        worker = handle.name(),
        id = handle.id(),
        reason = ?stopped,
        "worker stopped"
    );

    stopped
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Task, queue};
    use core::time::Duration;
    use std::sync::Mutex;
    use tokio::time::{Instant, timeout};

    type Seen = Arc<Mutex<Vec<(Instant, u32)>>>;

    struct Recorder {
        seen: Seen,
    }

    impl Worker<u32> for Recorder {
        async fn process(&mut self, _ctx: &CancellationToken, task: Task<u32>) {
            let now = Instant::now();
            let mut seen = self.seen.lock().unwrap();
            seen.extend(task.into_iter().map(|item| (now, item)));
        }
    }

    fn spawn_recorder(
        pacing: Option<Duration>,
        queue: SharedReceiver<u32>,
        cancel: CancellationToken,
    ) -> (Seen, Arc<QueueStats>, tokio::task::JoinHandle<Stopped>) {
        let seen = Seen::default();
        let stats = Arc::new(QueueStats::default());
        let handle = WorkerHandle::<u32, _>::new(
            0,
            Recorder {
                seen: Arc::clone(&seen),
            },
            pacing,
        );
        let join = tokio::spawn(worker_loop(handle, queue, cancel, Arc::clone(&stats)));
        (seen, stats, join)
    }

    #[tokio::test]
    async fn drains_queue_then_stops() {
        let (tx, rx) = queue::bounded(8);
        let cancel = CancellationToken::new();
        for i in 0..5 {
            tx.push(Task::Single(i), &cancel).await.unwrap();
        }
        drop(tx);

        let (seen, stats, join) = spawn_recorder(None, rx, cancel);
        assert_eq!(join.await.unwrap(), Stopped::Drained);

        let items: Vec<u32> = seen.lock().unwrap().iter().map(|(_, item)| *item).collect();
        assert_eq!(items, vec![0, 1, 2, 3, 4]);
        let snapshot = stats.snapshot();
        assert_eq!(snapshot.dispatched, 5);
        assert_eq!(snapshot.completed, 5);
    }

    #[tokio::test]
    async fn idle_worker_stops_on_cancel() {
        let (_tx, rx) = queue::bounded(1);
        let cancel = CancellationToken::new();
        let (seen, _stats, join) = spawn_recorder(None, rx, cancel.clone());

        cancel.cancel();
        let stopped = timeout(Duration::from_secs(1), join).await.unwrap().unwrap();
        assert_eq!(stopped, Stopped::Cancelled);
        assert!(seen.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn pacing_spaces_out_tasks() {
        let pacing = Duration::from_millis(40);
        let (tx, rx) = queue::bounded(4);
        let cancel = CancellationToken::new();
        for i in 0..3 {
            tx.push(Task::Single(i), &cancel).await.unwrap();
        }
        drop(tx);

        let (seen, _stats, join) = spawn_recorder(Some(pacing), rx, cancel);
        assert_eq!(join.await.unwrap(), Stopped::Drained);

        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 3);
        for pair in seen.windows(2) {
            assert!(pair[1].0 - pair[0].0 >= pacing);
        }
    }

    #[tokio::test]
    async fn cancel_cuts_pacing_short() {
        let (tx, rx) = queue::bounded(2);
        let cancel = CancellationToken::new();
        tx.push(Task::Single(1), &cancel).await.unwrap();
        tx.push(Task::Single(2), &cancel).await.unwrap();

        let (seen, _stats, join) = spawn_recorder(Some(Duration::from_secs(60)), rx, cancel.clone());
        while seen.lock().unwrap().is_empty() {
            tokio::task::yield_now().await;
        }
        cancel.cancel();

        let stopped = timeout(Duration::from_secs(1), join).await.unwrap().unwrap();
        assert_eq!(stopped, Stopped::Cancelled);
        assert_eq!(seen.lock().unwrap().len(), 1, "no task is dispatched after cancel");
    }
}
