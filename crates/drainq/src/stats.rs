use portable_atomic::{AtomicU64, Ordering};

#[cfg(feature = "cache-padded")]
type Counter = crossbeam_utils::CachePadded<AtomicU64>;
#[cfg(not(feature = "cache-padded"))]
type Counter = AtomicU64;

/// Lock-free progress counters shared by the producer and every worker loop.
///
/// `enqueued` is only written by the producer; `dispatched` and `completed`
/// are written by workers, so with many workers the `cache-padded` feature
/// keeps them on separate cache lines.
#[derive(Debug, Default)]
pub(crate) struct QueueStats {
    enqueued: Counter,
    dispatched: Counter,
    completed: Counter,
    failed_workers: Counter,
}

impl QueueStats {
    /// Records one enqueued item and returns the new total.
    pub(crate) fn record_enqueued(&self) -> u64 {
        self.enqueued.fetch_add(1, Ordering::Relaxed) + 1
    }

    pub(crate) fn record_dispatched(&self) {
        self.dispatched.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_completed(&self) {
        self.completed.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_worker_failed(&self) {
        self.failed_workers.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            enqueued: self.enqueued.load(Ordering::Relaxed),
            dispatched: self.dispatched.load(Ordering::Relaxed),
            completed: self.completed.load(Ordering::Relaxed),
            failed_workers: self.failed_workers.load(Ordering::Relaxed),
        }
    }
}

/// Point-in-time view of the queue counters.
///
/// `enqueued` counts items, while `dispatched` and `completed` count tasks: with
/// chunking enabled one task carries up to `chunk_size` items.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatsSnapshot {
    /// Items accepted by `enqueue`.
    pub enqueued: u64,
    /// Tasks taken off the queue by a worker.
    pub dispatched: u64,
    /// Tasks whose `process` call has returned.
    pub completed: u64,
    /// Worker loops that ended in a panic.
    pub failed_workers: u64,
}

impl StatsSnapshot {
    /// Tasks handed to a worker whose processing has not returned yet.
    pub const fn in_flight(&self) -> u64 {
        self.dispatched.saturating_sub(self.completed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counters_accumulate() {
        let stats = QueueStats::default();
        assert_eq!(stats.record_enqueued(), 1);
        assert_eq!(stats.record_enqueued(), 2);
        stats.record_dispatched();
        stats.record_dispatched();
        stats.record_completed();
        stats.record_worker_failed();

        let snapshot = stats.snapshot();
        assert_eq!(
            snapshot,
            StatsSnapshot {
                enqueued: 2,
                dispatched: 2,
                completed: 1,
                failed_workers: 1,
            }
        );
        assert_eq!(snapshot.in_flight(), 1);
    }
}
