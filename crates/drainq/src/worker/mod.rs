//! Worker abstraction and the loop that drives it.
//!
//! - [`Worker`] - the caller-supplied processing capability.
//! - `handle` - wraps a worker with its id, derived name and pacing delay.
//! - `worker_loop` - the per-worker task that takes units off the shared
//!   queue until it is drained or cancelled.
mod handle;
mod interface;
mod worker_loop;

pub(crate) use handle::WorkerHandle;
pub use interface::Worker;
pub(crate) use worker_loop::worker_loop;
