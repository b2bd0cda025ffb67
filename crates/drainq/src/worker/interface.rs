use crate::Task;
use core::future::Future;
use tokio_util::sync::CancellationToken;

/// Caller-supplied processing logic driven by a worker loop.
///
/// A worker loop owns exactly one `Worker` and calls [`Worker::process`] once
/// per task, sequentially: the next task is only taken after the returned
/// future completes. Different workers run in parallel.
///
/// The queue does not catch, retry or dead-letter anything on behalf of the
/// worker. Errors must be handled inside `process`.
///
/// Any `FnMut(CancellationToken, Task<T>) -> impl Future<Output = ()>` closure
/// is a `Worker`, which is convenient when the worker holds no state of its
/// own.
///
/// # Example
///
/// ```
/// use drainq::{Task, Worker};
/// use tokio_util::sync::CancellationToken;
///
/// struct Printer {
///     name: String,
/// }
///
/// impl Worker<u32> for Printer {
///     async fn process(&mut self, _ctx: &CancellationToken, task: Task<u32>) {
///         for item in task {
///             println!("{}: {item}", self.name);
///         }
///     }
///
///     fn set_name(&mut self, name: &str) {
///         self.name = name.to_string();
///     }
/// }
/// ```
pub trait Worker<T>: Send + 'static {
    /// Processes one task.
    ///
    /// `ctx` is the queue's cancellation token. A task that was already handed
    /// out is never interrupted by the queue; long-running work should watch
    /// `ctx` and return early once it is cancelled.
    fn process(&mut self, ctx: &CancellationToken, task: Task<T>) -> impl Future<Output = ()> + Send;

    /// Receives the display name derived for this worker (for example
    /// `"worker # 3"`). Informational only.
    fn set_name(&mut self, name: &str) {
        let _ = name;
    }
}

impl<T, F, Fut> Worker<T> for F
where
    F: FnMut(CancellationToken, Task<T>) -> Fut + Send + 'static,
    Fut: Future<Output = ()> + Send,
{
    fn process(&mut self, ctx: &CancellationToken, task: Task<T>) -> impl Future<Output = ()> + Send {
        (*self)(ctx.clone(), task)
    }
}
