use super::Worker;
use core::{marker::PhantomData, time::Duration};

/// The queue's wrapper around one [`Worker`]: its ordinal id, derived name and
/// optional pacing delay.
///
/// Building a handle assigns the derived name to the worker through
/// [`Worker::set_name`].
pub(crate) struct WorkerHandle<T, W> {
    id: usize,
    name: String,
    pacing: Option<Duration>,
    worker: W,
    _task: PhantomData<fn(T)>,
}

impl<T, W> WorkerHandle<T, W>
where
    W: Worker<T>,
{
    pub(crate) fn new(id: usize, mut worker: W, pacing: Option<Duration>) -> Self {
        let name = match pacing {
            Some(delay) => format!("sleeping ({delay:?}) worker # {id}"),
            None => format!("worker # {id}"),
        };
        worker.set_name(&name);
        Self {
            id,
            name,
            pacing,
            worker,
            _task: PhantomData,
        }
    }

    #[cfg_attr(not(feature = "tracing"), allow(dead_code))]
    pub(crate) const fn id(&self) -> usize {
        self.id
    }

    pub(crate) fn name(&self) -> &str {
        &self.name
    }

    pub(crate) const fn pacing(&self) -> Option<Duration> {
        self.pacing
    }

    pub(crate) fn worker_mut(&mut self) -> &mut W {
        &mut self.worker
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Task;
    use tokio_util::sync::CancellationToken;

    #[derive(Default)]
    struct Named(String);

    impl Worker<()> for Named {
        async fn process(&mut self, _ctx: &CancellationToken, _task: Task<()>) {}

        fn set_name(&mut self, name: &str) {
            self.0 = name.to_string();
        }
    }

    #[test]
    fn plain_worker_name() {
        let mut handle = WorkerHandle::<(), _>::new(3, Named::default(), None);
        assert_eq!(handle.id(), 3);
        assert_eq!(handle.name(), "worker # 3");
        assert_eq!(handle.worker_mut().0, "worker # 3");
        assert_eq!(handle.pacing(), None);
    }

    #[test]
    fn sleeping_worker_name_includes_delay() {
        let mut handle =
            WorkerHandle::<(), _>::new(0, Named::default(), Some(Duration::from_millis(250)));
        let name = handle.name().to_string();
        assert_eq!(name, "sleeping (250ms) worker # 0");
        assert_eq!(handle.worker_mut().0, name);
        assert_eq!(handle.pacing(), Some(Duration::from_millis(250)));
    }
}
