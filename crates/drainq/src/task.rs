/// The unit of work delivered to a [`Worker`].
///
/// The shape is decided by the queue configuration, never by the payload:
///
/// - [`Task::Single`] is used when the chunk size is `1` (no batching).
/// - [`Task::Chunk`] is used when the chunk size `K` is greater than `1`. Every
///   chunk holds exactly `K` items, except the final one flushed by
///   [`QueueManager::wait`], which may be shorter but is never empty.
///
/// Items inside a chunk keep their enqueue order.
///
/// # Example
///
/// ```
/// use drainq::Task;
///
/// let task = Task::Chunk(vec![1, 2, 3]);
/// assert_eq!(task.len(), 3);
/// assert_eq!(task.into_items(), vec![1, 2, 3]);
///
/// let task = Task::Single("a");
/// assert_eq!(task.len(), 1);
/// ```
///
/// [`Worker`]: crate::Worker
/// [`QueueManager::wait`]: crate::QueueManager::wait
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Task<T> {
    /// One item, delivered unbatched.
    Single(T),
    /// An ordered batch of items.
    Chunk(Vec<T>),
}

impl<T> Task<T> {
    /// Number of items carried by this task.
    pub fn len(&self) -> usize {
        match self {
            Self::Single(_) => 1,
            Self::Chunk(items) => items.len(),
        }
    }

    /// Returns `true` if the task carries no items.
    ///
    /// The queue never dispatches an empty chunk, so this only holds for
    /// tasks built by hand.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns `true` for a batched task.
    pub const fn is_chunk(&self) -> bool {
        matches!(self, Self::Chunk(_))
    }

    /// Flattens the task into its items, preserving order.
    pub fn into_items(self) -> Vec<T> {
        match self {
            Self::Single(item) => vec![item],
            Self::Chunk(items) => items,
        }
    }

    /// Iterates over the items by reference.
    pub fn iter(&self) -> core::slice::Iter<'_, T> {
        match self {
            Self::Single(item) => core::slice::from_ref(item).iter(),
            Self::Chunk(items) => items.iter(),
        }
    }
}

impl<T> IntoIterator for Task<T> {
    type Item = T;
    type IntoIter = std::vec::IntoIter<T>;

    fn into_iter(self) -> Self::IntoIter {
        self.into_items().into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_behaves_like_one_item() {
        let task = Task::Single(7);
        assert_eq!(task.len(), 1);
        assert!(!task.is_chunk());
        assert_eq!(task.iter().copied().collect::<Vec<_>>(), vec![7]);
        assert_eq!(task.into_items(), vec![7]);
    }

    #[test]
    fn chunk_preserves_order() {
        let task = Task::Chunk(vec!["a", "b", "c"]);
        assert!(task.is_chunk());
        assert!(!task.is_empty());
        assert_eq!(task.into_iter().collect::<Vec<_>>(), vec!["a", "b", "c"]);
    }

    #[test]
    fn empty_chunk_is_empty() {
        let task: Task<u8> = Task::Chunk(Vec::new());
        assert!(task.is_empty());
    }
}
