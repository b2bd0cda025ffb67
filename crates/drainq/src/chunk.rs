use crate::Task;

/// Producer-side accumulator that turns a stream of items into
/// [`Task::Chunk`]s of a fixed size.
///
/// The aggregator is owned by the enqueue path of a single producer and is
/// never shared, so it needs no synchronization.
///
/// # Example
///
/// ```
/// use drainq::{ChunkAggregator, Task};
///
/// let mut chunks = ChunkAggregator::new(2);
/// assert_eq!(chunks.push(1), None);
/// assert_eq!(chunks.push(2), Some(Task::Chunk(vec![1, 2])));
/// assert_eq!(chunks.push(3), None);
/// assert_eq!(chunks.flush(), Some(Task::Chunk(vec![3])));
/// assert_eq!(chunks.flush(), None);
/// ```
#[derive(Debug)]
pub struct ChunkAggregator<T> {
    chunk_size: usize,
    buffer: Vec<T>,
}

impl<T> ChunkAggregator<T> {
    /// Creates an aggregator emitting chunks of `chunk_size` items.
    ///
    /// # Panics
    ///
    /// Panics if `chunk_size` is zero.
    pub fn new(chunk_size: usize) -> Self {
        assert!(chunk_size > 0, "chunk size must be at least 1");
        Self {
            chunk_size,
            buffer: Vec::with_capacity(chunk_size),
        }
    }

    /// Appends an item, returning a full chunk once exactly `chunk_size` items
    /// have been collected.
    pub fn push(&mut self, item: T) -> Option<Task<T>> {
        self.buffer.push(item);
        if self.buffer.len() < self.chunk_size {
            return None;
        }
        let full = core::mem::replace(&mut self.buffer, Vec::with_capacity(self.chunk_size));
        Some(Task::Chunk(full))
    }

    /// Takes the partial chunk, if any items are buffered.
    pub fn flush(&mut self) -> Option<Task<T>> {
        if self.buffer.is_empty() {
            return None;
        }
        Some(Task::Chunk(core::mem::take(&mut self.buffer)))
    }

    /// Number of items waiting for the current chunk to fill.
    pub fn pending(&self) -> usize {
        self.buffer.len()
    }

    pub const fn chunk_size(&self) -> usize {
        self.chunk_size
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn drain(chunk_size: usize, total: u32) -> Vec<Vec<u32>> {
        let mut aggregator = ChunkAggregator::new(chunk_size);
        let mut chunks: Vec<Vec<u32>> = (0..total)
            .filter_map(|i| aggregator.push(i))
            .map(Task::into_items)
            .collect();
        chunks.extend(aggregator.flush().map(Task::into_items));
        chunks
    }

    #[test]
    fn emits_full_chunks_then_remainder() {
        let chunks = drain(4, 10);
        let sizes: Vec<usize> = chunks.iter().map(Vec::len).collect();
        assert_eq!(sizes, vec![4, 4, 2]);
        assert_eq!(chunks.concat(), (0..10).collect::<Vec<_>>());
    }

    #[test]
    fn exact_multiple_has_no_remainder() {
        let chunks = drain(5, 15);
        assert_eq!(chunks.len(), 3);
        assert!(chunks.iter().all(|chunk| chunk.len() == 5));
    }

    #[test]
    fn chunk_count_is_ceiling_of_items_over_size() {
        for (size, total) in [(3, 1), (3, 7), (7, 3), (1, 5)] {
            let chunks = drain(size, total);
            assert_eq!(chunks.len(), (total as usize).div_ceil(size));
        }
    }

    #[test]
    fn flush_on_empty_is_none() {
        let mut aggregator = ChunkAggregator::<u8>::new(3);
        assert_eq!(aggregator.pending(), 0);
        assert_eq!(aggregator.flush(), None);
    }

    #[test]
    #[should_panic(expected = "chunk size must be at least 1")]
    fn zero_chunk_size_panics() {
        let _ = ChunkAggregator::<u8>::new(0);
    }
}
