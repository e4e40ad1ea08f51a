/// Fixed-capacity accumulator decoupling batch-size policy from the
/// embedding and upsert calls that consume the batches.
#[derive(Debug)]
pub struct Batcher<T> {
    capacity: usize,
    items: Vec<T>,
}

impl<T> Batcher<T> {
    pub fn new(capacity: usize) -> Self {
        assert!(capacity > 0, "batch capacity must be positive");
        Self {
            capacity,
            items: Vec::with_capacity(capacity),
        }
    }

    /// Push an item, returning the full batch when capacity is reached.
    pub fn push(&mut self, item: T) -> Option<Vec<T>> {
        self.items.push(item);
        (self.items.len() >= self.capacity).then(|| self.drain())
    }

    /// Take whatever has accumulated, leaving the batcher empty.
    pub fn drain(&mut self) -> Vec<T> {
        std::mem::replace(&mut self.items, Vec::with_capacity(self.capacity))
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn push_returns_batch_at_capacity() {
        let mut batcher = Batcher::new(3);
        assert!(batcher.push(1).is_none());
        assert!(batcher.push(2).is_none());
        let batch = batcher.push(3).expect("third push fills the batch");
        assert_eq!(batch, vec![1, 2, 3]);
        assert!(batcher.is_empty());
    }

    #[test]
    fn drain_returns_partial_remainder() {
        let mut batcher = Batcher::new(10);
        batcher.push(1);
        batcher.push(2);
        assert_eq!(batcher.len(), 2);
        assert_eq!(batcher.drain(), vec![1, 2]);
        assert!(batcher.is_empty());
    }

    #[test]
    fn drain_on_empty_is_empty() {
        let mut batcher: Batcher<i32> = Batcher::new(5);
        assert!(batcher.drain().is_empty());
    }

    #[test]
    fn twenty_three_items_at_capacity_ten_yield_three_batches() {
        let mut batcher = Batcher::new(10);
        let mut batches = Vec::new();
        for i in 0..23 {
            if let Some(batch) = batcher.push(i) {
                batches.push(batch);
            }
        }
        if !batcher.is_empty() {
            batches.push(batcher.drain());
        }
        let sizes: Vec<usize> = batches.iter().map(Vec::len).collect();
        assert_eq!(sizes, vec![10, 10, 3]);
    }

    #[test]
    #[should_panic(expected = "batch capacity must be positive")]
    fn zero_capacity_is_rejected() {
        let _ = Batcher::<i32>::new(0);
    }
}
