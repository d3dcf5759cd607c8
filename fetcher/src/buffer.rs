use crate::model::Item;
use std::mem;
use std::num::NonZeroUsize;

/// Bounded, ordered batch of items awaiting a flush.
///
/// Owned by the buffering stage alone, so it carries no synchronization.
#[derive(Debug)]
pub struct Buffer {
    items: Vec<Item>,
    capacity: usize,
}

impl Buffer {
    pub fn new(capacity: NonZeroUsize) -> Self {
        let capacity = capacity.get();
        Self {
            items: Vec::with_capacity(capacity),
            capacity,
        }
    }

    /// Appends an item. When the buffer is already full its previous contents
    /// are detached and returned first, so the caller flushes them before the
    /// new item is ever written.
    pub fn insert(&mut self, item: Item) -> Option<Vec<Item>> {
        let flushed = if self.is_full() { self.take() } else { None };
        self.items.push(item);
        flushed
    }

    /// Detaches the current contents, leaving the buffer empty.
    /// Returns `None` when there is nothing to flush.
    pub fn take(&mut self) -> Option<Vec<Item>> {
        if self.items.is_empty() {
            return None;
        }
        let batch = mem::replace(&mut self.items, Vec::with_capacity(self.capacity));
        Some(batch)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.items.len() >= self.capacity
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    fn with_capacity(capacity: usize) -> Buffer {
        Buffer::new(NonZeroUsize::new(capacity).unwrap())
    }

    fn names(items: &[Item]) -> Vec<&str> {
        items.iter().map(|i| i.name.as_str()).collect()
    }

    #[test]
    fn full_buffer_flushes_before_insert() {
        let mut buffer = with_capacity(2);
        assert!(buffer.insert(Item::new("A")).is_none());
        assert!(buffer.insert(Item::new("B")).is_none());
        assert!(buffer.is_full());

        let flushed = buffer.insert(Item::new("C")).expect("forced flush");
        assert_eq!(names(&flushed), vec!["A", "B"]);
        assert_eq!(buffer.len(), 1);
        assert_eq!(names(&buffer.take().unwrap()), vec!["C"]);
    }

    #[test]
    fn take_on_empty_buffer_is_noop() {
        let mut buffer = with_capacity(3);
        assert!(buffer.take().is_none());

        buffer.insert(Item::new("Han"));
        assert_eq!(names(&buffer.take().unwrap()), vec!["Han"]);
        assert!(buffer.is_empty());
        assert!(buffer.take().is_none());
    }

    #[test]
    fn single_slot_buffer_flushes_on_every_insert_after_the_first() {
        let mut buffer = with_capacity(1);
        assert!(buffer.insert(Item::new("A")).is_none());
        assert_eq!(names(&buffer.insert(Item::new("B")).unwrap()), vec!["A"]);
        assert_eq!(names(&buffer.insert(Item::new("C")).unwrap()), vec!["B"]);
        assert_eq!(buffer.len(), 1);
    }

    proptest! {
        #[test]
        fn never_exceeds_capacity_and_preserves_order(
            capacity in 1usize..8,
            input in proptest::collection::vec("[a-z]{1,6}", 0..64),
        ) {
            let mut buffer = with_capacity(capacity);
            let mut written = Vec::new();

            for name in &input {
                if let Some(batch) = buffer.insert(Item::new(name.clone())) {
                    prop_assert!(batch.len() <= capacity);
                    written.extend(batch.into_iter().map(|i| i.name));
                }
                prop_assert!(buffer.len() <= capacity);
            }
            if let Some(batch) = buffer.take() {
                written.extend(batch.into_iter().map(|i| i.name));
            }

            prop_assert!(buffer.is_empty());
            prop_assert_eq!(written, input);
        }
    }
}
