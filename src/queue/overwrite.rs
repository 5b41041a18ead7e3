//! Bounded queue that evicts its oldest item when full.

use std::time::{Duration, Instant};

use super::Slots;
use crate::error::WaitError;

/// Fixed-capacity FIFO where `push` never blocks.
///
/// When the queue already holds `capacity` items, a push removes the single
/// oldest item first, so the newest push always succeeds and the size never
/// exceeds the capacity.
pub struct OverwriteQueue<T> {
    slots: Slots<T>,
    capacity: usize,
}

impl<T> OverwriteQueue<T> {
    /// Create a queue holding at most `capacity` items (minimum 1).
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        OverwriteQueue {
            slots: Slots::with_capacity(capacity),
            capacity,
        }
    }

    /// Append an item, returning the evicted oldest item if the queue was full.
    pub fn push(&self, item: T) -> Option<T> {
        self.slots.insert(|items| {
            let evicted = if items.len() >= self.capacity {
                items.pop_front()
            } else {
                None
            };
            items.push_back(item);
            evicted
        })
    }

    /// Block until an item is available and remove the oldest one.
    pub fn next(&self) -> T {
        self.slots.pop()
    }

    /// Remove the oldest item without blocking.
    pub fn try_next(&self) -> Option<T> {
        self.slots.try_pop()
    }

    /// Like [`next`](Self::next), giving up after `timeout`.
    pub fn next_timeout(&self, timeout: Duration) -> Result<T, WaitError> {
        self.slots.pop_until(Instant::now() + timeout)
    }

    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn test_overflow_keeps_most_recent() {
        let queue = OverwriteQueue::new(3);
        for i in 0..3 {
            assert_eq!(queue.push(i), None);
        }
        assert_eq!(queue.push(3), Some(0));
        assert_eq!(queue.len(), 3);

        assert_eq!(queue.next(), 1);
        assert_eq!(queue.next(), 2);
        assert_eq!(queue.next(), 3);
        assert_eq!(queue.try_next(), None);
    }

    #[test]
    fn test_zero_capacity_is_clamped() {
        let queue = OverwriteQueue::new(0);
        assert_eq!(queue.capacity(), 1);
        queue.push("a");
        assert_eq!(queue.push("b"), Some("a"));
        assert_eq!(queue.next(), "b");
    }

    #[test]
    fn test_next_blocks_until_push() {
        let queue = Arc::new(OverwriteQueue::new(2));
        let producer = {
            let queue = Arc::clone(&queue);
            thread::spawn(move || {
                thread::sleep(Duration::from_millis(50));
                queue.push(42);
            })
        };
        assert_eq!(queue.next(), 42);
        producer.join().unwrap();
    }

    #[test]
    fn test_next_timeout_on_empty() {
        let queue: OverwriteQueue<u8> = OverwriteQueue::new(4);
        let start = Instant::now();
        assert_eq!(queue.next_timeout(Duration::from_millis(30)), Err(WaitError::Timeout));
        assert!(start.elapsed() >= Duration::from_millis(30));
        assert!(queue.is_empty());
    }

    #[test]
    fn test_slow_consumer_sees_only_fresh_items() {
        let queue = Arc::new(OverwriteQueue::new(4));
        let producer = {
            let queue = Arc::clone(&queue);
            thread::spawn(move || {
                for i in 0..1000u32 {
                    queue.push(i);
                }
            })
        };
        producer.join().unwrap();

        let drained: Vec<u32> = std::iter::from_fn(|| queue.try_next()).collect();
        assert_eq!(drained, vec![996, 997, 998, 999]);
    }
}
