//! Unbounded queue with deadline and cancellation aware waits.

use std::sync::Arc;
use std::time::{Duration, Instant};

use super::Slots;
use crate::error::WaitError;
use crate::sync::CancelToken;

/// FIFO that never drops or blocks on `push`.
///
/// A failed wait consumes nothing: an item pushed after a timeout or
/// cancellation is returned by the next call.
pub struct UnboundedQueue<T> {
    slots: Arc<Slots<T>>,
}

impl<T> Default for UnboundedQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> UnboundedQueue<T> {
    #[must_use]
    pub fn new() -> Self {
        UnboundedQueue {
            slots: Arc::new(Slots::with_capacity(0)),
        }
    }

    pub fn push(&self, item: T) {
        self.slots.insert(|items| items.push_back(item));
    }

    /// Block until an item is available and remove the oldest one.
    pub fn next(&self) -> T {
        self.slots.pop()
    }

    /// Remove the oldest item without blocking.
    pub fn try_next(&self) -> Option<T> {
        self.slots.try_pop()
    }

    pub fn next_timeout(&self, timeout: Duration) -> Result<T, WaitError> {
        self.next_until(Instant::now() + timeout)
    }

    pub fn next_until(&self, deadline: Instant) -> Result<T, WaitError> {
        self.slots.pop_until(deadline)
    }

    /// Wait for an item until `token` is cancelled or `deadline` passes.
    ///
    /// An item that is already queued wins over a cancelled token.
    pub fn next_cancellable(
        &self,
        token: &CancelToken,
        deadline: Option<Instant>,
    ) -> Result<T, WaitError>
    where
        T: Send + 'static,
    {
        self.slots.pop_cancellable(token, deadline)
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
    use std::collections::HashMap;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn test_fifo_order() {
        let queue = UnboundedQueue::new();
        for i in 0..100 {
            queue.push(i);
        }
        assert_eq!(queue.len(), 100);
        for i in 0..100 {
            assert_eq!(queue.next(), i);
        }
        assert!(queue.is_empty());
    }

    #[test]
    fn test_concurrent_producers_lose_nothing() {
        const PRODUCERS: usize = 4;
        const PER_PRODUCER: usize = 250;

        let queue = Arc::new(UnboundedQueue::new());
        let handles: Vec<_> = (0..PRODUCERS)
            .map(|p| {
                let queue = Arc::clone(&queue);
                thread::spawn(move || {
                    for seq in 0..PER_PRODUCER {
                        queue.push((p, seq));
                    }
                })
            })
            .collect();

        let mut last_seen: HashMap<usize, usize> = HashMap::new();
        for _ in 0..PRODUCERS * PER_PRODUCER {
            let (p, seq) = queue.next_timeout(Duration::from_secs(5)).unwrap();
            if let Some(&prev) = last_seen.get(&p) {
                assert_eq!(seq, prev + 1, "producer {p} out of order");
            } else {
                assert_eq!(seq, 0);
            }
            last_seen.insert(p, seq);
        }
        for handle in handles {
            handle.join().unwrap();
        }

        assert!(queue.try_next().is_none());
        assert!(last_seen.values().all(|&seq| seq == PER_PRODUCER - 1));
    }

    #[test]
    fn test_timeout_consumes_nothing() {
        let queue = UnboundedQueue::new();
        assert_eq!(
            queue.next_timeout(Duration::from_millis(20)),
            Err(WaitError::Timeout)
        );
        queue.push("late");
        assert_eq!(queue.next_timeout(Duration::from_millis(20)), Ok("late"));
    }

    #[test]
    fn test_timeout_leaves_unconsumed_items() {
        let queue = UnboundedQueue::new();
        queue.push(1);
        queue.push(2);
        assert_eq!(queue.next(), 1);
        assert_eq!(queue.next_timeout(Duration::ZERO), Ok(2));
        assert_eq!(queue.next_timeout(Duration::ZERO), Err(WaitError::Timeout));
    }

    #[test]
    fn test_item_arriving_before_deadline() {
        let queue = Arc::new(UnboundedQueue::new());
        let producer = {
            let queue = Arc::clone(&queue);
            thread::spawn(move || {
                thread::sleep(Duration::from_millis(30));
                queue.push(7);
            })
        };
        assert_eq!(queue.next_timeout(Duration::from_secs(5)), Ok(7));
        producer.join().unwrap();
    }

    #[test]
    fn test_cancel_wakes_waiter() {
        let queue: Arc<UnboundedQueue<u8>> = Arc::new(UnboundedQueue::new());
        let token = CancelToken::new();
        let canceller = {
            let token = token.clone();
            thread::spawn(move || {
                thread::sleep(Duration::from_millis(30));
                token.cancel();
            })
        };
        let start = Instant::now();
        assert_eq!(
            queue.next_cancellable(&token, None),
            Err(WaitError::Cancelled)
        );
        assert!(start.elapsed() < Duration::from_secs(5));
        canceller.join().unwrap();

        queue.push(9);
        token.reset();
        assert_eq!(queue.next_cancellable(&token, None), Ok(9));
    }

    #[test]
    fn test_cancel_wakes_every_waiter() {
        let queue: Arc<UnboundedQueue<u8>> = Arc::new(UnboundedQueue::new());
        let token = CancelToken::new();
        let waiters: Vec<_> = (0..2)
            .map(|_| {
                let queue = Arc::clone(&queue);
                let token = token.clone();
                thread::spawn(move || queue.next_cancellable(&token, None))
            })
            .collect();

        while token.waiter_count() < 2 {
            thread::sleep(Duration::from_millis(1));
        }
        token.cancel();
        for waiter in waiters {
            assert_eq!(waiter.join().unwrap(), Err(WaitError::Cancelled));
        }
        assert_eq!(token.waiter_count(), 0);
    }

    #[test]
    fn test_queued_item_wins_over_cancellation() {
        let queue = UnboundedQueue::new();
        let token = CancelToken::new();
        token.cancel();
        queue.push(3);
        assert_eq!(queue.next_cancellable(&token, None), Ok(3));
        assert_eq!(queue.next_cancellable(&token, None), Err(WaitError::Cancelled));
    }

    #[test]
    fn test_cancellable_deadline() {
        let queue: UnboundedQueue<u8> = UnboundedQueue::new();
        let token = CancelToken::new();
        let deadline = Instant::now() + Duration::from_millis(20);
        assert_eq!(
            queue.next_cancellable(&token, Some(deadline)),
            Err(WaitError::Timeout)
        );
        assert!(Instant::now() >= deadline);
    }
}
