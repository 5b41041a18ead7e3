//! Cancellation shared by the queues.

use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Weak};

use parking_lot::Mutex;

/// Something blocked on a [`CancelToken`] that must be woken on cancel.
pub(crate) trait Wake: Send + Sync {
    fn wake(&self);
}

#[derive(Default)]
struct Shared {
    cancelled: AtomicBool,
    next_id: AtomicU64,
    waiters: Mutex<Vec<(u64, Weak<dyn Wake>)>>,
}

/// A thread-safe cancellation flag for queue waits.
///
/// Clones share the same flag. Once cancelled, every pending and future
/// cancellable wait observing this token returns
/// [`WaitError::Cancelled`](crate::WaitError::Cancelled) until it is reset.
/// Pending waits are woken by [`cancel`](Self::cancel) directly.
#[derive(Clone, Default)]
pub struct CancelToken(Arc<Shared>);

impl CancelToken {
    /// Create a new token (initially not cancelled).
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.0.cancelled.load(Ordering::Acquire)
    }

    /// Set the flag and wake every wait currently registered on this token.
    pub fn cancel(&self) {
        self.0.cancelled.store(true, Ordering::Release);
        let waiters: Vec<Arc<dyn Wake>> = self
            .0
            .waiters
            .lock()
            .iter()
            .filter_map(|(_, waiter)| waiter.upgrade())
            .collect();
        for waiter in waiters {
            waiter.wake();
        }
    }

    #[inline]
    pub fn reset(&self) {
        self.0.cancelled.store(false, Ordering::Release);
    }

    /// Register `waiter` for wake-ups until the returned guard is dropped.
    pub(crate) fn register(&self, waiter: Weak<dyn Wake>) -> Registration<'_> {
        let id = self.0.next_id.fetch_add(1, Ordering::Relaxed);
        self.0.waiters.lock().push((id, waiter));
        Registration { token: self, id }
    }

    #[cfg(test)]
    pub(crate) fn waiter_count(&self) -> usize {
        self.0.waiters.lock().len()
    }
}

impl fmt::Debug for CancelToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CancelToken")
            .field("cancelled", &self.is_cancelled())
            .finish_non_exhaustive()
    }
}

/// Keeps a waiter registered on a [`CancelToken`].
pub(crate) struct Registration<'a> {
    token: &'a CancelToken,
    id: u64,
}

impl Drop for Registration<'_> {
    fn drop(&mut self) {
        self.token.0.waiters.lock().retain(|(id, _)| *id != self.id);
    }
}
