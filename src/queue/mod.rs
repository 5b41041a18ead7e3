//! Blocking queues that decouple stream readers from consumers.
//!
//! - [`OverwriteQueue`]: bounded; a full queue drops its oldest item so the
//!   producer never waits. Suited to `info` updates where only the freshest
//!   data matters.
//! - [`UnboundedQueue`]: never drops; waits can be bounded by a deadline or a
//!   [`CancelToken`](crate::sync::CancelToken). Suited to messages such as
//!   `bestmove` that must not be lost.
//!
//! Both are FIFO among retained items and can be shared through an `Arc` by
//! any number of producers and consumers.

use std::collections::VecDeque;
use std::sync::{Arc, Weak};
use std::time::Instant;

use parking_lot::{Condvar, Mutex};

use crate::error::WaitError;
use crate::sync::{CancelToken, Wake};

mod overwrite;
mod unbounded;

pub use overwrite::OverwriteQueue;
pub use unbounded::UnboundedQueue;

/// Item storage and wake-up signal shared by both queue flavours.
struct Slots<T> {
    items: Mutex<VecDeque<T>>,
    ready: Condvar,
}

impl<T> Slots<T> {
    fn with_capacity(capacity: usize) -> Self {
        Slots {
            items: Mutex::new(VecDeque::with_capacity(capacity)),
            ready: Condvar::new(),
        }
    }

    /// Run `f` under the lock, then wake one waiting consumer.
    fn insert<R>(&self, f: impl FnOnce(&mut VecDeque<T>) -> R) -> R {
        let result = {
            let mut items = self.items.lock();
            f(&mut *items)
        };
        self.ready.notify_one();
        result
    }

    fn pop(&self) -> T {
        let mut items = self.items.lock();
        loop {
            if let Some(item) = items.pop_front() {
                return item;
            }
            self.ready.wait(&mut items);
        }
    }

    fn try_pop(&self) -> Option<T> {
        self.items.lock().pop_front()
    }

    fn pop_until(&self, deadline: Instant) -> Result<T, WaitError> {
        let mut items = self.items.lock();
        loop {
            if let Some(item) = items.pop_front() {
                return Ok(item);
            }
            if self.ready.wait_until(&mut items, deadline).timed_out() {
                return items.pop_front().ok_or(WaitError::Timeout);
            }
        }
    }

    /// Like [`pop_until`](Self::pop_until) with no deadline by default, also
    /// ending when `token` is cancelled.
    fn pop_cancellable(
        self: &Arc<Self>,
        token: &CancelToken,
        deadline: Option<Instant>,
    ) -> Result<T, WaitError>
    where
        T: Send + 'static,
    {
        let waiter: Weak<dyn Wake> = Arc::downgrade(self) as Weak<dyn Wake>;
        let _registration = token.register(waiter);

        let mut items = self.items.lock();
        loop {
            if let Some(item) = items.pop_front() {
                return Ok(item);
            }
            if token.is_cancelled() {
                return Err(WaitError::Cancelled);
            }
            match deadline {
                Some(deadline) => {
                    if self.ready.wait_until(&mut items, deadline).timed_out() {
                        return items.pop_front().ok_or(WaitError::Timeout);
                    }
                }
                None => self.ready.wait(&mut items),
            }
        }
    }

    fn len(&self) -> usize {
        self.items.lock().len()
    }
}

impl<T: Send> Wake for Slots<T> {
    fn wake(&self) {
        // Taking the lock orders this wake after a waiter's token check
        drop(self.items.lock());
        self.ready.notify_all();
    }
}
