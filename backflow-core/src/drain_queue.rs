// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use crossbeam_queue::{ArrayQueue, SegQueue};

/// Lock-free FIFO buffer drained by the [`crate::drain`] engine.
///
/// The producer offers from one thread while at most one drain pass polls. `is_empty`
/// may report a stale answer under concurrent `offer`, but never reports empty while an
/// already-offered item is still in the queue.
pub trait DrainQueue<T> {
    /// Append an item, handing it back if the queue is full.
    ///
    /// # Errors
    /// Returns the item when a bounded queue has no room left.
    fn offer(&self, item: T) -> Result<(), T>;

    /// Remove the oldest item, or `None` when nothing is buffered.
    fn poll(&self) -> Option<T>;

    /// Returns `true` when nothing is buffered.
    fn is_empty(&self) -> bool;
}

impl<T> DrainQueue<T> for SegQueue<T> {
    fn offer(&self, item: T) -> Result<(), T> {
        self.push(item);
        Ok(())
    }

    fn poll(&self) -> Option<T> {
        self.pop()
    }

    fn is_empty(&self) -> bool {
        SegQueue::is_empty(self)
    }
}

impl<T> DrainQueue<T> for ArrayQueue<T> {
    fn offer(&self, item: T) -> Result<(), T> {
        self.push(item)
    }

    fn poll(&self) -> Option<T> {
        self.pop()
    }

    fn is_empty(&self) -> bool {
        ArrayQueue::is_empty(self)
    }
}
