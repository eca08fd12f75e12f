// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Cold publishers built from plain values.
//!
//! Every subscription replays the source from the start, honouring demand exactly:
//! [`from_iter`] emits no more items than were requested and completes as soon as the last
//! item went out, without waiting for a further request.
//!
//! ```
//! use backflow_core::Publisher;
//! use backflow_stream::sources::from_iter;
//! use backflow_test_utils::TestSubscriber;
//!
//! let numbers = from_iter(vec![1, 2, 3]);
//! let subscriber = TestSubscriber::<i32>::new();
//! numbers.subscribe(subscriber.clone());
//!
//! subscriber.request(2);
//! assert_eq!(subscriber.values(), vec![1, 2]);
//! subscriber.request(1);
//! assert!(subscriber.is_completed());
//! ```

use crate::logging::log_trace;
use backflow_core::demand::add_cap;
use backflow_core::mutex::Mutex;
use backflow_core::{
    CancellationToken, EmptySubscription, FlowError, Publisher, Subscriber, Subscription,
    UNBOUNDED,
};
use core::iter::Peekable;
use core::marker::PhantomData;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Publisher replaying a cloneable collection. See [`from_iter`].
#[derive(Debug, Clone)]
pub struct FromIter<I> {
    items: I,
}

/// Emit every item of `items`, in order, then complete.
pub fn from_iter<I>(items: I) -> FromIter<I>
where
    I: IntoIterator + Clone,
{
    FromIter { items }
}

/// Emit `value` once, then complete.
pub fn just<T: Clone>(value: T) -> FromIter<[T; 1]> {
    from_iter([value])
}

/// Publisher that completes right after `on_subscribe`. See [`empty`].
pub struct Empty<T> {
    _item: PhantomData<fn() -> T>,
}

/// Complete immediately without emitting.
pub fn empty<T>() -> Empty<T> {
    Empty { _item: PhantomData }
}

/// Publisher that fails right after `on_subscribe`. See [`fail`].
pub struct Fail<T> {
    error: FlowError,
    _item: PhantomData<fn() -> T>,
}

/// Fail immediately with `error`, once per subscriber.
pub fn fail<T>(error: FlowError) -> Fail<T> {
    Fail {
        error,
        _item: PhantomData,
    }
}

impl<I> Publisher<I::Item> for FromIter<I>
where
    I: IntoIterator + Clone + Send + Sync,
    I::IntoIter: Send + 'static,
    I::Item: Send + 'static,
{
    fn subscribe(&self, subscriber: Arc<dyn Subscriber<I::Item>>) {
        let mut iter = self.items.clone().into_iter().peekable();
        if iter.peek().is_none() {
            subscriber.on_subscribe(Arc::new(EmptySubscription));
            subscriber.on_complete();
            return;
        }

        let subscription = Arc::new(IterSubscription {
            iter: Mutex::new(iter),
            downstream: subscriber.clone(),
            requested: AtomicU64::new(0),
            done: CancellationToken::new(),
        });
        subscriber.on_subscribe(subscription);
    }
}

impl<T> Publisher<T> for Empty<T> {
    fn subscribe(&self, subscriber: Arc<dyn Subscriber<T>>) {
        subscriber.on_subscribe(Arc::new(EmptySubscription));
        subscriber.on_complete();
    }
}

impl<T> Publisher<T> for Fail<T> {
    fn subscribe(&self, subscriber: Arc<dyn Subscriber<T>>) {
        subscriber.on_subscribe(Arc::new(EmptySubscription));
        subscriber.on_error(self.error.clone());
    }
}

struct IterSubscription<I: Iterator> {
    iter: Mutex<Peekable<I>>,
    downstream: Arc<dyn Subscriber<I::Item>>,
    requested: AtomicU64,
    /// Set by cancellation or by the emission of the final signal.
    done: CancellationToken,
}

impl<I> IterSubscription<I>
where
    I: Iterator + Send,
    I::Item: Send,
{
    fn add_demand(&self, n: u64) -> u64 {
        let mut current = self.requested.load(Ordering::Acquire);
        loop {
            match self.requested.compare_exchange(
                current,
                add_cap(current, n),
                Ordering::AcqRel,
                Ordering::Acquire,
            ) {
                Ok(previous) => return previous,
                Err(observed) => current = observed,
            }
        }
    }

    /// Pull the next item, noting whether it is the last one.
    fn next_item(&self) -> Option<(I::Item, bool)> {
        let mut iter = self.iter.lock();
        let item = iter.next()?;
        let last = iter.peek().is_none();
        Some((item, last))
    }

    fn finish(&self) {
        if self.done.cancel() {
            self.downstream.on_complete();
        }
    }

    /// Emit against `n` requested items. Only the caller that raised demand from zero
    /// runs this loop; requests made meanwhile, including from inside `on_next`, only
    /// bump the counter.
    fn emit(&self, mut n: u64) {
        let mut emitted = 0u64;
        loop {
            while n == UNBOUNDED || emitted != n {
                if self.done.is_cancelled() {
                    log_trace!("iterator emission stopped after {} items", emitted);
                    return;
                }
                match self.next_item() {
                    Some((item, last)) => {
                        self.downstream.on_next(item);
                        if last {
                            self.finish();
                            return;
                        }
                        emitted += 1;
                    }
                    None => {
                        self.finish();
                        return;
                    }
                }
            }

            n = self.requested.load(Ordering::Acquire);
            if n == emitted {
                n = self.requested.fetch_sub(emitted, Ordering::AcqRel) - emitted;
                if n == 0 {
                    return;
                }
                emitted = 0;
            }
        }
    }
}

impl<I> Subscription for IterSubscription<I>
where
    I: Iterator + Send,
    I::Item: Send,
{
    fn request(&self, n: u64) {
        if n == 0 || self.done.is_cancelled() {
            return;
        }
        if self.add_demand(n) == 0 {
            self.emit(add_cap(0, n));
        }
    }

    fn cancel(&self) {
        self.done.cancel();
    }
}
