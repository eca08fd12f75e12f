// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Keep only the last `n` items of a publisher and replay them once it completes.
//!
//! The operator consumes its upstream without limit, keeping a bounded window of the most
//! recent items (the oldest one is evicted when the window is full). Once the upstream
//! completes, the window is handed to the drain engine and replayed as fast as the
//! downstream requests it, followed by completion.
//!
//! Failure handling depends on the flavour:
//!
//! - [`take_last`](TakeLastExt::take_last) fails fast: the window is discarded and the
//!   failure delivered right away.
//! - [`take_last_delay_error`](TakeLastExt::take_last_delay_error) replays the window first
//!   and delivers the failure after its last item.
//!
//! ```
//! use backflow_core::Publisher;
//! use backflow_stream::sources::from_iter;
//! use backflow_stream::TakeLastExt;
//! use backflow_test_utils::TestSubscriber;
//!
//! let last_two = from_iter(1..=5).take_last(2);
//! let subscriber = TestSubscriber::<i32>::new();
//! last_two.subscribe(subscriber.clone());
//!
//! assert!(subscriber.values().is_empty());
//! subscriber.request(10);
//! assert_eq!(subscriber.values(), vec![4, 5]);
//! assert!(subscriber.is_completed());
//! ```

use crate::logging::log_trace;
use backflow_core::drain::{
    request_and_maybe_drain, request_and_maybe_drain_delay_error, try_drain_after_termination,
    try_drain_after_termination_delay_error,
};
use backflow_core::mutex::Mutex;
use backflow_core::{
    CancellationToken, DemandRegister, FlowError, PendingFailure, Publisher, Subscriber,
    Subscription, UNBOUNDED,
};
use crossbeam_queue::ArrayQueue;
use std::sync::{Arc, Weak};

/// Extension trait providing the `take_last` operators for every publisher.
pub trait TakeLastExt<T>: Publisher<T> + Sized {
    /// Emit only the last `n` items, failing fast on upstream failure.
    fn take_last(self, n: usize) -> TakeLast<Self> {
        TakeLast {
            upstream: self,
            count: n,
            delay_error: false,
        }
    }

    /// Emit only the last `n` items, delivering an upstream failure after them.
    fn take_last_delay_error(self, n: usize) -> TakeLast<Self> {
        TakeLast {
            upstream: self,
            count: n,
            delay_error: true,
        }
    }
}

impl<T, P> TakeLastExt<T> for P where P: Publisher<T> {}

/// Publisher returned by [`TakeLastExt::take_last`] and
/// [`TakeLastExt::take_last_delay_error`].
pub struct TakeLast<P> {
    upstream: P,
    count: usize,
    delay_error: bool,
}

impl<T, P> Publisher<T> for TakeLast<P>
where
    T: Send + 'static,
    P: Publisher<T>,
{
    fn subscribe(&self, subscriber: Arc<dyn Subscriber<T>>) {
        let window = TakeLastSubscriber::new(subscriber, self.count, self.delay_error);
        self.upstream.subscribe(window);
    }
}

struct TakeLastSubscriber<T> {
    downstream: Arc<dyn Subscriber<T>>,
    window: ArrayQueue<T>,
    count: usize,
    delay_error: bool,
    register: DemandRegister,
    failure: PendingFailure,
    cancelled: CancellationToken,
    upstream: Mutex<Option<Arc<dyn Subscription>>>,
    me: Weak<Self>,
}

impl<T> TakeLastSubscriber<T>
where
    T: Send + 'static,
{
    fn new(downstream: Arc<dyn Subscriber<T>>, count: usize, delay_error: bool) -> Arc<Self> {
        Arc::new_cyclic(|me| Self {
            downstream,
            // ArrayQueue rejects a zero capacity; with `count == 0` nothing is ever pushed.
            window: ArrayQueue::new(count.max(1)),
            count,
            delay_error,
            register: DemandRegister::new(),
            failure: PendingFailure::new(),
            cancelled: CancellationToken::new(),
            upstream: Mutex::new(None),
            me: me.clone(),
        })
    }

    fn discard_window(&self) {
        while self.window.pop().is_some() {}
    }
}

impl<T> Subscriber<T> for TakeLastSubscriber<T>
where
    T: Send + 'static,
{
    fn on_subscribe(&self, subscription: Arc<dyn Subscription>) {
        *self.upstream.lock() = Some(subscription.clone());
        if let Some(me) = self.me.upgrade() {
            self.downstream.on_subscribe(me);
        }
        subscription.request(UNBOUNDED);
    }

    fn on_next(&self, item: T) {
        if self.count > 0 {
            let _evicted = self.window.force_push(item);
        }
    }

    fn on_error(&self, error: FlowError) {
        let is_cancelled = || self.cancelled.is_cancelled();
        if self.delay_error {
            log_trace!("take_last holding failure behind {} items", self.window.len());
            if self.failure.set(error).is_err() {
                return;
            }
            try_drain_after_termination_delay_error(
                &*self.downstream,
                &self.window,
                &self.register,
                is_cancelled,
                &self.failure,
            );
        } else {
            self.discard_window();
            if !is_cancelled() {
                self.downstream.on_error(error);
            }
        }
    }

    fn on_complete(&self) {
        log_trace!("take_last replaying {} items", self.window.len());
        try_drain_after_termination(&*self.downstream, &self.window, &self.register, || {
            self.cancelled.is_cancelled()
        });
    }
}

impl<T> Subscription for TakeLastSubscriber<T>
where
    T: Send + 'static,
{
    fn request(&self, n: u64) {
        let is_cancelled = || self.cancelled.is_cancelled();
        // Upstream already has unbounded demand, so a request is never forwarded.
        if self.delay_error {
            request_and_maybe_drain_delay_error(
                n,
                &*self.downstream,
                &self.window,
                &self.register,
                is_cancelled,
                &self.failure,
            );
        } else {
            request_and_maybe_drain(n, &*self.downstream, &self.window, &self.register, is_cancelled);
        }
    }

    fn cancel(&self) {
        if self.cancelled.cancel() {
            let upstream = self.upstream.lock().take();
            if let Some(upstream) = upstream {
                upstream.cancel();
            }
        }
    }
}
