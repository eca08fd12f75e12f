// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use backflow_core::demand::add_cap;
use backflow_core::mutex::Mutex;
use backflow_core::{FlowError, Publisher, Subscriber, Subscription};
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;

/// A publisher driven by hand from the test.
///
/// It records the demand it receives and whether it was cancelled, and emits exactly
/// what the test tells it to, whether or not that demand exists. This makes it useful
/// both as a well-behaved upstream and as a misbehaving one.
///
/// # Example
///
/// ```rust
/// use backflow_core::Publisher;
/// use backflow_test_utils::{TestPublisher, TestSubscriber};
///
/// let publisher = TestPublisher::<i32>::new();
/// let subscriber = TestSubscriber::<i32>::with_initial_request(2);
/// publisher.subscribe(subscriber.clone());
///
/// assert_eq!(publisher.requested(), 2);
/// publisher.next(7);
/// publisher.complete();
/// assert_eq!(subscriber.values(), vec![7]);
/// assert!(subscriber.is_completed());
/// ```
pub struct TestPublisher<T> {
    subscriber: Mutex<Option<Arc<dyn Subscriber<T>>>>,
    subscription: Arc<RecordingSubscription>,
    subscribe_count: AtomicUsize,
}

/// Subscription handed out by [`TestPublisher`].
#[derive(Debug, Default)]
pub struct RecordingSubscription {
    requested: AtomicU64,
    request_calls: AtomicUsize,
    cancelled: AtomicBool,
}

impl RecordingSubscription {
    /// Total demand received, saturating at `UNBOUNDED`.
    pub fn requested(&self) -> u64 {
        self.requested.load(Ordering::Acquire)
    }

    /// Number of `request` calls received.
    pub fn request_calls(&self) -> usize {
        self.request_calls.load(Ordering::Acquire)
    }

    /// Returns `true` once `cancel` was called.
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }
}

impl Subscription for RecordingSubscription {
    fn request(&self, n: u64) {
        self.request_calls.fetch_add(1, Ordering::AcqRel);
        let mut current = self.requested.load(Ordering::Acquire);
        loop {
            match self.requested.compare_exchange(
                current,
                add_cap(current, n),
                Ordering::AcqRel,
                Ordering::Acquire,
            ) {
                Ok(_) => return,
                Err(observed) => current = observed,
            }
        }
    }

    fn cancel(&self) {
        self.cancelled.store(true, Ordering::Release);
    }
}

impl<T: Send + 'static> TestPublisher<T> {
    /// A publisher with no subscriber yet.
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            subscriber: Mutex::new(None),
            subscription: Arc::new(RecordingSubscription::default()),
            subscribe_count: AtomicUsize::new(0),
        })
    }

    /// Emit one item to the current subscriber.
    ///
    /// # Panics
    ///
    /// Panics if nobody subscribed yet.
    pub fn next(&self, item: T) {
        self.current().on_next(item);
    }

    /// Emit every item of `items`, in order.
    pub fn emit_all(&self, items: impl IntoIterator<Item = T>) {
        let subscriber = self.current();
        for item in items {
            subscriber.on_next(item);
        }
    }

    /// Signal completion to the current subscriber.
    pub fn complete(&self) {
        self.current().on_complete();
    }

    /// Signal failure to the current subscriber.
    pub fn error(&self, error: FlowError) {
        self.current().on_error(error);
    }

    /// Total demand received from the subscriber.
    pub fn requested(&self) -> u64 {
        self.subscription.requested()
    }

    /// Returns `true` once the subscriber cancelled.
    pub fn is_cancelled(&self) -> bool {
        self.subscription.is_cancelled()
    }

    /// The subscription handed to subscribers.
    pub fn subscription(&self) -> &Arc<RecordingSubscription> {
        &self.subscription
    }

    /// How many times `subscribe` was called.
    pub fn subscribe_count(&self) -> usize {
        self.subscribe_count.load(Ordering::Acquire)
    }

    fn current(&self) -> Arc<dyn Subscriber<T>> {
        self.subscriber
            .lock()
            .clone()
            .expect("TestPublisher has no subscriber")
    }
}

impl<T: Send + 'static> Publisher<T> for TestPublisher<T> {
    fn subscribe(&self, subscriber: Arc<dyn Subscriber<T>>) {
        self.subscribe_count.fetch_add(1, Ordering::AcqRel);
        *self.subscriber.lock() = Some(subscriber.clone());
        subscriber.on_subscribe(self.subscription.clone());
    }
}
