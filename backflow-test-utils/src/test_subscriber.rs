// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use crate::Signal;
use backflow_core::mutex::Mutex;
use backflow_core::{FlowError, Subscriber, Subscription};
use std::sync::Arc;

/// A subscriber that records every signal it receives.
///
/// Demand is driven from the test through [`TestSubscriber::request`]; an optional
/// initial request is issued from `on_subscribe`.
///
/// # Example
///
/// ```rust
/// use backflow_core::Subscriber;
/// use backflow_test_utils::{Signal, TestSubscriber};
///
/// let subscriber = TestSubscriber::<i32>::new();
/// subscriber.on_next(1);
/// subscriber.on_complete();
///
/// assert_eq!(subscriber.signals(), vec![Signal::Next(1), Signal::Complete]);
/// ```
pub struct TestSubscriber<T> {
    signals: Mutex<Vec<Signal<T>>>,
    subscription: Mutex<Option<Arc<dyn Subscription>>>,
    initial_request: u64,
}

impl<T: Clone + Send + 'static> TestSubscriber<T> {
    /// A subscriber that requests nothing on its own.
    pub fn new() -> Arc<Self> {
        Self::with_initial_request(0)
    }

    /// A subscriber that requests `n` as soon as it is subscribed.
    pub fn with_initial_request(n: u64) -> Arc<Self> {
        Arc::new(Self {
            signals: Mutex::new(Vec::new()),
            subscription: Mutex::new(None),
            initial_request: n,
        })
    }

    /// Request `n` more items through the received subscription.
    ///
    /// # Panics
    ///
    /// Panics if `on_subscribe` has not been called yet.
    pub fn request(&self, n: u64) {
        self.current_subscription().request(n);
    }

    /// Cancel the received subscription.
    ///
    /// # Panics
    ///
    /// Panics if `on_subscribe` has not been called yet.
    pub fn cancel(&self) {
        self.current_subscription().cancel();
    }

    /// Every signal received so far.
    pub fn signals(&self) -> Vec<Signal<T>> {
        self.signals.lock().clone()
    }

    /// The items received so far.
    pub fn values(&self) -> Vec<T> {
        self.signals
            .lock()
            .iter()
            .filter_map(|signal| match signal {
                Signal::Next(v) => Some(v.clone()),
                _ => None,
            })
            .collect()
    }

    /// The terminal failure, if one was received.
    pub fn error(&self) -> Option<FlowError> {
        self.signals.lock().iter().find_map(|signal| match signal {
            Signal::Error(e) => Some(e.clone()),
            _ => None,
        })
    }

    /// Returns `true` if `on_complete` was received.
    pub fn is_completed(&self) -> bool {
        self.signals
            .lock()
            .iter()
            .any(|signal| matches!(signal, Signal::Complete))
    }

    /// Number of terminal signals received. Anything other than 0 or 1 is a bug.
    pub fn terminal_count(&self) -> usize {
        self.signals
            .lock()
            .iter()
            .filter(|signal| signal.is_terminal())
            .count()
    }

    /// Number of `on_subscribe` calls received.
    pub fn subscribe_count(&self) -> usize {
        self.signals
            .lock()
            .iter()
            .filter(|signal| matches!(signal, Signal::Subscribe))
            .count()
    }

    /// Asserts the protocol shape: one subscribe first, at most one terminal, nothing after it.
    ///
    /// # Panics
    ///
    /// Panics describing the first violation found.
    pub fn assert_well_formed(&self) {
        let signals = self.signals.lock();
        assert!(
            matches!(signals.first(), Some(Signal::Subscribe)),
            "first signal must be on_subscribe"
        );
        assert_eq!(
            signals
                .iter()
                .filter(|s| matches!(s, Signal::Subscribe))
                .count(),
            1,
            "on_subscribe must be delivered exactly once"
        );
        if let Some(position) = signals.iter().position(Signal::is_terminal) {
            assert_eq!(
                position,
                signals.len() - 1,
                "no signal may follow a terminal signal"
            );
        }
    }

    fn current_subscription(&self) -> Arc<dyn Subscription> {
        self.subscription
            .lock()
            .clone()
            .expect("TestSubscriber has not been subscribed")
    }

    fn record(&self, signal: Signal<T>) {
        self.signals.lock().push(signal);
    }
}

impl<T: Clone + Send + 'static> Subscriber<T> for TestSubscriber<T> {
    fn on_subscribe(&self, subscription: Arc<dyn Subscription>) {
        *self.subscription.lock() = Some(subscription.clone());
        self.record(Signal::Subscribe);
        if self.initial_request > 0 {
            subscription.request(self.initial_request);
        }
    }

    fn on_next(&self, item: T) {
        self.record(Signal::Next(item));
    }

    fn on_error(&self, error: FlowError) {
        self.record(Signal::Error(error));
    }

    fn on_complete(&self) {
        self.record(Signal::Complete);
    }
}
