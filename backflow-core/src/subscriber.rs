// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use crate::Subscription;
use backflow_error::FlowError;
use std::sync::Arc;

/// Receiver side of the demand-driven protocol.
///
/// A subscriber observes exactly one `on_subscribe` first, then zero or more `on_next`
/// calls, then at most one terminal signal (`on_complete` or `on_error`). Signals for a
/// single subscription are never delivered concurrently with each other, but they may
/// arrive on different threads over time, so every method takes `&self` and
/// implementations keep their state behind atomics or a short mutex.
pub trait Subscriber<T>: Send + Sync {
    /// The producer accepted the subscription; `subscription` is used to request items.
    fn on_subscribe(&self, subscription: Arc<dyn Subscription>);

    /// One item, delivered only against previously requested demand.
    fn on_next(&self, item: T);

    /// Terminal failure. No further signals follow.
    fn on_error(&self, error: FlowError);

    /// Terminal success. No further signals follow.
    fn on_complete(&self);
}
