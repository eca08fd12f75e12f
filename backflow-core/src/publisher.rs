// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use crate::Subscriber;
use std::sync::Arc;

/// Source side of the demand-driven protocol.
///
/// Every call to `subscribe` starts an independent stream for the given subscriber,
/// beginning with `on_subscribe`.
pub trait Publisher<T>: Send + Sync {
    /// Attach `subscriber` and start signalling to it.
    fn subscribe(&self, subscriber: Arc<dyn Subscriber<T>>);
}

impl<T, P> Publisher<T> for Arc<P>
where
    P: Publisher<T> + ?Sized,
{
    fn subscribe(&self, subscriber: Arc<dyn Subscriber<T>>) {
        (**self).subscribe(subscriber);
    }
}

/// Type-erased, shareable publisher.
pub type SharedPublisher<T> = Arc<dyn Publisher<T>>;
