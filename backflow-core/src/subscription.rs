// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

/// Handle given to a subscriber to express demand and to cancel.
///
/// Both methods may be called from any thread, concurrently with signals flowing
/// downstream. `request(n)` expects `n > 0`; a zero request is accounted as a no-op.
/// `cancel()` is observed asynchronously: a few signals may still arrive after it returns,
/// but no terminal signal will be delivered once the producer has noticed it.
pub trait Subscription: Send + Sync {
    /// Declare willingness to receive up to `n` additional items.
    fn request(&self, n: u64);

    /// Ask the producer to stop emitting and release resources.
    fn cancel(&self);
}

/// A subscription that ignores requests and cancellation.
///
/// Handed to subscribers by producers that terminate without emitting (`empty`, `fail`).
#[derive(Debug, Default, Clone, Copy)]
pub struct EmptySubscription;

impl Subscription for EmptySubscription {
    fn request(&self, _n: u64) {}

    fn cancel(&self) {}
}
