// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use backflow_core::FlowError;

/// One signal observed by a [`TestSubscriber`](crate::TestSubscriber), in arrival order.
#[derive(Debug, Clone)]
pub enum Signal<T> {
    /// `on_subscribe` was called
    Subscribe,
    /// `on_next(item)` was called
    Next(T),
    /// `on_error(error)` was called
    Error(FlowError),
    /// `on_complete()` was called
    Complete,
}

impl<T> Signal<T> {
    /// Returns `true` for `Error` and `Complete`.
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Signal::Error(_) | Signal::Complete)
    }
}

// Errors compare by their rendered message, which is what assertions care about.
impl<T: PartialEq> PartialEq for Signal<T> {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Signal::Subscribe, Signal::Subscribe) | (Signal::Complete, Signal::Complete) => true,
            (Signal::Next(a), Signal::Next(b)) => a == b,
            (Signal::Error(a), Signal::Error(b)) => a.to_string() == b.to_string(),
            _ => false,
        }
    }
}
