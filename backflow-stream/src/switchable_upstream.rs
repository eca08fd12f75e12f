// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! A subscription whose upstream can be replaced mid-stream.
//!
//! Operators that move a downstream subscriber from one producer to another (failure
//! recovery, concatenation) hand the downstream a single [`SwitchableUpstream`] and keep
//! rebinding it. Demand that was requested but not yet delivered is carried over to the
//! new producer, so the downstream never has to request again after a switch.

use crate::logging::log_trace;
use backflow_core::demand::{add_cap, produced};
use backflow_core::mutex::Mutex;
use backflow_core::{FlowError, Subscriber, Subscription};
use std::sync::Arc;

struct SwitchState {
    current: Option<Arc<dyn Subscription>>,
    requested: u64,
    cancelled: bool,
}

/// The downstream-facing side of an operator that can switch producers.
///
/// The lock only guards the slot and the counters; upstream `request`/`cancel` calls and
/// downstream signals are always made after it is released.
pub struct SwitchableUpstream<T> {
    downstream: Arc<dyn Subscriber<T>>,
    state: Mutex<SwitchState>,
}

impl<T> SwitchableUpstream<T> {
    /// Wrap `downstream`. No upstream is bound yet; demand requested before the first
    /// [`set_or_switch_upstream`](Self::set_or_switch_upstream) is held and issued on binding.
    pub fn new(downstream: Arc<dyn Subscriber<T>>) -> Arc<Self> {
        Arc::new(Self {
            downstream,
            state: Mutex::new(SwitchState {
                current: None,
                requested: 0,
                cancelled: false,
            }),
        })
    }

    /// Bind `upstream`, replacing the previous one.
    ///
    /// Outstanding demand is re-requested from `upstream`. If the downstream already
    /// cancelled, `upstream` is cancelled right away instead.
    pub fn set_or_switch_upstream(&self, upstream: Arc<dyn Subscription>) {
        let outstanding = {
            let mut state = self.state.lock();
            if state.cancelled {
                None
            } else {
                state.current = Some(upstream.clone());
                Some(state.requested)
            }
        };

        match outstanding {
            None => upstream.cancel(),
            Some(0) => {}
            Some(n) => {
                log_trace!("switched upstream, carrying over demand {}", n);
                upstream.request(n);
            }
        }
    }

    /// Account for `count` items delivered by the current upstream.
    pub fn emitted(&self, count: u64) {
        let mut state = self.state.lock();
        state.requested = produced(state.requested, count);
    }

    /// Demand requested by the downstream and not yet delivered.
    pub fn outstanding(&self) -> u64 {
        self.state.lock().requested
    }

    /// Returns `true` once the downstream cancelled.
    pub fn is_cancelled(&self) -> bool {
        self.state.lock().cancelled
    }

    /// The wrapped downstream subscriber.
    pub fn downstream(&self) -> &Arc<dyn Subscriber<T>> {
        &self.downstream
    }

    /// Pass an item from the current upstream to the downstream.
    pub fn forward_next(&self, item: T) {
        self.downstream.on_next(item);
    }

    /// Deliver a terminal failure downstream.
    pub fn forward_error(&self, error: FlowError) {
        self.downstream.on_error(error);
    }

    /// Deliver completion downstream.
    pub fn forward_complete(&self) {
        self.downstream.on_complete();
    }
}

impl<T> Subscription for SwitchableUpstream<T> {
    fn request(&self, n: u64) {
        if n == 0 {
            return;
        }
        let current = {
            let mut state = self.state.lock();
            if state.cancelled {
                return;
            }
            state.requested = add_cap(state.requested, n);
            state.current.clone()
        };
        if let Some(upstream) = current {
            upstream.request(n);
        }
    }

    fn cancel(&self) {
        let current = {
            let mut state = self.state.lock();
            if state.cancelled {
                return;
            }
            state.cancelled = true;
            state.current.take()
        };
        if let Some(upstream) = current {
            upstream.cancel();
        }
    }
}
