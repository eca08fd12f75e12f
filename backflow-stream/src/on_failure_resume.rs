// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Switch to a fallback publisher when the upstream fails.
//!
//! On the first upstream failure the recovery function is called with that failure and the
//! downstream is moved onto the publisher it returns, keeping its subscription and its
//! outstanding demand. Recovery happens at most once: a failure of the fallback is passed
//! downstream unchanged.
//!
//! When recovery itself fails (it returns an error, returns no publisher, or panics) the
//! downstream receives a [`FlowError::Composite`] holding the upstream failure first and the
//! recovery failure second.
//!
//! # Example
//!
//! ```
//! use backflow_core::{FlowError, Publisher, SharedPublisher};
//! use backflow_stream::sources::{fail, from_iter};
//! use backflow_stream::OnFailureResumeExt;
//! use backflow_test_utils::{Signal, TestSubscriber};
//! use std::sync::Arc;
//!
//! let resumed = fail::<i32>(FlowError::stream_error("connection reset"))
//!     .on_failure_resume(|_failure| {
//!         let fallback: SharedPublisher<i32> = Arc::new(from_iter(vec![9]));
//!         Ok(Some(fallback))
//!     });
//!
//! let subscriber = TestSubscriber::<i32>::with_initial_request(1);
//! resumed.subscribe(subscriber.clone());
//!
//! assert_eq!(
//!     subscriber.signals(),
//!     vec![Signal::Subscribe, Signal::Next(9), Signal::Complete]
//! );
//! ```

use crate::logging::{log_debug, log_warn};
use crate::switchable_upstream::SwitchableUpstream;
use backflow_core::{FlowError, Publisher, Result, SharedPublisher, Subscriber, Subscription};
use std::any::Any;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};

/// Extension trait providing [`on_failure_resume`](OnFailureResumeExt::on_failure_resume)
/// for every publisher.
pub trait OnFailureResumeExt<T>: Publisher<T> + Sized {
    /// Resume with the publisher `recover` returns for the upstream failure.
    ///
    /// `recover` runs at most once per subscription. Returning `Ok(None)` is a protocol
    /// violation and is reported like a recovery error.
    fn on_failure_resume<F>(self, recover: F) -> OnFailureResume<Self, F>
    where
        F: Fn(&FlowError) -> Result<Option<SharedPublisher<T>>> + Send + Sync + 'static;
}

impl<T, P> OnFailureResumeExt<T> for P
where
    P: Publisher<T>,
{
    fn on_failure_resume<F>(self, recover: F) -> OnFailureResume<Self, F>
    where
        F: Fn(&FlowError) -> Result<Option<SharedPublisher<T>>> + Send + Sync + 'static,
    {
        OnFailureResume {
            upstream: self,
            recover: Arc::new(recover),
        }
    }
}

/// Publisher returned by [`OnFailureResumeExt::on_failure_resume`].
pub struct OnFailureResume<P, F> {
    upstream: P,
    recover: Arc<F>,
}

impl<T, P, F> Publisher<T> for OnFailureResume<P, F>
where
    T: Send + 'static,
    P: Publisher<T>,
    F: Fn(&FlowError) -> Result<Option<SharedPublisher<T>>> + Send + Sync + 'static,
{
    fn subscribe(&self, subscriber: Arc<dyn Subscriber<T>>) {
        let resume = ResumeSubscriber::new(subscriber, self.recover.clone());
        self.upstream.subscribe(resume);
    }
}

/// Whether the subscriber still listens to its original upstream.
///
/// The only transition is `Primary -> Resumed`, made once, from the failure signal.
#[derive(Debug, Default)]
struct ResumePhase {
    resumed: AtomicBool,
}

impl ResumePhase {
    fn is_resumed(&self) -> bool {
        self.resumed.load(Ordering::Acquire)
    }

    /// Move to `Resumed`. Returns `true` for the call that made the transition.
    fn resume(&self) -> bool {
        !self.resumed.swap(true, Ordering::AcqRel)
    }
}

struct ResumeSubscriber<T, F> {
    upstream: Arc<SwitchableUpstream<T>>,
    recover: Arc<F>,
    phase: ResumePhase,
    me: Weak<Self>,
}

impl<T, F> ResumeSubscriber<T, F>
where
    T: Send + 'static,
    F: Fn(&FlowError) -> Result<Option<SharedPublisher<T>>> + Send + Sync + 'static,
{
    fn new(downstream: Arc<dyn Subscriber<T>>, recover: Arc<F>) -> Arc<Self> {
        Arc::new_cyclic(|me| Self {
            upstream: SwitchableUpstream::new(downstream),
            recover,
            phase: ResumePhase::default(),
            me: me.clone(),
        })
    }

    /// Run the recovery function, turning every way it can fail into an error.
    fn fallback_for(&self, failure: &FlowError) -> Result<SharedPublisher<T>> {
        match catch_unwind(AssertUnwindSafe(|| (self.recover)(failure))) {
            Ok(Ok(Some(publisher))) => Ok(publisher),
            Ok(Ok(None)) => Err(FlowError::protocol_violation(
                "recovery function produced no publisher",
            )),
            Ok(Err(error)) => Err(error),
            Err(payload) => Err(FlowError::callback_panic(panic_message(payload.as_ref()))),
        }
    }
}

impl<T, F> Subscriber<T> for ResumeSubscriber<T, F>
where
    T: Send + 'static,
    F: Fn(&FlowError) -> Result<Option<SharedPublisher<T>>> + Send + Sync + 'static,
{
    fn on_subscribe(&self, subscription: Arc<dyn Subscription>) {
        if !self.phase.is_resumed() {
            let handle: Arc<dyn Subscription> = self.upstream.clone();
            self.upstream.downstream().on_subscribe(handle);
        }
        self.upstream.set_or_switch_upstream(subscription);
    }

    fn on_next(&self, item: T) {
        self.upstream.forward_next(item);
        if !self.phase.is_resumed() {
            self.upstream.emitted(1);
        }
    }

    fn on_error(&self, failure: FlowError) {
        if !self.phase.resume() {
            self.upstream.forward_error(failure);
            return;
        }

        log_debug!("upstream failed, attempting recovery: {}", failure);
        match self.fallback_for(&failure) {
            Ok(publisher) => {
                if let Some(me) = self.me.upgrade() {
                    publisher.subscribe(me);
                }
            }
            Err(recovery_error) => {
                log_warn!("recovery failed: {}", recovery_error);
                self.upstream
                    .forward_error(FlowError::composite(failure, recovery_error));
            }
        }
    }

    fn on_complete(&self) {
        self.upstream.forward_complete();
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        format!("recovery function panicked: {message}")
    } else if let Some(message) = payload.downcast_ref::<String>() {
        format!("recovery function panicked: {message}")
    } else {
        "recovery function panicked".to_string()
    }
}
