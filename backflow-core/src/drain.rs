// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Post-termination drain engine.
//!
//! Operators that buffer items until their upstream terminates (for example
//! `take_last`) hand the buffer to this engine. Items are replayed to the downstream
//! subscriber exactly as fast as it requests them, and the terminal signal is held back
//! until the buffer is empty. Everything is coordinated through the packed
//! [`DemandRegister`]: no locks, no blocking, and at most one drain pass makes progress
//! at a time.
//!
//! The protocol has two entry points per variant:
//!
//! - the subscription's `request(n)` calls [`request_and_maybe_drain`];
//! - the subscriber's terminal signal calls [`try_drain_after_termination`].
//!
//! The delay-error variant ([`request_and_maybe_drain_delay_error`],
//! [`try_drain_after_termination_delay_error`]) delivers a stored failure instead of
//! completion once the buffer is exhausted.
//!
//! # Example
//!
//! ```
//! use backflow_core::drain::{request_and_maybe_drain, try_drain_after_termination};
//! use backflow_core::{DemandRegister, DrainQueue};
//! use backflow_test_utils::{Signal, TestSubscriber};
//! use crossbeam_queue::SegQueue;
//!
//! let downstream = TestSubscriber::<i32>::new();
//! let queue = SegQueue::new();
//! let register = DemandRegister::new();
//!
//! for item in [1, 2, 3] {
//!     let _ = queue.offer(item);
//! }
//! try_drain_after_termination(&*downstream, &queue, &register, || false);
//! assert!(downstream.values().is_empty());
//!
//! assert!(request_and_maybe_drain(3, &*downstream, &queue, &register, || false));
//! assert_eq!(downstream.values(), vec![1, 2, 3]);
//! assert!(matches!(downstream.signals().last(), Some(Signal::Complete)));
//! ```

use crate::demand_register::{DEMAND_MASK, TERMINAL_MASK};
use crate::logging::log_trace;
use crate::{DemandRegister, DrainQueue, PendingFailure, Subscriber};

/// What the engine signals once the buffer is exhausted.
#[derive(Clone, Copy)]
enum Termination<'a> {
    Complete,
    /// Read at signal time: the producer stores it before publishing termination.
    DelayedFailure(&'a PendingFailure),
}

impl Termination<'_> {
    fn signal<T, S>(self, downstream: &S)
    where
        S: Subscriber<T> + ?Sized,
    {
        match self {
            Self::DelayedFailure(pending) => match pending.get() {
                Some(error) => downstream.on_error(error.clone()),
                None => downstream.on_complete(),
            },
            Self::Complete => downstream.on_complete(),
        }
    }
}

/// Account `n` more items of demand and drain if the producer already terminated.
///
/// Returns `true` when the register was terminal with no outstanding demand: this call
/// performed the drain itself and the caller must not forward the request upstream.
/// Returns `false` while the producer is still running, or when another drain pass is
/// already in progress and will pick the new demand up; the caller then requests from
/// upstream as usual.
pub fn request_and_maybe_drain<T, S, Q, C>(
    n: u64,
    downstream: &S,
    queue: &Q,
    register: &DemandRegister,
    is_cancelled: C,
) -> bool
where
    S: Subscriber<T> + ?Sized,
    Q: DrainQueue<T> + ?Sized,
    C: Fn() -> bool,
{
    request_with(
        n,
        downstream,
        queue,
        register,
        &is_cancelled,
        Termination::Complete,
    )
}

/// Start draining after the producer completed.
///
/// Must be called at most once, from the producer's completion signal. An empty buffer
/// completes the downstream right away. Otherwise the buffer is drained against the
/// current demand and, if items remain, the register is flagged terminal so that later
/// `request` calls resume the drain.
pub fn try_drain_after_termination<T, S, Q, C>(
    downstream: &S,
    queue: &Q,
    register: &DemandRegister,
    is_cancelled: C,
) where
    S: Subscriber<T> + ?Sized,
    Q: DrainQueue<T> + ?Sized,
    C: Fn() -> bool,
{
    terminate_with(
        downstream,
        queue,
        register,
        &is_cancelled,
        Termination::Complete,
    );
}

/// Delay-error counterpart of [`request_and_maybe_drain`].
///
/// `failure` is the slot the producer's `on_error` fills. It is consulted only when the
/// buffer runs dry, so an empty slot at that point means the producer completed.
pub fn request_and_maybe_drain_delay_error<T, S, Q, C>(
    n: u64,
    downstream: &S,
    queue: &Q,
    register: &DemandRegister,
    is_cancelled: C,
    failure: &PendingFailure,
) -> bool
where
    S: Subscriber<T> + ?Sized,
    Q: DrainQueue<T> + ?Sized,
    C: Fn() -> bool,
{
    request_with(
        n,
        downstream,
        queue,
        register,
        &is_cancelled,
        Termination::DelayedFailure(failure),
    )
}

/// Delay-error counterpart of [`try_drain_after_termination`].
///
/// Every buffered item is delivered before the stored failure (or completion when the
/// slot is empty). The failure must be stored before this call so that drains started by
/// concurrent `request` calls observe it.
pub fn try_drain_after_termination_delay_error<T, S, Q, C>(
    downstream: &S,
    queue: &Q,
    register: &DemandRegister,
    is_cancelled: C,
    failure: &PendingFailure,
) where
    S: Subscriber<T> + ?Sized,
    Q: DrainQueue<T> + ?Sized,
    C: Fn() -> bool,
{
    terminate_with(
        downstream,
        queue,
        register,
        &is_cancelled,
        Termination::DelayedFailure(failure),
    );
}

fn request_with<T, S, Q, C>(
    n: u64,
    downstream: &S,
    queue: &Q,
    register: &DemandRegister,
    is_cancelled: &C,
    termination: Termination<'_>,
) -> bool
where
    S: Subscriber<T> + ?Sized,
    Q: DrainQueue<T> + ?Sized,
    C: Fn() -> bool,
{
    let previous = register.add(n);

    if previous != TERMINAL_MASK {
        // (active, r) -> (active, r + n), or a drain pass is already running.
        return false;
    }

    // (terminal, 0) -> (terminal, n): nobody is draining, so this caller replays.
    if n != 0 {
        log_trace!("request({}) resumed a terminated drain", n);
        drain_pass(
            n | TERMINAL_MASK,
            downstream,
            queue,
            register,
            is_cancelled,
            termination,
        );
    }
    true
}

fn terminate_with<T, S, Q, C>(
    downstream: &S,
    queue: &Q,
    register: &DemandRegister,
    is_cancelled: &C,
    termination: Termination<'_>,
) where
    S: Subscriber<T> + ?Sized,
    Q: DrainQueue<T> + ?Sized,
    C: Fn() -> bool,
{
    if queue.is_empty() {
        termination.signal(downstream);
        return;
    }

    if drain_pass(
        register.bits(),
        downstream,
        queue,
        register,
        is_cancelled,
        termination,
    ) {
        return;
    }

    // (active, r) -> (terminal, r)
    if let Some(previous) = register.mark_terminal() {
        log_trace!(
            "drain marked terminal with {} outstanding",
            previous & DEMAND_MASK
        );
        if previous != 0 {
            drain_pass(
                previous | TERMINAL_MASK,
                downstream,
                queue,
                register,
                is_cancelled,
                termination,
            );
        }
    }
}

/// Deliver buffered items against the demand word `n`.
///
/// `emitted` carries the terminal bit of `n` so the two can be compared as whole words.
/// Returns `true` when the buffer was fully drained (the terminal signal has been sent)
/// or the drain was cancelled, `false` when demand ran out with items still buffered.
fn drain_pass<T, S, Q, C>(
    mut n: u64,
    downstream: &S,
    queue: &Q,
    register: &DemandRegister,
    is_cancelled: &C,
    termination: Termination<'_>,
) -> bool
where
    S: Subscriber<T> + ?Sized,
    Q: DrainQueue<T> + ?Sized,
    C: Fn() -> bool,
{
    let mut emitted = n & TERMINAL_MASK;

    loop {
        while emitted != n {
            if is_cancelled() {
                log_trace!("drain cancelled after {} items", emitted & DEMAND_MASK);
                return true;
            }

            match queue.poll() {
                Some(item) => {
                    downstream.on_next(item);
                    emitted += 1;
                }
                None => {
                    termination.signal(downstream);
                    return true;
                }
            }
        }

        if is_cancelled() {
            log_trace!("drain cancelled after {} items", emitted & DEMAND_MASK);
            return true;
        }

        if queue.is_empty() {
            termination.signal(downstream);
            return true;
        }

        n = register.bits();

        if n == emitted {
            n = register.settle(emitted & DEMAND_MASK);

            if n & DEMAND_MASK == 0 {
                return false;
            }

            emitted = n & TERMINAL_MASK;
        }
    }
}
