// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Delivery order, demand conservation and single-terminal properties of the drain engine
//! over random buffers and random splits of the requested amount.

use backflow_core::drain::{
    request_and_maybe_drain, request_and_maybe_drain_delay_error, try_drain_after_termination,
    try_drain_after_termination_delay_error,
};
use backflow_core::{DemandRegister, DrainQueue, PendingFailure};
use backflow_test_utils::{test_error, Signal, TestSubscriber};
use crossbeam_queue::SegQueue;
use proptest::prelude::*;

fn not_cancelled() -> bool {
    false
}

fn arb_items() -> impl Strategy<Value = Vec<u16>> {
    proptest::collection::vec(any::<u16>(), 0..40)
}

fn arb_requests() -> impl Strategy<Value = Vec<u64>> {
    proptest::collection::vec(0u64..6, 0..30)
}

proptest! {
    #[test]
    fn drain_preserves_order_and_respects_demand(
        items in arb_items(),
        before in arb_requests(),
        after in arb_requests(),
    ) {
        let downstream = TestSubscriber::<u16>::new();
        let queue = SegQueue::new();
        let register = DemandRegister::new();
        for &item in &items {
            let _ = queue.offer(item);
        }

        let mut requested: u64 = 0;
        for &n in &before {
            requested += n;
            request_and_maybe_drain(n, &*downstream, &queue, &register, not_cancelled);
            prop_assert!(downstream.values().is_empty());
        }

        try_drain_after_termination(&*downstream, &queue, &register, not_cancelled);
        prop_assert!(downstream.values().len() as u64 <= requested);

        for &n in &after {
            requested += n;
            request_and_maybe_drain(n, &*downstream, &queue, &register, not_cancelled);
            prop_assert!(downstream.values().len() as u64 <= requested);
        }

        let delivered = downstream.values();
        let expected_len = items.len().min(requested as usize);
        prop_assert_eq!(&delivered[..], &items[..expected_len]);

        if requested as usize >= items.len() {
            prop_assert_eq!(downstream.terminal_count(), 1);
            let signals = downstream.signals();
            prop_assert_eq!(signals.last(), Some(&Signal::Complete));
        } else {
            prop_assert_eq!(downstream.terminal_count(), 0);
        }
    }

    #[test]
    fn delay_error_delivers_failure_after_last_item(
        items in arb_items(),
        before in arb_requests(),
        after in arb_requests(),
    ) {
        let downstream = TestSubscriber::<u16>::new();
        let queue = SegQueue::new();
        let register = DemandRegister::new();
        let failure = PendingFailure::new();
        for &item in &items {
            let _ = queue.offer(item);
        }

        let mut requested: u64 = 0;
        for &n in &before {
            requested += n;
            request_and_maybe_drain_delay_error(
                n, &*downstream, &queue, &register, not_cancelled, &failure,
            );
        }

        failure.set(test_error("upstream failed")).unwrap();
        try_drain_after_termination_delay_error(
            &*downstream, &queue, &register, not_cancelled, &failure,
        );

        for &n in &after {
            requested += n;
            request_and_maybe_drain_delay_error(
                n, &*downstream, &queue, &register, not_cancelled, &failure,
            );
            prop_assert!(downstream.values().len() as u64 <= requested);
        }

        let expected_len = items.len().min(requested as usize);
        prop_assert_eq!(&downstream.values()[..], &items[..expected_len]);

        if requested as usize >= items.len() {
            let signals = downstream.signals();
            prop_assert_eq!(downstream.terminal_count(), 1);
            prop_assert_eq!(signals.last(), Some(&Signal::Error(test_error("upstream failed"))));
        } else {
            prop_assert_eq!(downstream.terminal_count(), 0);
        }
    }

    #[test]
    fn cancellation_never_yields_terminal_before_exhaustion(
        items in proptest::collection::vec(any::<u8>(), 1..30),
        cancel_after in 0usize..30,
        demand in 1u64..40,
    ) {
        let downstream = TestSubscriber::<u8>::new();
        let queue = SegQueue::new();
        let register = DemandRegister::new();
        for &item in &items {
            let _ = queue.offer(item);
        }
        let observer = downstream.clone();
        let is_cancelled = move || observer.values().len() >= cancel_after;

        try_drain_after_termination(&*downstream, &queue, &register, &is_cancelled);
        request_and_maybe_drain(demand, &*downstream, &queue, &register, &is_cancelled);

        let delivered = downstream.values().len();
        prop_assert!(delivered <= cancel_after);
        if cancel_after <= items.len() {
            prop_assert_eq!(downstream.terminal_count(), 0);
        }
    }
}
