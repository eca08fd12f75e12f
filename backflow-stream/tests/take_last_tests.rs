// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use backflow_core::{Publisher, UNBOUNDED};
use backflow_stream::sources::from_iter;
use backflow_stream::TakeLastExt;
use backflow_test_utils::{test_error, Signal, TestPublisher, TestSubscriber};

#[test]
fn test_take_last_requests_unbounded_upstream() {
    let upstream = TestPublisher::<i32>::new();
    let downstream = TestSubscriber::<i32>::new();

    upstream.clone().take_last(2).subscribe(downstream.clone());

    assert_eq!(upstream.requested(), UNBOUNDED);
    assert_eq!(downstream.subscribe_count(), 1);
}

#[test]
fn test_take_last_replays_window_on_demand() {
    // Arrange
    let upstream = TestPublisher::<i32>::new();
    let downstream = TestSubscriber::<i32>::new();
    upstream.clone().take_last(3).subscribe(downstream.clone());

    // Act
    upstream.emit_all(1..=10);
    upstream.complete();

    // Assert
    assert!(downstream.values().is_empty());
    downstream.request(1);
    assert_eq!(downstream.values(), vec![8]);
    downstream.request(1);
    assert_eq!(downstream.values(), vec![8, 9]);
    assert!(!downstream.is_completed());
    downstream.request(1);
    assert_eq!(
        downstream.signals(),
        vec![
            Signal::Subscribe,
            Signal::Next(8),
            Signal::Next(9),
            Signal::Next(10),
            Signal::Complete
        ]
    );
}

#[test]
fn test_take_last_uses_demand_requested_before_completion() {
    let upstream = TestPublisher::<i32>::new();
    let downstream = TestSubscriber::<i32>::with_initial_request(2);
    upstream.clone().take_last(3).subscribe(downstream.clone());

    upstream.emit_all([1, 2, 3, 4]);
    upstream.complete();

    assert_eq!(downstream.values(), vec![2, 3]);
    assert!(!downstream.is_completed());

    downstream.request(1);
    assert_eq!(downstream.values(), vec![2, 3, 4]);
    assert!(downstream.is_completed());
}

#[test]
fn test_take_last_with_fewer_items_than_window() {
    let downstream = TestSubscriber::<i32>::with_initial_request(UNBOUNDED);

    from_iter(vec![1, 2]).take_last(5).subscribe(downstream.clone());

    assert_eq!(
        downstream.signals(),
        vec![
            Signal::Subscribe,
            Signal::Next(1),
            Signal::Next(2),
            Signal::Complete
        ]
    );
}

#[test]
fn test_take_last_zero_completes_without_items() {
    let downstream = TestSubscriber::<i32>::new();

    from_iter(1..=5).take_last(0).subscribe(downstream.clone());

    assert_eq!(downstream.signals(), vec![Signal::Subscribe, Signal::Complete]);
}

#[test]
fn test_take_last_fails_fast() {
    let upstream = TestPublisher::<i32>::new();
    let downstream = TestSubscriber::<i32>::with_initial_request(1);
    upstream.clone().take_last(2).subscribe(downstream.clone());

    upstream.emit_all([1, 2, 3]);
    upstream.error(test_error("F"));

    assert_eq!(
        downstream.signals(),
        vec![Signal::Subscribe, Signal::Error(test_error("F"))]
    );
}

#[test]
fn test_take_last_delay_error_replays_then_fails() {
    // Arrange
    let upstream = TestPublisher::<i32>::new();
    let downstream = TestSubscriber::<i32>::new();
    upstream
        .clone()
        .take_last_delay_error(1)
        .subscribe(downstream.clone());

    // Act
    upstream.emit_all([7, 1]);
    upstream.error(test_error("F"));

    // Assert
    assert_eq!(downstream.signals(), vec![Signal::Subscribe]);
    downstream.request(1);
    assert_eq!(
        downstream.signals(),
        vec![
            Signal::Subscribe,
            Signal::Next(1),
            Signal::Error(test_error("F"))
        ]
    );
}

#[test]
fn test_take_last_delay_error_with_empty_window_fails_immediately() {
    let upstream = TestPublisher::<i32>::new();
    let downstream = TestSubscriber::<i32>::new();
    upstream
        .clone()
        .take_last_delay_error(4)
        .subscribe(downstream.clone());

    upstream.error(test_error("F"));

    assert_eq!(
        downstream.signals(),
        vec![Signal::Subscribe, Signal::Error(test_error("F"))]
    );
}

#[test]
fn test_cancel_stops_replay_and_cancels_upstream() {
    // Arrange
    let upstream = TestPublisher::<i32>::new();
    let downstream = TestSubscriber::<i32>::new();
    upstream.clone().take_last(3).subscribe(downstream.clone());
    upstream.emit_all([1, 2, 3]);
    upstream.complete();
    downstream.request(1);

    // Act
    downstream.cancel();
    downstream.request(5);

    // Assert
    assert!(upstream.is_cancelled());
    assert_eq!(downstream.values(), vec![1]);
    assert_eq!(downstream.terminal_count(), 0);
}

#[test]
fn test_take_last_delay_error_ignores_repeated_failure() {
    // Arrange
    let upstream = TestPublisher::<i32>::new();
    let downstream = TestSubscriber::<i32>::new();
    upstream
        .clone()
        .take_last_delay_error(2)
        .subscribe(downstream.clone());

    // Act
    upstream.error(test_error("first"));
    upstream.error(test_error("second"));

    // Assert
    assert_eq!(
        downstream.signals(),
        vec![Signal::Subscribe, Signal::Error(test_error("first"))]
    );
    assert_eq!(downstream.terminal_count(), 1);
}
