// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use backflow_core::{Publisher, StreamItem, Subscriber, UNBOUNDED};
use backflow_test_utils::{
    assert_no_element_emitted, assert_stream_ended, test_error, unwrap_stream, unwrap_value,
    Signal, TestPublisher, TestSubscriber,
};
use futures::channel::mpsc;

#[test]
fn test_subscriber_records_signals_in_order() {
    // Arrange
    let publisher = TestPublisher::<i32>::new();
    let subscriber = TestSubscriber::<i32>::new();
    publisher.subscribe(subscriber.clone());

    // Act
    publisher.emit_all([1, 2]);
    publisher.error(test_error("boom"));

    // Assert
    assert_eq!(
        subscriber.signals(),
        vec![
            Signal::Subscribe,
            Signal::Next(1),
            Signal::Next(2),
            Signal::Error(test_error("boom")),
        ]
    );
    assert_eq!(subscriber.values(), vec![1, 2]);
    assert_eq!(subscriber.terminal_count(), 1);
    assert!(!subscriber.is_completed());
    subscriber.assert_well_formed();
}

#[test]
fn test_publisher_accumulates_demand_and_saturates() {
    let publisher = TestPublisher::<i32>::new();
    let subscriber = TestSubscriber::<i32>::with_initial_request(3);
    publisher.subscribe(subscriber.clone());

    subscriber.request(4);
    assert_eq!(publisher.requested(), 7);
    assert_eq!(publisher.subscription().request_calls(), 2);

    subscriber.request(UNBOUNDED);
    assert_eq!(publisher.requested(), UNBOUNDED);
}

#[test]
fn test_publisher_records_cancellation_and_subscriptions() {
    let publisher = TestPublisher::<i32>::new();
    let subscriber = TestSubscriber::<i32>::new();
    publisher.subscribe(subscriber.clone());

    assert_eq!(publisher.subscribe_count(), 1);
    assert!(!publisher.is_cancelled());

    subscriber.cancel();

    assert!(publisher.is_cancelled());
}

#[test]
#[should_panic(expected = "no signal may follow a terminal signal")]
fn test_well_formed_rejects_signal_after_terminal() {
    let publisher = TestPublisher::<i32>::new();
    let subscriber = TestSubscriber::<i32>::new();
    publisher.subscribe(subscriber.clone());

    subscriber.on_complete();
    subscriber.on_next(1);

    subscriber.assert_well_formed();
}

#[test]
#[should_panic(expected = "has not been subscribed")]
fn test_request_before_subscribe_panics() {
    TestSubscriber::<i32>::new().request(1);
}

#[tokio::test]
async fn test_stream_helpers() -> anyhow::Result<()> {
    // Arrange
    let (sender, mut receiver) = mpsc::unbounded::<StreamItem<i32>>();

    // Act & Assert
    assert_no_element_emitted(&mut receiver, 20).await;

    sender.unbounded_send(StreamItem::Value(5))?;
    assert_eq!(unwrap_value(unwrap_stream(&mut receiver, 500).await), 5);

    drop(sender);
    assert_stream_ended(&mut receiver, 500).await;
    Ok(())
}
