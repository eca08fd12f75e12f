// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use backflow_core::mutex::Mutex;
use backflow_core::{Publisher, StreamItem, Subscriber};
use backflow_stream::sources::{fail, from_iter};
use backflow_stream::{IntoStreamExt, TakeLastExt, DEFAULT_PREFETCH};
use backflow_test_utils::{
    assert_no_element_emitted, assert_stream_ended, test_error, unwrap_stream, unwrap_value,
    RecordingSubscription, TestPublisher,
};
use futures::StreamExt;
use std::sync::Arc;

/// Holds on to its subscriber and lets the test decide when `on_subscribe` happens.
struct DeferredPublisher {
    subscriber: Mutex<Option<Arc<dyn Subscriber<u32>>>>,
}

impl DeferredPublisher {
    fn new() -> Arc<Self> {
        Arc::new(Self {
            subscriber: Mutex::new(None),
        })
    }

    fn accept(&self, subscription: Arc<RecordingSubscription>) {
        let subscriber = self.subscriber.lock().clone();
        if let Some(subscriber) = subscriber {
            subscriber.on_subscribe(subscription);
        }
    }
}

impl Publisher<u32> for DeferredPublisher {
    fn subscribe(&self, subscriber: Arc<dyn Subscriber<u32>>) {
        *self.subscriber.lock() = Some(subscriber);
    }
}

#[tokio::test]
async fn test_stream_yields_values_then_ends() -> anyhow::Result<()> {
    // Arrange
    let mut stream = from_iter(vec![1, 2, 3]).into_default_stream();

    // Act & Assert
    assert_eq!(unwrap_value(unwrap_stream(&mut stream, 500).await), 1);
    assert_eq!(unwrap_value(unwrap_stream(&mut stream, 500).await), 2);
    assert_eq!(unwrap_value(unwrap_stream(&mut stream, 500).await), 3);
    assert_stream_ended(&mut stream, 500).await;
    Ok(())
}

#[tokio::test]
async fn test_failure_arrives_as_final_error_item() {
    let mut stream = fail::<i32>(test_error("broken")).into_stream(4);

    let item = unwrap_stream(&mut stream, 500).await;
    assert!(matches!(item, StreamItem::Error(ref e) if e.to_string() == test_error("broken").to_string()));
    assert_stream_ended(&mut stream, 500).await;
}

#[tokio::test]
async fn test_prefetch_bounds_upstream_demand() {
    // Arrange
    let upstream = TestPublisher::<u32>::new();
    let mut stream = upstream.clone().into_stream(8);
    assert_eq!(upstream.requested(), 8);

    // Act
    upstream.emit_all(0..8);
    for expected in 0..5 {
        assert_eq!(unwrap_value(unwrap_stream(&mut stream, 500).await), expected);
    }

    // Assert
    assert_eq!(upstream.requested(), 8);
    assert_eq!(unwrap_value(unwrap_stream(&mut stream, 500).await), 5);
    assert_eq!(upstream.requested(), 14);
}

#[tokio::test]
async fn test_nothing_is_emitted_without_upstream_items() {
    let upstream = TestPublisher::<u32>::new();
    let mut stream = upstream.clone().into_stream(2);

    assert_no_element_emitted(&mut stream, 50).await;
    upstream.next(1);
    assert_eq!(unwrap_value(unwrap_stream(&mut stream, 500).await), 1);
}

#[tokio::test]
async fn test_dropping_stream_cancels_subscription() {
    let upstream = TestPublisher::<u32>::new();
    let stream = upstream.clone().into_stream(DEFAULT_PREFETCH);

    assert!(!upstream.is_cancelled());
    drop(stream);

    assert!(upstream.is_cancelled());
}

#[tokio::test]
async fn test_take_last_through_stream() {
    let values: Vec<i32> = from_iter(1..=1_000)
        .take_last(3)
        .into_stream(1)
        .map(|item| item.unwrap())
        .collect()
        .await;

    assert_eq!(values, vec![998, 999, 1_000]);
}

#[tokio::test]
async fn test_subscription_arriving_after_drop_is_cancelled() {
    // Arrange
    let publisher = DeferredPublisher::new();
    let stream = publisher.clone().into_stream(8);
    let subscription = Arc::new(RecordingSubscription::default());

    // Act
    drop(stream);
    publisher.accept(subscription.clone());

    // Assert
    assert!(subscription.is_cancelled());
    assert_eq!(subscription.requested(), 0);
}
