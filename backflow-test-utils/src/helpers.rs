// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use backflow_core::{FlowError, StreamItem};
use futures::stream::StreamExt;
use futures::Stream;
use std::time::Duration;
use tokio::time::sleep;

/// A failure with a recognizable message.
pub fn test_error(message: &str) -> FlowError {
    FlowError::stream_error(message)
}

/// Assert that nothing is emitted within `timeout_ms`.
pub async fn assert_no_element_emitted<S, T>(stream: &mut S, timeout_ms: u64)
where
    S: Stream<Item = T> + Unpin,
{
    tokio::select! {
        _state = stream.next() => {
            panic!("Unexpected element emitted, expected no output.");
        }
        _ = sleep(Duration::from_millis(timeout_ms)) => {}
    }
}

/// Wait up to `timeout_ms` for the next item.
///
/// # Panics
///
/// Panics if the stream ends or times out.
pub async fn unwrap_stream<S, T>(stream: &mut S, timeout_ms: u64) -> T
where
    S: Stream<Item = T> + Unpin,
{
    tokio::select! {
        item = stream.next() => item.expect("stream ended before emitting"),
        () = sleep(Duration::from_millis(timeout_ms)) => {
            panic!("Timeout: no item received within {timeout_ms} ms")
        }
    }
}

/// Extract the value of a `StreamItem`, panicking on errors.
pub fn unwrap_value<T>(item: StreamItem<T>) -> T {
    match item {
        StreamItem::Value(v) => v,
        StreamItem::Error(e) => panic!("Expected a value, got error: {e}"),
    }
}

/// Assert that the stream has ended within `timeout_ms`.
pub async fn assert_stream_ended<S, T>(stream: &mut S, timeout_ms: u64)
where
    S: Stream<Item = T> + Unpin,
{
    tokio::select! {
        item = stream.next() => {
            assert!(item.is_none(), "Expected stream to end, but it emitted an item");
        }
        () = sleep(Duration::from_millis(timeout_ms)) => {
            panic!("Timeout: stream did not end within {timeout_ms} ms");
        }
    }
}
