// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Test utilities for the backflow workspace.
//!
//! Not meant for production code. The pieces are:
//!
//! - [`TestSubscriber`]: records every signal and lets the test drive demand.
//! - [`TestPublisher`]: an upstream the test emits through by hand, recording the demand
//!   and cancellation it receives.
//! - [`helpers`]: async assertions for streams produced by the `into_stream` bridge.
//!
//! # Example
//!
//! ```rust
//! use backflow_core::Publisher;
//! use backflow_test_utils::{test_error, Signal, TestPublisher, TestSubscriber};
//!
//! let upstream = TestPublisher::<u8>::new();
//! let downstream = TestSubscriber::<u8>::new();
//! upstream.subscribe(downstream.clone());
//!
//! upstream.error(test_error("boom"));
//! assert_eq!(
//!     downstream.signals(),
//!     vec![Signal::Subscribe, Signal::Error(test_error("boom"))]
//! );
//! ```

#![allow(clippy::multiple_crate_versions, clippy::doc_markdown)]
pub mod helpers;
pub mod signal;
pub mod test_publisher;
pub mod test_subscriber;

pub use helpers::{
    assert_no_element_emitted, assert_stream_ended, test_error, unwrap_stream, unwrap_value,
};
pub use signal::Signal;
pub use test_publisher::{RecordingSubscription, TestPublisher};
pub use test_subscriber::TestSubscriber;
