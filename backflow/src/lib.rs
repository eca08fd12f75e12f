// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! # Backflow
//!
//! Demand-driven reactive publishers built on a lock-free drain engine.
//!
//! ## Overview
//!
//! A [`Publisher`] emits items to a [`Subscriber`] only as fast as the subscriber asks for
//! them through its [`Subscription`]. The crates behind this facade split the work:
//!
//! - `backflow-error`: [`FlowError`] and the `Result` alias
//! - `backflow-core`: the signalling traits, the packed [`DemandRegister`] and the drain
//!   engine in its fail-fast and delay-error flavours
//! - `backflow-stream`: sources, the `take_last` operators, failure resumption and the
//!   bridge to `futures::Stream`
//!
//! ## Quick Start
//!
//! ```rust
//! use backflow::prelude::*;
//! use futures::StreamExt;
//!
//! # futures::executor::block_on(async {
//! let last_two: Vec<i32> = from_iter(1..=10)
//!     .take_last(2)
//!     .into_stream(4)
//!     .map(|item| item.unwrap())
//!     .collect()
//!     .await;
//!
//! assert_eq!(last_two, vec![9, 10]);
//! # });
//! ```
//!
//! ## Recovery
//!
//! ```rust
//! use backflow::prelude::*;
//! use std::sync::Arc;
//!
//! let resumed = fail::<i32>(FlowError::stream_error("connection reset"))
//!     .on_failure_resume(|_failure| {
//!         let fallback: SharedPublisher<i32> = Arc::new(just(0));
//!         Ok(Some(fallback))
//!     });
//! # let _ = resumed;
//! ```

pub mod prelude;

pub use backflow_core::drain;
pub use backflow_core::{
    CancellationToken, DemandRegister, DemandState, DrainQueue, EmptySubscription,
    PendingFailure, Publisher, SharedPublisher, StreamItem, Subscriber, Subscription,
    UNBOUNDED,
};
pub use backflow_error::{FlowError, IntoFlowError, Result, ResultExt};
pub use backflow_stream::sources;
pub use backflow_stream::{
    IntoStreamExt, OnFailureResume, OnFailureResumeExt, PublisherStream, SwitchableUpstream,
    TakeLast, TakeLastExt, DEFAULT_PREFETCH,
};
