// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Core of the backflow runtime: the demand-driven signalling traits and the lock-free
//! machinery operators build on.
//!
//! - [`Publisher`], [`Subscriber`] and [`Subscription`] describe the protocol: a
//!   subscriber requests `n` items, the publisher emits at most that many, and exactly one
//!   terminal signal ends the stream.
//! - [`DemandRegister`] packs outstanding demand and a terminal flag into one atomic word.
//! - [`drain`] replays a [`DrainQueue`] against that register once the producer has
//!   terminated, in fail-fast and delay-error flavours.

#![allow(clippy::multiple_crate_versions, clippy::doc_markdown)]

mod logging;

pub mod cancellation_token;
pub mod demand;
pub mod demand_register;
pub mod drain;
pub mod drain_queue;
pub mod mutex;
pub mod pending_failure;
pub mod publisher;
pub mod stream_item;
pub mod subscriber;
pub mod subscription;

pub use self::cancellation_token::{CancellationToken, Cancelled};
pub use self::demand::UNBOUNDED;
pub use self::demand_register::{DemandRegister, DemandState};
pub use self::drain_queue::DrainQueue;
pub use self::pending_failure::PendingFailure;
pub use self::publisher::{Publisher, SharedPublisher};
pub use self::stream_item::StreamItem;
pub use self::subscriber::Subscriber;
pub use self::subscription::{EmptySubscription, Subscription};
pub use backflow_error::{FlowError, IntoFlowError, Result, ResultExt};
