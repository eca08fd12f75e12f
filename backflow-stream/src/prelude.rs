// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Prelude re-exporting the operator traits and the protocol types they work with.
//!
//! ```
//! use backflow_stream::prelude::*;
//!
//! let publisher = from_iter(vec![1, 2, 3]).take_last(1);
//! # let _ = publisher;
//! ```

pub use crate::into_stream::{IntoStreamExt, DEFAULT_PREFETCH};
pub use crate::on_failure_resume::OnFailureResumeExt;
pub use crate::sources::{empty, fail, from_iter, just};
pub use crate::take_last::TakeLastExt;
pub use backflow_core::{
    FlowError, Publisher, SharedPublisher, StreamItem, Subscriber, Subscription, UNBOUNDED,
};
