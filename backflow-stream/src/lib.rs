// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Publishers and operators for the backflow runtime.
//!
//! - [`sources`]: cold publishers over iterators and single values.
//! - [`SwitchableUpstream`]: a downstream subscription that survives a change of producer.
//! - [`OnFailureResumeExt`]: resume with a fallback publisher after a failure.
//! - [`TakeLastExt`]: keep the last `n` items and replay them through the drain engine.
//! - [`IntoStreamExt`]: consume any publisher as a `futures::Stream`.

#![allow(clippy::multiple_crate_versions, clippy::doc_markdown)]
mod logging;
pub mod into_stream;
pub mod on_failure_resume;
pub mod prelude;
pub mod sources;
pub mod switchable_upstream;
pub mod take_last;

pub use into_stream::{IntoStreamExt, PublisherStream, DEFAULT_PREFETCH};
pub use on_failure_resume::{OnFailureResume, OnFailureResumeExt};
pub use switchable_upstream::SwitchableUpstream;
pub use take_last::{TakeLast, TakeLastExt};
