// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Everything needed to build and consume a pipeline, in one import.

pub use backflow_stream::prelude::*;
pub use backflow_stream::PublisherStream;
