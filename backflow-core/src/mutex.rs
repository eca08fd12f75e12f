// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mutex used by the operator layer for short, non-reentrant critical sections.
//!
//! The drain engine itself never locks. Operators that keep a small amount of
//! bookkeeping next to it (the current upstream of a switchable subscriber, the
//! iterator behind a source) use this `parking_lot` mutex and never call out to
//! another subscriber while holding the guard.

pub use parking_lot::Mutex;
