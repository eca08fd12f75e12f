// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Saturating demand arithmetic shared by every operator.
//!
//! Demand lives in 63 bits so that the top bit of a packed word stays free for a flag.
//! Reaching [`UNBOUNDED`] means "emit as fast as you like" and is never decremented.

/// Demand value meaning "no limit". Additions saturate here instead of wrapping.
pub const UNBOUNDED: u64 = i64::MAX as u64;

/// Adds two demand amounts, clamping at [`UNBOUNDED`].
///
/// ```
/// use backflow_core::demand::{add_cap, UNBOUNDED};
///
/// assert_eq!(add_cap(2, 3), 5);
/// assert_eq!(add_cap(UNBOUNDED - 1, 10), UNBOUNDED);
/// ```
#[must_use]
pub const fn add_cap(current: u64, n: u64) -> u64 {
    let sum = current.saturating_add(n);
    if sum > UNBOUNDED {
        UNBOUNDED
    } else {
        sum
    }
}

/// Subtracts delivered items from outstanding demand.
///
/// Unbounded demand stays unbounded; otherwise the result never goes below zero.
#[must_use]
pub const fn produced(current: u64, n: u64) -> u64 {
    if current == UNBOUNDED {
        UNBOUNDED
    } else {
        current.saturating_sub(n)
    }
}

/// Returns `true` if `n` represents unbounded demand.
#[must_use]
pub const fn is_unbounded(n: u64) -> bool {
    n >= UNBOUNDED
}
