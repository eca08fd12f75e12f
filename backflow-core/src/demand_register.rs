// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Packed demand counter with a terminal flag.
//!
//! One `AtomicU64` holds both pieces of state the drain engine must observe together:
//! bit 63 says the producer has terminated, bits 0..=62 hold the requested but not yet
//! delivered amount. Outside this crate the register is read-only; every mutation goes
//! through the compare-and-swap helpers used by [`crate::drain`].

use crate::demand::add_cap;
use core::sync::atomic::{AtomicU64, Ordering};

pub(crate) const TERMINAL_MASK: u64 = 1 << 63;
pub(crate) const DEMAND_MASK: u64 = !TERMINAL_MASK;

/// Decoded view of a [`DemandRegister`] word.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DemandState {
    /// The producer is still running; the value is the outstanding demand.
    Active(u64),
    /// The producer has terminated; the value is the outstanding demand left to drain.
    Terminal(u64),
}

impl DemandState {
    /// Decode a raw register word.
    #[must_use]
    pub const fn from_bits(bits: u64) -> Self {
        if bits & TERMINAL_MASK == 0 {
            Self::Active(bits)
        } else {
            Self::Terminal(bits & DEMAND_MASK)
        }
    }

    /// Encode back into a raw register word.
    #[must_use]
    pub const fn to_bits(self) -> u64 {
        match self {
            Self::Active(pending) => pending & DEMAND_MASK,
            Self::Terminal(pending) => TERMINAL_MASK | (pending & DEMAND_MASK),
        }
    }

    /// Outstanding demand, regardless of the terminal flag.
    #[must_use]
    pub const fn pending(self) -> u64 {
        match self {
            Self::Active(pending) | Self::Terminal(pending) => pending,
        }
    }

    /// Returns `true` once the producer has terminated.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Terminal(_))
    }
}

/// Atomic demand register shared by a subscription and its drain engine.
#[derive(Debug, Default)]
pub struct DemandRegister {
    state: AtomicU64,
}

impl DemandRegister {
    /// A fresh register: active, no demand.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            state: AtomicU64::new(0),
        }
    }

    /// Snapshot of the current state.
    #[must_use]
    pub fn state(&self) -> DemandState {
        DemandState::from_bits(self.bits())
    }

    /// Outstanding demand at this instant.
    #[must_use]
    pub fn pending(&self) -> u64 {
        self.bits() & DEMAND_MASK
    }

    /// Returns `true` once the producer's termination has been published.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        self.bits() & TERMINAL_MASK != 0
    }

    pub(crate) fn bits(&self) -> u64 {
        self.state.load(Ordering::Acquire)
    }

    /// Adds `n` to the demand, preserving the terminal bit. Returns the previous word.
    pub(crate) fn add(&self, n: u64) -> u64 {
        let mut current = self.bits();
        loop {
            let next = (current & TERMINAL_MASK) | add_cap(current & DEMAND_MASK, n);
            match self
                .state
                .compare_exchange(current, next, Ordering::AcqRel, Ordering::Acquire)
            {
                Ok(previous) => return previous,
                Err(observed) => current = observed,
            }
        }
    }

    /// Sets the terminal bit, keeping the demand.
    ///
    /// Returns the previous word if this call performed the transition, `None` if the
    /// register was already terminal.
    pub(crate) fn mark_terminal(&self) -> Option<u64> {
        let mut current = self.bits();
        loop {
            if current & TERMINAL_MASK != 0 {
                return None;
            }
            match self.state.compare_exchange(
                current,
                current | TERMINAL_MASK,
                Ordering::AcqRel,
                Ordering::Acquire,
            ) {
                Ok(previous) => return Some(previous),
                Err(observed) => current = observed,
            }
        }
    }

    /// Removes `emitted` from the demand. Returns the new word.
    ///
    /// Callers only pass amounts they have already seen in the register, so the
    /// subtraction never borrows from the terminal bit.
    pub(crate) fn settle(&self, emitted: u64) -> u64 {
        self.state
            .fetch_sub(emitted, Ordering::AcqRel)
            .wrapping_sub(emitted)
    }
}
