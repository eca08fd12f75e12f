// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use crate::logging::log_warn;
use backflow_error::FlowError;
use std::sync::OnceLock;

/// Slot for the failure a delay-error drain delivers after the buffer runs dry.
///
/// Written once by the producer's `on_error`, before it calls
/// [`try_drain_after_termination_delay_error`](crate::drain::try_drain_after_termination_delay_error).
/// The compare-and-swap that publishes the terminal bit orders the write before every
/// read made by a drain pass that observed the terminal bit.
#[derive(Debug, Default)]
pub struct PendingFailure {
    slot: OnceLock<FlowError>,
}

impl PendingFailure {
    /// An empty slot.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            slot: OnceLock::new(),
        }
    }

    /// Store the failure.
    ///
    /// # Errors
    /// Hands the failure back if one was already stored; the first one wins.
    pub fn set(&self, error: FlowError) -> Result<(), FlowError> {
        self.slot.set(error).map_err(|rejected| {
            log_warn!("pending failure already set, dropping: {}", rejected);
            rejected
        })
    }

    /// The stored failure, if any.
    #[must_use]
    pub fn get(&self) -> Option<&FlowError> {
        self.slot.get()
    }

    /// Returns `true` once a failure has been stored.
    #[must_use]
    pub fn is_set(&self) -> bool {
        self.slot.get().is_some()
    }
}
