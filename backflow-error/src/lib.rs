// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

#![allow(clippy::multiple_crate_versions)]
//! Error types for the backflow streaming runtime
//!
//! Every failure that travels through a stream is a [`FlowError`] value. Failures are
//! delivered to subscribers through `on_error`, so the type is cheap to clone and never
//! borrows from the place where it was produced.
//!
//! # Examples
//!
//! ```
//! use backflow_error::{FlowError, Result};
//!
//! fn recover() -> Result<()> {
//!     Err(FlowError::stream_error("upstream went away"))
//! }
//!
//! let original = FlowError::stream_error("connection reset");
//! let composite = FlowError::composite(original, recover().unwrap_err());
//! assert_eq!(composite.causes().len(), 2);
//! ```

use std::sync::Arc;

/// Root error type for all backflow operations
///
/// Values of this type are what subscribers observe through `on_error`.
#[derive(Debug, Clone, thiserror::Error)]
pub enum FlowError {
    /// Stream processing encountered an error
    ///
    /// General failure signalled by a producer that does not fit the other variants.
    #[error("Stream processing error: {context}")]
    StreamProcessingError {
        /// Description of what went wrong during stream processing
        context: String,
    },

    /// Custom error from user code
    ///
    /// Wraps errors produced by user-provided functions so they can flow through
    /// `on_error` unchanged.
    #[error("User error: {0}")]
    UserError(#[source] Arc<dyn std::error::Error + Send + Sync>),

    /// User-provided callback panicked
    ///
    /// Recovery functions run under `catch_unwind`; a panic is converted into this variant.
    #[error("User callback panicked: {context}")]
    CallbackPanic {
        /// Panic payload rendered as text, when it was a string
        context: String,
    },

    /// A participant broke the signalling contract
    ///
    /// For example a recovery function that produced no replacement publisher.
    #[error("Protocol violation: {context}")]
    ProtocolViolation {
        /// Which rule was broken
        context: String,
    },

    /// Several failures merged into one terminal signal
    ///
    /// The first entry is the failure that triggered the work, later entries are
    /// failures that happened while handling it.
    #[error("Composite failure ({}): {}", count_causes(.errors), join_causes(.errors))]
    Composite {
        /// The individual failures, oldest first
        errors: Vec<FlowError>,
    },
}

fn count_causes(errors: &[FlowError]) -> String {
    match errors.len() {
        1 => "1 cause".to_string(),
        n => format!("{n} causes"),
    }
}

fn join_causes(errors: &[FlowError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

impl FlowError {
    /// Create a stream processing error with the given context
    pub fn stream_error(context: impl Into<String>) -> Self {
        Self::StreamProcessingError {
            context: context.into(),
        }
    }

    /// Create a protocol violation with the given context
    pub fn protocol_violation(context: impl Into<String>) -> Self {
        Self::ProtocolViolation {
            context: context.into(),
        }
    }

    /// Create a callback panic error with the given context
    pub fn callback_panic(context: impl Into<String>) -> Self {
        Self::CallbackPanic {
            context: context.into(),
        }
    }

    /// Wrap a user error
    pub fn user_error(error: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::UserError(Arc::new(error))
    }

    /// Merge a primary failure with a secondary one raised while handling it
    ///
    /// The primary failure is always listed first so the original trigger survives.
    ///
    /// ```
    /// use backflow_error::FlowError;
    ///
    /// let err = FlowError::composite(
    ///     FlowError::stream_error("first"),
    ///     FlowError::stream_error("second"),
    /// );
    /// assert!(err.primary().to_string().contains("first"));
    /// ```
    #[must_use]
    pub fn composite(primary: FlowError, secondary: FlowError) -> Self {
        Self::Composite {
            errors: vec![primary, secondary],
        }
    }

    /// The causes carried by this error
    ///
    /// A composite exposes every merged failure, any other variant is its own single cause.
    #[must_use]
    pub fn causes(&self) -> &[FlowError] {
        match self {
            Self::Composite { errors } => errors,
            other => core::slice::from_ref(other),
        }
    }

    /// The failure that started the chain
    #[must_use]
    pub fn primary(&self) -> &FlowError {
        match self {
            Self::Composite { errors } if !errors.is_empty() => errors[0].primary(),
            other => other,
        }
    }

    /// Returns `true` if this is a composite failure
    #[must_use]
    pub const fn is_composite(&self) -> bool {
        matches!(self, Self::Composite { .. })
    }

    /// Check if a resumption operator may reasonably recover from this error
    ///
    /// Failures reported by producers and user code are recoverable.
    #[must_use]
    pub const fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::StreamProcessingError { .. } | Self::UserError(_)
        )
    }

    /// Check if this error indicates a permanent failure
    ///
    /// Contract breaches, panics and failures that already went through a recovery
    /// attempt are permanent.
    #[must_use]
    pub const fn is_permanent(&self) -> bool {
        matches!(
            self,
            Self::ProtocolViolation { .. } | Self::CallbackPanic { .. } | Self::Composite { .. }
        )
    }
}

/// Specialized Result type for backflow operations
///
/// # Examples
///
/// ```
/// use backflow_error::Result;
///
/// fn process() -> Result<String> {
///     Ok("processed".to_string())
/// }
/// ```
pub type Result<T> = std::result::Result<T, FlowError>;

/// Extension trait for converting errors into `FlowError`
///
/// Implemented for every `std::error::Error + Send + Sync + 'static`.
pub trait IntoFlowError {
    /// Convert this error into a `FlowError` with additional context
    fn into_flow_error(self, context: &str) -> FlowError;

    /// Convert this error into a `FlowError` without additional context
    fn into_flow(self) -> FlowError
    where
        Self: Sized,
    {
        self.into_flow_error("")
    }
}

impl<E: std::error::Error + Send + Sync + 'static> IntoFlowError for E {
    fn into_flow_error(self, context: &str) -> FlowError {
        if context.is_empty() {
            FlowError::user_error(self)
        } else {
            FlowError::stream_error(format!("{context}: {self}"))
        }
    }
}

/// Helper trait for adding context to `Result`s
pub trait ResultExt<T> {
    /// Add context to an error
    ///
    /// # Errors
    /// Returns `Err(FlowError)` if the underlying result is `Err`.
    fn context(self, context: impl Into<String>) -> Result<T>;

    /// Add context to an error using a closure (lazy evaluation)
    ///
    /// # Errors
    /// Returns `Err(FlowError)` if the underlying result is `Err`.
    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String;
}

impl<T, E> ResultExt<T> for std::result::Result<T, E>
where
    E: Into<FlowError>,
{
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| attach_context(context.into(), e.into()))
    }

    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String,
    {
        self.map_err(|e| attach_context(f(), e.into()))
    }
}

fn attach_context(context: String, error: FlowError) -> FlowError {
    match error {
        FlowError::UserError(inner) => FlowError::StreamProcessingError {
            context: format!("{context}: {inner}"),
        },
        FlowError::StreamProcessingError { context: inner } => FlowError::StreamProcessingError {
            context: format!("{context}: {inner}"),
        },
        other => other,
    }
}
