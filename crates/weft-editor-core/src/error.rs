//! Error types for dispatch, the reference surface and configuration.

use thiserror::Error;

use crate::actions::Range;
use crate::dispatch::Phase;

/// Errors returned by the dispatcher's notification entry points.
///
/// A missing surface is not an error; see [`crate::Dispatch::Skipped`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum DispatchError {
    /// A notification arrived while another was still being dispatched.
    #[error("reentrant {phase} notification rejected")]
    Reentrant { phase: Phase },

    /// Nested notifications went deeper than the configured limit.
    #[error("dispatch nesting exceeded limit of {limit}")]
    DepthExceeded { limit: usize },
}

/// Errors from [`crate::PlainEditor`] mutations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum EditorError {
    /// Range does not fit in the current content.
    #[error("range {range} out of bounds for content of {len} chars")]
    OutOfBounds { range: Range, len: usize },

    #[error(transparent)]
    Dispatch(#[from] DispatchError),
}

/// Errors loading [`crate::DispatcherConfig`] from the environment.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ConfigError {
    #[error("invalid value {value:?} for {var}")]
    InvalidEnv { var: &'static str, value: String },
}
