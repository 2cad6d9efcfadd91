//! Error types.

use crate::core::EngineState;
use thiserror::Error;

/// Result type used throughout this crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while configuring or running an integration.
#[derive(Error, Debug)]
pub enum Error {
    /// The desired absolute or relative error is not a positive, finite number.
    #[error("desired error must be positive and finite, got {0}")]
    InvalidDesiredError(f64),

    /// The confidence level does not lie in the open interval (0, 1).
    #[error("confidence level must lie in (0, 1), got {0}")]
    InvalidConfidenceLevel(f64),

    /// The pilot sample is too small to estimate a variance.
    #[error("initial sample size must be at least 2, got {0}")]
    InitialSampleSizeTooSmall(usize),

    /// The sample size ceiling lies below the pilot sample size.
    #[error("maximum sample size {max} is smaller than the initial sample size {initial}")]
    MaxBelowInitial {
        /// The configured pilot sample size.
        initial: usize,
        /// The configured maximum sample size.
        max: usize,
    },

    /// A function or a sampler was not supplied.
    #[error("missing collaborator: {0}")]
    MissingCollaborator(&'static str),

    /// The integrand produced `inf` or `nan`.
    #[error("non-finite observation {value} after {count} observations")]
    NonFiniteObservation {
        /// The offending value.
        value: f64,
        /// Number of observations collected before it.
        count: usize,
    },

    /// An operation was requested in a state that does not allow it.
    #[error("`{operation}` is not allowed in state {state}")]
    InvalidState {
        /// Name of the requested operation.
        operation: &'static str,
        /// State of the engine at the time of the request.
        state: EngineState,
    },

    /// A sampler parameter is out of its domain.
    #[error("invalid parameter `{name}`: {reason}")]
    InvalidParameter {
        /// Name of the parameter.
        name: String,
        /// Why the value was rejected.
        reason: String,
    },

    /// A parameter was requested that the set does not contain.
    #[error("unknown parameter `{0}`")]
    UnknownParameter(String),

    /// Serializing a report failed.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl Error {
    /// Create an invalid parameter error.
    pub fn invalid_parameter(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidParameter {
            name: name.into(),
            reason: reason.into(),
        }
    }
}
