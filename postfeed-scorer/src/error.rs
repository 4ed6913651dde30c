//! Error types raised while loading or validating ranking configuration.
#![forbid(unsafe_code)]

use std::num::ParseFloatError;

use thiserror::Error;

/// Errors raised when ranking configuration is unusable.
///
/// Configuration fails fast: a ranker is never built from weights or a
/// decay rate that would silently produce nonsensical orderings.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RankingConfigError {
    /// An environment value could not be parsed as a number.
    #[error("{name}={raw:?} is not a valid number")]
    Parse {
        /// Environment variable name.
        name: &'static str,
        /// Raw value found in the environment.
        raw: String,
        /// Source error from the float parser.
        #[source]
        source: ParseFloatError,
    },
    /// A signal weight was negative or not finite.
    #[error("{name} must be finite and non-negative, got {value}")]
    InvalidWeight {
        /// Name of the offending weight.
        name: &'static str,
        /// Rejected value.
        value: f64,
    },
    /// Every signal weight was zero.
    #[error("at least one signal weight must be positive")]
    ZeroTotalWeight,
    /// The recency decay rate was negative or not finite.
    #[error("recency decay rate must be finite and non-negative, got {value}")]
    InvalidRecencyLambda {
        /// Rejected value.
        value: f64,
    },
}
