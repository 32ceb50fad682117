//! Configuration error types.

use thiserror::Error;

/// Errors that can occur during configuration loading and validation.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// An environment variable was set but could not be parsed.
    #[error("failed to parse {name}='{value}': {reason}")]
    InvalidValue {
        name: &'static str,
        value: String,
        reason: String,
    },

    /// A value parsed but violates an invariant (ordering, range, non-zero).
    #[error("invalid configuration for {name}: {reason}")]
    OutOfRange { name: &'static str, reason: String },

    /// A required environment variable was not set.
    ///
    /// Raised for external-service credentials, before any comparison work starts.
    #[error("missing required environment variable: {name}")]
    MissingEnvVar { name: &'static str },
}
