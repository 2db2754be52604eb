//! Error types for the guard engine.
//!
//! Denials are not errors: a guard that refuses navigation returns a normal
//! [`GuardResult`](crate::decision::GuardResult). Errors cover configuration
//! problems and failing upstream providers.

use thiserror::Error;

/// Result type for guard operations.
pub type Result<T> = std::result::Result<T, GuardError>;

/// Errors that can occur while configuring or evaluating guards.
#[derive(Debug, Error)]
pub enum GuardError {
    /// Configuration file could not be parsed.
    #[error("Failed to parse configuration: {0}")]
    ParseError(String),

    /// Configuration validation failed.
    #[error("Configuration validation error: {0}")]
    ValidationError(String),

    /// Required field is missing from the context.
    #[error("Missing required field: {0}")]
    MissingField(String),

    /// A denial was built without a usable redirect target.
    #[error("Invalid redirect target: {0:?}")]
    InvalidRedirect(String),

    /// An upstream context provider failed to produce its data.
    #[error("Provider '{provider}' failed: {message}")]
    Provider { provider: String, message: String },

    /// Route pattern could not be compiled.
    #[error("Invalid route pattern: {0}")]
    InvalidPattern(String),

    /// Serialization/deserialization error.
    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl GuardError {
    /// Creates a provider failure.
    pub fn provider(provider: impl Into<String>, message: impl Into<String>) -> Self {
        GuardError::Provider {
            provider: provider.into(),
            message: message.into(),
        }
    }

    /// Returns true when the error leaves the navigation decision undetermined.
    ///
    /// Only provider failures qualify; callers typically fall back to the most
    /// restrictive outcome (see [`fail_closed`](crate::decision::fail_closed)).
    pub fn is_indeterminate(&self) -> bool {
        matches!(self, GuardError::Provider { .. })
    }
}

impl From<serde_json::Error> for GuardError {
    fn from(err: serde_json::Error) -> Self {
        GuardError::SerializationError(err.to_string())
    }
}

impl From<serde_yaml::Error> for GuardError {
    fn from(err: serde_yaml::Error) -> Self {
        GuardError::ParseError(err.to_string())
    }
}

impl From<regex::Error> for GuardError {
    fn from(err: regex::Error) -> Self {
        GuardError::InvalidPattern(err.to_string())
    }
}
