//! Error handling module for regwizard
//!
//! Each subsystem has its own error enum (`StorageError`,
//! `TransitionError`, `ValidationErrors`); `WizardError` wraps them for
//! callers that deal with more than one, such as the command-line front end.

use thiserror::Error;

use crate::storage::StorageError;
use crate::wizard::TransitionError;

/// Main error type for regwizard
#[derive(Error, Debug)]
pub enum WizardError {
    /// IO errors (reading input files, stdin)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration errors (loading, parsing, bad values)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Draft storage errors
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// Refused wizard transitions, including validation failures
    #[error("Transition error: {0}")]
    Transition(#[from] TransitionError),

    /// Malformed input supplied to the front end
    #[error("Input error: {0}")]
    Input(String),
}

/// Result type alias for regwizard operations
pub type Result<T> = std::result::Result<T, WizardError>;

impl WizardError {
    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create an input error
    pub fn input(msg: impl Into<String>) -> Self {
        Self::Input(msg.into())
    }
}
