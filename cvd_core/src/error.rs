//! Error types for the cvd_core library.

use crate::validation::ValidationFailure;
use std::io;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for cvd_core operations
///
/// Calculation paths never produce these for expected-domain conditions:
/// invalid input is a [`ValidationFailure`] value and degenerate math is
/// handled by the fallback mapper. This type covers the infrastructure
/// around the engine (files, config) and lets a caller propagate a rejected
/// profile with `?`.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// IO error occurred
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML parsing error
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Configuration validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Coefficient data was rejected
    #[error("Coefficient data error: {0}")]
    Coefficients(String),

    /// Profile failed validation
    #[error("Validation failed [{}]: {0}", .0.code())]
    Validation(#[from] ValidationFailure),
}
