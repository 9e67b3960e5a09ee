#![forbid(unsafe_code)]

//! Cardiovascular-disease risk scoring engine.
//!
//! This crate provides:
//! - Domain types (profiles, sexes, calibration regions, results)
//! - Input validation from optional raw values to a validated profile
//! - Framingham point tables
//! - SCORE2 calibrated risk with a banded-points fallback
//! - A coefficient repository loadable from JSON
//! - Configuration and logging setup for binaries

pub mod types;
pub mod error;
pub mod validation;
pub mod coefficients;
pub mod framingham;
pub mod score2;
pub mod fallback;
pub mod categorize;
pub mod config;
pub mod logging;
pub mod engine;

// Re-export commonly used types
pub use error::{Error, Result};
pub use types::*;
pub use validation::{validate, ValidationFailure};
pub use coefficients::{CoefficientRepository, CoefficientSet, LoadOutcome};
pub use config::Config;
pub use engine::{calibration_example_profiles, CalibrationExample, RiskEngine};
