//! Custom error types for cooling profiles and device control.
//!
//! This module provides fine-grained error handling for profile handling,
//! numeric conversions, runtime storage and configuration validation.

use thiserror::Error;

/// Main error type for cooling operations.
#[derive(Error, Debug)]
pub enum LiquidError {
    /// Malformed argument to a numeric helper.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Interpolation requested on an empty or malformed curve.
    #[error("Invalid curve: {0}")]
    InvalidCurve(String),

    /// Speed profile cannot be used as requested.
    #[error("Invalid speed profile: {0}")]
    InvalidProfile(String),

    /// Channel name not supported by the device.
    #[error("Unknown channel '{channel}'. Use one of: {valid}")]
    UnknownChannel { channel: String, valid: String },

    /// Runtime or configuration storage failure.
    #[error("Storage error: {0}")]
    Storage(String),

    /// Filesystem error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Stored value could not be encoded or decoded.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic invalid input error.
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

/// Result type alias for cooling operations.
pub type Result<T> = std::result::Result<T, LiquidError>;
