//! # Terminal Error Types
//!
//! ## Error Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  startup:   machine.toml ──► ConfigError ──► stderr, exit code 1        │
//! │                                                                         │
//! │  per line:  VendingError ──┐                                            │
//! │             parse failure ─┴──► ApiError { code, message } ──► stdout   │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! `ApiError` is what the operator sees. With `--json` it is printed as:
//! ```json
//! { "code": "INSUFFICIENT_FUNDS", "message": "Insufficient funds for cola: ..." }
//! ```

use serde::Serialize;
use std::fmt;
use thiserror::Error;
use vend_core::VendingError;

// =============================================================================
// Configuration Errors
// =============================================================================

/// Failures while loading or validating machine configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Config file could not be read.
    #[error("Failed to read config {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Config file is not valid TOML for a machine.
    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    /// Config values were rejected by the core.
    #[error("Invalid machine configuration: {0}")]
    Invalid(#[from] VendingError),
}

/// Result type alias for configuration loading.
pub type ConfigResult<T> = Result<T, ConfigError>;

// =============================================================================
// API Error
// =============================================================================

/// Error returned from a terminal command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiError {
    /// Machine-readable error code for programmatic handling
    pub code: ErrorCode,

    /// Human-readable error message for display
    pub message: String,
}

/// Error codes for command responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Input validation failed
    ValidationError,

    /// Selection exceeds the available balance
    InsufficientFunds,

    /// Item is not in the catalog
    UnknownItem,

    /// Reserve lacks pieces of a denomination
    DenominationShortfall,

    /// Command word not recognized
    UnknownCommand,

    /// Invariant violation or other internal failure
    Internal,
}

impl ApiError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        ApiError {
            code,
            message: message.into(),
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::ValidationError, message)
    }

    pub fn unknown_command(word: &str) -> Self {
        ApiError::new(
            ErrorCode::UnknownCommand,
            format!("Unknown command '{}'. Type 'help' for a list.", word),
        )
    }
}

/// Converts core errors to API errors.
impl From<VendingError> for ApiError {
    fn from(err: VendingError) -> Self {
        match err {
            VendingError::Validation(e) => ApiError::validation(e.to_string()),
            e @ VendingError::InsufficientFunds { .. } => {
                ApiError::new(ErrorCode::InsufficientFunds, e.to_string())
            }
            VendingError::UnknownItem(name) => {
                ApiError::new(ErrorCode::UnknownItem, format!("Item not found: {}", name))
            }
            e @ VendingError::DenominationShortfall { .. } => {
                ApiError::new(ErrorCode::DenominationShortfall, e.to_string())
            }
            // Already logged at error level where it was raised
            VendingError::InvariantViolation(_) => ApiError::new(
                ErrorCode::Internal,
                "The machine is in an inconsistent state; call an operator",
            ),
        }
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "error: {}", self.message)
    }
}

impl std::error::Error for ApiError {}
