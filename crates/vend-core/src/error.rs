//! # Error Types
//!
//! Domain-specific error types for vend-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  vend-core errors (this file)                                          │
//! │  ├── VendingError     - Everything a machine operation can fail with   │
//! │  └── ValidationError  - Input outside the allowed domain               │
//! │                                                                         │
//! │  vend-terminal errors (app)                                            │
//! │  ├── ConfigError      - Loading machine.toml                           │
//! │  └── ApiError         - What the operator sees (serialized)            │
//! │                                                                         │
//! │  Flow: ValidationError → VendingError → ApiError → Terminal            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Recovery Contract
//! | Error                   | State mutated? | Caller action          |
//! |-------------------------|----------------|------------------------|
//! | `Validation`            | never          | show message, re-ask   |
//! | `InsufficientFunds`     | never          | show message           |
//! | `UnknownItem`           | never          | show message           |
//! | `DenominationShortfall` | never          | show message           |
//! | `InvariantViolation`    | never          | bug upstream, log loud |

use thiserror::Error;

use crate::money::Money;

// =============================================================================
// Vending Error
// =============================================================================

/// Errors returned by ledger, session, and facade operations.
///
/// Every operation validates before it mutates, so receiving any of these
/// means the machine is exactly as it was before the call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VendingError {
    /// Input failed validation (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Selecting the item would exceed the available balance.
    ///
    /// ## User Workflow
    /// ```text
    /// Balance 350, already selected 300
    ///      │
    ///      ▼
    /// select "cola" (150)
    ///      │
    ///      ▼
    /// 350 - (300 + 150) = -100 < 0
    ///      │
    ///      ▼
    /// InsufficientFunds { item: "cola", price: 150, available: 350, committed: 300 }
    /// ```
    #[error("Insufficient funds for {item}: price {price}, available {available}, already selected {committed}")]
    InsufficientFunds {
        item: String,
        price: Money,
        available: Money,
        committed: Money,
    },

    /// The requested item is not in the catalog.
    #[error("Item not found: {0}")]
    UnknownItem(String),

    /// The ledger does not hold enough pieces of a denomination.
    #[error("Not enough {value} pieces: held {held}, requested {requested}")]
    DenominationShortfall {
        value: Money,
        held: i64,
        requested: i64,
    },

    /// Internal guard failed; indicates a bug upstream of the failing call.
    #[error("Invariant violated: {0}")]
    InvariantViolation(String),
}

impl VendingError {
    pub fn invariant(msg: impl Into<String>) -> Self {
        Self::InvariantViolation(msg.into())
    }

    /// Returns true for errors that signal a broken invariant rather than
    /// bad input.
    pub fn is_invariant_violation(&self) -> bool {
        matches!(self, Self::InvariantViolation(_))
    }
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// Raised before any state is touched, both for operator input (inserted
/// amounts) and for construction input (ledger and catalog setup).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Text input could not be read as a whole number.
    #[error("'{input}' is not a number")]
    NotNumeric { input: String },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Value is below the allowed minimum.
    #[error("{field} must be at least {min}, got {actual}")]
    BelowMinimum { field: String, min: i64, actual: i64 },

    /// Amount cannot be expressed in the machine's denominations.
    #[error("{amount} is not a multiple of the smallest denomination {unit}")]
    NotRepresentable { amount: Money, unit: Money },

    /// The same denomination value was configured twice.
    #[error("denomination {value} is configured more than once")]
    DuplicateDenomination { value: Money },

    /// A denomination starts with a negative piece count.
    #[error("denomination {value} has negative count {count}")]
    NegativeCount { value: Money, count: i64 },

    /// The same item name appears twice in the catalog.
    #[error("item '{name}' already exists")]
    DuplicateItem { name: String },

    /// Total does not fit in the money range.
    #[error("{field} total exceeds the representable range")]
    Overflow { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Value is not in allowed set.
    #[error("{field} must be one of: {allowed:?}")]
    NotAllowed { field: String, allowed: Vec<String> },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with VendingError.
pub type VendingResult<T> = Result<T, VendingError>;

// =============================================================================
// Unit Tests
// =============================================================================
