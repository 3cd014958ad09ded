//! # Validation Module
//!
//! Input validation for the vending machine.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Where Validation Runs                              │
//! │                                                                         │
//! │  Construction (once)                                                    │
//! │  ├── validate_denomination   value > 0, count >= 0                      │
//! │  ├── validate_item_name      non-empty, bounded length                  │
//! │  └── validate_item_price     positive multiple of the smallest piece    │
//! │                                                                         │
//! │  Operator input (every insertion)                                       │
//! │  ├── parse_amount            text → Money                               │
//! │  └── validate_insert_amount  positive and >= minimum                    │
//! │                                                                         │
//! │  Every validator is pure and runs before any state is touched.          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use vend_core::money::Money;
//! use vend_core::validation::{parse_amount, validate_insert_amount};
//!
//! let amount = parse_amount(" 150 ").unwrap();
//! assert_eq!(amount, Money::from_units(150));
//! assert!(validate_insert_amount(amount, Money::from_units(10)).is_ok());
//! ```

use crate::error::ValidationError;
use crate::money::Money;
use crate::MAX_ITEM_NAME_LEN;

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// Operator Input
// =============================================================================

/// Parses operator text input into an amount.
///
/// ## Rules
/// - Surrounding whitespace is ignored
/// - Empty input is `Required`
/// - Anything that is not a whole number is `NotNumeric`
///
/// ## Example
/// ```rust
/// use vend_core::validation::parse_amount;
///
/// assert_eq!(parse_amount("500").unwrap().units(), 500);
/// assert!(parse_amount("five hundred").is_err());
/// assert!(parse_amount("").is_err());
/// ```
pub fn parse_amount(input: &str) -> ValidationResult<Money> {
    let trimmed = input.trim();

    if trimmed.is_empty() {
        return Err(ValidationError::Required {
            field: "amount".to_string(),
        });
    }

    trimmed
        .parse::<i64>()
        .map(Money::from_units)
        .map_err(|_| ValidationError::NotNumeric {
            input: trimmed.to_string(),
        })
}

/// Validates an amount the customer is inserting.
///
/// ## Rules
/// - Must be positive (> 0)
/// - Must be at least `min` (the minimum denomination granularity)
///
/// ## User Workflow
/// ```text
/// ┌─────────────────────────────────────────────────────────────────────────┐
/// │  Customer types 5 and presses "insert"                                  │
/// │       │                                                                 │
/// │       ▼                                                                 │
/// │  validate_insert_amount(5, 10) ← THIS FUNCTION                          │
/// │       │                                                                 │
/// │       ├── amount <= 0?  → "amount must be positive"                     │
/// │       │                                                                 │
/// │       ├── amount < 10?  → "amount must be at least 10, got 5"           │
/// │       │                                                                 │
/// │       └── OK → ledger allocation                                        │
/// └─────────────────────────────────────────────────────────────────────────┘
/// ```
pub fn validate_insert_amount(amount: Money, min: Money) -> ValidationResult<()> {
    if !amount.is_positive() {
        return Err(ValidationError::MustBePositive {
            field: "amount".to_string(),
        });
    }

    if amount < min {
        return Err(ValidationError::BelowMinimum {
            field: "amount".to_string(),
            min: min.units(),
            actual: amount.units(),
        });
    }

    Ok(())
}

/// Validates the configured minimum insertion.
pub fn validate_min_insert(min: Money) -> ValidationResult<()> {
    if !min.is_positive() {
        return Err(ValidationError::MustBePositive {
            field: "min_insert".to_string(),
        });
    }

    Ok(())
}

// =============================================================================
// Construction Input
// =============================================================================

/// Validates a single denomination of the initial ledger.
///
/// ## Rules
/// - Value must be positive
/// - Starting count must be non-negative
pub fn validate_denomination(value: Money, count: i64) -> ValidationResult<()> {
    if !value.is_positive() {
        return Err(ValidationError::MustBePositive {
            field: "denomination value".to_string(),
        });
    }

    if count < 0 {
        return Err(ValidationError::NegativeCount { value, count });
    }

    Ok(())
}

/// Validates a catalog item name.
///
/// ## Example
/// ```rust
/// use vend_core::validation::validate_item_name;
///
/// assert!(validate_item_name("cola").is_ok());
/// assert!(validate_item_name("   ").is_err());
/// ```
pub fn validate_item_name(name: &str) -> ValidationResult<()> {
    let name = name.trim();

    if name.is_empty() {
        return Err(ValidationError::Required {
            field: "item name".to_string(),
        });
    }

    if name.chars().count() > MAX_ITEM_NAME_LEN {
        return Err(ValidationError::TooLong {
            field: "item name".to_string(),
            max: MAX_ITEM_NAME_LEN,
        });
    }

    Ok(())
}

/// Validates a catalog item price against the smallest denomination.
///
/// A price that is not a multiple of `unit` would leave change that the
/// ledger cannot pay back.
pub fn validate_item_price(price: Money, unit: Money) -> ValidationResult<()> {
    if !price.is_positive() {
        return Err(ValidationError::MustBePositive {
            field: "price".to_string(),
        });
    }

    if unit.is_positive() && !price.split_into(unit).1.is_zero() {
        return Err(ValidationError::NotRepresentable { amount: price, unit });
    }

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn m(units: i64) -> Money {
        Money::from_units(units)
    }

    #[test]
    fn test_parse_amount() {
        assert_eq!(parse_amount("150").unwrap(), m(150));
        assert_eq!(parse_amount("  1000\n").unwrap(), m(1000));
        assert_eq!(parse_amount("-20").unwrap(), m(-20));

        assert!(matches!(
            parse_amount(""),
            Err(ValidationError::Required { .. })
        ));
        assert!(matches!(
            parse_amount("12a"),
            Err(ValidationError::NotNumeric { .. })
        ));
        assert!(matches!(
            parse_amount("1.5"),
            Err(ValidationError::NotNumeric { .. })
        ));
    }

    #[test]
    fn test_validate_insert_amount() {
        assert!(validate_insert_amount(m(10), m(10)).is_ok());
        assert!(validate_insert_amount(m(1000), m(10)).is_ok());

        assert_eq!(
            validate_insert_amount(m(5), m(10)),
            Err(ValidationError::BelowMinimum {
                field: "amount".to_string(),
                min: 10,
                actual: 5,
            })
        );
        assert!(matches!(
            validate_insert_amount(m(0), m(10)),
            Err(ValidationError::MustBePositive { .. })
        ));
        assert!(matches!(
            validate_insert_amount(m(-100), m(10)),
            Err(ValidationError::MustBePositive { .. })
        ));
    }

    #[test]
    fn test_validate_min_insert() {
        assert!(validate_min_insert(m(10)).is_ok());
        assert!(validate_min_insert(m(0)).is_err());
    }

    #[test]
    fn test_validate_denomination() {
        assert!(validate_denomination(m(100), 0).is_ok());
        assert!(validate_denomination(m(100), 5).is_ok());
        assert!(validate_denomination(m(0), 5).is_err());
        assert_eq!(
            validate_denomination(m(50), -1),
            Err(ValidationError::NegativeCount {
                value: m(50),
                count: -1
            })
        );
    }

    #[test]
    fn test_validate_item_name() {
        assert!(validate_item_name("water").is_ok());
        assert!(validate_item_name("").is_err());
        assert!(validate_item_name(&"x".repeat(MAX_ITEM_NAME_LEN + 1)).is_err());
    }

    #[test]
    fn test_validate_item_price() {
        assert!(validate_item_price(m(150), m(10)).is_ok());
        assert!(validate_item_price(m(0), m(10)).is_err());
        assert_eq!(
            validate_item_price(m(155), m(10)),
            Err(ValidationError::NotRepresentable {
                amount: m(155),
                unit: m(10)
            })
        );
    }
}
