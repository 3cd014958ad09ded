//! # Money Module
//!
//! Provides the `Money` type for amounts handled by the machine.
//!
//! ## One Integer Unit
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Every amount is a whole number of the machine's currency unit.         │
//! │                                                                         │
//! │    coin 10  ──►  Money(10)                                              │
//! │    bill 1000 ──► Money(1000)                                            │
//! │                                                                         │
//! │  There are no fractional units and no locale formatting: the machine   │
//! │  only needs to add, subtract, and split amounts into denominations.    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use vend_core::money::Money;
//!
//! let inserted = Money::from_units(150);
//! let price = Money::from_units(100);
//!
//! assert_eq!((inserted - price).units(), 50);
//! assert_eq!(Money::from_units(100).times(3).units(), 300);
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Mul, Sub, SubAssign};
use ts_rs::TS;

// =============================================================================
// Money Type
// =============================================================================

/// A monetary amount in the machine's single integer unit.
///
/// ## Design Decisions
/// - **i64 (signed)**: differences such as `balance - price` may go negative
///   and must be representable so the guard can reject them
/// - **Single field tuple struct**: zero-cost abstraction over i64
/// - **Newtype serde**: serializes as a bare number
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize, TS,
)]
#[ts(export)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from whole units.
    ///
    /// ## Example
    /// ```rust
    /// use vend_core::money::Money;
    ///
    /// let coin = Money::from_units(500);
    /// assert_eq!(coin.units(), 500);
    /// ```
    #[inline]
    pub const fn from_units(units: i64) -> Self {
        Money(units)
    }

    /// Returns the amount in whole units.
    #[inline]
    pub const fn units(&self) -> i64 {
        self.0
    }

    /// Returns zero money value.
    #[inline]
    pub const fn zero() -> Self {
        Money(0)
    }

    /// Checks if the value is zero.
    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Checks if the value is positive (greater than zero).
    #[inline]
    pub const fn is_positive(&self) -> bool {
        self.0 > 0
    }

    /// Checks if the value is negative (less than zero).
    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// Multiplies a denomination value by a number of pieces.
    ///
    /// ## Example
    /// ```rust
    /// use vend_core::money::Money;
    ///
    /// // Four 50-unit coins
    /// assert_eq!(Money::from_units(50).times(4).units(), 200);
    /// ```
    #[inline]
    pub const fn times(&self, count: i64) -> Self {
        Money(self.0 * count)
    }

    /// Addition that reports `i64` overflow instead of panicking.
    #[inline]
    pub fn checked_add(self, other: Money) -> Option<Money> {
        self.0.checked_add(other.0).map(Money)
    }

    #[inline]
    pub fn checked_sub(self, other: Money) -> Option<Money> {
        self.0.checked_sub(other.0).map(Money)
    }

    /// [`times`](Self::times) that reports overflow.
    #[inline]
    pub fn checked_times(self, count: i64) -> Option<Money> {
        self.0.checked_mul(count).map(Money)
    }

    /// Sums amounts, or `None` if the total leaves the `i64` range.
    ///
    /// ## Example
    /// ```rust
    /// use vend_core::money::Money;
    ///
    /// let amounts = [Money::from_units(100), Money::from_units(50)];
    /// assert_eq!(Money::checked_sum(amounts), Some(Money::from_units(150)));
    /// assert_eq!(Money::checked_sum([Money::from_units(i64::MAX), Money::from_units(1)]), None);
    /// ```
    pub fn checked_sum(amounts: impl IntoIterator<Item = Money>) -> Option<Money> {
        amounts
            .into_iter()
            .try_fold(Money::zero(), Money::checked_add)
    }

    /// Splits this amount into whole pieces of `piece` and what is left.
    ///
    /// Returns `(count, remainder)` with `count = floor(self / piece)` and
    /// `remainder = self % piece`. `piece` must be positive and `self`
    /// non-negative; callers validate both before splitting.
    ///
    /// ## Example
    /// ```rust
    /// use vend_core::money::Money;
    ///
    /// let (count, rest) = Money::from_units(370).split_into(Money::from_units(100));
    /// assert_eq!(count, 3);
    /// assert_eq!(rest.units(), 70);
    /// ```
    #[inline]
    pub const fn split_into(&self, piece: Money) -> (i64, Money) {
        (self.0 / piece.0, Money(self.0 % piece.0))
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Displays the bare number of units (no currency symbol).
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for Money {
    fn from(units: i64) -> Self {
        Money(units)
    }
}

impl Add for Money {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Money(self.0 + other.0)
    }
}

impl AddAssign for Money {
    #[inline]
    fn add_assign(&mut self, other: Self) {
        self.0 += other.0;
    }
}

impl Sub for Money {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Money(self.0 - other.0)
    }
}

impl SubAssign for Money {
    #[inline]
    fn sub_assign(&mut self, other: Self) {
        self.0 -= other.0;
    }
}

/// Multiplication by a piece count.
impl Mul<i64> for Money {
    type Output = Self;

    #[inline]
    fn mul(self, count: i64) -> Self {
        Money(self.0 * count)
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), |acc, m| acc + m)
    }
}

impl<'a> Sum<&'a Money> for Money {
    fn sum<I: Iterator<Item = &'a Money>>(iter: I) -> Self {
        iter.copied().sum()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
