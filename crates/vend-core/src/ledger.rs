//! # Denomination Ledger
//!
//! The machine's change reserve: how many pieces of each denomination it
//! holds.
//!
//! ## Allocation and Delta
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Ledger {100:2, 50:4, 10:10}                total = 500                 │
//! │                                                                         │
//! │  allocate(150, LargestFirst)                                            │
//! │    100 → 150 / 100 = 1, rest 50                                         │
//! │     50 →  50 /  50 = 1, rest 0                                          │
//! │     10 →   0 /  10 = 0, rest 0                                          │
//! │    = Allocation {100:1, 50:1, 10:0}, remainder 0                        │
//! │                                                                         │
//! │  apply_delta(allocation, Decrement)                                     │
//! │    = Ledger {100:1, 50:3, 10:10}            total = 350                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! `allocate` is the ideal decomposition of an amount. It never looks at the
//! counts actually held; `apply_delta` is where holdings are checked,
//! according to the [`ShortfallPolicy`].
//!
//! The stored denominations are sorted descending once, in [`Ledger::new`],
//! and never reordered. Iteration direction is chosen per call through
//! [`AllocationOrder`].

use serde::{Deserialize, Serialize};
use tracing::{debug, error, warn};
use ts_rs::TS;

use crate::error::{ValidationError, VendingError, VendingResult};
use crate::money::Money;
use crate::types::{AllocationOrder, ShortfallPolicy};
use crate::validation::validate_denomination;

// =============================================================================
// Denomination
// =============================================================================

/// A denomination value and a piece count.
///
/// Used both for what the ledger holds and for what an allocation requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Denomination {
    /// Face value of one piece.
    pub value: Money,

    /// Number of pieces.
    pub count: i64,
}

impl Denomination {
    pub const fn new(value: Money, count: i64) -> Self {
        Denomination { value, count }
    }

    /// Face value times count.
    #[inline]
    pub const fn subtotal(&self) -> Money {
        self.value.times(self.count)
    }
}

// =============================================================================
// Allocation
// =============================================================================

/// Direction in which an allocation is applied to the ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    /// Add pieces to the ledger (refund returned to the reserve).
    Increment,
    /// Remove pieces from the ledger (inserted cash absorbed).
    Decrement,
}

/// The result of [`Ledger::allocate`].
///
/// `parts` contains every ledger denomination in the order it was
/// processed, including those with a count of zero.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Allocation {
    /// Amount that was decomposed.
    pub amount: Money,

    /// Order in which denominations were processed.
    pub order: AllocationOrder,

    /// Requested pieces per denomination.
    pub parts: Vec<Denomination>,

    /// Part of `amount` smaller than the smallest denomination.
    pub remainder: Money,
}

impl Allocation {
    /// Sum of `value × count` over all parts, excluding the remainder.
    pub fn allocated(&self) -> Money {
        self.parts.iter().map(Denomination::subtotal).sum()
    }

    /// True when the whole amount was expressed in denominations.
    pub fn is_exact(&self) -> bool {
        self.remainder.is_zero()
    }

    /// Requested count for a denomination value (0 when absent).
    pub fn count_of(&self, value: Money) -> i64 {
        self.parts
            .iter()
            .find(|d| d.value == value)
            .map_or(0, |d| d.count)
    }
}

// =============================================================================
// Ledger
// =============================================================================

/// The change reserve.
///
/// ## Invariants
/// - Denomination values are unique and positive
/// - Denominations are stored strictly descending by value
/// - Counts are non-negative unless a delta was applied with
///   [`ShortfallPolicy::AllowNegative`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, TS)]
#[ts(export)]
pub struct Ledger {
    denominations: Vec<Denomination>,
}

impl Ledger {
    /// Creates a ledger from starting denominations in any order.
    ///
    /// ## Errors
    /// - `Required` if no denominations are given
    /// - `MustBePositive` / `NegativeCount` for an invalid entry
    /// - `DuplicateDenomination` if a value appears twice
    /// - `Overflow` if the total does not fit in [`Money`]
    pub fn new(denominations: impl IntoIterator<Item = Denomination>) -> VendingResult<Self> {
        let mut denominations: Vec<Denomination> = denominations.into_iter().collect();

        if denominations.is_empty() {
            return Err(ValidationError::Required {
                field: "denominations".to_string(),
            }
            .into());
        }

        for d in &denominations {
            validate_denomination(d.value, d.count)?;
        }

        denominations.sort_by(|a, b| b.value.cmp(&a.value));

        if let Some(pair) = denominations.windows(2).find(|w| w[0].value == w[1].value) {
            return Err(ValidationError::DuplicateDenomination {
                value: pair[0].value,
            }
            .into());
        }

        if checked_total(&denominations).is_none() {
            return Err(ValidationError::Overflow {
                field: "denominations".to_string(),
            }
            .into());
        }

        Ok(Ledger { denominations })
    }

    /// Convenience constructor from `(value, count)` pairs.
    ///
    /// ## Example
    /// ```rust
    /// use vend_core::ledger::Ledger;
    ///
    /// let ledger = Ledger::from_pairs([(100, 2), (50, 4), (10, 10)]).unwrap();
    /// assert_eq!(ledger.total().units(), 500);
    /// ```
    pub fn from_pairs(pairs: impl IntoIterator<Item = (i64, i64)>) -> VendingResult<Self> {
        Self::new(
            pairs
                .into_iter()
                .map(|(value, count)| Denomination::new(Money::from_units(value), count)),
        )
    }

    /// Denominations, largest value first.
    pub fn denominations(&self) -> &[Denomination] {
        &self.denominations
    }

    /// Pieces held of a given value, or `None` if the ledger has no such
    /// denomination.
    pub fn count_of(&self, value: Money) -> Option<i64> {
        self.denominations
            .iter()
            .find(|d| d.value == value)
            .map(|d| d.count)
    }

    /// The smallest denomination value; the granularity of every amount
    /// the ledger can represent.
    pub fn smallest_value(&self) -> Money {
        // Non-empty and sorted descending by construction.
        self.denominations
            .last()
            .map_or(Money::zero(), |d| d.value)
    }

    /// Sum of `value × count` over all denominations.
    ///
    /// Never overflows: construction and every delta keep the total in range.
    pub fn total(&self) -> Money {
        self.denominations.iter().map(Denomination::subtotal).sum()
    }

    /// Decomposes `amount` into denomination counts.
    ///
    /// For each denomination in `order`: `count = remaining / value`,
    /// `remaining %= value`. Holdings are not consulted.
    ///
    /// ## Errors
    /// `InvariantViolation` if `amount` is negative.
    pub fn allocate(&self, amount: Money, order: AllocationOrder) -> VendingResult<Allocation> {
        if amount.is_negative() {
            error!(amount = amount.units(), "Allocation requested for a negative amount");
            return Err(VendingError::invariant(format!(
                "cannot allocate negative amount {amount}"
            )));
        }

        let mut remaining = amount;
        let mut parts = Vec::with_capacity(self.denominations.len());

        let mut take = |d: &Denomination| {
            let (count, rest) = remaining.split_into(d.value);
            remaining = rest;
            parts.push(Denomination::new(d.value, count));
        };

        match order {
            AllocationOrder::LargestFirst => self.denominations.iter().for_each(&mut take),
            AllocationOrder::SmallestFirst => self.denominations.iter().rev().for_each(&mut take),
        }

        debug!(
            amount = amount.units(),
            ?order,
            remainder = remaining.units(),
            "Allocated amount across denominations"
        );

        Ok(Allocation {
            amount,
            order,
            parts,
            remainder: remaining,
        })
    }

    /// Checks whether `allocation` could be applied in `direction` without
    /// driving any count below zero. Never mutates.
    pub fn can_apply(&self, allocation: &Allocation, direction: Direction) -> bool {
        self.check_delta(allocation, direction, ShortfallPolicy::Reject)
            .is_ok()
    }

    /// Adds or subtracts the allocation's counts.
    ///
    /// Parts with a count of zero are skipped. All parts are checked before
    /// any count changes, so an `Err` leaves the ledger untouched.
    ///
    /// ## Errors
    /// - `InvariantViolation` if a part names a value the ledger lacks
    /// - `DenominationShortfall` if a decrement would go below zero under
    ///   [`ShortfallPolicy::Reject`]
    pub fn apply_delta(
        &mut self,
        allocation: &Allocation,
        direction: Direction,
        policy: ShortfallPolicy,
    ) -> VendingResult<()> {
        self.check_delta(allocation, direction, policy)?;

        for part in allocation.parts.iter().filter(|p| p.count > 0) {
            // Presence checked above.
            let Some(held) = self.denominations.iter_mut().find(|d| d.value == part.value) else {
                continue;
            };

            match direction {
                Direction::Increment => held.count += part.count,
                Direction::Decrement => held.count -= part.count,
            }

            if held.count < 0 {
                warn!(
                    value = held.value.units(),
                    count = held.count,
                    "Denomination count went negative"
                );
            }
        }

        debug!(?direction, total = self.total().units(), "Applied ledger delta");
        Ok(())
    }

    fn check_delta(
        &self,
        allocation: &Allocation,
        direction: Direction,
        policy: ShortfallPolicy,
    ) -> VendingResult<()> {
        for part in allocation.parts.iter().filter(|p| p.count > 0) {
            let Some(held) = self.count_of(part.value) else {
                error!(
                    value = part.value.units(),
                    "Allocation names a denomination the ledger does not hold"
                );
                return Err(VendingError::invariant(format!(
                    "allocation names denomination {} which the ledger does not hold",
                    part.value
                )));
            };

            if direction == Direction::Decrement
                && policy == ShortfallPolicy::Reject
                && held < part.count
            {
                return Err(VendingError::DenominationShortfall {
                    value: part.value,
                    held,
                    requested: part.count,
                });
            }
        }

        if self.projected_total(allocation, direction).is_none() {
            error!(
                amount = allocation.amount.units(),
                ?direction,
                "Ledger total would leave the money range"
            );
            return Err(VendingError::invariant(format!(
                "applying {} as {:?} overflows the ledger total",
                allocation.amount, direction
            )));
        }

        Ok(())
    }

    /// Total after applying `allocation`, or `None` on overflow.
    fn projected_total(&self, allocation: &Allocation, direction: Direction) -> Option<Money> {
        self.denominations
            .iter()
            .try_fold(Money::zero(), |acc, held| {
                let delta = allocation.count_of(held.value);
                let count = match direction {
                    Direction::Increment => held.count.checked_add(delta)?,
                    Direction::Decrement => held.count.checked_sub(delta)?,
                };
                acc.checked_add(held.value.checked_times(count)?)
            })
    }
}

/// Sum of `value × count`, or `None` on overflow.
fn checked_total(denominations: &[Denomination]) -> Option<Money> {
    denominations
        .iter()
        .try_fold(Money::zero(), |acc, d| acc.checked_add(d.value.checked_times(d.count)?))
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

    fn sample() -> Ledger {
        Ledger::from_pairs([(10, 10), (100, 2), (50, 4)]).unwrap()
    }

    #[test]
    fn test_new_sorts_descending() {
        let ledger = sample();
        let values: Vec<i64> = ledger.denominations().iter().map(|d| d.value.units()).collect();
        assert_eq!(values, vec![100, 50, 10]);
        assert_eq!(ledger.total(), m(500));
        assert_eq!(ledger.smallest_value(), m(10));
    }

    #[test]
    fn test_new_rejects_bad_input() {
        assert!(Ledger::from_pairs(Vec::<(i64, i64)>::new()).is_err());
        assert!(matches!(
            Ledger::from_pairs([(100, 1), (100, 2)]),
            Err(VendingError::Validation(ValidationError::DuplicateDenomination { .. }))
        ));
        assert!(matches!(
            Ledger::from_pairs([(100, -1)]),
            Err(VendingError::Validation(ValidationError::NegativeCount { .. }))
        ));
        assert!(matches!(
            Ledger::from_pairs([(0, 1)]),
            Err(VendingError::Validation(ValidationError::MustBePositive { .. }))
        ));
    }

    #[test]
    fn test_allocate_largest_first() {
        let ledger = sample();
        let allocation = ledger.allocate(m(380), AllocationOrder::LargestFirst).unwrap();

        assert_eq!(allocation.count_of(m(100)), 3);
        assert_eq!(allocation.count_of(m(50)), 1);
        assert_eq!(allocation.count_of(m(10)), 3);
        assert_eq!(allocation.allocated(), m(380));
        assert!(allocation.is_exact());
    }

    #[test]
    fn test_allocate_ignores_holdings() {
        // Only two 100s are held, but the ideal decomposition asks for ten.
        let ledger = sample();
        let allocation = ledger.allocate(m(1000), AllocationOrder::LargestFirst).unwrap();
        assert_eq!(allocation.count_of(m(100)), 10);
    }

    #[test]
    fn test_allocate_smallest_first_leaves_storage_order() {
        let ledger = sample();
        let allocation = ledger.allocate(m(150), AllocationOrder::SmallestFirst).unwrap();

        assert_eq!(allocation.parts[0].value, m(10));
        assert_eq!(allocation.count_of(m(10)), 15);
        assert_eq!(allocation.count_of(m(100)), 0);

        // Stored order is unaffected, so the next canonical allocation still works.
        assert_eq!(ledger.denominations()[0].value, m(100));
        let canonical = ledger.allocate(m(150), AllocationOrder::LargestFirst).unwrap();
        assert_eq!(canonical.count_of(m(100)), 1);
        assert_eq!(canonical.count_of(m(50)), 1);
    }

    #[test]
    fn test_allocate_remainder_and_zero() {
        let ledger = sample();

        let allocation = ledger.allocate(m(155), AllocationOrder::LargestFirst).unwrap();
        assert_eq!(allocation.remainder, m(5));
        assert_eq!(allocation.allocated() + allocation.remainder, m(155));

        let zero = ledger.allocate(m(0), AllocationOrder::LargestFirst).unwrap();
        assert!(zero.parts.iter().all(|p| p.count == 0));
        assert!(zero.is_exact());
    }

    #[test]
    fn test_allocate_negative_is_invariant_violation() {
        let ledger = sample();
        let err = ledger.allocate(m(-10), AllocationOrder::LargestFirst).unwrap_err();
        assert!(err.is_invariant_violation());
    }

    #[test]
    fn test_apply_delta_decrement_and_increment() {
        let mut ledger = sample();
        let allocation = ledger.allocate(m(150), AllocationOrder::LargestFirst).unwrap();

        ledger
            .apply_delta(&allocation, Direction::Decrement, ShortfallPolicy::Reject)
            .unwrap();
        assert_eq!(ledger.total(), m(350));
        assert_eq!(ledger.count_of(m(100)), Some(1));
        assert_eq!(ledger.count_of(m(50)), Some(3));

        ledger
            .apply_delta(&allocation, Direction::Increment, ShortfallPolicy::Reject)
            .unwrap();
        assert_eq!(ledger, sample());
    }

    #[test]
    fn test_apply_delta_reject_leaves_ledger_untouched() {
        let mut ledger = sample();
        // 50 pieces are fine, 100 pieces are short: nothing may change.
        let allocation = ledger.allocate(m(350), AllocationOrder::LargestFirst).unwrap();
        assert!(!ledger.can_apply(&allocation, Direction::Decrement));

        let err = ledger
            .apply_delta(&allocation, Direction::Decrement, ShortfallPolicy::Reject)
            .unwrap_err();
        assert_eq!(
            err,
            VendingError::DenominationShortfall {
                value: m(100),
                held: 2,
                requested: 3
            }
        );
        assert_eq!(ledger, sample());
    }

    #[test]
    fn test_apply_delta_allow_negative() {
        let mut ledger = sample();
        let allocation = ledger.allocate(m(300), AllocationOrder::LargestFirst).unwrap();

        ledger
            .apply_delta(&allocation, Direction::Decrement, ShortfallPolicy::AllowNegative)
            .unwrap();
        assert_eq!(ledger.count_of(m(100)), Some(-1));
        assert_eq!(ledger.total(), m(200));
    }

    #[test]
    fn test_new_rejects_overflowing_total() {
        let err = Ledger::from_pairs([(1000, i64::MAX / 10)]).unwrap_err();
        assert!(matches!(
            err,
            VendingError::Validation(ValidationError::Overflow { .. })
        ));

        // Each subtotal fits, the sum does not.
        assert!(Ledger::from_pairs([(100, i64::MAX / 100), (50, i64::MAX / 50)]).is_err());
    }

    #[test]
    fn test_apply_delta_overflow_is_invariant_violation() {
        let mut ledger = Ledger::from_pairs([(1000, 0), (10, 0)]).unwrap();
        let huge = ledger
            .allocate(m(9_000_000_000_000_000_000), AllocationOrder::LargestFirst)
            .unwrap();

        ledger
            .apply_delta(&huge, Direction::Decrement, ShortfallPolicy::AllowNegative)
            .unwrap();
        let before = ledger.clone();

        let err = ledger
            .apply_delta(&huge, Direction::Decrement, ShortfallPolicy::AllowNegative)
            .unwrap_err();

        assert!(err.is_invariant_violation());
        assert_eq!(ledger, before);
        assert_eq!(ledger.total(), m(-9_000_000_000_000_000_000));
    }

    #[test]
    fn test_apply_delta_unknown_denomination() {
        let mut ledger = sample();
        let foreign = Allocation {
            amount: m(500),
            order: AllocationOrder::LargestFirst,
            parts: vec![Denomination::new(m(500), 1)],
            remainder: m(0),
        };
        let err = ledger
            .apply_delta(&foreign, Direction::Increment, ShortfallPolicy::Reject)
            .unwrap_err();
        assert!(err.is_invariant_violation());
        assert_eq!(ledger, sample());
    }
}
