//! # Transaction Session
//!
//! Tracks money inserted by the customer and the prices of selected items,
//! and enforces the rules for inserting, selecting, and returning change.
//!
//! ## Operation Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     Session Operations                                  │
//! │                                                                         │
//! │  insert_money(150)                                                      │
//! │    validate amount ─► allocate(150) ─► ledger −{100:1, 50:1}            │
//! │    inserted = [150]                                                     │
//! │                                                                         │
//! │  select_item("cola", 150)                                               │
//! │    remaining = ledger.total − (selected + 150)  ─► must be ≥ 0          │
//! │    selected = 150                                                       │
//! │                                                                         │
//! │  return_change()                                                        │
//! │    refund = sum(inserted) − selected  ─► must be ≥ 0                    │
//! │    allocate(refund) ─► ledger +{…}                                      │
//! │    inserted = []          selected: kept or reset (SelectionCarry)      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Each operation checks everything that can fail before it changes any
//! field, and returns the [`EventKind`] the caller should record.

use serde::Serialize;
use tracing::error;

use crate::error::{ValidationError, VendingError, VendingResult};
use crate::event_log::EventKind;
use crate::ledger::{Direction, Ledger};
use crate::money::Money;
use crate::types::{AllocationOrder, SelectionCarry, SessionOptions};
use crate::validation::{validate_insert_amount, validate_item_name, validate_item_price};

/// Inserted amounts and selected price total for one customer session.
#[derive(Debug, Clone, Default, Serialize)]
pub struct TransactionSession {
    inserted: Vec<Money>,
    selected_total: Money,
    options: SessionOptions,
}

impl TransactionSession {
    pub fn new(options: SessionOptions) -> Self {
        TransactionSession {
            inserted: Vec::new(),
            selected_total: Money::zero(),
            options,
        }
    }

    pub fn options(&self) -> &SessionOptions {
        &self.options
    }

    /// Accepted insertions, oldest first.
    pub fn inserted(&self) -> &[Money] {
        &self.inserted
    }

    /// Sum of accepted insertions not yet refunded.
    ///
    /// `insert_money` refuses any insertion that would overflow this sum.
    pub fn inserted_total(&self) -> Money {
        self.inserted.iter().sum()
    }

    /// Most recent accepted insertion.
    pub fn last_inserted(&self) -> Option<Money> {
        self.inserted.last().copied()
    }

    pub fn has_inserted(&self) -> bool {
        !self.inserted.is_empty()
    }

    /// Running total of selected item prices.
    pub fn selected_total(&self) -> Money {
        self.selected_total
    }

    /// Accepts cash from the customer and absorbs it into the reserve.
    ///
    /// ## Errors
    /// - `Validation` if the amount is not positive, below the minimum, or
    ///   not a multiple of the smallest denomination
    /// - `DenominationShortfall` if the reserve cannot absorb it under
    ///   [`ShortfallPolicy::Reject`](crate::types::ShortfallPolicy::Reject)
    pub fn insert_money(&mut self, amount: Money, ledger: &mut Ledger) -> VendingResult<EventKind> {
        validate_insert_amount(amount, self.options.min_insert)?;

        let allocation = ledger.allocate(amount, AllocationOrder::LargestFirst)?;
        if !allocation.is_exact() {
            return Err(ValidationError::NotRepresentable {
                amount,
                unit: ledger.smallest_value(),
            }
            .into());
        }

        if self.inserted_total().checked_add(amount).is_none() {
            error!(
                inserted = self.inserted_total().units(),
                amount = amount.units(),
                "Inserted total would leave the money range"
            );
            return Err(VendingError::invariant(format!(
                "inserting {amount} overflows the inserted total"
            )));
        }

        // All-or-nothing; nothing else below can fail.
        ledger.apply_delta(&allocation, Direction::Decrement, self.options.shortfall)?;
        self.inserted.push(amount);

        Ok(EventKind::MoneyInserted { amount })
    }

    /// Adds an item's price to the selected total.
    ///
    /// The guard is `ledger.total() - (selected_total + price) >= 0`; a
    /// remainder of exactly zero is accepted. A sum that leaves the money
    /// range can never be covered and fails the same way. The name is
    /// trimmed before it is checked and recorded.
    ///
    /// ## Errors
    /// - `Validation` for an empty name, or a price that is not a positive
    ///   multiple of the smallest denomination
    /// - `InsufficientFunds` if the guard fails
    pub fn select_item(&mut self, name: &str, price: Money, ledger: &Ledger) -> VendingResult<EventKind> {
        let name = name.trim();
        validate_item_name(name)?;
        validate_item_price(price, ledger.smallest_value())?;

        let available = ledger.total();
        let committed = self.selected_total.checked_add(price);
        let remaining = committed.and_then(|total| available.checked_sub(total));

        let covered = remaining.is_some_and(|r| !r.is_negative());
        let Some(committed) = committed.filter(|_| covered) else {
            return Err(VendingError::InsufficientFunds {
                item: name.to_string(),
                price,
                available,
                committed: self.selected_total,
            });
        };

        self.selected_total = committed;

        Ok(EventKind::ItemSelected {
            name: name.to_string(),
            price,
        })
    }

    /// Pays back everything inserted minus the selected total.
    ///
    /// ## Errors
    /// `InvariantViolation` if the refund is negative or cannot be
    /// expressed in the ledger's denominations. Both mean an earlier guard
    /// let something through, so they are logged at error level.
    pub fn return_change(&mut self, ledger: &mut Ledger) -> VendingResult<EventKind> {
        let inserted_total = self.inserted_total();
        let refund = inserted_total - self.selected_total;

        if refund.is_negative() {
            error!(
                inserted = inserted_total.units(),
                selected = self.selected_total.units(),
                "Refund would be negative; selected total exceeds inserted money"
            );
            return Err(VendingError::invariant(format!(
                "refund of {refund} is negative (inserted {inserted_total}, selected {})",
                self.selected_total
            )));
        }

        let allocation = ledger.allocate(refund, AllocationOrder::LargestFirst)?;
        if !allocation.is_exact() {
            error!(
                refund = refund.units(),
                remainder = allocation.remainder.units(),
                "Refund cannot be paid in the ledger's denominations"
            );
            return Err(VendingError::invariant(format!(
                "refund of {refund} leaves unpayable remainder {}",
                allocation.remainder
            )));
        }

        ledger.apply_delta(&allocation, Direction::Increment, self.options.shortfall)?;
        self.inserted.clear();
        if self.options.selection_carry == SelectionCarry::Reset {
            self.selected_total = Money::zero();
        }

        Ok(EventKind::ChangeReturned { amount: refund })
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
