//! # Domain Types
//!
//! Policy switches and read models shared across the crate.
//!
//! ## Type Overview
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  Policies (chosen at construction)       Read models (for display)      │
//! │  ─────────────────────────────────       ─────────────────────────      │
//! │  AllocationOrder  LargestFirst           ItemAvailability               │
//! │                   SmallestFirst            name, price, selectable      │
//! │  ShortfallPolicy  Reject                                                │
//! │                   AllowNegative          MachineSnapshot                │
//! │  SelectionCarry   Retain                   balance, inserted, selected, │
//! │                   Reset                    ledger, availability, events │
//! │                                                                         │
//! │  SessionOptions = min_insert + ShortfallPolicy + SelectionCarry         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use ts_rs::TS;

use crate::error::ValidationError;
use crate::event_log::Event;
use crate::ledger::Denomination;
use crate::money::Money;
use crate::MIN_INSERT_AMOUNT;

// =============================================================================
// Allocation Order
// =============================================================================

/// Order in which [`Ledger::allocate`](crate::ledger::Ledger::allocate)
/// walks the denominations.
///
/// `LargestFirst` yields the canonical decomposition used for every
/// insertion and refund.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum AllocationOrder {
    #[default]
    LargestFirst,
    SmallestFirst,
}

// =============================================================================
// Shortfall Policy
// =============================================================================

/// What a ledger decrement does when the reserve lacks pieces.
///
/// ## Behavior
/// ```text
/// Ledger {100:2}, decrement {100:3}
///
///   Reject         → DenominationShortfall, ledger unchanged
///   AllowNegative  → Ledger {100:-1}, warning logged
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum ShortfallPolicy {
    /// Refuse the operation.
    #[default]
    Reject,
    /// Apply the delta and let counts go negative.
    AllowNegative,
}

impl fmt::Display for ShortfallPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShortfallPolicy::Reject => write!(f, "reject"),
            ShortfallPolicy::AllowNegative => write!(f, "allow_negative"),
        }
    }
}

impl FromStr for ShortfallPolicy {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "reject" => Ok(ShortfallPolicy::Reject),
            "allow_negative" | "allow-negative" => Ok(ShortfallPolicy::AllowNegative),
            _ => Err(ValidationError::NotAllowed {
                field: "shortfall".to_string(),
                allowed: vec!["reject".to_string(), "allow_negative".to_string()],
            }),
        }
    }
}

// =============================================================================
// Selection Carry
// =============================================================================

/// Whether the selected price total survives a return-change.
///
/// ## Why Both?
/// `Retain` keeps the running total across refunds, so a customer's later
/// refund is reduced by purchases made before the previous refund. If that
/// makes the refund negative, `return_change` reports an invariant
/// violation and changes nothing. `Reset` starts every post-refund
/// purchase from zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum SelectionCarry {
    #[default]
    Retain,
    Reset,
}

impl fmt::Display for SelectionCarry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SelectionCarry::Retain => write!(f, "retain"),
            SelectionCarry::Reset => write!(f, "reset"),
        }
    }
}

impl FromStr for SelectionCarry {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "retain" | "keep" => Ok(SelectionCarry::Retain),
            "reset" | "clear" => Ok(SelectionCarry::Reset),
            _ => Err(ValidationError::NotAllowed {
                field: "selection_carry".to_string(),
                allowed: vec!["retain".to_string(), "reset".to_string()],
            }),
        }
    }
}

// =============================================================================
// Session Options
// =============================================================================

/// Tunable business rules for a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct SessionOptions {
    /// Smallest amount accepted by a single insertion.
    pub min_insert: Money,

    /// Ledger behavior when the reserve lacks pieces.
    pub shortfall: ShortfallPolicy,

    /// Whether the selected total survives a return-change.
    pub selection_carry: SelectionCarry,
}

impl Default for SessionOptions {
    fn default() -> Self {
        SessionOptions {
            min_insert: Money::from_units(MIN_INSERT_AMOUNT),
            shortfall: ShortfallPolicy::default(),
            selection_carry: SelectionCarry::default(),
        }
    }
}

// =============================================================================
// Read Models
// =============================================================================

/// Whether a catalog item can currently be selected.
///
/// Advisory only: recomputed on every query and not enforced by
/// `select_item`, which applies its own balance guard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct ItemAvailability {
    pub name: String,
    pub price: Money,
    pub selectable: bool,
}

/// Everything the presentation layer needs to draw the machine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct MachineSnapshot {
    pub session_id: String,
    pub available_balance: Money,
    pub inserted_total: Money,
    pub last_inserted: Option<Money>,
    pub selected_total: Money,
    pub denominations: Vec<Denomination>,
    pub items: Vec<ItemAvailability>,
    pub events: Vec<Event>,
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_policy_defaults() {
        assert_eq!(AllocationOrder::default(), AllocationOrder::LargestFirst);
        assert_eq!(ShortfallPolicy::default(), ShortfallPolicy::Reject);
        assert_eq!(SelectionCarry::default(), SelectionCarry::Retain);

        let options = SessionOptions::default();
        assert_eq!(options.min_insert, Money::from_units(10));
    }

    #[test]
    fn test_policy_parsing() {
        assert_eq!("reject".parse::<ShortfallPolicy>().unwrap(), ShortfallPolicy::Reject);
        assert_eq!(
            "ALLOW_NEGATIVE".parse::<ShortfallPolicy>().unwrap(),
            ShortfallPolicy::AllowNegative
        );
        assert!("clamp".parse::<ShortfallPolicy>().is_err());

        assert_eq!("reset".parse::<SelectionCarry>().unwrap(), SelectionCarry::Reset);
        assert_eq!(" retain ".parse::<SelectionCarry>().unwrap(), SelectionCarry::Retain);
        assert!("forget".parse::<SelectionCarry>().is_err());
    }

    #[test]
    fn test_policy_display_round_trips() {
        for policy in [ShortfallPolicy::Reject, ShortfallPolicy::AllowNegative] {
            assert_eq!(policy.to_string().parse::<ShortfallPolicy>().unwrap(), policy);
        }
        for carry in [SelectionCarry::Retain, SelectionCarry::Reset] {
            assert_eq!(carry.to_string().parse::<SelectionCarry>().unwrap(), carry);
        }
    }

    #[test]
    fn test_policies_serialize_snake_case() {
        let json = serde_json::to_string(&ShortfallPolicy::AllowNegative).unwrap();
        assert_eq!(json, "\"allow_negative\"");
        let json = serde_json::to_string(&AllocationOrder::LargestFirst).unwrap();
        assert_eq!(json, "\"largest_first\"");
    }
}
