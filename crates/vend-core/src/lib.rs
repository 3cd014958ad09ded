//! # vend-core: Coin Accounting for a Vending Machine
//!
//! Tracks inserted money, keeps the machine's change reserve by
//! denomination, validates selections against the balance, and logs every
//! transaction. Pure logic with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                          Vend Architecture                              │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │         Presentation layer (terminal host, UI, ...)             │   │
//! │  │    Item buttons ──► Amount input ──► Return button ──► Board    │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                ★ vend-core (THIS CRATE) ★                        │   │
//! │  │                                                                 │   │
//! │  │                      VendingMachine (facade)                    │   │
//! │  │        ┌───────────────┬──────┴───────┬───────────────┐         │   │
//! │  │   ┌────┴────┐   ┌──────┴──────┐  ┌────┴────┐   ┌──────┴─────┐   │   │
//! │  │   │ ledger  │   │   session   │  │ catalog │   │ event_log  │   │   │
//! │  │   │ Ledger  │   │ Transaction │  │ Catalog │   │  EventLog  │   │   │
//! │  │   │ allocate│   │   Session   │  │  Item   │   │   Event    │   │   │
//! │  │   └─────────┘   └─────────────┘  └─────────┘   └────────────┘   │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO PERSISTENCE • NO LOCKING                          │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`money`] - Money type with integer arithmetic
//! - [`ledger`] - Denomination reserve and change allocation
//! - [`session`] - Inserted money and selected total rules
//! - [`event_log`] - Append-only transaction history
//! - [`catalog`] - Purchasable items
//! - [`facade`] - `VendingMachine`, the public entry point
//! - [`types`] - Policies and read models
//! - [`error`] - Domain error types
//! - [`validation`] - Input validation
//!
//! ## Invariants
//!
//! 1. **Validate, then mutate**: a failed operation leaves every piece of
//!    state exactly as it was
//! 2. **Conservation**: the reserve changes only on insertion (down) and
//!    refund (up); selecting an item never touches it
//! 3. **Append-only history**: events are never edited or removed
//!
//! ## Example Usage
//!
//! ```rust
//! use vend_core::{Money, VendingError, VendingMachine};
//!
//! let mut machine = VendingMachine::builder()
//!     .denomination(100, 2)
//!     .denomination(50, 4)
//!     .denomination(10, 10)
//!     .item("water", 50)
//!     .build()
//!     .unwrap();
//!
//! // Below the 10-unit minimum: rejected, nothing changes.
//! assert!(matches!(
//!     machine.insert_money(Money::from_units(5)),
//!     Err(VendingError::Validation(_))
//! ));
//!
//! machine.insert_money(Money::from_units(100)).unwrap();
//! assert!(machine.can_afford(Money::from_units(50)));
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod catalog;
pub mod error;
pub mod event_log;
pub mod facade;
pub mod ledger;
pub mod money;
pub mod session;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use catalog::{Catalog, CatalogItem};
pub use error::{ValidationError, VendingError, VendingResult};
pub use event_log::{Event, EventKind, EventLog};
pub use facade::{MachineBuilder, VendingMachine};
pub use ledger::{Allocation, Denomination, Direction, Ledger};
pub use money::Money;
pub use session::TransactionSession;
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Smallest amount a single insertion may carry, unless configured
/// otherwise through [`SessionOptions::min_insert`].
pub const MIN_INSERT_AMOUNT: i64 = 10;

/// Longest item name accepted by the catalog.
pub const MAX_ITEM_NAME_LEN: usize = 50;
