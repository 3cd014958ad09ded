//! # Vending Machine Facade
//!
//! The public API the presentation layer talks to. Wires the ledger, the
//! transaction session, the catalog, and the event log together.
//!
//! ## Call Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Presentation layer                                                     │
//! │     │ insert_money / select_item / return_change                        │
//! │     ▼                                                                   │
//! │  VendingMachine ──────────────────────────────────────────────────────  │
//! │     │ 1. TransactionSession validates and mutates (ledger included)     │
//! │     │ 2. on success only: EventLog::record                              │
//! │     ▼                                                                   │
//! │  Event returned to caller      or      VendingError, nothing changed    │
//! │                                                                         │
//! │  Queries: available_balance, can_afford, availability, snapshot, ...    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Exclusive Access
//! Every mutation takes `&mut self`. A machine has no internal locking;
//! callers that share one across threads wrap it themselves.
//!
//! ## Example
//! ```rust
//! use vend_core::{Money, VendingMachine};
//!
//! let mut machine = VendingMachine::builder()
//!     .denomination(100, 2)
//!     .denomination(50, 4)
//!     .denomination(10, 10)
//!     .item("cola", 150)
//!     .build()
//!     .unwrap();
//!
//! machine.insert_money(Money::from_units(150)).unwrap();
//! assert_eq!(machine.available_balance().units(), 350);
//!
//! let event = machine.select_catalog_item("cola").unwrap();
//! assert_eq!(event.message, "cola selected");
//!
//! let event = machine.return_change().unwrap();
//! assert_eq!(event.message, "change of 0 returned");
//! ```

use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::catalog::{Catalog, CatalogItem};
use crate::error::{VendingError, VendingResult};
use crate::event_log::{Event, EventKind, EventLog};
use crate::ledger::{Denomination, Ledger};
use crate::money::Money;
use crate::session::TransactionSession;
use crate::types::{ItemAvailability, MachineSnapshot, SessionOptions};
use crate::validation::{parse_amount, validate_item_price, validate_min_insert};

/// One vending machine session.
#[derive(Debug, Clone)]
pub struct VendingMachine {
    session_id: String,
    ledger: Ledger,
    session: TransactionSession,
    catalog: Catalog,
    log: EventLog,
}

impl VendingMachine {
    /// Creates a machine from its initial reserve, catalog, and options.
    ///
    /// ## Errors
    /// `Validation` if `options.min_insert` is not positive or a catalog
    /// price is not a positive multiple of the smallest denomination.
    pub fn new(ledger: Ledger, catalog: Catalog, options: SessionOptions) -> VendingResult<Self> {
        validate_min_insert(options.min_insert)?;

        let unit = ledger.smallest_value();
        for item in &catalog {
            validate_item_price(item.price, unit)?;
        }

        let session_id = Uuid::new_v4().to_string();
        info!(
            session_id = %session_id,
            reserve = ledger.total().units(),
            items = catalog.len(),
            "Vending session started"
        );

        Ok(VendingMachine {
            session_id,
            ledger,
            session: TransactionSession::new(options),
            catalog,
            log: EventLog::new(),
        })
    }

    pub fn builder() -> MachineBuilder {
        MachineBuilder::default()
    }

    // =========================================================================
    // Mutations
    // =========================================================================

    /// Inserts cash.
    pub fn insert_money(&mut self, amount: Money) -> VendingResult<Event> {
        let result = self.session.insert_money(amount, &mut self.ledger);
        self.finish("insert_money", result)
    }

    /// Inserts cash typed as text by the customer.
    ///
    /// Non-numeric text fails with `ValidationError::NotNumeric`.
    pub fn insert_input(&mut self, input: &str) -> VendingResult<Event> {
        let amount = match parse_amount(input) {
            Ok(amount) => amount,
            Err(e) => return self.finish("insert_money", Err(e.into())),
        };
        self.insert_money(amount)
    }

    /// Selects an item by name and price.
    pub fn select_item(&mut self, name: &str, price: Money) -> VendingResult<Event> {
        let result = self.session.select_item(name, price, &self.ledger);
        self.finish("select_item", result)
    }

    /// Selects a catalog item by name, using its catalog price.
    pub fn select_catalog_item(&mut self, name: &str) -> VendingResult<Event> {
        let Some(price) = self.catalog.get(name).map(|item| item.price) else {
            return self.finish("select_item", Err(VendingError::UnknownItem(name.to_string())));
        };
        self.select_item(name, price)
    }

    /// Returns the unspent part of the inserted money.
    pub fn return_change(&mut self) -> VendingResult<Event> {
        let result = self.session.return_change(&mut self.ledger);
        self.finish("return_change", result)
    }

    // =========================================================================
    // Queries
    // =========================================================================

    /// Money currently held in the reserve.
    pub fn available_balance(&self) -> Money {
        self.ledger.total()
    }

    /// Advisory check: something has been inserted and the reserve covers
    /// `price`.
    pub fn can_afford(&self, price: Money) -> bool {
        self.session.has_inserted() && self.available_balance() >= price
    }

    /// Selectability of each catalog item, in catalog order.
    pub fn availability(&self) -> Vec<ItemAvailability> {
        self.catalog
            .iter()
            .map(|item| ItemAvailability {
                name: item.name.clone(),
                price: item.price,
                selectable: self.can_afford(item.price),
            })
            .collect()
    }

    pub fn event_log(&self) -> &[Event] {
        self.log.all()
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    pub fn options(&self) -> &SessionOptions {
        self.session.options()
    }

    pub fn inserted(&self) -> &[Money] {
        self.session.inserted()
    }

    pub fn inserted_total(&self) -> Money {
        self.session.inserted_total()
    }

    pub fn last_inserted(&self) -> Option<Money> {
        self.session.last_inserted()
    }

    pub fn selected_total(&self) -> Money {
        self.session.selected_total()
    }

    /// Full read model for rendering.
    pub fn snapshot(&self) -> MachineSnapshot {
        debug!(session_id = %self.session_id, "Building machine snapshot");
        MachineSnapshot {
            session_id: self.session_id.clone(),
            available_balance: self.available_balance(),
            inserted_total: self.inserted_total(),
            last_inserted: self.last_inserted(),
            selected_total: self.selected_total(),
            denominations: self.ledger.denominations().to_vec(),
            items: self.availability(),
            events: self.log.all().to_vec(),
        }
    }

    /// Records the event of a successful operation, or logs the failure.
    fn finish(&mut self, operation: &str, result: VendingResult<EventKind>) -> VendingResult<Event> {
        match result {
            Ok(kind) => {
                let event = self.log.record(kind);
                info!(
                    session_id = %self.session_id,
                    sequence = event.sequence,
                    message = %event.message,
                    balance = self.ledger.total().units(),
                    "Event recorded"
                );
                Ok(event)
            }
            Err(e) => {
                // Invariant violations were already logged at error level.
                if !e.is_invariant_violation() {
                    warn!(session_id = %self.session_id, operation, error = %e, "Operation rejected");
                }
                Err(e)
            }
        }
    }
}

// =============================================================================
// Builder
// =============================================================================

/// Step-by-step construction of a [`VendingMachine`].
#[derive(Debug, Clone, Default)]
pub struct MachineBuilder {
    denominations: Vec<Denomination>,
    items: Vec<CatalogItem>,
    options: SessionOptions,
}

impl MachineBuilder {
    /// Adds a denomination with its starting piece count.
    pub fn denomination(mut self, value: i64, count: i64) -> Self {
        self.denominations
            .push(Denomination::new(Money::from_units(value), count));
        self
    }

    /// Adds a catalog item.
    pub fn item(mut self, name: impl Into<String>, price: i64) -> Self {
        self.items.push(CatalogItem::new(name, Money::from_units(price)));
        self
    }

    pub fn options(mut self, options: SessionOptions) -> Self {
        self.options = options;
        self
    }

    pub fn build(self) -> VendingResult<VendingMachine> {
        let ledger = Ledger::new(self.denominations)?;
        let catalog = Catalog::new(self.items)?;
        VendingMachine::new(ledger, catalog, self.options)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
