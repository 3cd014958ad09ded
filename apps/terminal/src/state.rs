//! # Machine State
//!
//! Shared handle to the single `VendingMachine` the terminal drives.
//!
//! `VendingMachine` has no internal locking; every caller goes through
//! this handle so that one command runs against the machine at a time.

use std::sync::{Arc, Mutex, PoisonError};

use vend_core::VendingMachine;

/// Serialized access to one vending session.
///
/// `Arc` lets an embedding host hand clones to other threads; `Mutex`
/// keeps mutations exclusive.
#[derive(Debug, Clone)]
pub struct MachineState {
    machine: Arc<Mutex<VendingMachine>>,
}

impl MachineState {
    pub fn new(machine: VendingMachine) -> Self {
        MachineState {
            machine: Arc::new(Mutex::new(machine)),
        }
    }

    /// Executes a function with read access to the machine.
    ///
    /// ## Usage
    /// ```rust,ignore
    /// let balance = state.with_machine(|m| m.available_balance());
    /// ```
    pub fn with_machine<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&VendingMachine) -> R,
    {
        // A panic mid-command cannot leave partial state behind: every
        // core mutation validates before it writes.
        let machine = self.machine.lock().unwrap_or_else(PoisonError::into_inner);
        f(&machine)
    }

    /// Executes a function with write access to the machine.
    pub fn with_machine_mut<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&mut VendingMachine) -> R,
    {
        let mut machine = self.machine.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut machine)
    }
}
