//! Payables and receivables.
//!
//! This module implements the ledger entry model and its lifecycle:
//! - Entry types shared by payables and receivables
//! - Stored vs. derived (display) status
//! - Payment recording and cancellation rules
//! - Error types for ledger updates

pub mod entry;
pub mod error;
pub mod state;

#[cfg(test)]
mod state_props;

pub use entry::{
    DisplayStatus, EntryKind, LedgerEntry, LedgerEntryDraft, LedgerKind, StoredStatus,
    fixed_cost_code, fixed_cost_from_code,
};
pub use error::LedgerError;
pub use state::{DerivedStatus, EntryUpdate, LedgerStateMachine, PaymentState, Transition};
