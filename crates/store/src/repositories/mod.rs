//! Repository abstractions for data access.
//!
//! Repositories hide how entries and reference data are stored from the
//! orchestration layer. The in-memory implementations back the CLI and tests.

pub mod directory;
pub mod ledger;

pub use directory::{InMemoryDirectory, ReferenceDirectory};
pub use ledger::{EntryMutation, InMemoryLedgerRepository, LedgerFilter, LedgerRepository};
