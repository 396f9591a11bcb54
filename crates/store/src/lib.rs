//! Tenant-scoped storage and the ledger book service.
//!
//! This crate provides:
//! - Repository abstractions for ledger entries and reference names
//! - In-memory implementations guarded by async locks
//! - `LedgerBook`, which wires the planner, the state machine and the
//!   period aggregator to a repository

pub mod book;
pub mod error;
pub mod repositories;

pub use book::{EntryView, LedgerBook, PersistedPlan};
pub use error::StoreError;
pub use repositories::{
    EntryMutation, InMemoryDirectory, InMemoryLedgerRepository, LedgerFilter, LedgerRepository,
    ReferenceDirectory,
};
