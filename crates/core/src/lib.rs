//! Core business logic for Caixa.
//!
//! This crate contains pure business logic with ZERO web or database dependencies.
//! All domain types, validation rules, and calculations live here. "Today" is
//! always passed in by the caller.
//!
//! # Modules
//!
//! - `installment` - Installment plan generation and due date rollover
//! - `ledger` - Payable/receivable entries and their status lifecycle
//! - `reports` - Period aggregation (monthly buckets, breakdowns, DRE, forecast)

pub mod installment;
pub mod ledger;
pub mod reports;

pub use installment::{InstallmentError, InstallmentPlan, InstallmentPlanRequest, InstallmentPlanner};
pub use ledger::{LedgerEntry, LedgerError, LedgerStateMachine};
pub use reports::{PeriodAggregator, ReportError};
