//! Installment plan generation.
//!
//! This module turns a plan request into the ordered batch of ledger entry
//! drafts the storage layer commits together:
//! - Amount resolution with last-installment rounding
//! - Due date rollover policies (fixed interval, calendar month)
//! - Entry date policies per ledger kind
//! - Single ("cash") entry creation

pub mod error;
pub mod planner;
pub mod schedule;
pub mod types;

#[cfg(test)]
mod planner_props;

pub use error::InstallmentError;
pub use planner::{DEFAULT_MAX_INSTALLMENTS, InstallmentPlanner, PlanAmounts};
pub use schedule::{installment_dates, next_billing_date, nth_date};
pub use types::{
    DEFAULT_INTERVAL_DAYS, EntryDatePolicy, EntryRequest, InstallmentPlan, InstallmentPlanRequest,
    RolloverPolicy,
};
