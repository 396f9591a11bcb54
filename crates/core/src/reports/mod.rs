//! Period aggregation for financial reports.
//!
//! This module provides pure business logic for:
//! - Monthly buckets with derived status breakdowns
//! - Category and counterparty breakdowns with percentages
//! - DRE (income statement) over paid entries
//! - Cash-flow summary and forward forecast
//! - Ledger summaries and period presets

pub mod error;
pub mod period;
pub mod service;
pub mod types;

#[cfg(test)]
mod tests;

pub use error::ReportError;
pub use period::{DateRange, PeriodPreset, month_key, month_start};
pub use service::{MAX_FORECAST_DAYS, NameLookup, PeriodAggregator};
pub use types::*;
