//! Installment planning request and result types.

use caixa_shared::types::{CategoryId, CounterpartyId};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::ledger::{LedgerEntryDraft, LedgerKind, StoredStatus};

/// Default number of days between installments.
pub const DEFAULT_INTERVAL_DAYS: u32 = 30;

const fn default_installments() -> u32 {
    1
}

/// How due dates advance from one installment to the next.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "type", content = "days")]
pub enum RolloverPolicy {
    /// Add a fixed number of days to the previous due date.
    FixedInterval(u32),
    /// Same day of month, one calendar month later, clamped to month end.
    ///
    /// Offsets are taken from the first due date, so a plan starting on the
    /// 31st returns to the 31st in every month that has one.
    CalendarMonth,
}

/// How the booking date of each installment is chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryDatePolicy {
    /// Every installment keeps the plan's entry date.
    Fixed,
    /// The entry date advances by the same offset as the due date.
    FollowDueDate,
}

impl EntryDatePolicy {
    /// Payables book each installment in the month it is due; receivables
    /// keep the original booking date.
    #[must_use]
    pub const fn default_for(kind: LedgerKind) -> Self {
        match kind {
            LedgerKind::Payable => Self::FollowDueDate,
            LedgerKind::Receivable => Self::Fixed,
        }
    }
}

/// Input for generating an installment plan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstallmentPlanRequest {
    /// Payable or receivable.
    pub kind: LedgerKind,
    /// Supplier or customer.
    pub counterparty_id: CounterpartyId,
    /// Optional category.
    #[serde(default)]
    pub category_id: Option<CategoryId>,
    /// Base description; installments get a `" - Parcela i/N"` suffix.
    pub description: String,
    /// Total of the whole plan.
    #[serde(default)]
    pub total_amount: Option<Decimal>,
    /// Amount of each installment.
    #[serde(default)]
    pub installment_amount: Option<Decimal>,
    /// Number of installments.
    #[serde(default = "default_installments")]
    pub total_installments: u32,
    /// Booking date.
    pub entry_date: NaiveDate,
    /// Due date of the first installment.
    pub first_due_date: NaiveDate,
    /// Days between installments for the fixed-interval policy; the
    /// planner's configured default (30) when absent.
    #[serde(default)]
    pub installment_interval_days: Option<u32>,
    /// External reference copied to every installment.
    #[serde(default)]
    pub reference: Option<String>,
    /// Notes copied to every installment.
    #[serde(default)]
    pub notes: Option<String>,
    /// Fixed cost flag.
    #[serde(default)]
    pub is_fixed_cost: bool,
}

/// Input for creating a single entry directly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntryRequest {
    /// Payable or receivable.
    pub kind: LedgerKind,
    /// Supplier or customer.
    pub counterparty_id: CounterpartyId,
    /// Optional category.
    #[serde(default)]
    pub category_id: Option<CategoryId>,
    /// Description.
    pub description: String,
    /// Amount owed.
    pub total_amount: Decimal,
    /// Per-installment amount; defaults to `total_amount`.
    #[serde(default)]
    pub installment_amount: Option<Decimal>,
    /// Booking date.
    pub entry_date: NaiveDate,
    /// Due date.
    pub due_date: NaiveDate,
    /// Amount already paid.
    #[serde(default)]
    pub paid_amount: Option<Decimal>,
    /// Payment date.
    #[serde(default)]
    pub payment_date: Option<NaiveDate>,
    /// Explicit status; overrides the one derived from `paid_amount`.
    #[serde(default)]
    pub status: Option<StoredStatus>,
    /// External reference.
    #[serde(default)]
    pub reference: Option<String>,
    /// Notes.
    #[serde(default)]
    pub notes: Option<String>,
    /// Fixed cost flag.
    #[serde(default)]
    pub is_fixed_cost: bool,
}

/// A validated plan, ready to be persisted as one batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstallmentPlan {
    /// Drafts ordered by installment number.
    pub drafts: Vec<LedgerEntryDraft>,
    /// Total of the whole plan.
    pub total_amount: Decimal,
    /// Uniform amount of installments `1..N-1`.
    pub installment_amount: Decimal,
    /// Amount of installment `N`.
    pub last_installment_amount: Decimal,
    /// Number of installments.
    pub total_installments: u32,
}
