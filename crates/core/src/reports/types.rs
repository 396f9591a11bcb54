//! Report types.

use caixa_shared::config::ReportsConfig;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Which date places an entry in a month.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BucketDate {
    /// Forecast-oriented reports.
    DueDate,
    /// Historical booking reports.
    EntryDate,
}

/// Grouping key for breakdowns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GroupKey {
    /// Group by category.
    Category,
    /// Group by supplier or customer.
    Counterparty,
}

/// Totals for one calendar month.
///
/// Pending covers every open entry; overdue is the subset past its due date.
/// Cancelled entries only contribute to `cancelled_count`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthBucket {
    /// `"YYYY-MM"`.
    pub month: String,
    /// Sum of `total_amount`.
    pub total_amount: Decimal,
    /// Sum of `paid_amount` over paid entries.
    pub paid_amount: Decimal,
    /// Remaining amount over open entries.
    pub pending_amount: Decimal,
    /// Remaining amount over overdue entries.
    pub overdue_amount: Decimal,
    /// Non-cancelled entries.
    pub total_count: u32,
    /// Paid entries.
    pub paid_count: u32,
    /// Open entries.
    pub pending_count: u32,
    /// Overdue entries.
    pub overdue_count: u32,
    /// Cancelled entries.
    pub cancelled_count: u32,
}

/// Total for one category or counterparty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupTotal {
    /// Category or counterparty id; `None` for uncategorized entries.
    pub group_id: Option<Uuid>,
    /// Display name.
    pub label: String,
    /// Sum of `total_amount`.
    pub total_amount: Decimal,
    /// Share of the grand total, 2 decimals.
    pub percentage: Decimal,
    /// Number of entries.
    pub count: u32,
}

/// DRE line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DreItem {
    /// Line label.
    pub description: String,
    /// Amount.
    pub value: Decimal,
    /// Share of revenue.
    pub percentage: Decimal,
    /// 1 = heading, 2 = subtotal, 3 = item.
    pub level: u8,
}

/// DRE section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DreSection {
    /// Section title.
    pub title: String,
    /// Lines.
    pub items: Vec<DreItem>,
    /// Section total.
    pub total: Decimal,
    /// Always 1.
    pub level: u8,
}

/// Income statement computed from paid entries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DreReport {
    /// `"dd/mm/yyyy a dd/mm/yyyy"`.
    pub period: String,
    /// Sections in presentation order.
    pub sections: Vec<DreSection>,
    /// Paid receivables.
    pub revenue_total: Decimal,
    /// Paid payables in cost-of-goods categories.
    pub cost_total: Decimal,
    /// Revenue minus cost.
    pub gross_profit: Decimal,
    /// Paid payables in every other category.
    pub operational_expenses_total: Decimal,
    /// Gross profit minus operating expenses.
    pub operational_result: Decimal,
    /// Always zero.
    pub financial_result: Decimal,
    /// Operational plus financial result.
    pub result_before_taxes: Decimal,
    /// Estimated taxes; zero unless the pre-tax result is positive.
    pub taxes: Decimal,
    /// Result after taxes.
    pub net_result: Decimal,
}

/// Classification rules for the DRE.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DrePolicy {
    /// Payable category names counted as cost of goods sold.
    pub cost_categories: Vec<String>,
    /// Flat rate applied to positive pre-tax results.
    pub tax_rate: Decimal,
}

impl DrePolicy {
    /// Builds the policy from report configuration.
    #[must_use]
    pub fn from_config(config: &ReportsConfig) -> Self {
        Self {
            cost_categories: config.cost_of_goods_categories.clone(),
            tax_rate: config.estimated_tax_rate,
        }
    }

    /// Returns true if the category name is a cost of goods category.
    #[must_use]
    pub fn is_cost_category(&self, name: &str) -> bool {
        self.cost_categories.iter().any(|c| c == name)
    }
}

impl Default for DrePolicy {
    fn default() -> Self {
        Self::from_config(&ReportsConfig::default())
    }
}

/// Expected cash position for one day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForecastDay {
    /// Day.
    pub date: NaiveDate,
    /// Pending receivables due that day.
    pub receivables: Decimal,
    /// Pending payables due that day.
    pub payables: Decimal,
    /// Running sum of receivables minus payables.
    pub expected_balance: Decimal,
}

/// Cash-flow totals by due date.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CashFlowSummary {
    /// Receivables.
    pub total_entries: Decimal,
    /// Payables.
    pub total_exits: Decimal,
    /// Entries minus exits.
    pub current_balance: Decimal,
    /// Open receivables.
    pub pending_receivables: Decimal,
    /// Open payables.
    pub pending_payables: Decimal,
    /// Overdue receivables.
    pub overdue_receivables: Decimal,
    /// Overdue payables.
    pub overdue_payables: Decimal,
}

/// Booked total for one month.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthTotal {
    /// `"YYYY-MM"`.
    pub month: String,
    /// Sum of `total_amount`.
    pub total: Decimal,
}

/// Payable or receivable summary.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerSummary {
    /// Sum of `total_amount` over non-cancelled entries.
    pub total_amount: Decimal,
    /// Sum of `paid_amount` over non-cancelled entries.
    pub total_paid: Decimal,
    /// Remaining amount over open entries.
    pub total_pending: Decimal,
    /// Remaining amount over overdue entries.
    pub total_overdue: Decimal,
    /// Open entries, overdue included.
    pub pending_count: u32,
    /// Paid entries.
    pub paid_count: u32,
    /// Overdue entries.
    pub overdue_count: u32,
    /// Cancelled entries.
    pub cancelled_count: u32,
    /// Totals by booking month, ascending.
    pub by_month: Vec<MonthTotal>,
}

/// Entries and exits for one month.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthlyFlow {
    /// `"YYYY-MM"`.
    pub month: String,
    /// Receivables due that month.
    pub entries: Decimal,
    /// Payables due that month.
    pub exits: Decimal,
}

/// Category breakdown of receivables and payables.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoriesSummary {
    /// Receivables by category, largest first.
    pub entries: Vec<GroupTotal>,
    /// Payables by category, largest first.
    pub exits: Vec<GroupTotal>,
    /// Sum of receivables.
    pub total_entries: Decimal,
    /// Sum of payables.
    pub total_exits: Decimal,
    /// Month series over the range.
    pub monthly: Vec<MonthlyFlow>,
}
