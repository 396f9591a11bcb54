//! Period aggregation service.
//!
//! Folds ledger entries handed over by the storage layer into report
//! structures. Every report reads the derived status through
//! [`LedgerStateMachine`], so an entry stored as pending but past due counts
//! as overdue. Cancelled entries never contribute to amounts.

use std::collections::{BTreeMap, HashMap};

use caixa_shared::types::{percentage_of, round_currency};
use chrono::{Days, NaiveDate};
use rust_decimal::Decimal;
use uuid::Uuid;

use super::error::ReportError;
use super::period::{DateRange, month_key, month_start};
use super::types::{
    BucketDate, CashFlowSummary, CategoriesSummary, DreItem, DrePolicy, DreReport, DreSection,
    ForecastDay, GroupKey, GroupTotal, LedgerSummary, MonthBucket, MonthTotal, MonthlyFlow,
};
use crate::ledger::{DisplayStatus, LedgerEntry, LedgerKind, LedgerStateMachine, StoredStatus};

/// Display names of categories and counterparties, keyed by id.
pub type NameLookup = HashMap<Uuid, String>;

/// Largest accepted forecast window.
pub const MAX_FORECAST_DAYS: u32 = 365;

const UNCATEGORIZED: &str = "Sem Categoria";
const MISC_REVENUE: &str = "Receitas Diversas";
const MISC_COSTS: &str = "Custos Diversos";
const MISC_EXPENSES: &str = "Despesas Diversas";

/// Stateless service for period reports.
pub struct PeriodAggregator;

impl PeriodAggregator {
    /// Per-month totals for every calendar month touched by `range`.
    ///
    /// Entries are placed by `bucket_date`; entries outside the range are
    /// ignored. Overdue amounts are only reported for months up to and
    /// including the current one.
    #[must_use]
    pub fn monthly_buckets(
        entries: &[LedgerEntry],
        range: &DateRange,
        today: NaiveDate,
        bucket_date: BucketDate,
    ) -> Vec<MonthBucket> {
        let current_month = month_start(today);
        let mut buckets: BTreeMap<NaiveDate, MonthBucket> = range
            .months()
            .into_iter()
            .map(|month| {
                let bucket = MonthBucket {
                    month: month_key(month),
                    ..MonthBucket::default()
                };
                (month, bucket)
            })
            .collect();

        for entry in entries {
            let date = match bucket_date {
                BucketDate::DueDate => entry.due_date,
                BucketDate::EntryDate => entry.entry_date,
            };
            if !range.contains(date) {
                continue;
            }
            let month = month_start(date);
            let Some(bucket) = buckets.get_mut(&month) else {
                continue;
            };

            let status = LedgerStateMachine::display_status(entry, today);
            if status == DisplayStatus::Cancelled {
                bucket.cancelled_count += 1;
                continue;
            }

            bucket.total_amount += entry.total_amount;
            bucket.total_count += 1;
            match status {
                DisplayStatus::Paid => {
                    bucket.paid_amount += entry.paid_amount;
                    bucket.paid_count += 1;
                }
                DisplayStatus::Pending | DisplayStatus::Overdue => {
                    let remaining = entry.remaining_amount();
                    bucket.pending_amount += remaining;
                    bucket.pending_count += 1;
                    if status == DisplayStatus::Overdue && month <= current_month {
                        bucket.overdue_amount += remaining;
                        bucket.overdue_count += 1;
                    }
                }
                DisplayStatus::Cancelled => {}
            }
        }

        buckets.into_values().collect()
    }

    /// Sum of `total_amount` per category or counterparty, largest first.
    ///
    /// Only entries due within `range` are counted (all entries when `None`).
    /// Percentages are relative to the sum over all groups and are zero when
    /// that sum is zero.
    #[must_use]
    pub fn breakdown(
        entries: &[LedgerEntry],
        key: GroupKey,
        names: &NameLookup,
        range: Option<&DateRange>,
    ) -> Vec<GroupTotal> {
        let mut groups: HashMap<Option<Uuid>, (Decimal, u32)> = HashMap::new();
        for entry in entries {
            if entry.status == StoredStatus::Cancelled
                || range.is_some_and(|r| !r.contains(entry.due_date))
            {
                continue;
            }
            let group_id = match key {
                GroupKey::Category => entry.category_id.map(|id| id.into_inner()),
                GroupKey::Counterparty => Some(entry.counterparty_id.into_inner()),
            };
            let group = groups.entry(group_id).or_insert((Decimal::ZERO, 0));
            group.0 += entry.total_amount;
            group.1 += 1;
        }

        let grand_total: Decimal = groups.values().map(|(amount, _)| *amount).sum();
        let mut totals: Vec<GroupTotal> = groups
            .into_iter()
            .map(|(group_id, (total_amount, count))| GroupTotal {
                group_id,
                label: group_label(key, group_id, names),
                total_amount,
                percentage: percentage_of(total_amount, grand_total),
                count,
            })
            .collect();
        totals.sort_by(|a, b| {
            b.total_amount
                .cmp(&a.total_amount)
                .then_with(|| a.label.cmp(&b.label))
        });
        totals
    }

    /// Income statement over paid entries due within `range`.
    ///
    /// Receivables are revenue. Payables whose category name is in the
    /// policy's cost list are cost of goods sold; every other payable is an
    /// operating expense. Percentages are relative to revenue.
    #[must_use]
    pub fn dre(
        entries: &[LedgerEntry],
        range: &DateRange,
        category_names: &NameLookup,
        policy: &DrePolicy,
    ) -> DreReport {
        let mut revenue: BTreeMap<String, Decimal> = BTreeMap::new();
        let mut costs: BTreeMap<String, Decimal> = BTreeMap::new();
        let mut expenses: BTreeMap<String, Decimal> = BTreeMap::new();

        for entry in entries {
            if entry.status != StoredStatus::Paid || !range.contains(entry.due_date) {
                continue;
            }
            let name = entry
                .category_id
                .and_then(|id| category_names.get(&id.into_inner()));
            let (group, fallback) = match entry.kind {
                LedgerKind::Receivable => (&mut revenue, MISC_REVENUE),
                LedgerKind::Payable if name.is_some_and(|n| policy.is_cost_category(n)) => {
                    (&mut costs, MISC_COSTS)
                }
                LedgerKind::Payable => (&mut expenses, MISC_EXPENSES),
            };
            let label = name.map_or_else(|| fallback.to_string(), Clone::clone);
            *group.entry(label).or_insert(Decimal::ZERO) += entry.total_amount;
        }

        let revenue_total: Decimal = revenue.values().sum();
        let cost_total: Decimal = costs.values().sum();
        let operational_expenses_total: Decimal = expenses.values().sum();

        let gross_profit = revenue_total - cost_total;
        let operational_result = gross_profit - operational_expenses_total;
        let financial_result = Decimal::ZERO;
        let result_before_taxes = operational_result + financial_result;
        let taxes = if result_before_taxes > Decimal::ZERO {
            round_currency(result_before_taxes * policy.tax_rate)
        } else {
            Decimal::ZERO
        };
        let net_result = result_before_taxes - taxes;

        let item = |description: &str, value: Decimal, level: u8| DreItem {
            description: description.to_string(),
            value,
            percentage: percentage_of(value, revenue_total),
            level,
        };
        let section = |title: &str, items: Vec<DreItem>, total: Decimal| DreSection {
            title: title.to_string(),
            items,
            total,
            level: 1,
        };
        let items_of = |group: BTreeMap<String, Decimal>| {
            let mut items: Vec<DreItem> = group
                .into_iter()
                .map(|(label, value)| item(&label, value, 3))
                .collect();
            items.sort_by(|a, b| b.value.cmp(&a.value));
            items
        };

        let sections = vec![
            section("RECEITA BRUTA", items_of(revenue), revenue_total),
            section("(-) CUSTO DOS PRODUTOS VENDIDOS", items_of(costs), cost_total),
            section(
                "LUCRO BRUTO",
                vec![item("Receita Bruta - Custo dos Produtos", gross_profit, 2)],
                gross_profit,
            ),
            section(
                "(-) DESPESAS OPERACIONAIS",
                items_of(expenses),
                operational_expenses_total,
            ),
            section(
                "RESULTADO OPERACIONAL",
                vec![item("Lucro Bruto - Despesas Operacionais", operational_result, 2)],
                operational_result,
            ),
            section(
                "RESULTADO LÍQUIDO",
                vec![
                    item("Resultado antes dos Impostos", result_before_taxes, 3),
                    item("(-) Impostos Estimados", taxes, 3),
                    item("Resultado Líquido Final", net_result, 2),
                ],
                net_result,
            ),
        ];

        DreReport {
            period: range.to_string(),
            sections,
            revenue_total,
            cost_total,
            gross_profit,
            operational_expenses_total,
            operational_result,
            financial_result,
            result_before_taxes,
            taxes,
            net_result,
        }
    }

    /// Expected balance for each of the `window` days after today.
    ///
    /// Only pending entries count, by their `total_amount`.
    ///
    /// # Errors
    ///
    /// Returns `InvalidForecastWindow` unless `1 <= window <= 365`.
    pub fn forecast(
        entries: &[LedgerEntry],
        today: NaiveDate,
        window: u32,
    ) -> Result<Vec<ForecastDay>, ReportError> {
        if !(1..=MAX_FORECAST_DAYS).contains(&window) {
            return Err(ReportError::InvalidForecastWindow(window));
        }

        let mut due: HashMap<NaiveDate, (Decimal, Decimal)> = HashMap::new();
        for entry in entries.iter().filter(|e| e.status == StoredStatus::Pending) {
            let day = due.entry(entry.due_date).or_insert((Decimal::ZERO, Decimal::ZERO));
            match entry.kind {
                LedgerKind::Receivable => day.0 += entry.total_amount,
                LedgerKind::Payable => day.1 += entry.total_amount,
            }
        }

        let mut balance = Decimal::ZERO;
        let mut days = Vec::with_capacity(window as usize);
        for offset in 1..=window {
            let Some(date) = today.checked_add_days(Days::new(u64::from(offset))) else {
                break;
            };
            let (receivables, payables) =
                due.get(&date).copied().unwrap_or((Decimal::ZERO, Decimal::ZERO));
            balance += receivables - payables;
            days.push(ForecastDay {
                date,
                receivables,
                payables,
                expected_balance: balance,
            });
        }
        Ok(days)
    }

    /// Receivable and payable totals by due date.
    ///
    /// Pending and overdue figures use `total_amount`, not the remaining
    /// amount.
    #[must_use]
    pub fn cash_flow_summary(
        entries: &[LedgerEntry],
        range: Option<&DateRange>,
        today: NaiveDate,
    ) -> CashFlowSummary {
        let mut summary = CashFlowSummary::default();
        for entry in entries {
            if entry.status == StoredStatus::Cancelled
                || range.is_some_and(|r| !r.contains(entry.due_date))
            {
                continue;
            }
            let pending = entry.status == StoredStatus::Pending;
            let overdue = LedgerStateMachine::is_overdue(entry, today);
            let (total, open, late) = match entry.kind {
                LedgerKind::Receivable => (
                    &mut summary.total_entries,
                    &mut summary.pending_receivables,
                    &mut summary.overdue_receivables,
                ),
                LedgerKind::Payable => (
                    &mut summary.total_exits,
                    &mut summary.pending_payables,
                    &mut summary.overdue_payables,
                ),
            };
            *total += entry.total_amount;
            if pending {
                *open += entry.total_amount;
            }
            if overdue {
                *late += entry.total_amount;
            }
        }
        summary.current_balance = summary.total_entries - summary.total_exits;
        summary
    }

    /// Summary of one ledger (payables or receivables).
    ///
    /// `by_month` groups by booking date.
    #[must_use]
    pub fn ledger_summary(entries: &[LedgerEntry], today: NaiveDate) -> LedgerSummary {
        let mut summary = LedgerSummary::default();
        let mut by_month: BTreeMap<String, Decimal> = BTreeMap::new();

        for entry in entries {
            let status = LedgerStateMachine::display_status(entry, today);
            if status == DisplayStatus::Cancelled {
                summary.cancelled_count += 1;
                continue;
            }
            summary.total_amount += entry.total_amount;
            summary.total_paid += entry.paid_amount;
            *by_month
                .entry(month_key(entry.entry_date))
                .or_insert(Decimal::ZERO) += entry.total_amount;

            match status {
                DisplayStatus::Paid => summary.paid_count += 1,
                DisplayStatus::Pending | DisplayStatus::Overdue => {
                    summary.pending_count += 1;
                    summary.total_pending += entry.remaining_amount();
                    if status == DisplayStatus::Overdue {
                        summary.overdue_count += 1;
                        summary.total_overdue += entry.remaining_amount();
                    }
                }
                DisplayStatus::Cancelled => {}
            }
        }

        summary.by_month = by_month
            .into_iter()
            .map(|(month, total)| MonthTotal { month, total })
            .collect();
        summary
    }

    /// Category breakdown of receivables and payables due within `range`,
    /// with a monthly entries/exits series.
    #[must_use]
    pub fn categories_summary(
        entries: &[LedgerEntry],
        range: &DateRange,
        category_names: &NameLookup,
    ) -> CategoriesSummary {
        let (receivables, payables): (Vec<LedgerEntry>, Vec<LedgerEntry>) = entries
            .iter()
            .filter(|e| e.status != StoredStatus::Cancelled)
            .cloned()
            .partition(|e| e.kind == LedgerKind::Receivable);

        let entries_by_category =
            Self::breakdown(&receivables, GroupKey::Category, category_names, Some(range));
        let exits_by_category =
            Self::breakdown(&payables, GroupKey::Category, category_names, Some(range));

        let monthly = range
            .months()
            .into_iter()
            .map(|month| {
                let in_month = |e: &&LedgerEntry| {
                    range.contains(e.due_date) && month_start(e.due_date) == month
                };
                MonthlyFlow {
                    month: month_key(month),
                    entries: receivables.iter().filter(in_month).map(|e| e.total_amount).sum(),
                    exits: payables.iter().filter(in_month).map(|e| e.total_amount).sum(),
                }
            })
            .collect();

        CategoriesSummary {
            total_entries: entries_by_category.iter().map(|g| g.total_amount).sum(),
            total_exits: exits_by_category.iter().map(|g| g.total_amount).sum(),
            entries: entries_by_category,
            exits: exits_by_category,
            monthly,
        }
    }
}

fn group_label(key: GroupKey, group_id: Option<Uuid>, names: &NameLookup) -> String {
    if let Some(name) = group_id.and_then(|id| names.get(&id)) {
        return name.clone();
    }
    match (key, group_id) {
        (GroupKey::Counterparty, Some(id)) => id.to_string(),
        _ => UNCATEGORIZED.to_string(),
    }
}
