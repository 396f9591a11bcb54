//! Tests for period aggregation.

use caixa_shared::types::{CategoryId, CounterpartyId, LedgerEntryId};
use chrono::NaiveDate;
use proptest::prelude::*;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use super::period::DateRange;
use super::service::{NameLookup, PeriodAggregator};
use super::types::{BucketDate, DrePolicy, GroupKey};
use crate::ledger::{EntryKind, LedgerEntry, LedgerKind, StoredStatus};

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn entry(kind: LedgerKind, amount: Decimal, due: NaiveDate, status: StoredStatus) -> LedgerEntry {
    LedgerEntry {
        id: LedgerEntryId::new(),
        kind,
        counterparty_id: CounterpartyId::new(),
        category_id: None,
        description: "Lançamento".to_string(),
        entry_kind: EntryKind::Cash,
        total_amount: amount,
        paid_amount: if status == StoredStatus::Paid {
            amount
        } else {
            Decimal::ZERO
        },
        entry_date: due,
        due_date: due,
        payment_date: None,
        status,
        installment_number: 1,
        total_installments: 1,
        installment_amount: amount,
        reference: None,
        notes: None,
        is_fixed_cost: false,
    }
}

fn with_category(mut e: LedgerEntry, category: CategoryId) -> LedgerEntry {
    e.category_id = Some(category);
    e
}

proptest! {
    /// Feature: period-aggregation, Category Percentage
    /// Percentages of all groups add up to 100 within rounding, and each
    /// is between 0 and 100.
    #[test]
    fn prop_category_percentages_total_100(
        amounts in prop::collection::vec(1i64..10_000_000, 1..12),
    ) {
        let entries: Vec<_> = amounts
            .iter()
            .map(|cents| {
                with_category(
                    entry(LedgerKind::Payable, Decimal::new(*cents, 2), date(2025, 1, 10), StoredStatus::Pending),
                    CategoryId::new(),
                )
            })
            .collect();

        let groups = PeriodAggregator::breakdown(&entries, GroupKey::Category, &NameLookup::new(), None);

        let total: Decimal = groups.iter().map(|g| g.percentage).sum();
        let tolerance = Decimal::new(i64::try_from(groups.len()).unwrap(), 2);
        prop_assert!((total - dec!(100)).abs() <= tolerance);
        for g in &groups {
            prop_assert!(g.percentage >= Decimal::ZERO && g.percentage <= dec!(100));
        }
        for pair in groups.windows(2) {
            prop_assert!(pair[0].total_amount >= pair[1].total_amount);
        }
    }
}

/// Feature: period-aggregation, Category Percentage
#[test]
fn test_category_percentage_split() {
    let a = CategoryId::new();
    let b = CategoryId::new();
    let names: NameLookup = [
        (a.into_inner(), "Vendas".to_string()),
        (b.into_inner(), "Serviços".to_string()),
    ]
    .into_iter()
    .collect();
    let due = date(2025, 3, 5);
    let entries = vec![
        with_category(entry(LedgerKind::Receivable, dec!(200), due, StoredStatus::Paid), a),
        with_category(entry(LedgerKind::Receivable, dec!(100), due, StoredStatus::Pending), a),
        with_category(entry(LedgerKind::Receivable, dec!(100), due, StoredStatus::Pending), b),
    ];

    let groups = PeriodAggregator::breakdown(&entries, GroupKey::Category, &names, None);

    assert_eq!(groups.len(), 2);
    assert_eq!(groups[0].label, "Vendas");
    assert_eq!(groups[0].total_amount, dec!(300));
    assert_eq!(groups[0].percentage, dec!(75.00));
    assert_eq!(groups[0].count, 2);
    assert_eq!(groups[1].label, "Serviços");
    assert_eq!(groups[1].percentage, dec!(25.00));
}

/// Feature: period-aggregation, Category Percentage
#[test]
fn test_category_percentage_zero_total() {
    let groups =
        PeriodAggregator::breakdown(&[], GroupKey::Category, &NameLookup::new(), None);
    assert!(groups.is_empty());

    let summary = PeriodAggregator::categories_summary(
        &[],
        &DateRange::new(date(2025, 1, 1), date(2025, 1, 31)).unwrap(),
        &NameLookup::new(),
    );
    assert_eq!(summary.total_entries, Decimal::ZERO);
    assert_eq!(summary.monthly.len(), 1);
}

#[test]
fn test_breakdown_uncategorized_and_counterparty() {
    let due = date(2025, 3, 5);
    let supplier = CounterpartyId::new();
    let mut first = entry(LedgerKind::Payable, dec!(50), due, StoredStatus::Pending);
    first.counterparty_id = supplier;
    let mut second = entry(LedgerKind::Payable, dec!(150), due, StoredStatus::Pending);
    second.counterparty_id = supplier;
    let cancelled = entry(LedgerKind::Payable, dec!(999), due, StoredStatus::Cancelled);
    let names: NameLookup = [(supplier.into_inner(), "Fornecedor A".to_string())]
        .into_iter()
        .collect();
    let entries = vec![first, second, cancelled];

    let by_category = PeriodAggregator::breakdown(&entries, GroupKey::Category, &names, None);
    assert_eq!(by_category.len(), 1);
    assert_eq!(by_category[0].label, "Sem Categoria");
    assert_eq!(by_category[0].group_id, None);
    assert_eq!(by_category[0].total_amount, dec!(200));

    let by_supplier = PeriodAggregator::breakdown(&entries, GroupKey::Counterparty, &names, None);
    assert_eq!(by_supplier[0].label, "Fornecedor A");
    assert_eq!(by_supplier[0].percentage, dec!(100.00));
}

/// Feature: period-aggregation, DRE Sign and Tax Floor
#[test]
fn test_dre_profit_and_tax() {
    let revenue = CategoryId::new();
    let raw_material = CategoryId::new();
    let rent = CategoryId::new();
    let names: NameLookup = [
        (revenue.into_inner(), "Vendas".to_string()),
        (raw_material.into_inner(), "Matéria Prima".to_string()),
        (rent.into_inner(), "Aluguel".to_string()),
    ]
    .into_iter()
    .collect();
    let due = date(2025, 4, 10);
    let entries = vec![
        with_category(entry(LedgerKind::Receivable, dec!(1000), due, StoredStatus::Paid), revenue),
        with_category(entry(LedgerKind::Payable, dec!(400), due, StoredStatus::Paid), raw_material),
        with_category(entry(LedgerKind::Payable, dec!(300), due, StoredStatus::Paid), rent),
        // Not paid: excluded.
        with_category(entry(LedgerKind::Payable, dec!(5000), due, StoredStatus::Pending), rent),
    ];
    let range = DateRange::new(date(2025, 4, 1), date(2025, 4, 30)).unwrap();

    let dre = PeriodAggregator::dre(&entries, &range, &names, &DrePolicy::default());

    assert_eq!(dre.revenue_total, dec!(1000));
    assert_eq!(dre.cost_total, dec!(400));
    assert_eq!(dre.gross_profit, dec!(600));
    assert_eq!(dre.operational_expenses_total, dec!(300));
    assert_eq!(dre.operational_result, dec!(300));
    assert_eq!(dre.result_before_taxes, dec!(300));
    assert_eq!(dre.taxes, dec!(30));
    assert_eq!(dre.net_result, dec!(270));
    assert_eq!(dre.period, "01/04/2025 a 30/04/2025");

    let titles: Vec<_> = dre.sections.iter().map(|s| s.title.as_str()).collect();
    assert_eq!(
        titles,
        vec![
            "RECEITA BRUTA",
            "(-) CUSTO DOS PRODUTOS VENDIDOS",
            "LUCRO BRUTO",
            "(-) DESPESAS OPERACIONAIS",
            "RESULTADO OPERACIONAL",
            "RESULTADO LÍQUIDO",
        ]
    );
    assert_eq!(dre.sections[1].items[0].description, "Matéria Prima");
    assert_eq!(dre.sections[1].items[0].percentage, dec!(40.00));
    assert_eq!(dre.sections[5].items[2].description, "Resultado Líquido Final");
    assert_eq!(dre.sections[5].items[2].percentage, dec!(27.00));
}

/// Feature: period-aggregation, DRE Sign and Tax Floor
#[test]
fn test_dre_negative_result_has_no_tax() {
    let due = date(2025, 4, 10);
    let entries = vec![
        entry(LedgerKind::Receivable, dec!(100), due, StoredStatus::Paid),
        entry(LedgerKind::Payable, dec!(250), due, StoredStatus::Paid),
    ];
    let range = DateRange::new(date(2025, 4, 1), date(2025, 4, 30)).unwrap();

    let dre = PeriodAggregator::dre(&entries, &range, &NameLookup::new(), &DrePolicy::default());

    assert_eq!(dre.operational_result, dec!(-150));
    assert_eq!(dre.taxes, Decimal::ZERO);
    assert_eq!(dre.net_result, dec!(-150));
    assert_eq!(dre.sections[0].items[0].description, "Receitas Diversas");
    assert_eq!(dre.sections[3].items[0].description, "Despesas Diversas");
}

#[test]
fn test_dre_without_revenue_has_zero_percentages() {
    let due = date(2025, 4, 10);
    let entries = vec![entry(LedgerKind::Payable, dec!(80), due, StoredStatus::Paid)];
    let range = DateRange::new(date(2025, 4, 1), date(2025, 4, 30)).unwrap();

    let dre = PeriodAggregator::dre(&entries, &range, &NameLookup::new(), &DrePolicy::default());

    assert!(dre
        .sections
        .iter()
        .flat_map(|s| &s.items)
        .all(|i| i.percentage == Decimal::ZERO));
}

#[test]
fn test_monthly_buckets_by_due_date() {
    let today = date(2025, 3, 15);
    let range = DateRange::new(date(2025, 2, 1), date(2025, 4, 30)).unwrap();
    let mut partial = entry(LedgerKind::Payable, dec!(100), date(2025, 3, 20), StoredStatus::Pending);
    partial.paid_amount = dec!(40);
    let entries = vec![
        entry(LedgerKind::Payable, dec!(50), date(2025, 2, 10), StoredStatus::Paid),
        entry(LedgerKind::Payable, dec!(70), date(2025, 2, 20), StoredStatus::Pending),
        entry(LedgerKind::Payable, dec!(30), date(2025, 3, 1), StoredStatus::Pending),
        partial,
        entry(LedgerKind::Payable, dec!(90), date(2025, 4, 2), StoredStatus::Pending),
        entry(LedgerKind::Payable, dec!(10), date(2025, 4, 3), StoredStatus::Cancelled),
        // Outside the range.
        entry(LedgerKind::Payable, dec!(1000), date(2025, 5, 1), StoredStatus::Pending),
    ];

    let buckets =
        PeriodAggregator::monthly_buckets(&entries, &range, today, BucketDate::DueDate);

    assert_eq!(buckets.len(), 3);
    let feb = &buckets[0];
    assert_eq!(feb.month, "2025-02");
    assert_eq!(feb.total_amount, dec!(120));
    assert_eq!(feb.paid_amount, dec!(50));
    assert_eq!(feb.pending_amount, dec!(70));
    assert_eq!(feb.overdue_amount, dec!(70));
    assert_eq!(feb.overdue_count, 1);

    let mar = &buckets[1];
    assert_eq!(mar.total_amount, dec!(130));
    assert_eq!(mar.pending_amount, dec!(90));
    assert_eq!(mar.overdue_amount, dec!(30));
    assert_eq!(mar.pending_count, 2);

    let apr = &buckets[2];
    assert_eq!(apr.total_amount, dec!(90));
    assert_eq!(apr.overdue_amount, Decimal::ZERO);
    assert_eq!(apr.cancelled_count, 1);
    assert_eq!(apr.total_count, 1);
}

#[test]
fn test_monthly_buckets_by_entry_date_never_overdue_in_future() {
    let today = date(2025, 3, 15);
    let range = DateRange::new(date(2025, 3, 1), date(2025, 4, 30)).unwrap();
    let mut booked_later = entry(LedgerKind::Payable, dec!(60), date(2025, 3, 1), StoredStatus::Pending);
    booked_later.entry_date = date(2025, 4, 5);

    let buckets =
        PeriodAggregator::monthly_buckets(&[booked_later], &range, today, BucketDate::EntryDate);

    assert_eq!(buckets[1].month, "2025-04");
    assert_eq!(buckets[1].pending_amount, dec!(60));
    assert_eq!(buckets[1].overdue_amount, Decimal::ZERO);
}

#[test]
fn test_forecast_running_balance() {
    let today = date(2025, 6, 1);
    let entries = vec![
        entry(LedgerKind::Receivable, dec!(500), date(2025, 6, 2), StoredStatus::Pending),
        entry(LedgerKind::Payable, dec!(200), date(2025, 6, 2), StoredStatus::Pending),
        entry(LedgerKind::Payable, dec!(400), date(2025, 6, 3), StoredStatus::Pending),
        // Paid and past entries do not count.
        entry(LedgerKind::Receivable, dec!(900), date(2025, 6, 3), StoredStatus::Paid),
        entry(LedgerKind::Receivable, dec!(900), date(2025, 5, 30), StoredStatus::Pending),
        // Today itself is outside the window.
        entry(LedgerKind::Receivable, dec!(900), today, StoredStatus::Pending),
    ];

    let forecast = PeriodAggregator::forecast(&entries, today, 3).unwrap();

    assert_eq!(forecast.len(), 3);
    assert_eq!(forecast[0].date, date(2025, 6, 2));
    assert_eq!(forecast[0].receivables, dec!(500));
    assert_eq!(forecast[0].payables, dec!(200));
    assert_eq!(forecast[0].expected_balance, dec!(300));
    assert_eq!(forecast[1].expected_balance, dec!(-100));
    assert_eq!(forecast[2].expected_balance, dec!(-100));
}

#[test]
fn test_forecast_window_bounds() {
    let today = date(2025, 6, 1);
    assert!(PeriodAggregator::forecast(&[], today, 0).is_err());
    assert!(PeriodAggregator::forecast(&[], today, 366).is_err());
    assert_eq!(PeriodAggregator::forecast(&[], today, 365).unwrap().len(), 365);
}

#[test]
fn test_cash_flow_summary() {
    let today = date(2025, 6, 15);
    let range = DateRange::month_containing(today);
    let entries = vec![
        entry(LedgerKind::Receivable, dec!(1000), date(2025, 6, 10), StoredStatus::Pending),
        entry(LedgerKind::Receivable, dec!(500), date(2025, 6, 20), StoredStatus::Paid),
        entry(LedgerKind::Payable, dec!(300), date(2025, 6, 1), StoredStatus::Pending),
        entry(LedgerKind::Payable, dec!(200), date(2025, 6, 30), StoredStatus::Pending),
        entry(LedgerKind::Payable, dec!(50), date(2025, 6, 30), StoredStatus::Cancelled),
        entry(LedgerKind::Payable, dec!(700), date(2025, 7, 1), StoredStatus::Pending),
    ];

    let summary = PeriodAggregator::cash_flow_summary(&entries, Some(&range), today);

    assert_eq!(summary.total_entries, dec!(1500));
    assert_eq!(summary.total_exits, dec!(500));
    assert_eq!(summary.current_balance, dec!(1000));
    assert_eq!(summary.pending_receivables, dec!(1000));
    assert_eq!(summary.overdue_receivables, dec!(1000));
    assert_eq!(summary.pending_payables, dec!(500));
    assert_eq!(summary.overdue_payables, dec!(300));

    let unbounded = PeriodAggregator::cash_flow_summary(&entries, None, today);
    assert_eq!(unbounded.total_exits, dec!(1200));
}

#[test]
fn test_ledger_summary_groups_by_entry_date() {
    let today = date(2025, 6, 15);
    let mut overdue = entry(LedgerKind::Receivable, dec!(100), date(2025, 6, 1), StoredStatus::Pending);
    overdue.entry_date = date(2025, 5, 20);
    overdue.paid_amount = dec!(25);
    let entries = vec![
        overdue,
        entry(LedgerKind::Receivable, dec!(200), date(2025, 6, 20), StoredStatus::Pending),
        entry(LedgerKind::Receivable, dec!(300), date(2025, 6, 5), StoredStatus::Paid),
        entry(LedgerKind::Receivable, dec!(400), date(2025, 6, 5), StoredStatus::Cancelled),
    ];

    let summary = PeriodAggregator::ledger_summary(&entries, today);

    assert_eq!(summary.total_amount, dec!(600));
    assert_eq!(summary.total_paid, dec!(325));
    assert_eq!(summary.total_pending, dec!(275));
    assert_eq!(summary.total_overdue, dec!(75));
    assert_eq!(summary.pending_count, 2);
    assert_eq!(summary.overdue_count, 1);
    assert_eq!(summary.paid_count, 1);
    assert_eq!(summary.cancelled_count, 1);
    assert_eq!(summary.by_month.len(), 2);
    assert_eq!(summary.by_month[0].month, "2025-05");
    assert_eq!(summary.by_month[0].total, dec!(100));
    assert_eq!(summary.by_month[1].total, dec!(500));
}

#[test]
fn test_categories_summary_monthly_series() {
    let range = DateRange::new(date(2025, 1, 1), date(2025, 2, 28)).unwrap();
    let entries = vec![
        entry(LedgerKind::Receivable, dec!(100), date(2025, 1, 10), StoredStatus::Paid),
        entry(LedgerKind::Payable, dec!(40), date(2025, 1, 11), StoredStatus::Pending),
        entry(LedgerKind::Payable, dec!(60), date(2025, 2, 11), StoredStatus::Pending),
        entry(LedgerKind::Receivable, dec!(999), date(2025, 3, 1), StoredStatus::Pending),
    ];

    let summary = PeriodAggregator::categories_summary(&entries, &range, &NameLookup::new());

    assert_eq!(summary.total_entries, dec!(100));
    assert_eq!(summary.total_exits, dec!(100));
    assert_eq!(summary.exits[0].label, "Sem Categoria");
    assert_eq!(summary.monthly.len(), 2);
    assert_eq!(summary.monthly[0].entries, dec!(100));
    assert_eq!(summary.monthly[0].exits, dec!(40));
    assert_eq!(summary.monthly[1].exits, dec!(60));
}
