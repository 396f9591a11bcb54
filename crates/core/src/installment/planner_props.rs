//! Property-based tests for installment planning.

use caixa_shared::types::CounterpartyId;
use chrono::{Datelike, NaiveDate};
use proptest::prelude::*;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use super::planner::InstallmentPlanner;
use super::types::{EntryDatePolicy, InstallmentPlanRequest, RolloverPolicy};
use crate::ledger::{EntryKind, LedgerKind, StoredStatus};

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn request(total: Decimal, n: u32, first_due: NaiveDate) -> InstallmentPlanRequest {
    InstallmentPlanRequest {
        kind: LedgerKind::Receivable,
        counterparty_id: CounterpartyId::new(),
        category_id: None,
        description: "Mensalidade".to_string(),
        total_amount: Some(total),
        installment_amount: None,
        total_installments: n,
        entry_date: first_due,
        first_due_date: first_due,
        installment_interval_days: None,
        reference: None,
        notes: None,
        is_fixed_cost: false,
    }
}

/// Strategy to generate totals from 1.00 to 1,000,000.00.
fn total_strategy() -> impl Strategy<Value = Decimal> {
    (100i64..100_000_000i64).prop_map(|cents| Decimal::new(cents, 2))
}

fn rollover_strategy() -> impl Strategy<Value = RolloverPolicy> {
    prop_oneof![
        (1u32..=90).prop_map(RolloverPolicy::FixedInterval),
        Just(RolloverPolicy::CalendarMonth),
    ]
}

fn first_due_strategy() -> impl Strategy<Value = NaiveDate> {
    (2000i32..2100, 1u32..=12, 1u32..=31).prop_map(|(y, m, d)| {
        (0..4)
            .find_map(|back| NaiveDate::from_ymd_opt(y, m, d - back))
            .unwrap()
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// Feature: installment-planning, Sum Invariant
    /// For any total > 0 and 1 <= N <= 60 the amounts sum exactly to the
    /// total and only the last installment may differ from the uniform amount.
    #[test]
    fn prop_sum_invariant(
        total in total_strategy(),
        n in 1u32..=60,
        rollover in rollover_strategy(),
        first_due in first_due_strategy(),
    ) {
        prop_assume!(total >= Decimal::new(i64::from(n), 2));
        let planner = InstallmentPlanner::default();
        let plan = planner
            .plan(&request(total, n, first_due), rollover, EntryDatePolicy::Fixed)
            .unwrap();

        prop_assert_eq!(plan.drafts.len(), n as usize);
        let sum: Decimal = plan.drafts.iter().map(|d| d.installment_amount).sum();
        prop_assert_eq!(sum, total);

        let (last, rest) = plan.drafts.split_last().unwrap();
        for draft in rest {
            prop_assert_eq!(draft.installment_amount, plan.installment_amount);
        }
        prop_assert_eq!(last.installment_amount, plan.last_installment_amount);
        prop_assert!(last.installment_amount >= plan.installment_amount);
        prop_assert!(last.installment_amount - plan.installment_amount < Decimal::new(i64::from(n), 2));
    }

    /// Feature: installment-planning, Sum Invariant
    /// Every row carries its own amount and starts pending with nothing paid.
    #[test]
    fn prop_rows_are_pending_per_entry_amounts(
        total in total_strategy(),
        n in 1u32..=60,
    ) {
        prop_assume!(total >= Decimal::new(i64::from(n), 2));
        let planner = InstallmentPlanner::default();
        let plan = planner
            .plan(&request(total, n, date(2025, 1, 1)), RolloverPolicy::CalendarMonth, EntryDatePolicy::Fixed)
            .unwrap();

        for (i, draft) in plan.drafts.iter().enumerate() {
            prop_assert_eq!(draft.total_amount, draft.installment_amount);
            prop_assert_eq!(draft.paid_amount, Decimal::ZERO);
            prop_assert_eq!(draft.status, StoredStatus::Pending);
            prop_assert_eq!(draft.installment_number as usize, i + 1);
            prop_assert_eq!(draft.total_installments, n);
        }
    }

    /// Feature: installment-planning, Fixed-Interval Spacing
    /// Consecutive due dates are exactly `interval` days apart.
    #[test]
    fn prop_fixed_interval_spacing(
        n in 2u32..=60,
        interval in 1u32..=90,
        first_due in first_due_strategy(),
    ) {
        let planner = InstallmentPlanner::default();
        let plan = planner
            .plan(&request(dec!(10000), n, first_due), RolloverPolicy::FixedInterval(interval), EntryDatePolicy::Fixed)
            .unwrap();

        for pair in plan.drafts.windows(2) {
            prop_assert_eq!((pair[1].due_date - pair[0].due_date).num_days(), i64::from(interval));
        }
    }

    /// Feature: installment-planning, Month-End Rollover
    /// Calendar-month due dates land one month apart on the anchor day, or on
    /// the last day of the month when the anchor day does not exist.
    #[test]
    fn prop_calendar_month_keeps_anchor_day(
        n in 2u32..=60,
        first_due in first_due_strategy(),
    ) {
        let planner = InstallmentPlanner::default();
        let plan = planner
            .plan(&request(dec!(10000), n, first_due), RolloverPolicy::CalendarMonth, EntryDatePolicy::Fixed)
            .unwrap();

        let anchor = first_due.day();
        for pair in plan.drafts.windows(2) {
            let (prev, next) = (pair[0].due_date, pair[1].due_date);
            let months = (next.year() - prev.year()) * 12 + i32::try_from(next.month()).unwrap()
                - i32::try_from(prev.month()).unwrap();
            prop_assert_eq!(months, 1);
            let is_month_end = next.succ_opt().unwrap().month() != next.month();
            prop_assert!(next.day() == anchor || (next.day() < anchor && is_month_end));
        }
    }
}

/// Feature: installment-planning, N=1 Degeneracy
#[test]
fn test_single_installment_plan_is_cash_entry() {
    let planner = InstallmentPlanner::default();
    let plan = planner
        .plan(
            &request(dec!(1234.56), 1, date(2025, 6, 30)),
            RolloverPolicy::CalendarMonth,
            EntryDatePolicy::Fixed,
        )
        .unwrap();

    assert_eq!(plan.drafts.len(), 1);
    let draft = &plan.drafts[0];
    assert_eq!(draft.installment_number, 1);
    assert_eq!(draft.total_installments, 1);
    assert_eq!(draft.entry_kind, EntryKind::Cash);
    assert_eq!(draft.total_amount, dec!(1234.56));
    assert_eq!(draft.description, "Mensalidade");
}

/// Feature: installment-planning, Month-End Rollover
#[test]
fn test_month_end_rollover_leap_year() {
    let planner = InstallmentPlanner::default();
    let plan = planner
        .plan(
            &request(dec!(300), 3, date(2024, 1, 31)),
            RolloverPolicy::CalendarMonth,
            EntryDatePolicy::Fixed,
        )
        .unwrap();

    let due_dates: Vec<_> = plan.drafts.iter().map(|d| d.due_date).collect();
    assert_eq!(
        due_dates,
        vec![date(2024, 1, 31), date(2024, 2, 29), date(2024, 3, 31)]
    );
}

/// Feature: installment-planning, Fixed-Interval Spacing
#[test]
fn test_thirty_day_spacing() {
    let planner = InstallmentPlanner::default();
    let req = request(dec!(400), 4, date(2025, 1, 1));
    let plan = planner
        .plan(&req, planner.fixed_interval_policy(&req), EntryDatePolicy::Fixed)
        .unwrap();

    let due_dates: Vec<_> = plan.drafts.iter().map(|d| d.due_date).collect();
    assert_eq!(
        due_dates,
        vec![
            date(2025, 1, 1),
            date(2025, 1, 31),
            date(2025, 3, 2),
            date(2025, 4, 1),
        ]
    );
}
