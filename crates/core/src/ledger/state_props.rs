//! Property-based tests for ledger entry status rules.
//!
//! Feature: ledger-state, Derived Overdue

use caixa_shared::types::{CounterpartyId, LedgerEntryId};
use chrono::{Days, NaiveDate};
use proptest::prelude::*;
use rust_decimal::Decimal;

use super::entry::{DisplayStatus, EntryKind, LedgerEntry, LedgerKind, StoredStatus};
use super::state::LedgerStateMachine;

/// Strategy to generate a positive amount from 0.01 to 1,000,000.00.
fn positive_amount() -> impl Strategy<Value = Decimal> {
    (1i64..100_000_000i64).prop_map(|cents| Decimal::new(cents, 2))
}

/// Strategy to generate "today" between 2020 and 2030.
fn today_strategy() -> impl Strategy<Value = NaiveDate> {
    (0u64..3650).prop_map(|offset| {
        NaiveDate::from_ymd_opt(2020, 1, 1)
            .and_then(|d| d.checked_add_days(Days::new(offset)))
            .unwrap()
    })
}

fn kind_strategy() -> impl Strategy<Value = LedgerKind> {
    prop_oneof![Just(LedgerKind::Payable), Just(LedgerKind::Receivable)]
}

fn make_entry(kind: LedgerKind, total: Decimal, due: NaiveDate, status: StoredStatus) -> LedgerEntry {
    LedgerEntry {
        id: LedgerEntryId::new(),
        kind,
        counterparty_id: CounterpartyId::new(),
        category_id: None,
        description: "Entrada".to_string(),
        entry_kind: EntryKind::Cash,
        total_amount: total,
        paid_amount: Decimal::ZERO,
        entry_date: due,
        due_date: due,
        payment_date: None,
        status,
        installment_number: 1,
        total_installments: 1,
        installment_amount: total,
        reference: None,
        notes: None,
        is_fixed_cost: false,
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// A pending entry due yesterday is overdue.
    #[test]
    fn prop_pending_due_yesterday_is_overdue(
        kind in kind_strategy(),
        total in positive_amount(),
        today in today_strategy(),
    ) {
        let yesterday = today.pred_opt().unwrap();
        let entry = make_entry(kind, total, yesterday, StoredStatus::Pending);

        prop_assert!(LedgerStateMachine::is_overdue(&entry, today));
        prop_assert_eq!(LedgerStateMachine::display_status(&entry, today), DisplayStatus::Overdue);
    }

    /// A pending entry due tomorrow is not overdue.
    #[test]
    fn prop_pending_due_tomorrow_not_overdue(
        kind in kind_strategy(),
        total in positive_amount(),
        today in today_strategy(),
    ) {
        let tomorrow = today.succ_opt().unwrap();
        let entry = make_entry(kind, total, tomorrow, StoredStatus::Pending);

        prop_assert!(!LedgerStateMachine::is_overdue(&entry, today));
        prop_assert_eq!(LedgerStateMachine::display_status(&entry, today), DisplayStatus::Pending);
    }

    /// Paid and cancelled entries are never overdue.
    #[test]
    fn prop_closed_entries_never_overdue(
        kind in kind_strategy(),
        total in positive_amount(),
        today in today_strategy(),
        days_late in 0u64..2000,
        cancelled in any::<bool>(),
    ) {
        let due = today.checked_sub_days(Days::new(days_late)).unwrap();
        let status = if cancelled { StoredStatus::Cancelled } else { StoredStatus::Paid };
        let entry = make_entry(kind, total, due, status);

        prop_assert!(!LedgerStateMachine::is_overdue(&entry, today));
        prop_assert_ne!(LedgerStateMachine::display_status(&entry, today), DisplayStatus::Overdue);
    }

    /// Payment derivation matches the paid amount.
    ///
    /// *For any* total and non-negative paid amount, the entry is paid exactly
    /// when `paid >= total`, and the remaining amount is `total - paid`.
    #[test]
    fn prop_payment_derivation(
        total in positive_amount(),
        paid_cents in 0i64..200_000_000i64,
        today in today_strategy(),
    ) {
        let paid = Decimal::new(paid_cents, 2);
        let mut entry = make_entry(LedgerKind::Receivable, total, today, StoredStatus::Pending);

        let transition = LedgerStateMachine::record_payment(&mut entry, paid, None, today).unwrap();

        prop_assert_eq!(entry.status == StoredStatus::Paid, paid >= total);
        prop_assert_eq!(entry.payment_date.is_some(), paid > Decimal::ZERO && paid >= total);
        prop_assert_eq!(transition.overpaid, paid > total);
        prop_assert_eq!(entry.remaining_amount(), total - paid);
    }
}
