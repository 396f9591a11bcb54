//! Due date arithmetic.

use chrono::{Datelike, Days, Months, NaiveDate};

use super::types::{EntryDatePolicy, RolloverPolicy};

/// Returns the date `offset` steps after `start` under the given policy.
///
/// Calendar-month steps are always measured from `start`, never chained from
/// the previous (possibly clamped) date. Returns `None` past the end of the
/// supported calendar.
#[must_use]
pub fn nth_date(start: NaiveDate, policy: RolloverPolicy, offset: u32) -> Option<NaiveDate> {
    match policy {
        RolloverPolicy::FixedInterval(days) => {
            start.checked_add_days(Days::new(u64::from(days) * u64::from(offset)))
        }
        RolloverPolicy::CalendarMonth => start.checked_add_months(Months::new(offset)),
    }
}

/// Due and entry dates for installment `offset + 1` of a plan.
#[must_use]
pub fn installment_dates(
    entry_date: NaiveDate,
    first_due_date: NaiveDate,
    rollover: RolloverPolicy,
    entry_dates: EntryDatePolicy,
    offset: u32,
) -> Option<(NaiveDate, NaiveDate)> {
    let due_date = nth_date(first_due_date, rollover, offset)?;
    let entry_date = match entry_dates {
        EntryDatePolicy::Fixed => entry_date,
        EntryDatePolicy::FollowDueDate => nth_date(entry_date, rollover, offset)?,
    };
    Some((entry_date, due_date))
}

/// Due date of the next monthly billing cycle for a billing day.
///
/// If the billing day has not passed yet this month it is used; otherwise the
/// cycle moves to next month. Days past the end of a shorter month clamp to
/// its last day. Returns `None` for a billing day outside `1..=31`.
#[must_use]
pub fn next_billing_date(today: NaiveDate, billing_day: u32) -> Option<NaiveDate> {
    if !(1..=31).contains(&billing_day) {
        return None;
    }
    let month_start = today.with_day(1)?;
    let this_month = clamp_to_month(month_start, billing_day)?;
    if this_month >= today {
        return Some(this_month);
    }
    clamp_to_month(month_start.checked_add_months(Months::new(1))?, billing_day)
}

fn clamp_to_month(month_start: NaiveDate, day: u32) -> Option<NaiveDate> {
    let last = month_start
        .checked_add_months(Months::new(1))?
        .pred_opt()?;
    month_start.with_day(day.min(last.day()))
}
