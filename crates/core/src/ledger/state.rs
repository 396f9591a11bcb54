//! Ledger entry lifecycle.
//!
//! Stored status is a tri-state (`pending`, `paid`, `cancelled`). Overdue is
//! derived on read from the stored status, the due date and "today", and every
//! report goes through [`LedgerStateMachine::display_status`].

use caixa_shared::types::CategoryId;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::entry::{DisplayStatus, LedgerEntry, StoredStatus};
use super::error::LedgerError;

/// Outcome of deriving status from recorded payments.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaymentState {
    /// Status implied by the paid amount.
    pub status: StoredStatus,
    /// Payment date implied by the paid amount.
    pub payment_date: Option<NaiveDate>,
}

/// Partial update of a ledger entry.
///
/// Absent fields are left untouched. An explicit `status` wins over the
/// status derived from `paid_amount` when both are present.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EntryUpdate {
    /// New description.
    pub description: Option<String>,
    /// New category.
    pub category_id: Option<CategoryId>,
    /// New amount owed.
    pub total_amount: Option<Decimal>,
    /// New absolute paid amount.
    pub paid_amount: Option<Decimal>,
    /// New booking date.
    pub entry_date: Option<NaiveDate>,
    /// New due date.
    pub due_date: Option<NaiveDate>,
    /// Payment date to record.
    pub payment_date: Option<NaiveDate>,
    /// Explicit status.
    pub status: Option<StoredStatus>,
    /// New notes.
    pub notes: Option<String>,
    /// New external reference.
    pub reference: Option<String>,
    /// New fixed cost flag.
    pub is_fixed_cost: Option<bool>,
}

impl EntryUpdate {
    /// Update that records an absolute paid amount.
    #[must_use]
    pub fn payment(paid_amount: Decimal, payment_date: Option<NaiveDate>) -> Self {
        Self {
            paid_amount: Some(paid_amount),
            payment_date,
            ..Self::default()
        }
    }

    /// Update that only sets the status.
    #[must_use]
    pub fn status(status: StoredStatus) -> Self {
        Self {
            status: Some(status),
            ..Self::default()
        }
    }

    fn touches_payment(&self) -> bool {
        self.paid_amount.is_some() || self.payment_date.is_some()
    }
}

/// Result of applying an update.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    /// Stored status before the update.
    pub from: StoredStatus,
    /// Stored status after the update.
    pub to: StoredStatus,
    /// Paid amount now exceeds the amount owed.
    pub overpaid: bool,
    /// A paid entry was cancelled.
    pub cancelled_paid: bool,
}

impl Transition {
    /// Returns true if the stored status changed.
    #[must_use]
    pub fn changed(&self) -> bool {
        self.from != self.to
    }
}

/// Read-side view of an entry's status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DerivedStatus {
    /// Persisted status.
    pub stored: StoredStatus,
    /// Status shown to users.
    pub display: DisplayStatus,
    /// Pending and past due.
    pub is_overdue: bool,
    /// Amount still owed; negative when overpaid.
    pub remaining_amount: Decimal,
    /// Portuguese label of the display status.
    pub label: String,
    /// `"i/N"` or `"À vista"`.
    pub installment_label: String,
}

/// Stateless service for ledger entry status rules.
pub struct LedgerStateMachine;

impl LedgerStateMachine {
    /// Returns true if the entry is pending and its due date has passed.
    #[must_use]
    pub fn is_overdue(entry: &LedgerEntry, today: NaiveDate) -> bool {
        entry.status == StoredStatus::Pending && entry.due_date < today
    }

    /// Status used for display and reporting.
    #[must_use]
    pub fn display_status(entry: &LedgerEntry, today: NaiveDate) -> DisplayStatus {
        match entry.status {
            StoredStatus::Paid => DisplayStatus::Paid,
            StoredStatus::Cancelled => DisplayStatus::Cancelled,
            StoredStatus::Pending if entry.due_date < today => DisplayStatus::Overdue,
            StoredStatus::Pending => DisplayStatus::Pending,
        }
    }

    /// Annotates an entry with its derived status.
    #[must_use]
    pub fn annotate(entry: &LedgerEntry, today: NaiveDate) -> DerivedStatus {
        let display = Self::display_status(entry, today);
        DerivedStatus {
            stored: entry.status,
            display,
            is_overdue: display == DisplayStatus::Overdue,
            remaining_amount: entry.remaining_amount(),
            label: display.label().to_string(),
            installment_label: entry.installment_label(),
        }
    }

    /// Amount still owed. Negative when overpaid.
    #[must_use]
    pub fn remaining_amount(entry: &LedgerEntry) -> Decimal {
        entry.remaining_amount()
    }

    /// Derives status and payment date from a paid amount.
    ///
    /// Fully paid entries take the supplied payment date, or today.
    /// Partially paid entries stay pending and keep their payment date.
    /// A zero paid amount clears the payment date.
    #[must_use]
    pub fn derive_payment_state(
        total_amount: Decimal,
        paid_amount: Decimal,
        supplied_date: Option<NaiveDate>,
        current_date: Option<NaiveDate>,
        today: NaiveDate,
    ) -> PaymentState {
        if paid_amount >= total_amount {
            PaymentState {
                status: StoredStatus::Paid,
                payment_date: Some(supplied_date.unwrap_or(today)),
            }
        } else if paid_amount > Decimal::ZERO {
            PaymentState {
                status: StoredStatus::Pending,
                payment_date: supplied_date.or(current_date),
            }
        } else {
            PaymentState {
                status: StoredStatus::Pending,
                payment_date: None,
            }
        }
    }

    /// Applies a partial update to an entry.
    ///
    /// The entry is left untouched when an error is returned.
    ///
    /// # Errors
    ///
    /// - `EntryCancelled` if the entry is cancelled and the update records a
    ///   payment or changes its status
    /// - `NegativePaidAmount`, `NonPositiveTotal` or `EmptyDescription` for
    ///   invalid field values
    pub fn apply_update(
        entry: &mut LedgerEntry,
        update: EntryUpdate,
        today: NaiveDate,
    ) -> Result<Transition, LedgerError> {
        let from = entry.status;

        if from.is_terminal()
            && (update.touches_payment()
                || update.status.is_some_and(|s| s != StoredStatus::Cancelled))
        {
            return Err(LedgerError::EntryCancelled(entry.id));
        }
        if let Some(paid) = update.paid_amount
            && paid < Decimal::ZERO
        {
            return Err(LedgerError::NegativePaidAmount(paid));
        }
        if let Some(total) = update.total_amount
            && total <= Decimal::ZERO
        {
            return Err(LedgerError::NonPositiveTotal(total));
        }
        if update
            .description
            .as_deref()
            .is_some_and(|d| d.trim().is_empty())
        {
            return Err(LedgerError::EmptyDescription);
        }

        if let Some(description) = update.description {
            entry.description = description;
        }
        if let Some(category_id) = update.category_id {
            entry.category_id = Some(category_id);
        }
        if let Some(total) = update.total_amount {
            entry.total_amount = total;
        }
        if let Some(entry_date) = update.entry_date {
            entry.entry_date = entry_date;
        }
        if let Some(due_date) = update.due_date {
            entry.due_date = due_date;
        }
        if let Some(notes) = update.notes {
            entry.notes = Some(notes);
        }
        if let Some(reference) = update.reference {
            entry.reference = Some(reference);
        }
        if let Some(is_fixed_cost) = update.is_fixed_cost {
            entry.is_fixed_cost = is_fixed_cost;
        }

        if let Some(paid) = update.paid_amount {
            let derived = Self::derive_payment_state(
                entry.total_amount,
                paid,
                update.payment_date,
                entry.payment_date,
                today,
            );
            entry.paid_amount = paid;
            entry.status = derived.status;
            entry.payment_date = derived.payment_date;
        } else if let Some(payment_date) = update.payment_date {
            entry.payment_date = Some(payment_date);
        }

        if let Some(status) = update.status {
            entry.status = status;
            if status == StoredStatus::Paid && entry.payment_date.is_none() {
                entry.payment_date = Some(today);
            }
        }

        Ok(Transition {
            from,
            to: entry.status,
            overpaid: entry.paid_amount > entry.total_amount,
            cancelled_paid: from == StoredStatus::Paid && entry.status == StoredStatus::Cancelled,
        })
    }

    /// Records an absolute paid amount.
    ///
    /// # Errors
    ///
    /// See [`Self::apply_update`].
    pub fn record_payment(
        entry: &mut LedgerEntry,
        paid_amount: Decimal,
        payment_date: Option<NaiveDate>,
        today: NaiveDate,
    ) -> Result<Transition, LedgerError> {
        Self::apply_update(entry, EntryUpdate::payment(paid_amount, payment_date), today)
    }

    /// Adds a payment on top of what was already paid.
    ///
    /// # Errors
    ///
    /// `NegativePaidAmount` for a negative amount, `AmountOverflow` if the
    /// running total does not fit in a decimal, otherwise see
    /// [`Self::apply_update`].
    pub fn add_payment(
        entry: &mut LedgerEntry,
        amount: Decimal,
        payment_date: Option<NaiveDate>,
        today: NaiveDate,
    ) -> Result<Transition, LedgerError> {
        if amount < Decimal::ZERO {
            return Err(LedgerError::NegativePaidAmount(amount));
        }
        let paid = entry
            .paid_amount
            .checked_add(amount)
            .ok_or(LedgerError::AmountOverflow {
                paid: entry.paid_amount,
                amount,
            })?;
        Self::record_payment(entry, paid, payment_date, today)
    }

    /// Cancels an entry. Always allowed, including for paid entries.
    ///
    /// # Errors
    ///
    /// Never fails today; returns a `Result` to match the other transitions.
    pub fn cancel(entry: &mut LedgerEntry, today: NaiveDate) -> Result<Transition, LedgerError> {
        Self::apply_update(entry, EntryUpdate::status(StoredStatus::Cancelled), today)
    }
}
