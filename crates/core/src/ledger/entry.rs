//! Payable and receivable entry types.

use std::fmt;
use std::str::FromStr;

use caixa_shared::types::{CategoryId, CounterpartyId, LedgerEntryId};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::error::LedgerError;

/// Which side of the books an entry lives on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LedgerKind {
    /// A bill to pay; the counterparty is a supplier.
    Payable,
    /// A bill to be paid; the counterparty is a customer.
    Receivable,
}

/// Whether an entry is a single ("cash") entry or part of an installment plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    /// Single entry paid at once.
    Cash,
    /// One installment of a plan.
    Installment,
}

/// Persisted status.
///
/// Overdue is never stored; it is derived on read (see [`DisplayStatus`]).
/// A legacy `"overdue"` value is read back as `pending`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoredStatus {
    /// Open, awaiting payment.
    #[serde(alias = "overdue", alias = "PENDING", alias = "OVERDUE")]
    Pending,
    /// Fully paid.
    #[serde(alias = "PAID")]
    Paid,
    /// Cancelled by the user. Terminal.
    #[serde(alias = "CANCELLED")]
    Cancelled,
}

impl StoredStatus {
    /// Returns true if no further payment or status change is accepted.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Cancelled)
    }
}

impl fmt::Display for StoredStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pending => write!(f, "pending"),
            Self::Paid => write!(f, "paid"),
            Self::Cancelled => write!(f, "cancelled"),
        }
    }
}

impl FromStr for StoredStatus {
    type Err = LedgerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pending" | "overdue" => Ok(Self::Pending),
            "paid" => Ok(Self::Paid),
            "cancelled" => Ok(Self::Cancelled),
            _ => Err(LedgerError::InvalidStatus(s.to_string())),
        }
    }
}

/// Status shown to users and used by every report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DisplayStatus {
    /// Open and not yet due.
    Pending,
    /// Fully paid.
    Paid,
    /// Open and past its due date.
    Overdue,
    /// Cancelled.
    Cancelled,
}

impl DisplayStatus {
    /// Portuguese label used on statements and the cash-flow screen.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Pending => "Pendente",
            Self::Paid => "Pago",
            Self::Overdue => "Vencido",
            Self::Cancelled => "Cancelado",
        }
    }
}

/// Converts the historical single-character fixed-cost code.
#[must_use]
pub fn fixed_cost_from_code(code: &str) -> bool {
    code.trim().eq_ignore_ascii_case("S")
}

/// Returns the historical single-character fixed-cost code.
#[must_use]
pub const fn fixed_cost_code(is_fixed_cost: bool) -> &'static str {
    if is_fixed_cost { "S" } else { "N" }
}

/// A payable or receivable entry as persisted by the storage layer.
///
/// `total_amount` always holds this entry's own amount, never the total of
/// the plan it was generated from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerEntry {
    /// Identifier assigned by the storage layer.
    pub id: LedgerEntryId,
    /// Payable or receivable.
    pub kind: LedgerKind,
    /// Supplier (payable) or customer (receivable).
    pub counterparty_id: CounterpartyId,
    /// Optional classification category.
    pub category_id: Option<CategoryId>,
    /// Free-text description.
    pub description: String,
    /// Cash or installment.
    pub entry_kind: EntryKind,
    /// Amount owed for this entry.
    pub total_amount: Decimal,
    /// Amount paid so far.
    pub paid_amount: Decimal,
    /// Booking date.
    pub entry_date: NaiveDate,
    /// Due date.
    pub due_date: NaiveDate,
    /// Date the entry was settled.
    pub payment_date: Option<NaiveDate>,
    /// Persisted status.
    pub status: StoredStatus,
    /// 1-based position in the plan.
    pub installment_number: u32,
    /// Plan size; 1 for cash entries.
    pub total_installments: u32,
    /// Per-installment amount.
    pub installment_amount: Decimal,
    /// External reference.
    pub reference: Option<String>,
    /// Notes.
    pub notes: Option<String>,
    /// Fixed cost flag (payables only).
    pub is_fixed_cost: bool,
}

impl LedgerEntry {
    /// Amount still owed. Not clamped: overpaid entries go negative.
    #[must_use]
    pub fn remaining_amount(&self) -> Decimal {
        self.total_amount - self.paid_amount
    }

    /// Returns true if this entry belongs to a plan of more than one installment.
    #[must_use]
    pub fn is_installment(&self) -> bool {
        self.entry_kind == EntryKind::Installment && self.total_installments > 1
    }

    /// `"i/N"` for installments, `"À vista"` for cash entries.
    #[must_use]
    pub fn installment_label(&self) -> String {
        if self.total_installments > 1 {
            format!("{}/{}", self.installment_number, self.total_installments)
        } else {
            "À vista".to_string()
        }
    }

    /// Returns the fixed-cost flag as its historical code.
    #[must_use]
    pub fn fixed_cost_code(&self) -> &'static str {
        fixed_cost_code(self.is_fixed_cost)
    }
}

/// An entry ready to be persisted; the storage layer assigns its id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerEntryDraft {
    /// Payable or receivable.
    pub kind: LedgerKind,
    /// Supplier (payable) or customer (receivable).
    pub counterparty_id: CounterpartyId,
    /// Optional classification category.
    pub category_id: Option<CategoryId>,
    /// Free-text description.
    pub description: String,
    /// Cash or installment.
    pub entry_kind: EntryKind,
    /// Amount owed for this entry.
    pub total_amount: Decimal,
    /// Amount paid so far.
    pub paid_amount: Decimal,
    /// Booking date.
    pub entry_date: NaiveDate,
    /// Due date.
    pub due_date: NaiveDate,
    /// Date the entry was settled.
    pub payment_date: Option<NaiveDate>,
    /// Initial status.
    pub status: StoredStatus,
    /// 1-based position in the plan.
    pub installment_number: u32,
    /// Plan size.
    pub total_installments: u32,
    /// Per-installment amount.
    pub installment_amount: Decimal,
    /// External reference.
    pub reference: Option<String>,
    /// Notes.
    pub notes: Option<String>,
    /// Fixed cost flag.
    pub is_fixed_cost: bool,
}

impl LedgerEntryDraft {
    /// Attaches the storage-assigned id.
    #[must_use]
    pub fn into_entry(self, id: LedgerEntryId) -> LedgerEntry {
        LedgerEntry {
            id,
            kind: self.kind,
            counterparty_id: self.counterparty_id,
            category_id: self.category_id,
            description: self.description,
            entry_kind: self.entry_kind,
            total_amount: self.total_amount,
            paid_amount: self.paid_amount,
            entry_date: self.entry_date,
            due_date: self.due_date,
            payment_date: self.payment_date,
            status: self.status,
            installment_number: self.installment_number,
            total_installments: self.total_installments,
            installment_amount: self.installment_amount,
            reference: self.reference,
            notes: self.notes,
            is_fixed_cost: self.is_fixed_cost,
        }
    }
}
