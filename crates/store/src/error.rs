//! Store error types.

use caixa_core::{InstallmentError, LedgerError, ReportError};
use caixa_shared::AppError;
use caixa_shared::types::{CategoryId, CompanyId, CounterpartyId, LedgerEntryId};
use thiserror::Error;

/// Errors returned by repositories and the ledger book.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Entry not found for this company.
    #[error("Ledger entry not found: {0}")]
    NotFound(LedgerEntryId),

    /// Counterparty not found for this company.
    #[error("Counterparty not found: {0}")]
    CounterpartyNotFound(CounterpartyId),

    /// Category not found for this company.
    #[error("Category not found: {0}")]
    CategoryNotFound(CategoryId),

    /// Paid receivables cannot be deleted.
    #[error("Cannot delete paid receivable {0}")]
    PaidReceivableDeletion(LedgerEntryId),

    /// The batch would exceed the company's entry quota; nothing was stored.
    #[error("Company {company_id} would exceed its limit of {limit} entries")]
    QuotaExceeded {
        /// Company.
        company_id: CompanyId,
        /// Configured limit.
        limit: usize,
    },

    /// Ledger rule violation.
    #[error(transparent)]
    Ledger(#[from] LedgerError),

    /// Invalid plan request.
    #[error(transparent)]
    Installment(#[from] InstallmentError),

    /// Invalid report request.
    #[error(transparent)]
    Report(#[from] ReportError),
}

impl StoreError {
    /// Returns the error code for API responses.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::NotFound(_) => "ENTRY_NOT_FOUND",
            Self::CounterpartyNotFound(_) => "COUNTERPARTY_NOT_FOUND",
            Self::CategoryNotFound(_) => "CATEGORY_NOT_FOUND",
            Self::PaidReceivableDeletion(_) => "PAID_RECEIVABLE_DELETION",
            Self::QuotaExceeded { .. } => "QUOTA_EXCEEDED",
            Self::Ledger(e) => e.error_code(),
            Self::Installment(e) => e.error_code(),
            Self::Report(e) => e.error_code(),
        }
    }
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(_)
            | StoreError::CounterpartyNotFound(_)
            | StoreError::CategoryNotFound(_) => Self::NotFound(err.to_string()),
            StoreError::PaidReceivableDeletion(_) => Self::BusinessRule(err.to_string()),
            StoreError::QuotaExceeded { .. } => Self::Conflict(err.to_string()),
            StoreError::Ledger(e) => e.into(),
            StoreError::Installment(e) => e.into(),
            StoreError::Report(e) => e.into(),
        }
    }
}
