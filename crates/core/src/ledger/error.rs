//! Ledger error types for payment and status updates.

use caixa_shared::AppError;
use caixa_shared::types::LedgerEntryId;
use rust_decimal::Decimal;
use thiserror::Error;

/// Errors that can occur while mutating a ledger entry.
#[derive(Debug, Error)]
pub enum LedgerError {
    /// Paid amount cannot be negative.
    #[error("Paid amount cannot be negative: {0}")]
    NegativePaidAmount(Decimal),

    /// Total amount must be greater than zero.
    #[error("Total amount must be greater than zero: {0}")]
    NonPositiveTotal(Decimal),

    /// Paid amount plus the new payment does not fit in a decimal.
    #[error("Amount overflow: {paid} + {amount}")]
    AmountOverflow {
        /// Amount already paid.
        paid: Decimal,
        /// Payment being added.
        amount: Decimal,
    },

    /// Cancelled entries accept no payment or status change.
    #[error("Entry {0} is cancelled")]
    EntryCancelled(LedgerEntryId),

    /// Description cannot be empty.
    #[error("Description cannot be empty")]
    EmptyDescription,

    /// Unknown status string.
    #[error("Invalid status: {0}")]
    InvalidStatus(String),
}

impl LedgerError {
    /// Returns the error code for API responses.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::NegativePaidAmount(_) => "NEGATIVE_PAID_AMOUNT",
            Self::NonPositiveTotal(_) => "NON_POSITIVE_TOTAL",
            Self::AmountOverflow { .. } => "AMOUNT_OVERFLOW",
            Self::EntryCancelled(_) => "ENTRY_CANCELLED",
            Self::EmptyDescription => "EMPTY_DESCRIPTION",
            Self::InvalidStatus(_) => "INVALID_STATUS",
        }
    }
}

impl From<LedgerError> for AppError {
    fn from(err: LedgerError) -> Self {
        match err {
            LedgerError::EntryCancelled(_) => Self::BusinessRule(err.to_string()),
            _ => Self::Validation(err.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_error_codes() {
        assert_eq!(
            LedgerError::NegativePaidAmount(dec!(-1)).error_code(),
            "NEGATIVE_PAID_AMOUNT"
        );
        assert_eq!(
            LedgerError::EntryCancelled(LedgerEntryId::new()).error_code(),
            "ENTRY_CANCELLED"
        );
        assert_eq!(
            LedgerError::InvalidStatus("x".into()).error_code(),
            "INVALID_STATUS"
        );
    }

    #[test]
    fn test_into_app_error() {
        let app: AppError = LedgerError::NonPositiveTotal(dec!(0)).into();
        assert_eq!(app.status_code(), 400);

        let app: AppError = LedgerError::AmountOverflow {
            paid: Decimal::MAX,
            amount: dec!(1),
        }
        .into();
        assert_eq!(app.error_code(), "VALIDATION_ERROR");

        let app: AppError = LedgerError::EntryCancelled(LedgerEntryId::new()).into();
        assert_eq!(app.status_code(), 422);
    }

    #[test]
    fn test_error_display() {
        assert_eq!(
            LedgerError::NegativePaidAmount(dec!(-10.50)).to_string(),
            "Paid amount cannot be negative: -10.50"
        );
    }
}
