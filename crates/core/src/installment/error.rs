//! Installment planning error types.

use caixa_shared::AppError;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use thiserror::Error;

/// Errors raised while validating a plan request or building its drafts.
#[derive(Debug, Error)]
pub enum InstallmentError {
    /// Installment count must be at least 1.
    #[error("Installment count must be at least 1, got {0}")]
    InvalidInstallmentCount(u32),

    /// Installment count exceeds the configured limit.
    #[error("Installment count {requested} exceeds the limit of {max}")]
    InstallmentLimitExceeded {
        /// Requested count.
        requested: u32,
        /// Configured limit.
        max: u32,
    },

    /// Interval between installments must be at least 1 day.
    #[error("Installment interval must be at least 1 day, got {0}")]
    InvalidInterval(u32),

    /// Neither total nor per-installment amount was supplied.
    #[error("Either total_amount or installment_amount is required")]
    MissingAmount,

    /// Total and per-installment amounts disagree.
    #[error(
        "Inconsistent amounts: total {total} cannot be split into {count} installments of {installment}"
    )]
    InconsistentAmounts {
        /// Supplied total amount.
        total: Decimal,
        /// Supplied per-installment amount.
        installment: Decimal,
        /// Installment count.
        count: u32,
    },

    /// Amounts must be greater than zero.
    #[error("Amount must be greater than zero: {0}")]
    NonPositiveAmount(Decimal),

    /// Paid amount cannot be negative.
    #[error("Paid amount cannot be negative: {0}")]
    NegativePaidAmount(Decimal),

    /// An amount derived from the request does not fit in a decimal.
    #[error("Amount overflow: {installment} x {count} installments")]
    AmountOverflow {
        /// Per-installment amount.
        installment: Decimal,
        /// Installment count.
        count: u32,
    },

    /// Total is too small to split into the requested count.
    #[error("Total {total} is too small to split into {count} installments")]
    InstallmentAmountTooSmall {
        /// Supplied total amount.
        total: Decimal,
        /// Installment count.
        count: u32,
    },

    /// Description cannot be empty.
    #[error("Description cannot be empty")]
    EmptyDescription,

    /// A generated date falls outside the supported calendar.
    #[error("Installment {installment} date out of range starting from {start}")]
    DateOutOfRange {
        /// First due date of the plan.
        start: NaiveDate,
        /// Installment number that overflowed.
        installment: u32,
    },

    /// Generated amounts do not sum to the plan total.
    #[error("Installment amounts sum to {sum}, expected {expected}")]
    ArithmeticInconsistency {
        /// Sum of generated amounts.
        sum: Decimal,
        /// Plan total.
        expected: Decimal,
    },
}

impl InstallmentError {
    /// Returns the error code for API responses.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidInstallmentCount(_) => "INVALID_INSTALLMENT_COUNT",
            Self::InstallmentLimitExceeded { .. } => "INSTALLMENT_LIMIT_EXCEEDED",
            Self::InvalidInterval(_) => "INVALID_INTERVAL",
            Self::MissingAmount => "MISSING_AMOUNT",
            Self::InconsistentAmounts { .. } => "INCONSISTENT_AMOUNTS",
            Self::NonPositiveAmount(_) => "NON_POSITIVE_AMOUNT",
            Self::NegativePaidAmount(_) => "NEGATIVE_PAID_AMOUNT",
            Self::AmountOverflow { .. } => "AMOUNT_OVERFLOW",
            Self::InstallmentAmountTooSmall { .. } => "INSTALLMENT_AMOUNT_TOO_SMALL",
            Self::EmptyDescription => "EMPTY_DESCRIPTION",
            Self::DateOutOfRange { .. } => "DATE_OUT_OF_RANGE",
            Self::ArithmeticInconsistency { .. } => "ARITHMETIC_INCONSISTENCY",
        }
    }
}

impl From<InstallmentError> for AppError {
    fn from(err: InstallmentError) -> Self {
        match err {
            InstallmentError::ArithmeticInconsistency { .. } => Self::Internal(err.to_string()),
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
            InstallmentError::InvalidInstallmentCount(0).error_code(),
            "INVALID_INSTALLMENT_COUNT"
        );
        assert_eq!(InstallmentError::MissingAmount.error_code(), "MISSING_AMOUNT");
        assert_eq!(
            InstallmentError::ArithmeticInconsistency {
                sum: dec!(99.99),
                expected: dec!(100),
            }
            .error_code(),
            "ARITHMETIC_INCONSISTENCY"
        );
    }

    #[test]
    fn test_into_app_error() {
        let app: AppError = InstallmentError::InvalidInterval(0).into();
        assert_eq!(app.status_code(), 400);

        let app: AppError = InstallmentError::AmountOverflow {
            installment: Decimal::MAX,
            count: 2,
        }
        .into();
        assert_eq!(app.error_code(), "VALIDATION_ERROR");

        let app: AppError = InstallmentError::ArithmeticInconsistency {
            sum: dec!(1),
            expected: dec!(2),
        }
        .into();
        assert_eq!(app.status_code(), 500);
    }

    #[test]
    fn test_error_display() {
        let err = InstallmentError::InconsistentAmounts {
            total: dec!(100.00),
            installment: dec!(30.00),
            count: 3,
        };
        assert_eq!(
            err.to_string(),
            "Inconsistent amounts: total 100.00 cannot be split into 3 installments of 30.00"
        );
    }
}
