//! Report error types.

use caixa_shared::AppError;
use chrono::NaiveDate;
use thiserror::Error;

/// Errors that can occur during report generation.
#[derive(Debug, Error)]
pub enum ReportError {
    /// Invalid date range.
    #[error("Invalid date range: start {start} is after end {end}")]
    InvalidDateRange {
        /// Start date.
        start: NaiveDate,
        /// End date.
        end: NaiveDate,
    },

    /// Forecast window outside 1..=365 days.
    #[error("Forecast window must be between 1 and 365 days, got {0}")]
    InvalidForecastWindow(u32),

    /// Unknown period preset.
    #[error("Invalid period: {0}")]
    InvalidPeriod(String),
}

impl ReportError {
    /// Returns the error code for API responses.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidDateRange { .. } => "INVALID_DATE_RANGE",
            Self::InvalidForecastWindow(_) => "INVALID_FORECAST_WINDOW",
            Self::InvalidPeriod(_) => "INVALID_PERIOD",
        }
    }
}

impl From<ReportError> for AppError {
    fn from(err: ReportError) -> Self {
        Self::Validation(err.to_string())
    }
}
