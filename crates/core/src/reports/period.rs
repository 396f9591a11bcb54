//! Report periods and month iteration.

use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, Months, NaiveDate};
use serde::{Deserialize, Serialize};

use super::error::ReportError;

/// An inclusive date range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    /// First day, inclusive.
    pub start: NaiveDate,
    /// Last day, inclusive.
    pub end: NaiveDate,
}

impl DateRange {
    /// Creates a range.
    ///
    /// # Errors
    ///
    /// Returns `InvalidDateRange` if `start > end`.
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, ReportError> {
        if start > end {
            return Err(ReportError::InvalidDateRange { start, end });
        }
        Ok(Self { start, end })
    }

    /// The whole calendar month containing `date`.
    #[must_use]
    pub fn month_containing(date: NaiveDate) -> Self {
        let start = month_start(date);
        let end = start
            .checked_add_months(Months::new(1))
            .and_then(|next| next.pred_opt())
            .unwrap_or(NaiveDate::MAX);
        Self { start, end }
    }

    /// Returns true if `date` falls within the range.
    #[must_use]
    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start && date <= self.end
    }

    /// First day of every calendar month touched by the range, in order.
    #[must_use]
    pub fn months(&self) -> Vec<NaiveDate> {
        let mut months = Vec::new();
        let mut current = month_start(self.start);
        while current <= self.end {
            months.push(current);
            match current.checked_add_months(Months::new(1)) {
                Some(next) => current = next,
                None => break,
            }
        }
        months
    }
}

impl fmt::Display for DateRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} a {}",
            self.start.format("%d/%m/%Y"),
            self.end.format("%d/%m/%Y")
        )
    }
}

/// First day of the month containing `date`.
#[must_use]
pub fn month_start(date: NaiveDate) -> NaiveDate {
    date.with_day(1).unwrap_or(date)
}

/// `"YYYY-MM"` key of the month containing `date`.
#[must_use]
pub fn month_key(date: NaiveDate) -> String {
    date.format("%Y-%m").to_string()
}

/// Named report periods, all ending today.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PeriodPreset {
    /// From the first of this month.
    #[serde(rename = "current_month")]
    CurrentMonth,
    /// This month and the two before it.
    #[serde(rename = "3_months")]
    ThreeMonths,
    /// This month and the five before it.
    #[serde(rename = "6_months")]
    SixMonths,
    /// This month and the eleven before it.
    #[serde(rename = "12_months")]
    TwelveMonths,
    /// From January 1st.
    #[serde(rename = "year")]
    Year,
}

impl PeriodPreset {
    /// Resolves the preset against today.
    #[must_use]
    pub fn resolve(self, today: NaiveDate) -> DateRange {
        let first = month_start(today);
        let months_back = match self {
            Self::CurrentMonth => 0,
            Self::ThreeMonths => 2,
            Self::SixMonths => 5,
            Self::TwelveMonths => 11,
            Self::Year => first.month0(),
        };
        let start = first
            .checked_sub_months(Months::new(months_back))
            .unwrap_or(first);
        DateRange { start, end: today }
    }
}

impl FromStr for PeriodPreset {
    type Err = ReportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "current_month" => Ok(Self::CurrentMonth),
            "3_months" => Ok(Self::ThreeMonths),
            "6_months" => Ok(Self::SixMonths),
            "12_months" => Ok(Self::TwelveMonths),
            "year" => Ok(Self::Year),
            _ => Err(ReportError::InvalidPeriod(s.to_string())),
        }
    }
}
