//! Installment plan generation.

use caixa_shared::config::PlannerConfig;
use caixa_shared::types::{round_currency, truncate_currency};
use chrono::NaiveDate;
use rust_decimal::Decimal;

use super::error::InstallmentError;
use super::schedule::installment_dates;
use super::types::{
    DEFAULT_INTERVAL_DAYS, EntryDatePolicy, EntryRequest, InstallmentPlan,
    InstallmentPlanRequest, RolloverPolicy,
};
use crate::ledger::{EntryKind, LedgerEntryDraft, LedgerStateMachine, StoredStatus};

/// Default upper bound on installments per plan.
pub const DEFAULT_MAX_INSTALLMENTS: u32 = 360;

/// Resolved amounts of a plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlanAmounts {
    /// Total of the whole plan.
    pub total: Decimal,
    /// Amount of installments `1..N-1`.
    pub uniform: Decimal,
    /// Amount of installment `N`; absorbs the rounding remainder.
    pub last: Decimal,
}

/// Builds ledger entry drafts from plan requests.
///
/// The planner is pure: it validates the request and returns drafts. Ids are
/// assigned and the batch is committed by the storage layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InstallmentPlanner {
    max_installments: u32,
    default_interval_days: u32,
}

impl Default for InstallmentPlanner {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_INSTALLMENTS, DEFAULT_INTERVAL_DAYS)
    }
}

impl InstallmentPlanner {
    /// Creates a planner with explicit limits.
    #[must_use]
    pub const fn new(max_installments: u32, default_interval_days: u32) -> Self {
        Self {
            max_installments,
            default_interval_days,
        }
    }

    /// Creates a planner from configuration.
    #[must_use]
    pub const fn from_config(config: &PlannerConfig) -> Self {
        Self::new(config.max_installments, config.default_interval_days)
    }

    /// Fixed-interval policy for a request, falling back to the configured
    /// default interval.
    #[must_use]
    pub fn fixed_interval_policy(&self, request: &InstallmentPlanRequest) -> RolloverPolicy {
        RolloverPolicy::FixedInterval(
            request
                .installment_interval_days
                .unwrap_or(self.default_interval_days),
        )
    }

    /// Resolves the driving amount into total, uniform and last amounts.
    ///
    /// Amounts are rounded to cents first. The uniform amount is
    /// `total / count` truncated to cents, and the last installment takes
    /// `total - uniform * (count - 1)`.
    ///
    /// # Errors
    ///
    /// - `MissingAmount` if neither amount is supplied
    /// - `NonPositiveAmount` if a supplied amount is not positive
    /// - `InconsistentAmounts` if both are supplied and disagree
    /// - `InstallmentAmountTooSmall` if the uniform amount truncates to zero
    /// - `AmountOverflow` if the derived total does not fit in a decimal
    pub fn resolve_amounts(
        total_amount: Option<Decimal>,
        installment_amount: Option<Decimal>,
        count: u32,
    ) -> Result<PlanAmounts, InstallmentError> {
        if count < 1 {
            return Err(InstallmentError::InvalidInstallmentCount(count));
        }
        let n = Decimal::from(count);

        let positive = |amount: Decimal| {
            let rounded = round_currency(amount);
            if rounded > Decimal::ZERO {
                Ok(rounded)
            } else {
                Err(InstallmentError::NonPositiveAmount(amount))
            }
        };

        let (total, uniform) = match (total_amount, installment_amount) {
            (None, None) => return Err(InstallmentError::MissingAmount),
            (None, Some(installment)) => {
                let installment = positive(installment)?;
                let total = installment
                    .checked_mul(n)
                    .ok_or(InstallmentError::AmountOverflow { installment, count })?;
                (total, installment)
            }
            (Some(total), None) => {
                let total = positive(total)?;
                (total, truncate_currency(total / n))
            }
            (Some(total), Some(installment)) => {
                let total = positive(total)?;
                let installment = positive(installment)?;
                if installment != truncate_currency(total / n)
                    && installment.checked_mul(n) != Some(total)
                {
                    return Err(InstallmentError::InconsistentAmounts {
                        total,
                        installment,
                        count,
                    });
                }
                (total, installment)
            }
        };

        if uniform <= Decimal::ZERO {
            return Err(InstallmentError::InstallmentAmountTooSmall { total, count });
        }

        let last = uniform
            .checked_mul(n - Decimal::ONE)
            .and_then(|rest| total.checked_sub(rest))
            .ok_or(InstallmentError::AmountOverflow {
                installment: uniform,
                count,
            })?;
        Ok(PlanAmounts {
            total,
            uniform,
            last,
        })
    }

    /// Generates the drafts of an installment plan.
    ///
    /// Installment `i` of `N` is due `i - 1` steps after `first_due_date`.
    /// Every draft is pending with nothing paid, and carries its own amount in
    /// both `total_amount` and `installment_amount`. Plans with `N > 1` get a
    /// `" - Parcela i/N"` description suffix.
    ///
    /// # Errors
    ///
    /// Returns a validation error before any draft is produced, or
    /// `ArithmeticInconsistency` if the generated amounts do not add up.
    pub fn plan(
        &self,
        request: &InstallmentPlanRequest,
        rollover: RolloverPolicy,
        entry_dates: EntryDatePolicy,
    ) -> Result<InstallmentPlan, InstallmentError> {
        let count = request.total_installments;
        if count < 1 {
            return Err(InstallmentError::InvalidInstallmentCount(count));
        }
        if count > self.max_installments {
            return Err(InstallmentError::InstallmentLimitExceeded {
                requested: count,
                max: self.max_installments,
            });
        }
        if let RolloverPolicy::FixedInterval(days) = rollover
            && days < 1
        {
            return Err(InstallmentError::InvalidInterval(days));
        }
        if request.installment_interval_days == Some(0) {
            return Err(InstallmentError::InvalidInterval(0));
        }
        let description = request.description.trim();
        if description.is_empty() {
            return Err(InstallmentError::EmptyDescription);
        }

        let amounts =
            Self::resolve_amounts(request.total_amount, request.installment_amount, count)?;
        let entry_kind = if count > 1 {
            EntryKind::Installment
        } else {
            EntryKind::Cash
        };

        let mut drafts = Vec::with_capacity(count as usize);
        for offset in 0..count {
            let number = offset + 1;
            let (entry_date, due_date) = installment_dates(
                request.entry_date,
                request.first_due_date,
                rollover,
                entry_dates,
                offset,
            )
            .ok_or(InstallmentError::DateOutOfRange {
                start: request.first_due_date,
                installment: number,
            })?;

            let amount = if number == count {
                amounts.last
            } else {
                amounts.uniform
            };
            let description = if count > 1 {
                format!("{description} - Parcela {number}/{count}")
            } else {
                description.to_string()
            };

            drafts.push(LedgerEntryDraft {
                kind: request.kind,
                counterparty_id: request.counterparty_id,
                category_id: request.category_id,
                description,
                entry_kind,
                total_amount: amount,
                paid_amount: Decimal::ZERO,
                entry_date,
                due_date,
                payment_date: None,
                status: StoredStatus::Pending,
                installment_number: number,
                total_installments: count,
                installment_amount: amount,
                reference: request.reference.clone(),
                notes: request.notes.clone(),
                is_fixed_cost: request.is_fixed_cost,
            });
        }

        let sum: Decimal = drafts.iter().map(|d| d.installment_amount).sum();
        if sum != amounts.total {
            return Err(InstallmentError::ArithmeticInconsistency {
                sum,
                expected: amounts.total,
            });
        }

        Ok(InstallmentPlan {
            drafts,
            total_amount: amounts.total,
            installment_amount: amounts.uniform,
            last_installment_amount: amounts.last,
            total_installments: count,
        })
    }

    /// Builds a single ("cash") entry draft.
    ///
    /// Status is derived from `paid_amount` as for a payment update, and an
    /// explicit `status` overrides it.
    ///
    /// # Errors
    ///
    /// `EmptyDescription`, `NonPositiveAmount` or `NegativePaidAmount` for
    /// invalid fields.
    pub fn single_entry(
        request: EntryRequest,
        today: NaiveDate,
    ) -> Result<LedgerEntryDraft, InstallmentError> {
        let description = request.description.trim();
        if description.is_empty() {
            return Err(InstallmentError::EmptyDescription);
        }
        if request.total_amount <= Decimal::ZERO {
            return Err(InstallmentError::NonPositiveAmount(request.total_amount));
        }
        if let Some(installment) = request.installment_amount
            && installment <= Decimal::ZERO
        {
            return Err(InstallmentError::NonPositiveAmount(installment));
        }
        let paid_amount = request.paid_amount.unwrap_or(Decimal::ZERO);
        if paid_amount < Decimal::ZERO {
            return Err(InstallmentError::NegativePaidAmount(paid_amount));
        }

        let derived = LedgerStateMachine::derive_payment_state(
            request.total_amount,
            paid_amount,
            request.payment_date,
            request.payment_date,
            today,
        );
        let (status, payment_date) = match request.status {
            Some(StoredStatus::Paid) => (
                StoredStatus::Paid,
                derived.payment_date.or(Some(today)),
            ),
            Some(status) => (status, derived.payment_date),
            None => (derived.status, derived.payment_date),
        };

        Ok(LedgerEntryDraft {
            kind: request.kind,
            counterparty_id: request.counterparty_id,
            category_id: request.category_id,
            description: description.to_string(),
            entry_kind: EntryKind::Cash,
            total_amount: request.total_amount,
            paid_amount,
            entry_date: request.entry_date,
            due_date: request.due_date,
            payment_date,
            status,
            installment_number: 1,
            total_installments: 1,
            installment_amount: request.installment_amount.unwrap_or(request.total_amount),
            reference: request.reference,
            notes: request.notes,
            is_fixed_cost: request.is_fixed_cost,
        })
    }
}
