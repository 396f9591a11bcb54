//! Ledger book: the orchestration layer over the pure core.
//!
//! Verifies references, plans entries, commits batches, applies status
//! transitions, and feeds stored entries to the period aggregator.

use std::sync::Arc;

use caixa_core::installment::{
    EntryDatePolicy, EntryRequest, InstallmentPlanRequest, InstallmentPlanner, RolloverPolicy,
};
use caixa_core::ledger::{
    DerivedStatus, EntryUpdate, LedgerEntry, LedgerKind, LedgerStateMachine, StoredStatus,
    Transition,
};
use caixa_core::reports::{
    BucketDate, CashFlowSummary, CategoriesSummary, DateRange, DrePolicy, DreReport, ForecastDay,
    GroupKey, GroupTotal, LedgerSummary, MonthBucket, PeriodAggregator,
};
use caixa_shared::config::AppConfig;
use caixa_shared::types::{
    CategoryId, CompanyId, CounterpartyId, LedgerEntryId, PageRequest, PageResponse,
};
use caixa_shared::Clock;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::StoreError;
use crate::repositories::{LedgerFilter, LedgerRepository, ReferenceDirectory};

/// A committed installment plan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersistedPlan {
    /// Stored entries ordered by installment number.
    pub entries: Vec<LedgerEntry>,
    /// Total of the whole plan.
    pub total_amount: Decimal,
    /// Uniform installment amount.
    pub installment_amount: Decimal,
    /// Last installment amount.
    pub last_installment_amount: Decimal,
}

/// An entry with its derived status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntryView {
    /// Stored entry.
    #[serde(flatten)]
    pub entry: LedgerEntry,
    /// Derived status.
    pub derived: DerivedStatus,
}

/// Ledger service for one storage backend.
pub struct LedgerBook {
    entries: Arc<dyn LedgerRepository>,
    directory: Arc<dyn ReferenceDirectory>,
    clock: Arc<dyn Clock>,
    planner: InstallmentPlanner,
    dre_policy: DrePolicy,
    forecast_days: u32,
}

impl LedgerBook {
    /// Creates a ledger book.
    #[must_use]
    pub fn new(
        entries: Arc<dyn LedgerRepository>,
        directory: Arc<dyn ReferenceDirectory>,
        clock: Arc<dyn Clock>,
        config: &AppConfig,
    ) -> Self {
        Self {
            entries,
            directory,
            clock,
            planner: InstallmentPlanner::from_config(&config.planner),
            dre_policy: DrePolicy::from_config(&config.reports),
            forecast_days: config.reports.forecast_days,
        }
    }

    /// Today according to the injected clock.
    #[must_use]
    pub fn today(&self) -> NaiveDate {
        self.clock.today()
    }

    async fn check_references(
        &self,
        company_id: CompanyId,
        kind: LedgerKind,
        counterparty_id: CounterpartyId,
        category_id: Option<CategoryId>,
    ) -> Result<(), StoreError> {
        if self
            .directory
            .counterparty_name(company_id, kind, counterparty_id)
            .await
            .is_none()
        {
            return Err(StoreError::CounterpartyNotFound(counterparty_id));
        }
        if let Some(category_id) = category_id
            && self
                .directory
                .category_name(company_id, category_id)
                .await
                .is_none()
        {
            return Err(StoreError::CategoryNotFound(category_id));
        }
        Ok(())
    }

    /// Plans and commits an installment plan as one batch.
    ///
    /// Without an explicit rollover the request's fixed interval is used
    /// (30 days by default). Without an explicit entry date policy payables
    /// follow their due dates and receivables keep the plan's entry date.
    ///
    /// # Errors
    ///
    /// Returns `CounterpartyNotFound` or `CategoryNotFound` for unknown
    /// references, an `Installment` error for invalid requests, or the
    /// repository's error if the batch cannot be committed.
    pub async fn plan_installments(
        &self,
        company_id: CompanyId,
        request: &InstallmentPlanRequest,
        rollover: Option<RolloverPolicy>,
        entry_dates: Option<EntryDatePolicy>,
    ) -> Result<PersistedPlan, StoreError> {
        self.check_references(
            company_id,
            request.kind,
            request.counterparty_id,
            request.category_id,
        )
        .await?;

        let rollover = rollover.unwrap_or_else(|| self.planner.fixed_interval_policy(request));
        let entry_dates = entry_dates.unwrap_or(EntryDatePolicy::default_for(request.kind));
        let plan = self.planner.plan(request, rollover, entry_dates)?;
        let entries = self.entries.insert_batch(company_id, plan.drafts).await?;

        info!(
            company_id = %company_id,
            kind = ?request.kind,
            installments = plan.total_installments,
            total = %plan.total_amount,
            rollover = ?rollover,
            "Installment plan persisted"
        );

        Ok(PersistedPlan {
            entries,
            total_amount: plan.total_amount,
            installment_amount: plan.installment_amount,
            last_installment_amount: plan.last_installment_amount,
        })
    }

    /// Creates a single entry.
    ///
    /// # Errors
    ///
    /// Same as [`Self::plan_installments`].
    pub async fn create_entry(
        &self,
        company_id: CompanyId,
        request: EntryRequest,
    ) -> Result<LedgerEntry, StoreError> {
        self.check_references(
            company_id,
            request.kind,
            request.counterparty_id,
            request.category_id,
        )
        .await?;

        let draft = InstallmentPlanner::single_entry(request, self.today())?;
        let entry = self.entries.insert(company_id, draft).await?;

        info!(company_id = %company_id, entry_id = %entry.id, kind = ?entry.kind, "Entry created");
        Ok(entry)
    }

    /// Fetches an entry with its derived status.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the entry does not belong to the company.
    pub async fn get_entry(
        &self,
        company_id: CompanyId,
        id: LedgerEntryId,
    ) -> Result<EntryView, StoreError> {
        let entry = self.entries.get(company_id, id).await?;
        Ok(self.view(entry))
    }

    /// Lists entries ordered by due date, one page at a time.
    ///
    /// # Errors
    ///
    /// Returns the repository's error.
    pub async fn list_entries(
        &self,
        company_id: CompanyId,
        filter: &LedgerFilter,
        page: PageRequest,
    ) -> Result<PageResponse<EntryView>, StoreError> {
        let entries = self.entries.list(company_id, filter).await?;
        let total = entries.len() as u64;
        debug!(company_id = %company_id, total, "Listed ledger entries");

        let data = entries
            .into_iter()
            .skip(page.offset())
            .take(page.limit())
            .map(|entry| self.view(entry))
            .collect();
        Ok(PageResponse::new(data, page.page, page.per_page, total))
    }

    /// Applies a partial update.
    ///
    /// # Errors
    ///
    /// Returns `NotFound`, or a `Ledger` error if the update is rejected.
    pub async fn update_entry(
        &self,
        company_id: CompanyId,
        id: LedgerEntryId,
        update: EntryUpdate,
    ) -> Result<EntryView, StoreError> {
        let today = self.today();
        let (entry, transition) = self
            .entries
            .modify(
                company_id,
                id,
                Box::new(move |entry: &mut LedgerEntry| {
                    LedgerStateMachine::apply_update(entry, update, today)
                }),
            )
            .await?;
        Self::log_transition(company_id, &entry, transition);
        Ok(self.view(entry))
    }

    /// Records an absolute paid amount.
    ///
    /// # Errors
    ///
    /// Same as [`Self::update_entry`].
    pub async fn record_payment(
        &self,
        company_id: CompanyId,
        id: LedgerEntryId,
        paid_amount: Decimal,
        payment_date: Option<NaiveDate>,
    ) -> Result<EntryView, StoreError> {
        self.update_entry(company_id, id, EntryUpdate::payment(paid_amount, payment_date))
            .await
    }

    /// Adds a payment on top of what was already paid.
    ///
    /// # Errors
    ///
    /// Same as [`Self::update_entry`].
    pub async fn add_payment(
        &self,
        company_id: CompanyId,
        id: LedgerEntryId,
        amount: Decimal,
        payment_date: Option<NaiveDate>,
    ) -> Result<EntryView, StoreError> {
        let today = self.today();
        let (entry, transition) = self
            .entries
            .modify(
                company_id,
                id,
                Box::new(move |entry: &mut LedgerEntry| {
                    LedgerStateMachine::add_payment(entry, amount, payment_date, today)
                }),
            )
            .await?;
        Self::log_transition(company_id, &entry, transition);
        Ok(self.view(entry))
    }

    /// Cancels an entry.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the entry does not belong to the company.
    pub async fn cancel_entry(
        &self,
        company_id: CompanyId,
        id: LedgerEntryId,
    ) -> Result<EntryView, StoreError> {
        let today = self.today();
        let (entry, transition) = self
            .entries
            .modify(
                company_id,
                id,
                Box::new(move |entry: &mut LedgerEntry| LedgerStateMachine::cancel(entry, today)),
            )
            .await?;
        Self::log_transition(company_id, &entry, transition);
        Ok(self.view(entry))
    }

    /// Hard-deletes an entry. Paid receivables cannot be deleted.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` or `PaidReceivableDeletion`.
    pub async fn delete_entry(
        &self,
        company_id: CompanyId,
        id: LedgerEntryId,
    ) -> Result<(), StoreError> {
        let entry = self.entries.get(company_id, id).await?;
        if entry.kind == LedgerKind::Receivable && entry.status == StoredStatus::Paid {
            return Err(StoreError::PaidReceivableDeletion(id));
        }
        self.entries.delete(company_id, id).await?;
        info!(company_id = %company_id, entry_id = %id, "Entry deleted");
        Ok(())
    }

    /// Monthly buckets for one ledger.
    ///
    /// # Errors
    ///
    /// Returns the repository's error.
    pub async fn monthly_buckets(
        &self,
        company_id: CompanyId,
        kind: LedgerKind,
        range: &DateRange,
        bucket_date: BucketDate,
    ) -> Result<Vec<MonthBucket>, StoreError> {
        let entries = self.entries.list(company_id, &LedgerFilter::kind(kind)).await?;
        Ok(PeriodAggregator::monthly_buckets(
            &entries,
            range,
            self.today(),
            bucket_date,
        ))
    }

    /// Breakdown of one ledger by category or counterparty.
    ///
    /// # Errors
    ///
    /// Returns the repository's error.
    pub async fn breakdown(
        &self,
        company_id: CompanyId,
        kind: LedgerKind,
        key: GroupKey,
        range: Option<&DateRange>,
    ) -> Result<Vec<GroupTotal>, StoreError> {
        let entries = self.entries.list(company_id, &LedgerFilter::kind(kind)).await?;
        let names = match key {
            GroupKey::Category => self.directory.category_names(company_id).await,
            GroupKey::Counterparty => self.directory.counterparty_names(company_id, kind).await,
        };
        Ok(PeriodAggregator::breakdown(&entries, key, &names, range))
    }

    /// Income statement over the range.
    ///
    /// # Errors
    ///
    /// Returns the repository's error.
    pub async fn dre(
        &self,
        company_id: CompanyId,
        range: &DateRange,
    ) -> Result<DreReport, StoreError> {
        let filter = LedgerFilter {
            status: Some(StoredStatus::Paid),
            due_from: Some(range.start),
            due_to: Some(range.end),
            ..LedgerFilter::default()
        };
        let entries = self.entries.list(company_id, &filter).await?;
        let names = self.directory.category_names(company_id).await;
        Ok(PeriodAggregator::dre(&entries, range, &names, &self.dre_policy))
    }

    /// Cash forecast for the next `days` days (configured default when `None`).
    ///
    /// # Errors
    ///
    /// Returns a `Report` error for windows outside 1..=365 days.
    pub async fn forecast(
        &self,
        company_id: CompanyId,
        days: Option<u32>,
    ) -> Result<Vec<ForecastDay>, StoreError> {
        let filter = LedgerFilter {
            status: Some(StoredStatus::Pending),
            ..LedgerFilter::default()
        };
        let entries = self.entries.list(company_id, &filter).await?;
        let window = days.unwrap_or(self.forecast_days);
        Ok(PeriodAggregator::forecast(&entries, self.today(), window)?)
    }

    /// Cash-flow summary over the range, or over everything when `None`.
    ///
    /// # Errors
    ///
    /// Returns the repository's error.
    pub async fn cash_flow_summary(
        &self,
        company_id: CompanyId,
        range: Option<&DateRange>,
    ) -> Result<CashFlowSummary, StoreError> {
        let entries = self.entries.list(company_id, &LedgerFilter::default()).await?;
        Ok(PeriodAggregator::cash_flow_summary(
            &entries,
            range,
            self.today(),
        ))
    }

    /// Summary of one ledger.
    ///
    /// # Errors
    ///
    /// Returns the repository's error.
    pub async fn ledger_summary(
        &self,
        company_id: CompanyId,
        kind: LedgerKind,
    ) -> Result<LedgerSummary, StoreError> {
        let entries = self.entries.list(company_id, &LedgerFilter::kind(kind)).await?;
        Ok(PeriodAggregator::ledger_summary(&entries, self.today()))
    }

    /// Category summary of both ledgers.
    ///
    /// # Errors
    ///
    /// Returns the repository's error.
    pub async fn categories_summary(
        &self,
        company_id: CompanyId,
        range: &DateRange,
    ) -> Result<CategoriesSummary, StoreError> {
        let entries = self.entries.list(company_id, &LedgerFilter::default()).await?;
        let names = self.directory.category_names(company_id).await;
        Ok(PeriodAggregator::categories_summary(&entries, range, &names))
    }

    fn view(&self, entry: LedgerEntry) -> EntryView {
        let derived = LedgerStateMachine::annotate(&entry, self.today());
        EntryView { entry, derived }
    }

    fn log_transition(company_id: CompanyId, entry: &LedgerEntry, transition: Transition) {
        if transition.overpaid {
            warn!(
                company_id = %company_id,
                entry_id = %entry.id,
                total = %entry.total_amount,
                paid = %entry.paid_amount,
                "Entry overpaid"
            );
        }
        if transition.cancelled_paid {
            warn!(company_id = %company_id, entry_id = %entry.id, "Paid entry cancelled");
        }
        if transition.changed() {
            info!(
                company_id = %company_id,
                entry_id = %entry.id,
                from = %transition.from,
                to = %transition.to,
                "Entry status changed"
            );
        }
    }
}
