//! Ledger entry repository.

use std::collections::{BTreeMap, HashMap};

use caixa_core::LedgerError;
use caixa_core::ledger::{
    LedgerEntry, LedgerEntryDraft, LedgerKind, StoredStatus, Transition,
};
use caixa_shared::types::{CategoryId, CompanyId, CounterpartyId, LedgerEntryId};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

use crate::error::StoreError;

/// Filter for listing entries. Empty fields match everything.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LedgerFilter {
    /// Payables or receivables.
    pub kind: Option<LedgerKind>,
    /// Stored status.
    pub status: Option<StoredStatus>,
    /// Supplier or customer.
    pub counterparty_id: Option<CounterpartyId>,
    /// Category.
    pub category_id: Option<CategoryId>,
    /// Earliest due date, inclusive.
    pub due_from: Option<NaiveDate>,
    /// Latest due date, inclusive.
    pub due_to: Option<NaiveDate>,
    /// Case-insensitive text over description, notes and reference.
    pub search: Option<String>,
}

impl LedgerFilter {
    /// Filter for one ledger.
    #[must_use]
    pub fn kind(kind: LedgerKind) -> Self {
        Self {
            kind: Some(kind),
            ..Self::default()
        }
    }

    /// Returns true if the entry passes every set criterion.
    #[must_use]
    pub fn matches(&self, entry: &LedgerEntry) -> bool {
        if self.kind.is_some_and(|k| k != entry.kind)
            || self.status.is_some_and(|s| s != entry.status)
            || self.counterparty_id.is_some_and(|c| c != entry.counterparty_id)
            || self.category_id.is_some_and(|c| Some(c) != entry.category_id)
            || self.due_from.is_some_and(|d| entry.due_date < d)
            || self.due_to.is_some_and(|d| entry.due_date > d)
        {
            return false;
        }
        match self.search.as_deref().map(str::trim) {
            None | Some("") => true,
            Some(term) => {
                let term = term.to_lowercase();
                [
                    Some(entry.description.as_str()),
                    entry.notes.as_deref(),
                    entry.reference.as_deref(),
                ]
                .into_iter()
                .flatten()
                .any(|text| text.to_lowercase().contains(&term))
            }
        }
    }
}

/// A change applied to one stored entry. Returning an error discards it.
pub type EntryMutation =
    Box<dyn FnOnce(&mut LedgerEntry) -> Result<Transition, LedgerError> + Send>;

/// Tenant-scoped persistence for ledger entries.
///
/// Every method is scoped by company; an entry of another company is
/// reported as not found.
#[async_trait::async_trait]
pub trait LedgerRepository: Send + Sync {
    /// Persists a batch atomically and assigns ids. Either every draft is
    /// stored or none is.
    async fn insert_batch(
        &self,
        company_id: CompanyId,
        drafts: Vec<LedgerEntryDraft>,
    ) -> Result<Vec<LedgerEntry>, StoreError>;

    /// Persists one entry and assigns its id.
    async fn insert(
        &self,
        company_id: CompanyId,
        draft: LedgerEntryDraft,
    ) -> Result<LedgerEntry, StoreError>;

    /// Fetches one entry.
    async fn get(&self, company_id: CompanyId, id: LedgerEntryId)
    -> Result<LedgerEntry, StoreError>;

    /// Lists matching entries ordered by due date.
    async fn list(
        &self,
        company_id: CompanyId,
        filter: &LedgerFilter,
    ) -> Result<Vec<LedgerEntry>, StoreError>;

    /// Reads, mutates and writes back one entry as a single step. No other
    /// write to the entry can interleave, and nothing is written when the
    /// mutation fails.
    async fn modify(
        &self,
        company_id: CompanyId,
        id: LedgerEntryId,
        apply: EntryMutation,
    ) -> Result<(LedgerEntry, Transition), StoreError>;

    /// Hard-deletes an entry. Sibling installments are not renumbered.
    async fn delete(&self, company_id: CompanyId, id: LedgerEntryId) -> Result<(), StoreError>;
}

/// In-memory repository guarded by a single async lock.
#[derive(Debug, Default)]
pub struct InMemoryLedgerRepository {
    companies: RwLock<HashMap<CompanyId, BTreeMap<LedgerEntryId, LedgerEntry>>>,
    max_entries_per_company: Option<usize>,
}

impl InMemoryLedgerRepository {
    /// Creates an empty repository without quotas.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty repository that caps entries per company.
    #[must_use]
    pub fn with_quota(max_entries_per_company: usize) -> Self {
        Self {
            companies: RwLock::default(),
            max_entries_per_company: Some(max_entries_per_company),
        }
    }

    fn check_quota(
        &self,
        company_id: CompanyId,
        stored: usize,
        incoming: usize,
    ) -> Result<(), StoreError> {
        match self.max_entries_per_company {
            Some(limit) if stored + incoming > limit => {
                Err(StoreError::QuotaExceeded { company_id, limit })
            }
            _ => Ok(()),
        }
    }
}

#[async_trait::async_trait]
impl LedgerRepository for InMemoryLedgerRepository {
    async fn insert_batch(
        &self,
        company_id: CompanyId,
        drafts: Vec<LedgerEntryDraft>,
    ) -> Result<Vec<LedgerEntry>, StoreError> {
        let mut companies = self.companies.write().await;
        let entries = companies.entry(company_id).or_default();

        self.check_quota(company_id, entries.len(), drafts.len())?;

        let created: Vec<LedgerEntry> = drafts
            .into_iter()
            .map(|draft| draft.into_entry(LedgerEntryId::new()))
            .collect();
        for entry in &created {
            entries.insert(entry.id, entry.clone());
        }
        Ok(created)
    }

    async fn insert(
        &self,
        company_id: CompanyId,
        draft: LedgerEntryDraft,
    ) -> Result<LedgerEntry, StoreError> {
        let mut companies = self.companies.write().await;
        let entries = companies.entry(company_id).or_default();
        self.check_quota(company_id, entries.len(), 1)?;

        let entry = draft.into_entry(LedgerEntryId::new());
        entries.insert(entry.id, entry.clone());
        Ok(entry)
    }

    async fn get(
        &self,
        company_id: CompanyId,
        id: LedgerEntryId,
    ) -> Result<LedgerEntry, StoreError> {
        self.companies
            .read()
            .await
            .get(&company_id)
            .and_then(|entries| entries.get(&id))
            .cloned()
            .ok_or(StoreError::NotFound(id))
    }

    async fn list(
        &self,
        company_id: CompanyId,
        filter: &LedgerFilter,
    ) -> Result<Vec<LedgerEntry>, StoreError> {
        let companies = self.companies.read().await;
        let mut entries: Vec<LedgerEntry> = companies
            .get(&company_id)
            .into_iter()
            .flat_map(BTreeMap::values)
            .filter(|entry| filter.matches(entry))
            .cloned()
            .collect();
        entries.sort_by(|a, b| {
            a.due_date
                .cmp(&b.due_date)
                .then_with(|| a.installment_number.cmp(&b.installment_number))
                .then_with(|| a.id.cmp(&b.id))
        });
        Ok(entries)
    }

    async fn modify(
        &self,
        company_id: CompanyId,
        id: LedgerEntryId,
        apply: EntryMutation,
    ) -> Result<(LedgerEntry, Transition), StoreError> {
        let mut companies = self.companies.write().await;
        let slot = companies
            .get_mut(&company_id)
            .and_then(|entries| entries.get_mut(&id))
            .ok_or(StoreError::NotFound(id))?;

        let mut entry = slot.clone();
        let transition = apply(&mut entry)?;
        *slot = entry.clone();
        Ok((entry, transition))
    }

    async fn delete(&self, company_id: CompanyId, id: LedgerEntryId) -> Result<(), StoreError> {
        self.companies
            .write()
            .await
            .get_mut(&company_id)
            .and_then(|entries| entries.remove(&id))
            .map(|_| ())
            .ok_or(StoreError::NotFound(id))
    }
}
