//! Counterparty and category lookups.

use std::collections::HashMap;

use caixa_core::ledger::LedgerKind;
use caixa_core::reports::NameLookup;
use caixa_shared::types::{CategoryId, CompanyId, CounterpartyId};
use tokio::sync::RwLock;

/// Read access to the suppliers, customers and categories of a company.
#[async_trait::async_trait]
pub trait ReferenceDirectory: Send + Sync {
    /// Name of a supplier (payables) or customer (receivables), if it exists.
    async fn counterparty_name(
        &self,
        company_id: CompanyId,
        kind: LedgerKind,
        id: CounterpartyId,
    ) -> Option<String>;

    /// Name of a category, if it exists.
    async fn category_name(&self, company_id: CompanyId, id: CategoryId) -> Option<String>;

    /// Every category name of the company.
    async fn category_names(&self, company_id: CompanyId) -> NameLookup;

    /// Every supplier or customer name of the company.
    async fn counterparty_names(&self, company_id: CompanyId, kind: LedgerKind) -> NameLookup;
}

#[derive(Debug, Default)]
struct CompanyDirectory {
    suppliers: NameLookup,
    customers: NameLookup,
    categories: NameLookup,
}

impl CompanyDirectory {
    fn counterparties(&self, kind: LedgerKind) -> &NameLookup {
        match kind {
            LedgerKind::Payable => &self.suppliers,
            LedgerKind::Receivable => &self.customers,
        }
    }
}

/// In-memory directory.
#[derive(Debug, Default)]
pub struct InMemoryDirectory {
    companies: RwLock<HashMap<CompanyId, CompanyDirectory>>,
}

impl InMemoryDirectory {
    /// Creates an empty directory.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a supplier (payables) or customer (receivables).
    pub async fn add_counterparty(
        &self,
        company_id: CompanyId,
        kind: LedgerKind,
        id: CounterpartyId,
        name: impl Into<String>,
    ) {
        let mut companies = self.companies.write().await;
        let directory = companies.entry(company_id).or_default();
        let names = match kind {
            LedgerKind::Payable => &mut directory.suppliers,
            LedgerKind::Receivable => &mut directory.customers,
        };
        names.insert(id.into_inner(), name.into());
    }

    /// Registers a category.
    pub async fn add_category(&self, company_id: CompanyId, id: CategoryId, name: impl Into<String>) {
        self.companies
            .write()
            .await
            .entry(company_id)
            .or_default()
            .categories
            .insert(id.into_inner(), name.into());
    }
}

#[async_trait::async_trait]
impl ReferenceDirectory for InMemoryDirectory {
    async fn counterparty_name(
        &self,
        company_id: CompanyId,
        kind: LedgerKind,
        id: CounterpartyId,
    ) -> Option<String> {
        self.companies
            .read()
            .await
            .get(&company_id)
            .and_then(|d| d.counterparties(kind).get(&id.into_inner()).cloned())
    }

    async fn category_name(&self, company_id: CompanyId, id: CategoryId) -> Option<String> {
        self.companies
            .read()
            .await
            .get(&company_id)
            .and_then(|d| d.categories.get(&id.into_inner()).cloned())
    }

    async fn category_names(&self, company_id: CompanyId) -> NameLookup {
        self.companies
            .read()
            .await
            .get(&company_id)
            .map(|d| d.categories.clone())
            .unwrap_or_default()
    }

    async fn counterparty_names(&self, company_id: CompanyId, kind: LedgerKind) -> NameLookup {
        self.companies
            .read()
            .await
            .get(&company_id)
            .map(|d| d.counterparties(kind).clone())
            .unwrap_or_default()
    }
}
