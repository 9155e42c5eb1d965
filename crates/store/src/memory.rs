//! In-memory `DocumentStore`.
//!
//! Reference implementation used by tests and dry runs. Uniqueness is
//! enforced the same way a database would: colliding inserts report
//! `AlreadyExists` and leave the existing record untouched.

use async_trait::async_trait;
use dashmap::DashMap;
use ebmig_shared::MigrateResult;

use crate::documents::{Customer, Item, Supplier, TargetAccount, TargetDocument};
use crate::repositories::{DocumentStore, InsertOutcome};

/// DashMap-backed document store.
#[derive(Debug, Default)]
pub struct MemoryStore {
    accounts: DashMap<String, TargetAccount>,
    items: DashMap<String, Item>,
    customers: DashMap<String, Customer>,
    suppliers: DashMap<String, Supplier>,
    documents: DashMap<String, TargetDocument>,
    mutation_index: DashMap<i64, String>,
}

impl MemoryStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns every stored document, unordered. Test helper.
    #[must_use]
    pub fn all_documents(&self) -> Vec<TargetDocument> {
        self.documents.iter().map(|e| e.value().clone()).collect()
    }

    /// Returns the document created for a mutation, when any. Test helper.
    #[must_use]
    pub fn document_for_mutation(&self, source_mutation_id: i64) -> Option<TargetDocument> {
        let name = self.mutation_index.get(&source_mutation_id)?;
        self.documents.get(name.value()).map(|e| e.value().clone())
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn insert_account(&self, account: TargetAccount) -> MigrateResult<InsertOutcome> {
        if self.accounts.contains_key(&account.name) {
            return Ok(InsertOutcome::AlreadyExists);
        }
        if !account.account_number.is_empty()
            && self
                .accounts
                .iter()
                .any(|e| e.value().account_number == account.account_number)
        {
            return Ok(InsertOutcome::AlreadyExists);
        }
        self.accounts.insert(account.name.clone(), account);
        Ok(InsertOutcome::Inserted)
    }

    async fn account_by_name(&self, name: &str) -> MigrateResult<Option<TargetAccount>> {
        Ok(self.accounts.get(name).map(|e| e.value().clone()))
    }

    async fn account_by_source_code(&self, code: &str) -> MigrateResult<Option<TargetAccount>> {
        Ok(self
            .accounts
            .iter()
            .find(|e| e.value().source_code.as_deref() == Some(code))
            .map(|e| e.value().clone()))
    }

    async fn account_by_number(&self, number: &str) -> MigrateResult<Option<TargetAccount>> {
        if number.is_empty() {
            return Ok(None);
        }
        Ok(self
            .accounts
            .iter()
            .find(|e| e.value().account_number == number)
            .map(|e| e.value().clone()))
    }

    async fn account_count(&self) -> MigrateResult<u64> {
        Ok(self.accounts.len() as u64)
    }

    async fn insert_item(&self, item: Item) -> MigrateResult<InsertOutcome> {
        if self.items.contains_key(&item.item_code) {
            return Ok(InsertOutcome::AlreadyExists);
        }
        self.items.insert(item.item_code.clone(), item);
        Ok(InsertOutcome::Inserted)
    }

    async fn item_by_code(&self, code: &str) -> MigrateResult<Option<Item>> {
        Ok(self.items.get(code).map(|e| e.value().clone()))
    }

    async fn insert_customer(&self, customer: Customer) -> MigrateResult<InsertOutcome> {
        if self.customers.contains_key(&customer.name) {
            return Ok(InsertOutcome::AlreadyExists);
        }
        self.customers.insert(customer.name.clone(), customer);
        Ok(InsertOutcome::Inserted)
    }

    async fn insert_supplier(&self, supplier: Supplier) -> MigrateResult<InsertOutcome> {
        if self.suppliers.contains_key(&supplier.name) {
            return Ok(InsertOutcome::AlreadyExists);
        }
        self.suppliers.insert(supplier.name.clone(), supplier);
        Ok(InsertOutcome::Inserted)
    }

    async fn customer_by_relation(&self, relation_id: i64) -> MigrateResult<Option<Customer>> {
        Ok(self
            .customers
            .iter()
            .find(|e| e.value().relation_id == Some(relation_id))
            .map(|e| e.value().clone()))
    }

    async fn supplier_by_relation(&self, relation_id: i64) -> MigrateResult<Option<Supplier>> {
        Ok(self
            .suppliers
            .iter()
            .find(|e| e.value().relation_id == Some(relation_id))
            .map(|e| e.value().clone()))
    }

    async fn insert_document(&self, document: TargetDocument) -> MigrateResult<InsertOutcome> {
        let source_id = document.source_mutation_id();
        if self.mutation_index.contains_key(&source_id) {
            return Ok(InsertOutcome::AlreadyExists);
        }
        let name = document.name().to_string();
        self.mutation_index.insert(source_id, name.clone());
        self.documents.insert(name, document);
        Ok(InsertOutcome::Inserted)
    }

    async fn document_exists_for_mutation(&self, source_mutation_id: i64) -> MigrateResult<bool> {
        Ok(self.mutation_index.contains_key(&source_mutation_id))
    }

    async fn document_count(&self) -> MigrateResult<u64> {
        Ok(self.documents.len() as u64)
    }
}
