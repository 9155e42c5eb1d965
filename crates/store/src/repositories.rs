//! The `DocumentStore` seam.
//!
//! The migration core never talks to a database directly; everything it
//! persists goes through this trait. Unique-constraint semantics are
//! expressed by [`InsertOutcome`]: an insert that collides with an
//! existing key is a skip, not an error.

use async_trait::async_trait;
use ebmig_shared::MigrateResult;

use crate::documents::{Customer, Item, Supplier, TargetAccount, TargetDocument};

/// Outcome of an insert against a unique key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertOutcome {
    /// The record was created.
    Inserted,
    /// A record with the same unique key already existed; nothing changed.
    AlreadyExists,
}

impl InsertOutcome {
    /// Returns true when the insert created a new record.
    #[must_use]
    pub const fn is_inserted(self) -> bool {
        matches!(self, Self::Inserted)
    }
}

/// Persistence seam for everything the migration creates.
///
/// Implementations must enforce these unique keys:
/// account `name` and `account_number`, item `item_code`, party `name`,
/// and document `source_mutation_id`.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    // ===== Accounts =====

    /// Inserts an account; skips when the name or number already exists.
    async fn insert_account(&self, account: TargetAccount) -> MigrateResult<InsertOutcome>;

    /// Looks up an account by its unique name.
    async fn account_by_name(&self, name: &str) -> MigrateResult<Option<TargetAccount>>;

    /// Looks up an account by its source-code back-reference.
    async fn account_by_source_code(&self, code: &str) -> MigrateResult<Option<TargetAccount>>;

    /// Looks up an account by account number.
    async fn account_by_number(&self, number: &str) -> MigrateResult<Option<TargetAccount>>;

    /// Number of accounts in the store.
    async fn account_count(&self) -> MigrateResult<u64>;

    // ===== Items =====

    /// Inserts an item; skips when the item code already exists.
    async fn insert_item(&self, item: Item) -> MigrateResult<InsertOutcome>;

    /// Looks up an item by code.
    async fn item_by_code(&self, code: &str) -> MigrateResult<Option<Item>>;

    // ===== Parties =====

    /// Inserts a customer; skips when the name already exists.
    async fn insert_customer(&self, customer: Customer) -> MigrateResult<InsertOutcome>;

    /// Inserts a supplier; skips when the name already exists.
    async fn insert_supplier(&self, supplier: Supplier) -> MigrateResult<InsertOutcome>;

    /// Finds the customer bound to a source relation ID.
    async fn customer_by_relation(&self, relation_id: i64) -> MigrateResult<Option<Customer>>;

    /// Finds the supplier bound to a source relation ID.
    async fn supplier_by_relation(&self, relation_id: i64) -> MigrateResult<Option<Supplier>>;

    // ===== Posting documents =====

    /// Inserts a submitted document; skips when a document with the
    /// same `source_mutation_id` already exists.
    async fn insert_document(&self, document: TargetDocument) -> MigrateResult<InsertOutcome>;

    /// True when any document carries this source mutation ID.
    async fn document_exists_for_mutation(&self, source_mutation_id: i64) -> MigrateResult<bool>;

    /// Total number of posting documents.
    async fn document_count(&self) -> MigrateResult<u64>;
}
