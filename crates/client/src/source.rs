//! The `MutationSource` seam.
//!
//! The iterator and orchestrator only depend on this trait, so they can
//! be exercised against [`FakeSource`] without network access.

use async_trait::async_trait;
use chrono::NaiveDate;
use ebmig_core::account::{RelationType, SourceAccount, SourceRelation};
use ebmig_core::mutation::{Mutation, MutationType};
use ebmig_shared::MigrateResult;

/// Read access to the source accounting system.
#[async_trait]
pub trait MutationSource: Send + Sync {
    /// Summary fetch by ID; `None` on a gap. Rows may be omitted.
    async fn mutation_by_id(&self, id: i64) -> MigrateResult<Option<Mutation>>;

    /// Detail fetch by ID with full row data; `None` on a gap.
    async fn mutation_detail(&self, id: i64) -> MigrateResult<Option<Mutation>>;

    /// Full chart-of-accounts listing.
    async fn list_accounts(&self) -> MigrateResult<Vec<SourceAccount>>;

    /// Relation listing filtered by kind.
    async fn list_relations(&self, relation_type: RelationType)
    -> MigrateResult<Vec<SourceRelation>>;

    /// Typed mutation listing with an optional date window.
    async fn list_mutations_by_type(
        &self,
        mutation_type: MutationType,
        date_from: Option<NaiveDate>,
        date_to: Option<NaiveDate>,
    ) -> MigrateResult<Vec<Mutation>>;
}

/// In-memory source for tests.
///
/// Summary and detail payloads are kept separately so mismatch and
/// rows-omitted behavior can be simulated.
#[derive(Debug, Default)]
pub struct FakeSource {
    summaries: std::collections::BTreeMap<i64, Mutation>,
    details: std::collections::BTreeMap<i64, Mutation>,
    accounts: Vec<SourceAccount>,
    relations: Vec<SourceRelation>,
}

impl FakeSource {
    /// Creates an empty fake.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a mutation on both the summary and detail endpoints.
    pub fn add_mutation(&mut self, mutation: Mutation) {
        self.summaries.insert(mutation.id, mutation.clone());
        self.details.insert(mutation.id, mutation);
    }

    /// Registers a summary payload under an arbitrary requested ID,
    /// e.g. a mismatched or zero-ID payload.
    pub fn add_summary_payload(&mut self, requested_id: i64, payload: Mutation) {
        self.summaries.insert(requested_id, payload);
    }

    /// Registers a detail payload only.
    pub fn add_detail(&mut self, mutation: Mutation) {
        self.details.insert(mutation.id, mutation);
    }

    /// Seeds the chart of accounts.
    pub fn set_accounts(&mut self, accounts: Vec<SourceAccount>) {
        self.accounts = accounts;
    }

    /// Seeds the relation listing.
    pub fn set_relations(&mut self, relations: Vec<SourceRelation>) {
        self.relations = relations;
    }
}

#[async_trait]
impl MutationSource for FakeSource {
    async fn mutation_by_id(&self, id: i64) -> MigrateResult<Option<Mutation>> {
        Ok(self.summaries.get(&id).cloned())
    }

    async fn mutation_detail(&self, id: i64) -> MigrateResult<Option<Mutation>> {
        Ok(self.details.get(&id).cloned())
    }

    async fn list_accounts(&self) -> MigrateResult<Vec<SourceAccount>> {
        Ok(self.accounts.clone())
    }

    async fn list_relations(
        &self,
        relation_type: RelationType,
    ) -> MigrateResult<Vec<SourceRelation>> {
        Ok(self
            .relations
            .iter()
            .filter(|r| r.relation_type == relation_type)
            .cloned()
            .collect())
    }

    async fn list_mutations_by_type(
        &self,
        mutation_type: MutationType,
        date_from: Option<NaiveDate>,
        date_to: Option<NaiveDate>,
    ) -> MigrateResult<Vec<Mutation>> {
        Ok(self
            .details
            .values()
            .filter(|m| m.mutation_type == mutation_type)
            .filter(|m| date_from.is_none_or(|d| m.date >= d))
            .filter(|m| date_to.is_none_or(|d| m.date <= d))
            .cloned()
            .collect())
    }
}
