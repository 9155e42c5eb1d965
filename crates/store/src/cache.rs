//! Mutation cache keyed by source ID.
//!
//! Fetching is the slowest phase and is re-runnable; caching the raw
//! JSON plus a few denormalized fields makes imports resumable and lets
//! the dispatcher re-run without re-contacting the source.

use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use dashmap::DashMap;
use ebmig_core::mutation::{Mutation, MutationType};
use ebmig_shared::{MigrateError, MigrateResult};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One cached mutation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheEntry {
    /// Source mutation ID (unique key).
    pub source_id: i64,
    /// The raw mutation JSON as fetched.
    pub raw_json: serde_json::Value,
    /// Denormalized mutation type.
    pub mutation_type: MutationType,
    /// Denormalized date.
    pub date: NaiveDate,
    /// Denormalized absolute amount sum.
    pub amount: Decimal,
    /// Ledger code of the first row, when any.
    pub ledger_code: Option<String>,
    /// Relation foreign key, when any.
    pub relation_id: Option<i64>,
    /// Invoice reference, when any.
    pub invoice_number: Option<String>,
    /// Entry reference, when any.
    pub entry_number: Option<String>,
    /// When this entry was fetched.
    pub fetched_at: DateTime<Utc>,
}

impl CacheEntry {
    /// Builds a cache entry from a fetched mutation.
    pub fn from_mutation(mutation: &Mutation) -> MigrateResult<Self> {
        let raw_json = serde_json::to_value(mutation)
            .map_err(|e| MigrateError::Store(format!("serialize mutation {}: {e}", mutation.id)))?;

        Ok(Self {
            source_id: mutation.id,
            raw_json,
            mutation_type: mutation.mutation_type,
            date: mutation.date,
            amount: mutation.principal_amount(),
            ledger_code: mutation.first_ledger_code().map(ToString::to_string),
            relation_id: mutation.relation_id,
            invoice_number: mutation.invoice_number.clone(),
            entry_number: mutation.entry_number.clone(),
            fetched_at: Utc::now(),
        })
    }

    /// Rehydrates the mutation from the raw JSON.
    pub fn mutation(&self) -> MigrateResult<Mutation> {
        serde_json::from_value(self.raw_json.clone())
            .map_err(|e| MigrateError::Store(format!("corrupt cache entry {}: {e}", self.source_id)))
    }
}

/// Aggregate view of cache contents.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CacheStatistics {
    /// Total cached mutations.
    pub total: u64,
    /// Count per mutation type.
    pub by_type: BTreeMap<MutationType, u64>,
    /// Earliest and latest mutation date.
    pub date_range: Option<(NaiveDate, NaiveDate)>,
    /// Lowest and highest source ID.
    pub id_range: Option<(i64, i64)>,
}

/// Persistent mutation store keyed by source ID.
#[async_trait]
pub trait MutationCache: Send + Sync {
    /// True when the source ID is cached.
    async fn has(&self, source_id: i64) -> MigrateResult<bool>;

    /// Idempotent insert; returns true when the entry was new.
    async fn put(&self, mutation: &Mutation) -> MigrateResult<bool>;

    /// Fetches and rehydrates a cached mutation.
    async fn get(&self, source_id: i64) -> MigrateResult<Option<Mutation>>;

    /// All cached mutations of one type, ascending by source ID.
    async fn by_type(&self, mutation_type: MutationType) -> MigrateResult<Vec<Mutation>>;

    /// Aggregate contents summary.
    async fn statistics(&self) -> MigrateResult<CacheStatistics>;

    /// Drops every entry.
    async fn clear(&self) -> MigrateResult<()>;
}

/// In-memory mutation cache.
#[derive(Debug, Default)]
pub struct MemoryMutationCache {
    entries: DashMap<i64, CacheEntry>,
}

impl MemoryMutationCache {
    /// Creates an empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl MutationCache for MemoryMutationCache {
    async fn has(&self, source_id: i64) -> MigrateResult<bool> {
        Ok(self.entries.contains_key(&source_id))
    }

    async fn put(&self, mutation: &Mutation) -> MigrateResult<bool> {
        if self.entries.contains_key(&mutation.id) {
            return Ok(false);
        }
        let entry = CacheEntry::from_mutation(mutation)?;
        self.entries.insert(mutation.id, entry);
        Ok(true)
    }

    async fn get(&self, source_id: i64) -> MigrateResult<Option<Mutation>> {
        self.entries
            .get(&source_id)
            .map(|e| e.value().mutation())
            .transpose()
    }

    async fn by_type(&self, mutation_type: MutationType) -> MigrateResult<Vec<Mutation>> {
        let mut ids: Vec<i64> = self
            .entries
            .iter()
            .filter(|e| e.value().mutation_type == mutation_type)
            .map(|e| e.value().source_id)
            .collect();
        ids.sort_unstable();

        let mut mutations = Vec::with_capacity(ids.len());
        for id in ids {
            if let Some(entry) = self.entries.get(&id) {
                mutations.push(entry.value().mutation()?);
            }
        }
        Ok(mutations)
    }

    async fn statistics(&self) -> MigrateResult<CacheStatistics> {
        let mut by_type: BTreeMap<MutationType, u64> = BTreeMap::new();
        let mut date_range: Option<(NaiveDate, NaiveDate)> = None;
        let mut id_range: Option<(i64, i64)> = None;

        for entry in &self.entries {
            let entry = entry.value();
            *by_type.entry(entry.mutation_type).or_insert(0) += 1;
            date_range = Some(match date_range {
                None => (entry.date, entry.date),
                Some((lo, hi)) => (lo.min(entry.date), hi.max(entry.date)),
            });
            id_range = Some(match id_range {
                None => (entry.source_id, entry.source_id),
                Some((lo, hi)) => (lo.min(entry.source_id), hi.max(entry.source_id)),
            });
        }

        Ok(CacheStatistics {
            total: self.entries.len() as u64,
            by_type,
            date_range,
            id_range,
        })
    }

    async fn clear(&self) -> MigrateResult<()> {
        self.entries.clear();
        Ok(())
    }
}
