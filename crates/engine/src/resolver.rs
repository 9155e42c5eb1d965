//! Ledger-code to target-account resolver.
//!
//! Looks up the target account for a source ledger code, first by the
//! `source_code` back-reference, then by account number. Results,
//! including negative ones, are memoized for the duration of the run.

use std::sync::Arc;

use ebmig_shared::MigrateResult;
use ebmig_store::DocumentStore;
use moka::sync::Cache;

/// Run-scoped memoization capacity.
const RESOLVER_CACHE_CAPACITY: u64 = 10_000;

/// Resolves source ledger codes to target account names.
pub struct LedgerResolver {
    store: Arc<dyn DocumentStore>,
    cache: Cache<String, Option<String>>,
}

impl LedgerResolver {
    /// Creates a resolver scoped to one migration run.
    #[must_use]
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self {
            store,
            cache: Cache::new(RESOLVER_CACHE_CAPACITY),
        }
    }

    /// Resolves a ledger code to the target account name.
    ///
    /// Returns `None` when no mapping exists; callers decide whether to
    /// fail or fall back.
    pub async fn resolve(&self, ledger_code: &str) -> MigrateResult<Option<String>> {
        if let Some(cached) = self.cache.get(ledger_code) {
            return Ok(cached);
        }

        let resolved = match self.store.account_by_source_code(ledger_code).await? {
            Some(account) => Some(account.name),
            None => self
                .store
                .account_by_number(ledger_code)
                .await?
                .map(|account| account.name),
        };

        self.cache.insert(ledger_code.to_string(), resolved.clone());
        Ok(resolved)
    }
}

#[cfg(test)]
mod tests {
    use ebmig_core::classify::RootType;
    use ebmig_store::{MemoryStore, TargetAccount};

    use super::*;

    async fn store_with_account(source_code: Option<&str>, number: &str) -> Arc<MemoryStore> {
        let store = Arc::new(MemoryStore::new());
        store
            .insert_account(TargetAccount {
                name: format!("{number} - Test"),
                account_number: number.to_string(),
                account_name: "Test".into(),
                root_type: RootType::Income,
                account_type: None,
                parent_account: Some("Income".into()),
                is_group: false,
                company: "Acme".into(),
                source_code: source_code.map(ToString::to_string),
            })
            .await
            .unwrap();
        store
    }

    #[tokio::test]
    async fn test_resolve_by_source_code() {
        let store = store_with_account(Some("8000"), "8000").await;
        let resolver = LedgerResolver::new(store);

        let hit = resolver.resolve("8000").await.unwrap();
        assert_eq!(hit.as_deref(), Some("8000 - Test"));
    }

    #[tokio::test]
    async fn test_resolve_falls_back_to_account_number() {
        // No source_code back-reference, only the number matches.
        let store = store_with_account(None, "8000").await;
        let resolver = LedgerResolver::new(store);

        let hit = resolver.resolve("8000").await.unwrap();
        assert_eq!(hit.as_deref(), Some("8000 - Test"));
    }

    #[tokio::test]
    async fn test_unresolved_code_is_none_and_memoized() {
        let store = Arc::new(MemoryStore::new());
        let resolver = LedgerResolver::new(store.clone());

        assert!(resolver.resolve("9999").await.unwrap().is_none());

        // An account created after the first lookup is not seen: the
        // negative result is memoized for the run.
        store
            .insert_account(TargetAccount {
                name: "9999 - Late".into(),
                account_number: "9999".into(),
                account_name: "Late".into(),
                root_type: RootType::Expense,
                account_type: None,
                parent_account: Some("Expenses".into()),
                is_group: false,
                company: "Acme".into(),
                source_code: Some("9999".into()),
            })
            .await
            .unwrap();

        assert!(resolver.resolve("9999").await.unwrap().is_none());
    }
}
