//! Persists a derived chart-of-accounts plan.
//!
//! The five fixed roots are created first, then group accounts, then
//! the accounts themselves. Re-running against a populated store skips
//! every existing record, so the build is safe to repeat.

use std::sync::Arc;

use ebmig_core::account::SourceAccount;
use ebmig_core::classify::RootType;
use ebmig_core::coa::{ParentRef, derive_plan};
use ebmig_shared::MigrateResult;
use ebmig_store::{DocumentStore, TargetAccount};
use tracing::info;

/// Counters from one chart build.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CoaBuildStats {
    /// Root accounts created.
    pub roots_created: u64,
    /// Group accounts created.
    pub groups_created: u64,
    /// Leaf and intermediate accounts created.
    pub accounts_created: u64,
    /// Records that already existed and were skipped.
    pub skipped: u64,
}

/// Builds the target chart of accounts from the source chart.
pub struct CoaBuilder {
    store: Arc<dyn DocumentStore>,
    company: String,
}

impl CoaBuilder {
    /// Creates a builder for one company.
    #[must_use]
    pub fn new(store: Arc<dyn DocumentStore>, company: &str) -> Self {
        Self {
            store,
            company: company.to_string(),
        }
    }

    /// Creates the five root accounts if missing.
    pub async fn ensure_roots(&self) -> MigrateResult<u64> {
        let mut created = 0;
        for root_type in RootType::ALL {
            let outcome = self
                .store
                .insert_account(TargetAccount::root(root_type, &self.company))
                .await?;
            if outcome.is_inserted() {
                created += 1;
            }
        }
        Ok(created)
    }

    /// Derives and persists the full plan for a source chart.
    pub async fn build(&self, source: &[SourceAccount]) -> MigrateResult<CoaBuildStats> {
        let mut stats = CoaBuildStats {
            roots_created: self.ensure_roots().await?,
            ..CoaBuildStats::default()
        };

        let plan = derive_plan(source);

        // Group parents are looked up in the plan so the account rows
        // always reference the group names actually persisted above.
        let group_names: std::collections::BTreeMap<&str, &str> = plan
            .groups
            .iter()
            .map(|g| (g.code.as_str(), g.name.as_str()))
            .collect();

        for group in &plan.groups {
            let account = TargetAccount {
                name: group.name.clone(),
                account_number: String::new(),
                account_name: group.name.clone(),
                root_type: group.root_type,
                account_type: None,
                parent_account: Some(group.root_type.root_account_name().to_string()),
                is_group: true,
                company: self.company.clone(),
                source_code: None,
            };
            if self.store.insert_account(account).await?.is_inserted() {
                stats.groups_created += 1;
            } else {
                stats.skipped += 1;
            }
        }

        for planned in &plan.accounts {
            let parent_account = match &planned.parent {
                ParentRef::Root(root) => root.root_account_name().to_string(),
                ParentRef::Group(code) => group_names.get(code.as_str()).map_or_else(
                    || planned.root_type.root_account_name().to_string(),
                    ToString::to_string,
                ),
            };
            let account = TargetAccount {
                name: planned.name.clone(),
                account_number: planned.account_number.clone(),
                account_name: planned.account_name.clone(),
                root_type: planned.root_type,
                account_type: planned.account_type,
                parent_account: Some(parent_account),
                is_group: planned.is_group,
                company: self.company.clone(),
                source_code: Some(planned.source_code.clone()),
            };
            if self.store.insert_account(account).await?.is_inserted() {
                stats.accounts_created += 1;
            } else {
                stats.skipped += 1;
            }
        }

        info!(
            roots = stats.roots_created,
            groups = stats.groups_created,
            accounts = stats.accounts_created,
            skipped = stats.skipped,
            "chart of accounts built"
        );
        Ok(stats)
    }
}
