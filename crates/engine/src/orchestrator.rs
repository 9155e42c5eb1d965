//! The migration run: prepare, chart, relations, transactions.
//!
//! A run walks fixed phases and reports progress as a percentage:
//! 0-20 target preparation, 20-30 chart of accounts, 30-40 relations,
//! 40-95 transactions in type order, 95-100 finalization. Non-fatal
//! errors are counted and logged per mutation; only authentication and
//! configuration errors abort the run.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use chrono::{DateTime, Utc};
use ebmig_client::{MutationIterator, MutationSource};
use ebmig_core::account::RelationType;
use ebmig_core::classify::{RootType, TargetAccountType};
use ebmig_core::mutation::{Mutation, MutationType};
use ebmig_shared::{MigrateResult, MigrationConfig, ProgressBus, ProgressEvent};
use ebmig_store::{DocumentStore, MutationCache, TargetAccount};
use tracing::{error, info, warn};

use crate::coa_builder::CoaBuilder;
use crate::dispatch::{DispatchOutcome, Dispatcher, RunContext};
use crate::party::PartyResolver;

/// Error log entries kept per run.
const ERROR_LOG_CAP: usize = 50;

/// Counters from one cache-fill crawl.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheFetchStats {
    /// IDs checked against the source.
    pub checked: u64,
    /// Mutations found.
    pub found: u64,
    /// Mutations newly added to the cache.
    pub cached: u64,
    /// True when the consecutive-miss cap cut the crawl short.
    pub stopped_early: bool,
}

/// Terminal state of a migration run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStatus {
    /// Phases are still executing.
    Running,
    /// The run finished (possibly cancelled mid-way, with partial counts).
    Completed,
    /// A fatal error aborted the run.
    Failed,
}

/// Operator-facing result of one migration run.
#[derive(Debug, Clone)]
pub struct MigrationReport {
    /// Terminal status.
    pub status: RunStatus,
    /// When the run started.
    pub start_time: DateTime<Utc>,
    /// When the run ended; `None` while running.
    pub end_time: Option<DateTime<Utc>>,
    /// Last phase description published.
    pub current_operation: String,
    /// Last progress percentage published (0-100).
    pub progress_percentage: u8,
    /// Whether cancellation cut the run short.
    pub cancelled: bool,
    /// Accounts created (roots, groups and leaves).
    pub accounts_created: u64,
    /// Customers created from relation listings.
    pub customers_created: u64,
    /// Suppliers created from relation listings.
    pub suppliers_created: u64,
    /// Documents created, per mutation type.
    pub imported_by_type: BTreeMap<MutationType, u64>,
    /// Total documents created.
    pub imported: u64,
    /// Mutations skipped (opening balances, already imported).
    pub skipped: u64,
    /// Mutations that failed conversion.
    pub failed: u64,
    /// First [`ERROR_LOG_CAP`] error messages.
    pub error_log: Vec<String>,
}

impl MigrationReport {
    fn new() -> Self {
        Self {
            status: RunStatus::Running,
            start_time: Utc::now(),
            end_time: None,
            current_operation: String::new(),
            progress_percentage: 0,
            cancelled: false,
            accounts_created: 0,
            customers_created: 0,
            suppliers_created: 0,
            imported_by_type: BTreeMap::new(),
            imported: 0,
            skipped: 0,
            failed: 0,
            error_log: Vec::new(),
        }
    }

    /// One-line human summary.
    #[must_use]
    pub fn summary(&self) -> String {
        format!(
            "{:?}: {} accounts, {} customers, {} suppliers, \
             {} documents imported, {} skipped, {} failed",
            self.status,
            self.accounts_created,
            self.customers_created,
            self.suppliers_created,
            self.imported,
            self.skipped,
            self.failed
        )
    }

    fn log_error(&mut self, message: String) {
        if self.error_log.len() < ERROR_LOG_CAP {
            self.error_log.push(message);
        }
    }
}

/// Drives a full migration run over the injected seams.
pub struct Orchestrator {
    source: Arc<dyn MutationSource>,
    store: Arc<dyn DocumentStore>,
    cache: Arc<dyn MutationCache>,
    config: MigrationConfig,
    dispatcher: Dispatcher,
    cancelled: Arc<AtomicBool>,
}

impl Orchestrator {
    /// Wires an orchestrator with the standard document builders.
    #[must_use]
    pub fn new(
        source: Arc<dyn MutationSource>,
        store: Arc<dyn DocumentStore>,
        cache: Arc<dyn MutationCache>,
        config: MigrationConfig,
    ) -> Self {
        Self {
            source,
            store,
            cache,
            config,
            dispatcher: Dispatcher::standard(),
            cancelled: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Handle another task can use to request cancellation.
    ///
    /// The flag is checked between mutations; a cancelled run ends
    /// `Completed` with whatever it managed to import.
    #[must_use]
    pub fn cancel_handle(&self) -> Arc<AtomicBool> {
        self.cancelled.clone()
    }

    fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Relaxed)
    }

    /// Runs every enabled phase and returns the report.
    ///
    /// Never returns an error: fatal failures end the run with
    /// [`RunStatus::Failed`] and the message in the error log.
    pub async fn run(&self, progress: &dyn ProgressBus) -> MigrationReport {
        let mut report = MigrationReport::new();
        info!(dry_run = self.config.flags.dry_run, "migration run started");

        match self.run_phases(progress, &mut report).await {
            Ok(()) => {
                report.status = RunStatus::Completed;
                report.progress_percentage = 100;
                progress.publish(ProgressEvent::completed(report.summary()));
            }
            Err(err) => {
                error!(error = %err, "migration run aborted");
                report.status = RunStatus::Failed;
                report.log_error(format!("[{}] {err}", err.kind()));
                progress.publish(ProgressEvent::message(format!("Migration failed: {err}")));
            }
        }

        report.end_time = Some(Utc::now());
        info!(summary = %report.summary(), "migration run finished");
        report
    }

    async fn run_phases(
        &self,
        progress: &dyn ProgressBus,
        report: &mut MigrationReport,
    ) -> MigrateResult<()> {
        self.phase(progress, report, 0, "Preparing target defaults");
        self.prepare_target(report).await?;
        self.phase(progress, report, 20, "Building chart of accounts");

        if self.config.flags.migrate_accounts {
            let chart = self.source.list_accounts().await?;
            let builder = CoaBuilder::new(self.store.clone(), &self.config.target.default_company);
            let stats = builder.build(&chart).await?;
            report.accounts_created +=
                stats.roots_created + stats.groups_created + stats.accounts_created;
        }

        self.phase(progress, report, 30, "Importing relations");
        self.import_relations(report).await?;

        self.phase(progress, report, 40, "Importing transactions");
        if self.config.flags.migrate_transactions {
            self.import_transactions(progress, report).await?;
        }

        self.phase(progress, report, 95, "Finalizing");
        Ok(())
    }

    /// Creates the default accounts and parties every run relies on.
    async fn prepare_target(&self, report: &mut MigrationReport) -> MigrateResult<()> {
        let company = &self.config.target.default_company;
        let builder = CoaBuilder::new(self.store.clone(), company);
        report.accounts_created += builder.ensure_roots().await?;

        let defaults = [
            (
                &self.config.target.default_bank_account,
                RootType::Asset,
                Some(TargetAccountType::Bank),
            ),
            (
                &self.config.target.default_receivable,
                RootType::Asset,
                Some(TargetAccountType::Receivable),
            ),
            (
                &self.config.target.default_payable,
                RootType::Liability,
                Some(TargetAccountType::Payable),
            ),
            (&self.config.target.default_income_account, RootType::Income, None),
            (
                &self.config.target.default_expense_account,
                RootType::Expense,
                None,
            ),
        ];
        for (name, root_type, account_type) in defaults {
            let outcome = self
                .store
                .insert_account(TargetAccount {
                    name: name.clone(),
                    account_number: String::new(),
                    account_name: name.clone(),
                    root_type,
                    account_type,
                    parent_account: Some(root_type.root_account_name().to_string()),
                    is_group: false,
                    company: company.clone(),
                    source_code: None,
                })
                .await?;
            if outcome.is_inserted() {
                report.accounts_created += 1;
            }
        }

        // Import-default parties exist up front so dispatch never races
        // their creation.
        let parties = PartyResolver::new(self.store.clone());
        parties.get_or_create_customer(None).await?;
        parties.get_or_create_supplier(None).await?;
        Ok(())
    }

    async fn import_relations(&self, report: &mut MigrationReport) -> MigrateResult<()> {
        let parties = PartyResolver::new(self.store.clone());

        if self.config.flags.migrate_customers {
            for relation in self.source.list_relations(RelationType::Customer).await? {
                if parties.create_customer(&relation).await?.is_inserted() {
                    report.customers_created += 1;
                }
            }
        }
        if self.config.flags.migrate_suppliers {
            for relation in self.source.list_relations(RelationType::Supplier).await? {
                if parties.create_supplier(&relation).await?.is_inserted() {
                    report.suppliers_created += 1;
                }
            }
        }
        Ok(())
    }

    /// Imports documents type by type, in processing order.
    async fn import_transactions(
        &self,
        progress: &dyn ProgressBus,
        report: &mut MigrationReport,
    ) -> MigrateResult<()> {
        let ctx = RunContext::new(
            self.store.clone(),
            self.config.target.clone(),
            self.config.flags.dry_run,
        );
        // Opening balances are fetched too so the report shows them as
        // skips instead of silently dropping them.
        let mut order = vec![MutationType::Opening];
        order.extend(MutationType::IMPORT_ORDER);

        for (index, mutation_type) in order.iter().enumerate() {
            if self.is_cancelled() {
                report.cancelled = true;
                break;
            }

            // 55 percentage points spread over the processing order.
            let pct = 40 + u8::try_from(index * 55 / order.len()).unwrap_or(0);
            self.phase(
                progress,
                report,
                pct,
                format!("Importing type {} mutations", mutation_type.code()),
            );

            let mutations = self
                .source
                .list_mutations_by_type(
                    *mutation_type,
                    self.config.flags.date_from,
                    self.config.flags.date_to,
                )
                .await?;

            for mutation in &mutations {
                if self.is_cancelled() {
                    info!(id = mutation.id, "cancellation requested, stopping");
                    report.cancelled = true;
                    progress.publish(ProgressEvent::message("Migration cancelled"));
                    return Ok(());
                }
                self.cache.put(mutation).await?;
                self.dispatch_one(&ctx, mutation, report).await?;
            }
        }
        Ok(())
    }

    async fn dispatch_one(
        &self,
        ctx: &RunContext,
        mutation: &Mutation,
        report: &mut MigrationReport,
    ) -> MigrateResult<()> {
        match self.dispatcher.dispatch(ctx, mutation).await? {
            DispatchOutcome::Imported { .. } => {
                report.imported += 1;
                *report
                    .imported_by_type
                    .entry(mutation.mutation_type)
                    .or_insert(0) += 1;
            }
            DispatchOutcome::Skipped { .. } => report.skipped += 1,
            DispatchOutcome::Failed { kind, message } => {
                warn!(id = mutation.id, kind, "mutation failed");
                report.failed += 1;
                report.log_error(format!("mutation {}: [{kind}] {message}", mutation.id));
            }
        }
        Ok(())
    }

    /// Crawls the source ID space and fills the mutation cache.
    ///
    /// Separate from [`run`](Self::run) so a slow crawl can be done
    /// once and inspected before any documents are created.
    pub async fn fetch_into_cache(
        &self,
        progress: &dyn ProgressBus,
    ) -> MigrateResult<CacheFetchStats> {
        let iterator = MutationIterator::new(self.source.as_ref());
        let (low, high) = iterator.estimate_id_range().await?;
        progress.publish(ProgressEvent::message(format!(
            "Fetching mutations {low}..{high} into cache"
        )));

        let mut fetched = Vec::new();
        let stats = iterator
            .iterate(low, high, progress, |mutation| fetched.push(mutation))
            .await?;

        let mut cached = 0u64;
        for mutation in &fetched {
            if self.cache.put(mutation).await? {
                cached += 1;
            }
        }

        info!(
            checked = stats.checked,
            found = stats.found,
            cached,
            "cache fetch finished"
        );
        Ok(CacheFetchStats {
            checked: stats.checked,
            found: stats.found,
            cached,
            stopped_early: stats.stopped_early,
        })
    }

    fn phase(
        &self,
        progress: &dyn ProgressBus,
        report: &mut MigrationReport,
        pct: u8,
        operation: impl Into<String>,
    ) {
        let operation = operation.into();
        report.current_operation.clone_from(&operation);
        report.progress_percentage = pct;
        progress.publish(ProgressEvent::update(operation, pct));
    }
}
