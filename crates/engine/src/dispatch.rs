//! Mutation dispatch: route each mutation to its document builder.
//!
//! The dispatcher owns a registry keyed by [`DocumentKind`], so a
//! builder can be swapped without touching the routing. Dispatching a
//! single mutation is total: opening balances and already-imported
//! mutations become skips, builder failures become failed outcomes,
//! and only fatal errors (auth, config) propagate as `Err`.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use ebmig_core::classify::{DocumentKind, document_kind_for};
use ebmig_core::mutation::Mutation;
use ebmig_shared::{MigrateResult, TargetConfig};
use ebmig_store::{DocumentStore, TargetDocument};
use tracing::{debug, warn};

use crate::builders::{JournalBuilder, PaymentBuilder, PurchaseBuilder, SalesBuilder};
use crate::party::PartyResolver;
use crate::resolver::LedgerResolver;
use crate::tegenrekening::TegenrekeningMapper;

/// Skip reason for type-0 mutations.
pub const SKIP_OPENING: &str = "opening-balance-out-of-scope";

/// Skip reason for mutations already present in the target.
pub const SKIP_ALREADY_IMPORTED: &str = "already-imported";

/// Shared state for one migration run.
pub struct RunContext {
    /// Persistence seam.
    pub store: Arc<dyn DocumentStore>,
    /// Memoized ledger-code resolver.
    pub resolver: Arc<LedgerResolver>,
    /// Counter-account to item mapper.
    pub mapper: TegenrekeningMapper,
    /// Relation to party resolver.
    pub parties: PartyResolver,
    /// Target-side defaults.
    pub target: TargetConfig,
    /// When set, documents are built but never persisted.
    pub dry_run: bool,
}

impl RunContext {
    /// Wires up the per-run resolvers over one store.
    #[must_use]
    pub fn new(store: Arc<dyn DocumentStore>, target: TargetConfig, dry_run: bool) -> Self {
        let resolver = Arc::new(LedgerResolver::new(store.clone()));
        let mapper =
            TegenrekeningMapper::new(store.clone(), resolver.clone(), target.clone());
        let parties = PartyResolver::new(store.clone());
        Self {
            store,
            resolver,
            mapper,
            parties,
            target,
            dry_run,
        }
    }
}

/// Result of dispatching one mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// A document was created (or would be, under dry run).
    Imported {
        /// Name of the created document.
        document_name: String,
    },
    /// Nothing to do for this mutation.
    Skipped {
        /// Why it was skipped.
        reason: String,
    },
    /// The mutation could not be converted.
    Failed {
        /// Stable error kind code.
        kind: &'static str,
        /// Human-readable message.
        message: String,
    },
}

/// Builds one kind of target document from a mutation.
#[async_trait]
pub trait DocumentBuilder: Send + Sync {
    /// Converts a mutation into a persistable document.
    async fn build(&self, ctx: &RunContext, mutation: &Mutation) -> MigrateResult<TargetDocument>;
}

/// Routes mutations to registered document builders.
pub struct Dispatcher {
    builders: HashMap<DocumentKind, Box<dyn DocumentBuilder>>,
}

impl Dispatcher {
    /// Creates an empty dispatcher.
    #[must_use]
    pub fn new() -> Self {
        Self {
            builders: HashMap::new(),
        }
    }

    /// Creates a dispatcher with the four standard builders registered.
    #[must_use]
    pub fn standard() -> Self {
        let mut dispatcher = Self::new();
        dispatcher.register(DocumentKind::PurchaseInvoice, Box::new(PurchaseBuilder));
        dispatcher.register(DocumentKind::SalesInvoice, Box::new(SalesBuilder));
        dispatcher.register(DocumentKind::PaymentEntry, Box::new(PaymentBuilder));
        dispatcher.register(DocumentKind::JournalEntry, Box::new(JournalBuilder));
        dispatcher
    }

    /// Registers (or replaces) the builder for a document kind.
    pub fn register(&mut self, kind: DocumentKind, builder: Box<dyn DocumentBuilder>) {
        self.builders.insert(kind, builder);
    }

    /// Dispatches one mutation end to end.
    ///
    /// Returns `Err` only for fatal errors; everything else is folded
    /// into the outcome.
    pub async fn dispatch(
        &self,
        ctx: &RunContext,
        mutation: &Mutation,
    ) -> MigrateResult<DispatchOutcome> {
        let Some(kind) = document_kind_for(mutation.mutation_type) else {
            debug!(id = mutation.id, "skipping opening balance");
            return Ok(DispatchOutcome::Skipped {
                reason: SKIP_OPENING.to_string(),
            });
        };

        if ctx.store.document_exists_for_mutation(mutation.id).await? {
            return Ok(DispatchOutcome::Skipped {
                reason: SKIP_ALREADY_IMPORTED.to_string(),
            });
        }

        let Some(builder) = self.builders.get(&kind) else {
            return Ok(DispatchOutcome::Failed {
                kind: "BUILD",
                message: format!("no builder registered for {kind:?}"),
            });
        };

        let document = match builder.build(ctx, mutation).await {
            Ok(document) => document,
            Err(err) if err.is_fatal() => return Err(err),
            Err(err) => {
                warn!(id = mutation.id, error = %err, "mutation conversion failed");
                return Ok(DispatchOutcome::Failed {
                    kind: err.kind(),
                    message: err.to_string(),
                });
            }
        };

        if ctx.dry_run {
            debug!(id = mutation.id, name = document.name(), "dry run, not persisting");
            return Ok(DispatchOutcome::Imported {
                document_name: document.name().to_string(),
            });
        }

        let document_name = document.name().to_string();
        if ctx.store.insert_document(document).await?.is_inserted() {
            Ok(DispatchOutcome::Imported { document_name })
        } else {
            Ok(DispatchOutcome::Skipped {
                reason: SKIP_ALREADY_IMPORTED.to_string(),
            })
        }
    }
}

impl Default for Dispatcher {
    fn default() -> Self {
        Self::new()
    }
}
