//! Migration engine: turns source mutations into target documents.
//!
//! # Modules
//!
//! - `resolver` - Memoized ledger-code to account resolution
//! - `party` - Relation to customer/supplier resolution
//! - `tegenrekening` - Counter-account to item/line mapping
//! - `coa_builder` - Chart-of-accounts persistence
//! - `builders` - The four document builders
//! - `dispatch` - Routing, idempotency and dry-run handling
//! - `orchestrator` - The phased migration run

pub mod builders;
pub mod coa_builder;
pub mod dispatch;
pub mod orchestrator;
pub mod party;
pub mod resolver;
pub mod tegenrekening;

pub use coa_builder::{CoaBuildStats, CoaBuilder};
pub use dispatch::{DispatchOutcome, Dispatcher, DocumentBuilder, RunContext};
pub use orchestrator::{CacheFetchStats, MigrationReport, Orchestrator, RunStatus};
pub use party::PartyResolver;
pub use resolver::LedgerResolver;
pub use tegenrekening::TegenrekeningMapper;

#[cfg(test)]
mod tests;
