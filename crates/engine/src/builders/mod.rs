//! The four standard document builders.
//!
//! Each builder converts one mutation into one target document. They
//! share the run context for party, account and item resolution and
//! never persist anything themselves; persistence is the dispatcher's
//! job.

mod journal;
mod payment;
mod purchase;
mod sales;

pub use journal::JournalBuilder;
pub use payment::PaymentBuilder;
pub use purchase::PurchaseBuilder;
pub use sales::SalesBuilder;

use ebmig_core::mutation::Mutation;
use ebmig_shared::{MigrateError, MigrateResult};

/// Rejects mutations the source sent without line items.
fn require_rows(mutation: &Mutation) -> MigrateResult<()> {
    if mutation.rows.is_empty() {
        return Err(MigrateError::Build(format!(
            "mutation {} has no rows",
            mutation.id
        )));
    }
    Ok(())
}
