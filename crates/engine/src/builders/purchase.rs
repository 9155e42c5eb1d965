//! Purchase invoice builder for type-1 mutations.

use async_trait::async_trait;
use ebmig_core::classify::LineDirection;
use ebmig_core::mutation::Mutation;
use ebmig_shared::MigrateResult;
use ebmig_store::{DocStatus, PurchaseInvoice, TargetDocument};

use crate::builders::require_rows;
use crate::dispatch::{DocumentBuilder, RunContext};

/// Builds purchase invoices.
pub struct PurchaseBuilder;

#[async_trait]
impl DocumentBuilder for PurchaseBuilder {
    async fn build(&self, ctx: &RunContext, mutation: &Mutation) -> MigrateResult<TargetDocument> {
        require_rows(mutation)?;

        let supplier = ctx
            .parties
            .get_or_create_supplier(mutation.relation_id)
            .await?;

        let mut lines = Vec::with_capacity(mutation.rows.len());
        for row in &mutation.rows {
            let line = ctx
                .mapper
                .create_invoice_line(
                    &row.ledger_code,
                    row.amount.abs(),
                    row.description.as_deref(),
                    LineDirection::Purchase,
                )
                .await?;
            lines.push(line);
        }

        Ok(TargetDocument::PurchaseInvoice(PurchaseInvoice {
            name: format!("PINV-EBH-{}", mutation.id),
            supplier,
            company: ctx.target.default_company.clone(),
            posting_date: mutation.date,
            bill_no: mutation.reference(),
            credit_to: ctx.target.default_payable.clone(),
            lines,
            status: DocStatus::Submitted,
            source_mutation_id: mutation.id,
        }))
    }
}
