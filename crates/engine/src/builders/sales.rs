//! Sales invoice builder for type-2 mutations.

use async_trait::async_trait;
use ebmig_core::classify::LineDirection;
use ebmig_core::mutation::Mutation;
use ebmig_shared::MigrateResult;
use ebmig_store::{DocStatus, SalesInvoice, TargetDocument};

use crate::builders::require_rows;
use crate::dispatch::{DocumentBuilder, RunContext};

/// Builds sales invoices.
pub struct SalesBuilder;

#[async_trait]
impl DocumentBuilder for SalesBuilder {
    async fn build(&self, ctx: &RunContext, mutation: &Mutation) -> MigrateResult<TargetDocument> {
        require_rows(mutation)?;

        let customer = ctx
            .parties
            .get_or_create_customer(mutation.relation_id)
            .await?;

        let mut lines = Vec::with_capacity(mutation.rows.len());
        for row in &mutation.rows {
            let line = ctx
                .mapper
                .create_invoice_line(
                    &row.ledger_code,
                    row.amount.abs(),
                    row.description.as_deref(),
                    LineDirection::Sales,
                )
                .await?;
            lines.push(line);
        }

        Ok(TargetDocument::SalesInvoice(SalesInvoice {
            name: format!("SINV-EBH-{}", mutation.id),
            customer,
            company: ctx.target.default_company.clone(),
            posting_date: mutation.date,
            debit_to: ctx.target.default_receivable.clone(),
            lines,
            status: DocStatus::Submitted,
            source_mutation_id: mutation.id,
        }))
    }
}
