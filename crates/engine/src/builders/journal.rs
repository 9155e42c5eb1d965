//! Journal entry builder for type-5, 6 and 7 mutations.
//!
//! Money received/sent (types 5 and 6) post every row against its
//! resolved account with a single balancing leg on the configured bank
//! account. Plain journals (type 7) follow the row signs; a multi-row
//! journal that does not balance on its own gets a residual bank leg.
//!
//! Unlike invoice lines, journal legs have no generic fallback: a row
//! whose ledger code resolves to no account fails the mutation.

use async_trait::async_trait;
use ebmig_core::mutation::{Mutation, MutationType};
use ebmig_shared::{MigrateError, MigrateResult};
use ebmig_store::{DocStatus, JournalEntry, JournalLine, TargetDocument};
use rust_decimal::Decimal;
use tracing::warn;

use crate::builders::require_rows;
use crate::dispatch::{DocumentBuilder, RunContext};

/// Builds journal entries.
pub struct JournalBuilder;

impl JournalBuilder {
    async fn resolve_row_account(
        ctx: &RunContext,
        mutation_id: i64,
        code: &str,
    ) -> MigrateResult<String> {
        ctx.resolver.resolve(code).await?.ok_or_else(|| {
            MigrateError::Mapping(format!(
                "mutation {mutation_id}: no account for ledger code {code}"
            ))
        })
    }

    fn leg(account: String, debit: Decimal, credit: Decimal, cost_center: &str) -> JournalLine {
        JournalLine {
            account,
            debit,
            credit,
            cost_center: cost_center.to_string(),
        }
    }
}

#[async_trait]
impl DocumentBuilder for JournalBuilder {
    async fn build(&self, ctx: &RunContext, mutation: &Mutation) -> MigrateResult<TargetDocument> {
        require_rows(mutation)?;

        let cost_center = ctx.target.default_cost_center.as_str();
        let bank = ctx.target.default_bank_account.clone();
        let mut lines = Vec::with_capacity(mutation.rows.len() + 1);

        match mutation.mutation_type {
            MutationType::MoneyReceived => {
                let mut total = Decimal::ZERO;
                for row in &mutation.rows {
                    let account =
                        Self::resolve_row_account(ctx, mutation.id, &row.ledger_code).await?;
                    let amount = row.amount.abs();
                    total += amount;
                    lines.push(Self::leg(account, Decimal::ZERO, amount, cost_center));
                }
                lines.push(Self::leg(bank, total, Decimal::ZERO, cost_center));
            }
            MutationType::MoneySent => {
                let mut total = Decimal::ZERO;
                for row in &mutation.rows {
                    let account =
                        Self::resolve_row_account(ctx, mutation.id, &row.ledger_code).await?;
                    let amount = row.amount.abs();
                    total += amount;
                    lines.push(Self::leg(account, amount, Decimal::ZERO, cost_center));
                }
                lines.push(Self::leg(bank, Decimal::ZERO, total, cost_center));
            }
            MutationType::Journal => {
                for row in &mutation.rows {
                    let account =
                        Self::resolve_row_account(ctx, mutation.id, &row.ledger_code).await?;
                    let signed = row.signed_amount();
                    if signed >= Decimal::ZERO {
                        lines.push(Self::leg(account, signed, Decimal::ZERO, cost_center));
                    } else {
                        lines.push(Self::leg(account, Decimal::ZERO, -signed, cost_center));
                    }
                }
                let residual = mutation.signed_total();
                if !residual.is_zero() {
                    if mutation.rows.len() > 1 {
                        warn!(
                            id = mutation.id,
                            %residual,
                            "unbalanced journal, adding bank leg"
                        );
                    }
                    if residual > Decimal::ZERO {
                        lines.push(Self::leg(bank, Decimal::ZERO, residual, cost_center));
                    } else {
                        lines.push(Self::leg(bank, -residual, Decimal::ZERO, cost_center));
                    }
                }
            }
            other => {
                return Err(MigrateError::Build(format!(
                    "mutation {} type {} is not a journal type",
                    mutation.id,
                    other.code()
                )));
            }
        }

        let entry = JournalEntry {
            name: format!("JV-EBH-{}", mutation.id),
            company: ctx.target.default_company.clone(),
            posting_date: mutation.date,
            lines,
            user_remark: format!(
                "E-Boekhouden mutation {} (type {}): {}",
                mutation.id,
                mutation.mutation_type.code(),
                mutation.description
            ),
            status: DocStatus::Submitted,
            source_mutation_id: mutation.id,
        };

        if !entry.is_balanced() {
            return Err(MigrateError::Build(format!(
                "mutation {} produced an unbalanced journal",
                mutation.id
            )));
        }

        Ok(TargetDocument::JournalEntry(entry))
    }
}
