//! Payment entry builder for type-3 and type-4 mutations.

use async_trait::async_trait;
use ebmig_core::classify::{PaymentDirection, payment_direction_for};
use ebmig_core::mutation::Mutation;
use ebmig_shared::{MigrateError, MigrateResult};
use ebmig_store::{DocStatus, PaymentEntry, TargetDocument};

use crate::builders::require_rows;
use crate::dispatch::{DocumentBuilder, RunContext};

/// Builds payment entries.
pub struct PaymentBuilder;

impl PaymentBuilder {
    /// Bank or cash account touched by the payment: the account the
    /// first row points at, falling back to the configured default.
    async fn money_account(ctx: &RunContext, mutation: &Mutation) -> MigrateResult<String> {
        if let Some(code) = mutation.first_ledger_code()
            && let Some(account) = ctx.resolver.resolve(code).await?
        {
            return Ok(account);
        }
        Ok(ctx.target.default_bank_account.clone())
    }
}

#[async_trait]
impl DocumentBuilder for PaymentBuilder {
    async fn build(&self, ctx: &RunContext, mutation: &Mutation) -> MigrateResult<TargetDocument> {
        require_rows(mutation)?;

        let direction = payment_direction_for(mutation.mutation_type).ok_or_else(|| {
            MigrateError::Build(format!(
                "mutation {} is not a payment type",
                mutation.id
            ))
        })?;

        let amount = mutation.principal_amount();
        if amount.is_zero() {
            return Err(MigrateError::Build(format!(
                "payment mutation {} has zero amount",
                mutation.id
            )));
        }

        let money_account = Self::money_account(ctx, mutation).await?;
        let (party, paid_from, paid_to) = match direction {
            PaymentDirection::Receive => {
                let customer = ctx
                    .parties
                    .get_or_create_customer(mutation.relation_id)
                    .await?;
                (customer, ctx.target.default_receivable.clone(), money_account)
            }
            PaymentDirection::Pay => {
                let supplier = ctx
                    .parties
                    .get_or_create_supplier(mutation.relation_id)
                    .await?;
                (supplier, money_account, ctx.target.default_payable.clone())
            }
        };

        Ok(TargetDocument::PaymentEntry(PaymentEntry {
            name: format!("PE-EBH-{}", mutation.id),
            direction,
            party,
            company: ctx.target.default_company.clone(),
            posting_date: mutation.date,
            paid_amount: amount,
            received_amount: amount,
            paid_from,
            paid_to,
            reference_no: mutation.reference(),
            reference_date: mutation.date,
            status: DocStatus::Submitted,
            source_mutation_id: mutation.id,
        }))
    }
}
