//! Tegenrekening mapper: source counter-account code to invoice line.
//!
//! Three-tier resolution:
//! 1. an existing `EB-<code>` item is reused as-is;
//! 2. otherwise, when the code resolves to a target account, a new item
//!    is created from the account's name and type;
//! 3. otherwise a generic fallback item plus the default income/expense
//!    account guarantees forward progress.

use std::sync::Arc;

use ebmig_core::classify::{LineDirection, RootType};
use ebmig_core::naming::{
    GENERIC_EXPENSE_ITEM, GENERIC_INCOME_ITEM, is_cogs_name, item_code, item_name_from_account,
};
use ebmig_shared::{MigrateResult, TargetConfig};
use ebmig_store::{DocumentStore, InvoiceLine, Item, ItemGroup, TargetAccount};
use rust_decimal::Decimal;
use tracing::debug;

use crate::resolver::LedgerResolver;

/// A resolved (item, account) pair for one source code.
#[derive(Debug, Clone)]
pub struct MappedItem {
    /// The reusable item backing the line.
    pub item: Item,
    /// Target account the line posts against.
    pub account: String,
    /// True when the generic fallback tier was used.
    pub fallback: bool,
}

/// Maps source counter-account codes to items and accounts.
pub struct TegenrekeningMapper {
    store: Arc<dyn DocumentStore>,
    resolver: Arc<LedgerResolver>,
    target: TargetConfig,
}

impl TegenrekeningMapper {
    /// Creates a mapper scoped to one run.
    #[must_use]
    pub fn new(
        store: Arc<dyn DocumentStore>,
        resolver: Arc<LedgerResolver>,
        target: TargetConfig,
    ) -> Self {
        Self {
            store,
            resolver,
            target,
        }
    }

    /// Builds an invoice line for a source code and amount.
    ///
    /// This is the public façade used by the document builders. The
    /// line always carries exactly one of income/expense account,
    /// matching `direction`.
    pub async fn create_invoice_line(
        &self,
        source_code: &str,
        amount: Decimal,
        description: Option<&str>,
        direction: LineDirection,
    ) -> MigrateResult<InvoiceLine> {
        let mapped = self.resolve_item(source_code, direction).await?;

        let description = description
            .filter(|d| !d.trim().is_empty())
            .map_or_else(|| mapped.item.item_name.clone(), ToString::to_string);

        let (income_account, expense_account) = match direction {
            LineDirection::Sales => (Some(mapped.account), None),
            LineDirection::Purchase => (None, Some(mapped.account)),
        };

        Ok(InvoiceLine {
            item_code: mapped.item.item_code,
            description,
            qty: Decimal::ONE,
            rate: amount,
            income_account,
            expense_account,
            cost_center: self.target.default_cost_center.clone(),
        })
    }

    /// Resolves the item and account for a source code.
    pub async fn resolve_item(
        &self,
        source_code: &str,
        direction: LineDirection,
    ) -> MigrateResult<MappedItem> {
        let code = item_code(source_code);

        // Tier 1: smart item already exists.
        if let Some(item) = self.store.item_by_code(&code).await? {
            let account = match self.resolver.resolve(source_code).await? {
                Some(account) => account,
                None => self.default_account(direction),
            };
            return Ok(MappedItem {
                item,
                account,
                fallback: false,
            });
        }

        // Tier 2: the code resolves to an account; create the item.
        if let Some(account_name) = self.resolver.resolve(source_code).await? {
            let account = self.store.account_by_name(&account_name).await?;
            let item = self
                .create_dynamic_item(source_code, &code, account.as_ref(), direction)
                .await?;
            return Ok(MappedItem {
                item,
                account: account_name,
                fallback: false,
            });
        }

        // Tier 3: generic fallback.
        debug!(source_code, "no account mapping, using generic item");
        let item = self.ensure_generic_item(direction).await?;
        Ok(MappedItem {
            item,
            account: self.default_account(direction),
            fallback: true,
        })
    }

    /// Creates (or reuses) the `EB-<code>` item for a resolved account.
    async fn create_dynamic_item(
        &self,
        source_code: &str,
        code: &str,
        account: Option<&TargetAccount>,
        direction: LineDirection,
    ) -> MigrateResult<Item> {
        let item_group = match account {
            Some(a) if is_cogs_name(&a.account_name) => ItemGroup::CostOfGoodsSold,
            Some(a) if a.root_type == RootType::Income => ItemGroup::Revenue,
            Some(a) if a.root_type == RootType::Expense => ItemGroup::Expense,
            _ => match direction {
                LineDirection::Sales => ItemGroup::Revenue,
                LineDirection::Purchase => ItemGroup::Expense,
            },
        };

        let item_name = account.map_or_else(
            || source_code.to_string(),
            |a| item_name_from_account(&a.account_name, source_code),
        );

        let item = Item {
            item_code: code.to_string(),
            item_name,
            item_group,
            is_sales_item: item_group == ItemGroup::Revenue || direction == LineDirection::Sales,
            is_purchase_item: item_group != ItemGroup::Revenue
                || direction == LineDirection::Purchase,
        };

        // A concurrent run may have created it; the existing one wins.
        self.store.insert_item(item.clone()).await?;
        match self.store.item_by_code(code).await? {
            Some(existing) => Ok(existing),
            None => Ok(item),
        }
    }

    /// Creates the generic fallback item for a direction on demand.
    async fn ensure_generic_item(&self, direction: LineDirection) -> MigrateResult<Item> {
        let (code, name, group) = match direction {
            LineDirection::Sales => (
                GENERIC_INCOME_ITEM,
                "Generic Import Income",
                ItemGroup::Revenue,
            ),
            LineDirection::Purchase => (
                GENERIC_EXPENSE_ITEM,
                "Generic Import Expense",
                ItemGroup::Expense,
            ),
        };

        let item = Item {
            item_code: code.to_string(),
            item_name: name.to_string(),
            item_group: group,
            is_sales_item: direction == LineDirection::Sales,
            is_purchase_item: direction == LineDirection::Purchase,
        };
        self.store.insert_item(item.clone()).await?;
        match self.store.item_by_code(code).await? {
            Some(existing) => Ok(existing),
            None => Ok(item),
        }
    }

    /// Default posting account for a direction.
    fn default_account(&self, direction: LineDirection) -> String {
        match direction {
            LineDirection::Sales => self.target.default_income_account.clone(),
            LineDirection::Purchase => self.target.default_expense_account.clone(),
        }
    }
}
