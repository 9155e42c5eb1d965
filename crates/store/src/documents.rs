//! Target document model.
//!
//! These are the entities the migration creates in the target system:
//! accounts, parties, reusable items, and the four posting documents.
//! Every posting document carries `source_mutation_id` for idempotency.

use chrono::NaiveDate;
use ebmig_core::classify::{DocumentKind, PaymentDirection, RootType, TargetAccountType};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A target chart-of-accounts entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetAccount {
    /// Unique name within the company scope.
    pub name: String,
    /// Account number (the source code for migrated accounts).
    pub account_number: String,
    /// Display name.
    pub account_name: String,
    /// Root of the tree this account belongs to.
    pub root_type: RootType,
    /// Refined account type, when any.
    pub account_type: Option<TargetAccountType>,
    /// Parent account name; `None` only for the five roots.
    pub parent_account: Option<String>,
    /// True for group (non-postable) accounts.
    pub is_group: bool,
    /// Owning company.
    pub company: String,
    /// Back-reference to the source account code.
    pub source_code: Option<String>,
}

impl TargetAccount {
    /// Creates one of the five root accounts.
    #[must_use]
    pub fn root(root_type: RootType, company: &str) -> Self {
        Self {
            name: root_type.root_account_name().to_string(),
            account_number: String::new(),
            account_name: root_type.root_account_name().to_string(),
            root_type,
            account_type: None,
            parent_account: None,
            is_group: true,
            company: company.to_string(),
            source_code: None,
        }
    }
}

/// A target customer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Customer {
    /// Unique customer name.
    pub name: String,
    /// Customer group.
    pub customer_group: String,
    /// Territory.
    pub territory: String,
    /// Source relation binding, when known.
    pub relation_id: Option<i64>,
}

/// A target supplier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Supplier {
    /// Unique supplier name.
    pub name: String,
    /// Supplier group.
    pub supplier_group: String,
    /// Source relation binding, when known.
    pub relation_id: Option<i64>,
}

/// Item group for mapped invoice items.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemGroup {
    /// Revenue items.
    Revenue,
    /// Expense items.
    Expense,
    /// Cost of goods sold items.
    CostOfGoodsSold,
}

impl ItemGroup {
    /// Target-side group name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Revenue => "Revenue Items",
            Self::Expense => "Expense Items",
            Self::CostOfGoodsSold => "Cost of Goods Sold Items",
        }
    }
}

/// A reusable mapped item backing invoice lines.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    /// Stable code, `EB-<source_code>` for mapped items.
    pub item_code: String,
    /// Humanized name.
    pub item_name: String,
    /// Item group.
    pub item_group: ItemGroup,
    /// Usable on sales invoices.
    pub is_sales_item: bool,
    /// Usable on purchase invoices.
    pub is_purchase_item: bool,
}

/// One line of a sales or purchase invoice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvoiceLine {
    /// Item backing this line.
    pub item_code: String,
    /// Line description.
    pub description: String,
    /// Quantity, always 1 for migrated lines.
    pub qty: Decimal,
    /// Unit rate (the row amount).
    pub rate: Decimal,
    /// Income account for sales lines.
    pub income_account: Option<String>,
    /// Expense account for purchase lines.
    pub expense_account: Option<String>,
    /// Cost center.
    pub cost_center: String,
}

/// Document submission status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocStatus {
    /// Saved but not posted.
    Draft,
    /// Posted to the ledger.
    Submitted,
}

/// A purchase invoice built from a type-1 mutation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PurchaseInvoice {
    /// Document name.
    pub name: String,
    /// Supplier name.
    pub supplier: String,
    /// Owning company.
    pub company: String,
    /// Posting date.
    pub posting_date: NaiveDate,
    /// Supplier invoice reference.
    pub bill_no: String,
    /// Payable account credited by this invoice.
    pub credit_to: String,
    /// Invoice lines.
    pub lines: Vec<InvoiceLine>,
    /// Submission status.
    pub status: DocStatus,
    /// Idempotency key: the source mutation ID.
    pub source_mutation_id: i64,
}

/// A sales invoice built from a type-2 mutation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SalesInvoice {
    /// Document name.
    pub name: String,
    /// Customer name.
    pub customer: String,
    /// Owning company.
    pub company: String,
    /// Posting date.
    pub posting_date: NaiveDate,
    /// Receivable account debited by this invoice.
    pub debit_to: String,
    /// Invoice lines.
    pub lines: Vec<InvoiceLine>,
    /// Submission status.
    pub status: DocStatus,
    /// Idempotency key: the source mutation ID.
    pub source_mutation_id: i64,
}

/// A payment entry built from a type-3 or type-4 mutation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentEntry {
    /// Document name.
    pub name: String,
    /// Receive (customer) or Pay (supplier).
    pub direction: PaymentDirection,
    /// Party name.
    pub party: String,
    /// Owning company.
    pub company: String,
    /// Posting date.
    pub posting_date: NaiveDate,
    /// Amount paid out of `paid_from`.
    pub paid_amount: Decimal,
    /// Amount received into `paid_to` (equal for same-currency runs).
    pub received_amount: Decimal,
    /// Account the money leaves.
    pub paid_from: String,
    /// Account the money arrives in.
    pub paid_to: String,
    /// External reference number.
    pub reference_no: String,
    /// External reference date.
    pub reference_date: NaiveDate,
    /// Submission status.
    pub status: DocStatus,
    /// Idempotency key: the source mutation ID.
    pub source_mutation_id: i64,
}

/// One leg of a journal entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JournalLine {
    /// Account posted to.
    pub account: String,
    /// Debit amount (zero if credit leg).
    pub debit: Decimal,
    /// Credit amount (zero if debit leg).
    pub credit: Decimal,
    /// Cost center.
    pub cost_center: String,
}

/// A journal entry built from a type-5, 6, or 7 mutation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JournalEntry {
    /// Document name.
    pub name: String,
    /// Owning company.
    pub company: String,
    /// Posting date.
    pub posting_date: NaiveDate,
    /// Journal legs; debits and credits balance.
    pub lines: Vec<JournalLine>,
    /// Remark encoding the source ID and type.
    pub user_remark: String,
    /// Submission status.
    pub status: DocStatus,
    /// Idempotency key: the source mutation ID.
    pub source_mutation_id: i64,
}

impl JournalEntry {
    /// Returns true when debit and credit totals match.
    #[must_use]
    pub fn is_balanced(&self) -> bool {
        let debit: Decimal = self.lines.iter().map(|l| l.debit).sum();
        let credit: Decimal = self.lines.iter().map(|l| l.credit).sum();
        debit == credit
    }
}

/// Any posting document created by the migration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "doctype", rename_all = "snake_case")]
pub enum TargetDocument {
    /// Purchase invoice.
    PurchaseInvoice(PurchaseInvoice),
    /// Sales invoice.
    SalesInvoice(SalesInvoice),
    /// Payment entry.
    PaymentEntry(PaymentEntry),
    /// Journal entry.
    JournalEntry(JournalEntry),
}

impl TargetDocument {
    /// Document kind discriminator.
    #[must_use]
    pub const fn kind(&self) -> DocumentKind {
        match self {
            Self::PurchaseInvoice(_) => DocumentKind::PurchaseInvoice,
            Self::SalesInvoice(_) => DocumentKind::SalesInvoice,
            Self::PaymentEntry(_) => DocumentKind::PaymentEntry,
            Self::JournalEntry(_) => DocumentKind::JournalEntry,
        }
    }

    /// Document name.
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::PurchaseInvoice(d) => &d.name,
            Self::SalesInvoice(d) => &d.name,
            Self::PaymentEntry(d) => &d.name,
            Self::JournalEntry(d) => &d.name,
        }
    }

    /// Idempotency key.
    #[must_use]
    pub const fn source_mutation_id(&self) -> i64 {
        match self {
            Self::PurchaseInvoice(d) => d.source_mutation_id,
            Self::SalesInvoice(d) => d.source_mutation_id,
            Self::PaymentEntry(d) => d.source_mutation_id,
            Self::JournalEntry(d) => d.source_mutation_id,
        }
    }

    /// Submission status.
    #[must_use]
    pub const fn status(&self) -> DocStatus {
        match self {
            Self::PurchaseInvoice(d) => d.status,
            Self::SalesInvoice(d) => d.status,
            Self::PaymentEntry(d) => d.status,
            Self::JournalEntry(d) => d.status,
        }
    }
}
