//! Classification tables for the migration core.
//!
//! All source-to-target classification lives here as explicit constant
//! tables and total match expressions, so derivation is testable in
//! isolation and deterministic across runs.

use serde::{Deserialize, Serialize};

use crate::account::AccountCategory;
use crate::mutation::MutationType;

/// Root of a target account tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RootType {
    /// Assets.
    Asset,
    /// Liabilities.
    Liability,
    /// Equity.
    Equity,
    /// Income.
    Income,
    /// Expenses.
    Expense,
}

impl RootType {
    /// All five roots, in creation order.
    pub const ALL: [Self; 5] = [
        Self::Asset,
        Self::Liability,
        Self::Equity,
        Self::Income,
        Self::Expense,
    ];

    /// Name of the root account for this root type.
    #[must_use]
    pub const fn root_account_name(self) -> &'static str {
        match self {
            Self::Asset => "Assets",
            Self::Liability => "Liabilities",
            Self::Equity => "Equity",
            Self::Income => "Income",
            Self::Expense => "Expenses",
        }
    }
}

/// Refined target account type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TargetAccountType {
    /// Bank account.
    Bank,
    /// Cash account.
    Cash,
    /// Accounts receivable.
    Receivable,
    /// Accounts payable.
    Payable,
    /// Tax account.
    Tax,
    /// Stock account.
    Stock,
}

impl TargetAccountType {
    /// Target-side display name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Bank => "Bank",
            Self::Cash => "Cash",
            Self::Receivable => "Receivable",
            Self::Payable => "Payable",
            Self::Tax => "Tax",
            Self::Stock => "Stock",
        }
    }
}

/// Kind of target document a mutation becomes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentKind {
    /// Purchase Invoice.
    PurchaseInvoice,
    /// Sales Invoice.
    SalesInvoice,
    /// Payment Entry.
    PaymentEntry,
    /// Journal Entry.
    JournalEntry,
}

/// Direction of a payment entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PaymentDirection {
    /// Money coming in (customer payment).
    Receive,
    /// Money going out (supplier payment).
    Pay,
}

/// Direction of an invoice line for item mapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineDirection {
    /// Sales invoice line (income side).
    Sales,
    /// Purchase invoice line (expense side).
    Purchase,
}

/// Fixed table mapping source group codes to a root.
///
/// Groups not listed here fall back to the category-based mapping.
pub const GROUP_ROOTS: &[(&str, RootType)] = &[
    ("001", RootType::Asset),
    ("002", RootType::Asset),
    ("006", RootType::Liability),
    ("007", RootType::Expense),
    ("008", RootType::Expense),
    ("009", RootType::Expense),
    ("055", RootType::Income),
    ("056", RootType::Expense),
    ("057", RootType::Expense),
    ("058", RootType::Expense),
    ("059", RootType::Expense),
];

/// Looks up the root for a source group code.
#[must_use]
pub fn root_for_group(group: &str) -> Option<RootType> {
    GROUP_ROOTS
        .iter()
        .find(|(code, _)| *code == group)
        .map(|(_, root)| *root)
}

/// Derives the root type for a source account.
///
/// The group override wins first; then the category table; balance and
/// profit/loss categories fall back to a code-prefix rule.
#[must_use]
pub fn root_for_account(category: AccountCategory, code: &str, group: Option<&str>) -> RootType {
    if let Some(root) = group.and_then(root_for_group) {
        return root;
    }

    match category {
        AccountCategory::Financial | AccountCategory::Debtors | AccountCategory::VatReceivable => {
            RootType::Asset
        }
        AccountCategory::Creditors
        | AccountCategory::VatSettlement
        | AccountCategory::VatPayable
        | AccountCategory::VatPayableLow
        | AccountCategory::VatPayableHigh
        | AccountCategory::VatPayableOther => RootType::Liability,
        AccountCategory::Balance => match code.chars().next() {
            Some('0'..='2') => RootType::Asset,
            Some('3' | '4') => RootType::Liability,
            Some('5') => RootType::Equity,
            _ => RootType::Asset,
        },
        AccountCategory::ProfitLoss => match code.chars().next() {
            Some('8' | '9') => RootType::Income,
            _ => RootType::Expense,
        },
    }
}

/// Refines the target account type from the source category.
#[must_use]
pub const fn account_type_for_category(category: AccountCategory) -> Option<TargetAccountType> {
    match category {
        AccountCategory::Financial => Some(TargetAccountType::Bank),
        AccountCategory::Debtors => Some(TargetAccountType::Receivable),
        AccountCategory::Creditors => Some(TargetAccountType::Payable),
        AccountCategory::VatSettlement
        | AccountCategory::VatPayable
        | AccountCategory::VatPayableLow
        | AccountCategory::VatPayableHigh
        | AccountCategory::VatPayableOther
        | AccountCategory::VatReceivable => Some(TargetAccountType::Tax),
        AccountCategory::Balance | AccountCategory::ProfitLoss => None,
    }
}

/// Routes a mutation type to its target document kind.
///
/// Opening balances are out of scope and map to `None`.
#[must_use]
pub const fn document_kind_for(mutation_type: MutationType) -> Option<DocumentKind> {
    match mutation_type {
        MutationType::Opening => None,
        MutationType::PurchaseInvoice => Some(DocumentKind::PurchaseInvoice),
        MutationType::SalesInvoice => Some(DocumentKind::SalesInvoice),
        MutationType::CustomerPayment | MutationType::SupplierPayment => {
            Some(DocumentKind::PaymentEntry)
        }
        MutationType::MoneyReceived | MutationType::MoneySent | MutationType::Journal => {
            Some(DocumentKind::JournalEntry)
        }
    }
}

/// Payment direction for a payment-type mutation.
#[must_use]
pub const fn payment_direction_for(mutation_type: MutationType) -> Option<PaymentDirection> {
    match mutation_type {
        MutationType::CustomerPayment => Some(PaymentDirection::Receive),
        MutationType::SupplierPayment => Some(PaymentDirection::Pay),
        _ => None,
    }
}
