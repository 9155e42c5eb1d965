//! Source chart-of-accounts and relation models.

use serde::{Deserialize, Serialize};

/// Source account category as encoded by the source API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum AccountCategory {
    /// Balance sheet account.
    #[serde(rename = "BAL")]
    Balance,
    /// Profit and loss account.
    #[serde(rename = "VW")]
    ProfitLoss,
    /// Financial (bank) account.
    #[serde(rename = "FIN")]
    Financial,
    /// Debtors (receivable).
    #[serde(rename = "DEB")]
    Debtors,
    /// Creditors (payable).
    #[serde(rename = "CRED")]
    Creditors,
    /// VAT settlement account.
    #[serde(rename = "BTWRC")]
    VatSettlement,
    /// VAT payable.
    #[serde(rename = "AF")]
    VatPayable,
    /// VAT payable, low rate.
    #[serde(rename = "AF6")]
    VatPayableLow,
    /// VAT payable, high rate.
    #[serde(rename = "AF19")]
    VatPayableHigh,
    /// VAT payable, other rate.
    #[serde(rename = "AFOVERIG")]
    VatPayableOther,
    /// VAT receivable (prepaid).
    #[serde(rename = "VOOR")]
    VatReceivable,
}

impl AccountCategory {
    /// Returns true for any of the VAT settlement/payable/receivable categories.
    #[must_use]
    pub const fn is_vat(self) -> bool {
        matches!(
            self,
            Self::VatSettlement
                | Self::VatPayable
                | Self::VatPayableLow
                | Self::VatPayableHigh
                | Self::VatPayableOther
                | Self::VatReceivable
        )
    }
}

/// One entry of the source chart of accounts.
///
/// The `Ord` impl (code, then description, category, group) gives
/// duplicate codes a stable winner during plan derivation.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceAccount {
    /// Short account code, unique within the tenant.
    pub code: String,
    /// Account name.
    #[serde(default)]
    pub description: String,
    /// Enumerated source category.
    pub category: AccountCategory,
    /// Optional flat group classification (not a parent reference).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group: Option<String>,
}

/// Relation (party) kind in the source system.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RelationType {
    /// A customer relation.
    Customer,
    /// A supplier relation.
    Supplier,
}

/// A source party (customer or supplier).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceRelation {
    /// Source-global relation ID.
    pub id: i64,
    /// Whether this relation is a customer or supplier.
    #[serde(rename = "type")]
    pub relation_type: RelationType,
    /// Display name.
    #[serde(default)]
    pub name: String,
    /// Contact email.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// Contact phone number.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    /// Postal city.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
}
