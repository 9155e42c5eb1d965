//! Source mutation model.
//!
//! A mutation is one accounting event in the source system (invoice,
//! payment, or journal), identified by a sparse integer ID. The JSON
//! shape is camelCase and amounts arrive as either strings or numbers.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Mutation type as encoded by the source (`type` field, 0-7).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum MutationType {
    /// Opening balance entry (skipped by the migration).
    Opening,
    /// Purchase invoice received.
    PurchaseInvoice,
    /// Sales invoice issued.
    SalesInvoice,
    /// Payment received from a customer.
    CustomerPayment,
    /// Payment sent to a supplier.
    SupplierPayment,
    /// Money received outside an invoice.
    MoneyReceived,
    /// Money sent outside an invoice.
    MoneySent,
    /// General journal entry.
    Journal,
}

impl MutationType {
    /// All types that produce target documents, in processing order.
    pub const IMPORT_ORDER: [Self; 7] = [
        Self::PurchaseInvoice,
        Self::SalesInvoice,
        Self::CustomerPayment,
        Self::SupplierPayment,
        Self::MoneyReceived,
        Self::MoneySent,
        Self::Journal,
    ];

    /// Returns the numeric code used by the source API.
    #[must_use]
    pub const fn code(self) -> u8 {
        match self {
            Self::Opening => 0,
            Self::PurchaseInvoice => 1,
            Self::SalesInvoice => 2,
            Self::CustomerPayment => 3,
            Self::SupplierPayment => 4,
            Self::MoneyReceived => 5,
            Self::MoneySent => 6,
            Self::Journal => 7,
        }
    }

    /// Parses a numeric source code.
    #[must_use]
    pub const fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(Self::Opening),
            1 => Some(Self::PurchaseInvoice),
            2 => Some(Self::SalesInvoice),
            3 => Some(Self::CustomerPayment),
            4 => Some(Self::SupplierPayment),
            5 => Some(Self::MoneyReceived),
            6 => Some(Self::MoneySent),
            7 => Some(Self::Journal),
            _ => None,
        }
    }
}

impl TryFrom<u8> for MutationType {
    type Error = String;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        Self::from_code(code).ok_or_else(|| format!("unknown mutation type code: {code}"))
    }
}

impl From<MutationType> for u8 {
    fn from(t: MutationType) -> Self {
        t.code()
    }
}

/// Debit/credit marker on a mutation row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RowSide {
    /// Debit leg.
    #[serde(rename = "D", alias = "d")]
    Debit,
    /// Credit leg.
    #[serde(rename = "C", alias = "c")]
    Credit,
}

/// One line item of a mutation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MutationRow {
    /// Source ledger (counter-account) code referenced by this row.
    #[serde(rename = "ledgerId", with = "flexible_code")]
    pub ledger_code: String,
    /// Row amount. Signed when no side marker is present, absolute otherwise.
    #[serde(with = "flexible_decimal")]
    pub amount: Decimal,
    /// Debit/credit marker, when the source sends absolute amounts.
    #[serde(default, alias = "debitCredit", skip_serializing_if = "Option::is_none")]
    pub side: Option<RowSide>,
    /// Source VAT code, carried but not applied.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vat_code: Option<String>,
    /// Source VAT amount, carried but not applied.
    #[serde(default, with = "flexible_decimal_opt", skip_serializing_if = "Option::is_none")]
    pub vat_amount: Option<Decimal>,
    /// Row-level description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl MutationRow {
    /// Returns the signed amount: debit positive, credit negative.
    ///
    /// Rows without a side marker are taken as already signed.
    #[must_use]
    pub fn signed_amount(&self) -> Decimal {
        match self.side {
            Some(RowSide::Debit) => self.amount.abs(),
            Some(RowSide::Credit) => -self.amount.abs(),
            None => self.amount,
        }
    }
}

/// One accounting event fetched from the source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Mutation {
    /// Source-global integer ID (sparse).
    pub id: i64,
    /// Mutation type (0-7).
    #[serde(rename = "type")]
    pub mutation_type: MutationType,
    /// Calendar date of the event.
    pub date: NaiveDate,
    /// Free-text description.
    #[serde(default)]
    pub description: String,
    /// Optional external invoice reference.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub invoice_number: Option<String>,
    /// Optional external entry reference.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entry_number: Option<String>,
    /// Optional source party foreign key.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub relation_id: Option<i64>,
    /// Ordered line items. The summary endpoint may omit these.
    #[serde(default)]
    pub rows: Vec<MutationRow>,
    /// Whether row amounts include VAT. Carried but not applied.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub in_ex_vat: Option<String>,
    /// Payment term in days. Carried but not applied.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub term_of_payment: Option<i32>,
}

impl Mutation {
    /// Principal amount: sum of absolute row amounts.
    #[must_use]
    pub fn principal_amount(&self) -> Decimal {
        self.rows.iter().map(|r| r.amount.abs()).sum()
    }

    /// Sum of signed row amounts (zero for a balanced multi-leg mutation).
    #[must_use]
    pub fn signed_total(&self) -> Decimal {
        self.rows.iter().map(MutationRow::signed_amount).sum()
    }

    /// Ledger code of the first (principal) row, when any row exists.
    #[must_use]
    pub fn first_ledger_code(&self) -> Option<&str> {
        self.rows.first().map(|r| r.ledger_code.as_str())
    }

    /// External reference: the invoice number, or `EBH-<id>` when absent.
    #[must_use]
    pub fn reference(&self) -> String {
        self.invoice_number
            .as_deref()
            .filter(|s| !s.trim().is_empty())
            .map_or_else(|| format!("EBH-{}", self.id), ToString::to_string)
    }
}

/// Deserializes a ledger code sent as either a JSON number or string.
mod flexible_code {
    use serde::{Deserialize, Deserializer, Serializer};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Number(i64),
        Text(String),
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
        Ok(match Raw::deserialize(deserializer)? {
            Raw::Number(n) => n.to_string(),
            Raw::Text(s) => s,
        })
    }

    pub fn serialize<S: Serializer>(code: &str, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(code)
    }
}

/// Deserializes a decimal sent as either a JSON number or string.
mod flexible_decimal {
    use std::str::FromStr;

    use rust_decimal::Decimal;
    use serde::{Deserialize, Deserializer, Serializer, de::Error};

    #[derive(Deserialize)]
    #[serde(untagged)]
    pub(super) enum Raw {
        Number(serde_json::Number),
        Text(String),
    }

    pub(super) fn parse<E: Error>(raw: Raw) -> Result<Decimal, E> {
        let text = match raw {
            Raw::Number(n) => n.to_string(),
            Raw::Text(s) => s,
        };
        Decimal::from_str(text.trim()).map_err(|e| E::custom(format!("invalid amount: {e}")))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Decimal, D::Error> {
        parse(Raw::deserialize(deserializer)?)
    }

    pub fn serialize<S: Serializer>(amount: &Decimal, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&amount.to_string())
    }
}

/// Optional variant of [`flexible_decimal`].
mod flexible_decimal_opt {
    use rust_decimal::Decimal;
    use serde::{Deserialize, Deserializer, Serializer};

    use super::flexible_decimal;

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<Decimal>, D::Error> {
        let raw: Option<flexible_decimal::Raw> = Option::deserialize(deserializer)?;
        raw.map(flexible_decimal::parse).transpose()
    }

    pub fn serialize<S: Serializer>(
        amount: &Option<Decimal>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match amount {
            Some(a) => serializer.serialize_some(&a.to_string()),
            None => serializer.serialize_none(),
        }
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal_macros::dec;

    use super::*;

    #[test]
    fn test_type_codes_round_trip() {
        for code in 0u8..=7 {
            let t = MutationType::from_code(code).unwrap();
            assert_eq!(t.code(), code);
        }
        assert!(MutationType::from_code(8).is_none());
    }

    #[test]
    fn test_import_order_excludes_opening() {
        assert!(!MutationType::IMPORT_ORDER.contains(&MutationType::Opening));
        assert_eq!(MutationType::IMPORT_ORDER.len(), 7);
    }

    #[test]
    fn test_deserialize_camel_case_payload() {
        let json = serde_json::json!({
            "id": 17,
            "type": 1,
            "date": "2019-03-31",
            "description": "Office supplies",
            "invoiceNumber": "TEST001",
            "relationId": 19_097_433,
            "rows": [
                { "ledgerId": 15_916_395, "amount": "100.00" }
            ]
        });

        let mutation: Mutation = serde_json::from_value(json).unwrap();
        assert_eq!(mutation.id, 17);
        assert_eq!(mutation.mutation_type, MutationType::PurchaseInvoice);
        assert_eq!(mutation.invoice_number.as_deref(), Some("TEST001"));
        assert_eq!(mutation.relation_id, Some(19_097_433));
        assert_eq!(mutation.rows[0].ledger_code, "15916395");
        assert_eq!(mutation.rows[0].amount, dec!(100.00));
    }

    #[test]
    fn test_amount_accepts_number_or_string() {
        let as_number: MutationRow =
            serde_json::from_value(serde_json::json!({ "ledgerId": "8000", "amount": 12.5 }))
                .unwrap();
        let as_string: MutationRow =
            serde_json::from_value(serde_json::json!({ "ledgerId": 8000, "amount": "12.50" }))
                .unwrap();
        assert_eq!(as_number.amount, dec!(12.5));
        assert_eq!(as_string.amount, dec!(12.50));
    }

    #[test]
    fn test_signed_amount_with_side_marker() {
        let debit = MutationRow {
            ledger_code: "8000".into(),
            amount: dec!(40),
            side: Some(RowSide::Debit),
            vat_code: None,
            vat_amount: None,
            description: None,
        };
        let credit = MutationRow {
            side: Some(RowSide::Credit),
            ..debit.clone()
        };
        let bare = MutationRow {
            side: None,
            amount: dec!(-40),
            ..debit.clone()
        };

        assert_eq!(debit.signed_amount(), dec!(40));
        assert_eq!(credit.signed_amount(), dec!(-40));
        assert_eq!(bare.signed_amount(), dec!(-40));
    }

    #[test]
    fn test_principal_and_signed_totals() {
        let json = serde_json::json!({
            "id": 900,
            "type": 7,
            "date": "2020-01-01",
            "rows": [
                { "ledgerId": "8000", "amount": "75.00", "debitCredit": "D" },
                { "ledgerId": "1010", "amount": "75.00", "debitCredit": "C" }
            ]
        });
        let mutation: Mutation = serde_json::from_value(json).unwrap();

        assert_eq!(mutation.principal_amount(), dec!(150.00));
        assert_eq!(mutation.signed_total(), Decimal::ZERO);
        assert_eq!(mutation.first_ledger_code(), Some("8000"));
    }

    #[test]
    fn test_reference_falls_back_to_id() {
        let json = serde_json::json!({ "id": 42, "type": 2, "date": "2020-01-01" });
        let mutation: Mutation = serde_json::from_value(json).unwrap();
        assert_eq!(mutation.reference(), "EBH-42");

        let json = serde_json::json!({
            "id": 42, "type": 2, "date": "2020-01-01", "invoiceNumber": "  "
        });
        let blank: Mutation = serde_json::from_value(json).unwrap();
        assert_eq!(blank.reference(), "EBH-42");
    }
}
