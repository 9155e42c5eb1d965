//! Item code and name derivation for mapped tegenrekening items.

/// Prefix for every migrated item code.
pub const ITEM_CODE_PREFIX: &str = "EB-";

/// Generic fallback item code for income lines.
pub const GENERIC_INCOME_ITEM: &str = "EB-GENERIC-INCOME";

/// Generic fallback item code for expense lines.
pub const GENERIC_EXPENSE_ITEM: &str = "EB-GENERIC-EXPENSE";

/// Maximum length of a derived item name.
const MAX_ITEM_NAME_LEN: usize = 100;

/// Builds the stable item code for a source ledger code.
#[must_use]
pub fn item_code(source_code: &str) -> String {
    format!("{ITEM_CODE_PREFIX}{source_code}")
}

/// Derives a human-readable item name from a target account name.
///
/// Strips the trailing company suffix (`" - Abbr"`), a leading account
/// code, and caps the length. Falls back to the source code when
/// nothing readable remains.
#[must_use]
pub fn item_name_from_account(account_name: &str, source_code: &str) -> String {
    let mut name = account_name.trim();

    // "1300 - Debiteuren - AC" -> keep the middle part.
    if let Some(idx) = name.rfind(" - ") {
        let (head, tail) = name.split_at(idx);
        // Only treat a short trailing token as a company abbreviation.
        if tail.trim_start_matches(" - ").len() <= 5 {
            name = head.trim();
        }
    }

    // Strip a leading numeric code plus separator.
    let stripped = name
        .trim_start_matches(|c: char| c.is_ascii_digit())
        .trim_start_matches([' ', '-', ':']);
    if !stripped.is_empty() {
        name = stripped;
    }

    let name: String = name.chars().take(MAX_ITEM_NAME_LEN).collect();
    if name.trim().is_empty() {
        source_code.to_string()
    } else {
        name.trim().to_string()
    }
}

/// Returns true when a source account name marks cost-of-goods-sold.
#[must_use]
pub fn is_cogs_name(account_name: &str) -> bool {
    let lower = account_name.to_lowercase();
    lower.contains("inkoopwaarde") || lower.contains("cost of goods")
}
