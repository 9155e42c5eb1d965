//! Chart-of-accounts plan derivation.
//!
//! Turns the flat source chart (code + category + group classification)
//! into a deterministic plan of group and leaf accounts under the five
//! fixed roots. The plan is pure data; persistence happens in the
//! engine crate.

use crate::account::SourceAccount;
use crate::classify::{RootType, TargetAccountType, account_type_for_category, root_for_account, root_for_group};

/// Maximum length of a derived account name.
const MAX_ACCOUNT_NAME_LEN: usize = 60;

/// Parent of a planned account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParentRef {
    /// Attach directly under a root account.
    Root(RootType),
    /// Attach under the group account created for this group code.
    Group(String),
}

/// A group account to create under a root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedGroup {
    /// Source group code.
    pub code: String,
    /// Display name of the group account.
    pub name: String,
    /// Root this group attaches to.
    pub root_type: RootType,
}

/// A leaf (or intermediate) account to create.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedAccount {
    /// Source account code, kept as the back-reference.
    pub source_code: String,
    /// Target account number (equal to the source code).
    pub account_number: String,
    /// Human account name from the source description.
    pub account_name: String,
    /// Unique target name: `<code> - <name>`.
    pub name: String,
    /// Derived root type.
    pub root_type: RootType,
    /// Refined target account type, when the category implies one.
    pub account_type: Option<TargetAccountType>,
    /// Where this account attaches.
    pub parent: ParentRef,
    /// True when another source code has this code as a strict prefix.
    pub is_group: bool,
}

/// The full derivation result.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CoaPlan {
    /// Group accounts, sorted by code.
    pub groups: Vec<PlannedGroup>,
    /// Accounts, sorted by code.
    pub accounts: Vec<PlannedAccount>,
}

/// Derives the account plan from the source chart.
///
/// The derivation is a pure function of the account set: input order
/// does not matter, duplicate codes collapse to the `Ord`-smallest
/// entry, and output is sorted by code. No planned account ends up
/// without a parent, and an account only attaches to a group rooted
/// in its own tree.
#[must_use]
pub fn derive_plan(source: &[SourceAccount]) -> CoaPlan {
    let mut seen: std::collections::BTreeMap<String, SourceAccount> =
        std::collections::BTreeMap::new();
    for account in source {
        seen.entry(account.code.clone())
            .and_modify(|kept| {
                if *account < *kept {
                    *kept = account.clone();
                }
            })
            .or_insert_with(|| account.clone());
    }
    let accounts: Vec<SourceAccount> = seen.into_values().collect();

    let groups = derive_groups(&accounts);
    let group_roots: std::collections::BTreeMap<&str, RootType> =
        groups.iter().map(|g| (g.code.as_str(), g.root_type)).collect();
    let codes: Vec<&str> = accounts.iter().map(|a| a.code.as_str()).collect();

    let planned = accounts
        .iter()
        .map(|account| {
            let root_type =
                root_for_account(account.category, &account.code, account.group.as_deref());
            // A member whose root disagrees with its group goes under
            // its own root, keeping each tree single-rooted.
            let parent = match account.group.as_deref() {
                Some(g) if group_roots.get(g) == Some(&root_type) => {
                    ParentRef::Group(g.to_string())
                }
                _ => ParentRef::Root(root_type),
            };
            let is_group = codes
                .iter()
                .any(|c| c.len() > account.code.len() && c.starts_with(account.code.as_str()));

            PlannedAccount {
                source_code: account.code.clone(),
                account_number: account.code.clone(),
                account_name: truncate(&account.description, MAX_ACCOUNT_NAME_LEN),
                name: account_name(&account.code, &account.description),
                root_type,
                account_type: account_type_for_category(account.category),
                parent,
                is_group,
            }
        })
        .collect();

    CoaPlan {
        groups,
        accounts: planned,
    }
}

/// Derives the distinct group accounts with their root assignment.
///
/// Groups outside the fixed table inherit the root of their first
/// member account (sorted by code), which keeps the result stable.
fn derive_groups(accounts: &[SourceAccount]) -> Vec<PlannedGroup> {
    let mut groups = std::collections::BTreeMap::new();

    for account in accounts {
        let Some(group) = account.group.as_deref() else {
            continue;
        };
        groups.entry(group.to_string()).or_insert_with(|| {
            let root_type = root_for_group(group)
                .unwrap_or_else(|| root_for_account(account.category, &account.code, None));
            PlannedGroup {
                code: group.to_string(),
                name: format!("Group {group}"),
                root_type,
            }
        });
    }

    groups.into_values().collect()
}

/// Builds the unique target name for an account.
fn account_name(code: &str, description: &str) -> String {
    let description = description.trim();
    if description.is_empty() {
        code.to_string()
    } else {
        format!("{code} - {}", truncate(description, MAX_ACCOUNT_NAME_LEN))
    }
}

/// Truncates on a character boundary.
fn truncate(text: &str, max_chars: usize) -> String {
    text.trim().chars().take(max_chars).collect()
}

#[cfg(test)]
mod tests {
    use crate::account::AccountCategory;

    use super::*;

    fn source(code: &str, category: AccountCategory, group: Option<&str>) -> SourceAccount {
        SourceAccount {
            code: code.to_string(),
            description: format!("Account {code}"),
            category,
            group: group.map(ToString::to_string),
        }
    }

    #[test]
    fn test_every_account_has_a_parent() {
        let plan = derive_plan(&[
            source("1010", AccountCategory::Financial, Some("001")),
            source("8000", AccountCategory::ProfitLoss, None),
        ]);

        assert_eq!(plan.accounts.len(), 2);
        assert_eq!(plan.accounts[0].parent, ParentRef::Group("001".into()));
        assert_eq!(plan.accounts[1].parent, ParentRef::Root(RootType::Income));
    }

    #[test]
    fn test_group_accounts_from_table_and_fallback() {
        let plan = derive_plan(&[
            source("8000", AccountCategory::ProfitLoss, Some("055")),
            source("1300", AccountCategory::Debtors, Some("777")),
        ]);

        assert_eq!(plan.groups.len(), 2);
        let by_code: std::collections::HashMap<_, _> =
            plan.groups.iter().map(|g| (g.code.as_str(), g)).collect();
        assert_eq!(by_code["055"].root_type, RootType::Income);
        // 777 is not in the table; it inherits from its Debtors member.
        assert_eq!(by_code["777"].root_type, RootType::Asset);
    }

    #[test]
    fn test_is_group_by_strict_prefix() {
        let plan = derive_plan(&[
            source("40", AccountCategory::ProfitLoss, None),
            source("4010", AccountCategory::ProfitLoss, None),
            source("4020", AccountCategory::ProfitLoss, None),
        ]);

        let by_code: std::collections::HashMap<_, _> = plan
            .accounts
            .iter()
            .map(|a| (a.source_code.as_str(), a))
            .collect();
        assert!(by_code["40"].is_group);
        assert!(!by_code["4010"].is_group);
        assert!(!by_code["4020"].is_group);
    }

    #[test]
    fn test_duplicate_codes_collapse_order_independently() {
        let mut first = source("8000", AccountCategory::ProfitLoss, None);
        first.description = "First".to_string();
        let mut second = source("8000", AccountCategory::ProfitLoss, None);
        second.description = "Second".to_string();

        let plan = derive_plan(&[first.clone(), second.clone()]);
        let reversed = derive_plan(&[second, first]);

        assert_eq!(plan, reversed);
        assert_eq!(plan.accounts.len(), 1);
        // The Ord-smallest duplicate wins regardless of input order.
        assert_eq!(plan.accounts[0].account_name, "First");
    }

    #[test]
    fn test_dissenting_member_attaches_to_its_own_root() {
        // 777 is not in the fixed table; its root comes from the first
        // member by code (1300, Debtors -> Asset). The Creditors member
        // must not end up inside the Asset tree.
        let plan = derive_plan(&[
            source("1300", AccountCategory::Debtors, Some("777")),
            source("1600", AccountCategory::Creditors, Some("777")),
        ]);

        let by_code: std::collections::HashMap<_, _> = plan
            .accounts
            .iter()
            .map(|a| (a.source_code.as_str(), a))
            .collect();
        assert_eq!(by_code["1300"].root_type, RootType::Asset);
        assert_eq!(by_code["1300"].parent, ParentRef::Group("777".into()));
        assert_eq!(by_code["1600"].root_type, RootType::Liability);
        assert_eq!(by_code["1600"].parent, ParentRef::Root(RootType::Liability));
    }

    #[test]
    fn test_account_naming_and_backreference() {
        let plan = derive_plan(&[SourceAccount {
            code: "1300".into(),
            description: "Debiteuren".into(),
            category: AccountCategory::Debtors,
            group: None,
        }]);

        let account = &plan.accounts[0];
        assert_eq!(account.name, "1300 - Debiteuren");
        assert_eq!(account.account_number, "1300");
        assert_eq!(account.source_code, "1300");
        assert_eq!(account.account_type, Some(TargetAccountType::Receivable));
    }

    #[test]
    fn test_blank_description_uses_code() {
        let plan = derive_plan(&[SourceAccount {
            code: "9999".into(),
            description: "  ".into(),
            category: AccountCategory::Balance,
            group: None,
        }]);

        assert_eq!(plan.accounts[0].name, "9999");
    }
}
