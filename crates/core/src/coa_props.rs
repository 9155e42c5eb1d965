//! Property-based tests for chart-of-accounts derivation.
//!
//! Laws covered: derivation determinism regardless of input order, and
//! the no-root-leaf guarantee (every planned account has a parent that
//! exists in the plan).

use proptest::prelude::*;

use crate::account::{AccountCategory, SourceAccount};
use crate::coa::{ParentRef, derive_plan};

fn category_strategy() -> impl Strategy<Value = AccountCategory> {
    prop_oneof![
        Just(AccountCategory::Balance),
        Just(AccountCategory::ProfitLoss),
        Just(AccountCategory::Financial),
        Just(AccountCategory::Debtors),
        Just(AccountCategory::Creditors),
        Just(AccountCategory::VatSettlement),
        Just(AccountCategory::VatPayable),
        Just(AccountCategory::VatPayableLow),
        Just(AccountCategory::VatPayableHigh),
        Just(AccountCategory::VatPayableOther),
        Just(AccountCategory::VatReceivable),
    ]
}

fn group_strategy() -> impl Strategy<Value = Option<String>> {
    prop_oneof![
        3 => Just(None),
        1 => "(00[1-9]|05[5-9])".prop_map(Some),
        1 => "[0-9]{3}".prop_map(Some),
    ]
}

fn account_strategy() -> impl Strategy<Value = SourceAccount> {
    ("[0-9]{1,5}", "[A-Za-z ]{0,30}", category_strategy(), group_strategy()).prop_map(
        |(code, description, category, group)| SourceAccount {
            code,
            description,
            category,
            group,
        },
    )
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// Derivation is a pure function of the account *set*: shuffling the
    /// input produces an identical plan.
    #[test]
    fn prop_derivation_is_order_independent(
        accounts in prop::collection::vec(account_strategy(), 0..40),
        seed in any::<u64>(),
    ) {
        let baseline = derive_plan(&accounts);

        // Cheap deterministic shuffle.
        let mut shuffled = accounts;
        if !shuffled.is_empty() {
            let len = shuffled.len();
            for i in 0..len {
                #[allow(clippy::cast_possible_truncation)]
                let j = ((seed.wrapping_mul(6_364_136_223_846_793_005).wrapping_add(i as u64))
                    % len as u64) as usize;
                shuffled.swap(i, j);
            }
        }

        prop_assert_eq!(derive_plan(&shuffled), baseline);
    }

    /// No source account becomes a root: every planned account has a
    /// parent, group parents exist in the plan, and an account never
    /// sits inside a group rooted in a different tree.
    #[test]
    fn prop_no_account_without_parent(
        accounts in prop::collection::vec(account_strategy(), 0..40),
    ) {
        let plan = derive_plan(&accounts);
        let group_roots: std::collections::BTreeMap<&str, _> =
            plan.groups.iter().map(|g| (g.code.as_str(), g.root_type)).collect();

        for account in &plan.accounts {
            match &account.parent {
                ParentRef::Root(root) => prop_assert_eq!(*root, account.root_type),
                ParentRef::Group(code) => {
                    let root = group_roots.get(code.as_str());
                    prop_assert!(root.is_some(),
                        "parent group {} missing from plan", code);
                    prop_assert_eq!(root.copied(), Some(account.root_type),
                        "account {} rooted outside its parent group's tree",
                        &account.source_code);
                }
            }
        }
    }

    /// `is_group` holds exactly when another code extends this one.
    #[test]
    fn prop_is_group_matches_prefix_relation(
        accounts in prop::collection::vec(account_strategy(), 0..40),
    ) {
        let plan = derive_plan(&accounts);
        let codes: Vec<&str> = plan.accounts.iter().map(|a| a.source_code.as_str()).collect();

        for account in &plan.accounts {
            let expected = codes.iter().any(|c| {
                c.len() > account.source_code.len() && c.starts_with(account.source_code.as_str())
            });
            prop_assert_eq!(account.is_group, expected);
        }
    }

    /// Output carries each distinct code exactly once, sorted.
    #[test]
    fn prop_accounts_unique_and_sorted(
        accounts in prop::collection::vec(account_strategy(), 0..40),
    ) {
        let plan = derive_plan(&accounts);
        let codes: Vec<&String> = plan.accounts.iter().map(|a| &a.source_code).collect();
        let mut sorted = codes.clone();
        sorted.sort();
        sorted.dedup();
        prop_assert_eq!(codes, sorted);
    }
}
