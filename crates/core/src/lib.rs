//! Pure domain logic for the E-Boekhouden migration core.
//!
//! This crate contains the source data model and every deterministic
//! derivation rule, with ZERO I/O dependencies.
//!
//! # Modules
//!
//! - `mutation` - Source mutation model and amount conventions
//! - `account` - Source chart-of-accounts and relation models
//! - `classify` - Constant classification tables (group/category/type)
//! - `coa` - Chart-of-accounts plan derivation
//! - `naming` - Mapped item code and name derivation

pub mod account;
pub mod classify;
pub mod coa;
pub mod mutation;
pub mod naming;

#[cfg(test)]
mod coa_props;

pub use account::{AccountCategory, RelationType, SourceAccount, SourceRelation};
pub use classify::{
    DocumentKind, LineDirection, PaymentDirection, RootType, TargetAccountType,
    account_type_for_category, document_kind_for, payment_direction_for, root_for_account,
    root_for_group,
};
pub use coa::{CoaPlan, ParentRef, PlannedAccount, PlannedGroup, derive_plan};
pub use mutation::{Mutation, MutationRow, MutationType, RowSide};
