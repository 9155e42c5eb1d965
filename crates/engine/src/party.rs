//! Party resolution: source relation to customer/supplier.
//!
//! Parties are never mutated on re-encounter. Unknown relations fall
//! back to a well-known import default created on first use.

use std::sync::Arc;

use ebmig_core::account::SourceRelation;
use ebmig_shared::MigrateResult;
use ebmig_store::{Customer, DocumentStore, InsertOutcome, Supplier};

/// Fallback customer for unresolvable relations.
pub const IMPORT_CUSTOMER: &str = "Import Customer";

/// Fallback supplier for unresolvable relations.
pub const IMPORT_SUPPLIER: &str = "Import Supplier";

/// Default customer group assigned to created customers.
const DEFAULT_CUSTOMER_GROUP: &str = "All Customer Groups";

/// Default territory assigned to created customers.
const DEFAULT_TERRITORY: &str = "All Territories";

/// Default supplier group assigned to created suppliers.
const DEFAULT_SUPPLIER_GROUP: &str = "All Supplier Groups";

/// Resolves source relations to target parties.
pub struct PartyResolver {
    store: Arc<dyn DocumentStore>,
}

impl PartyResolver {
    /// Creates a resolver over the given store.
    #[must_use]
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    /// Returns the customer for a relation, or the import default.
    pub async fn get_or_create_customer(&self, relation_id: Option<i64>) -> MigrateResult<String> {
        if let Some(id) = relation_id
            && let Some(customer) = self.store.customer_by_relation(id).await?
        {
            return Ok(customer.name);
        }

        self.store
            .insert_customer(Customer {
                name: IMPORT_CUSTOMER.to_string(),
                customer_group: DEFAULT_CUSTOMER_GROUP.to_string(),
                territory: DEFAULT_TERRITORY.to_string(),
                relation_id: None,
            })
            .await?;
        Ok(IMPORT_CUSTOMER.to_string())
    }

    /// Returns the supplier for a relation, or the import default.
    pub async fn get_or_create_supplier(&self, relation_id: Option<i64>) -> MigrateResult<String> {
        if let Some(id) = relation_id
            && let Some(supplier) = self.store.supplier_by_relation(id).await?
        {
            return Ok(supplier.name);
        }

        self.store
            .insert_supplier(Supplier {
                name: IMPORT_SUPPLIER.to_string(),
                supplier_group: DEFAULT_SUPPLIER_GROUP.to_string(),
                relation_id: None,
            })
            .await?;
        Ok(IMPORT_SUPPLIER.to_string())
    }

    /// Creates a customer from a source relation listing entry.
    pub async fn create_customer(&self, relation: &SourceRelation) -> MigrateResult<InsertOutcome> {
        self.store
            .insert_customer(Customer {
                name: party_name(relation),
                customer_group: DEFAULT_CUSTOMER_GROUP.to_string(),
                territory: DEFAULT_TERRITORY.to_string(),
                relation_id: Some(relation.id),
            })
            .await
    }

    /// Creates a supplier from a source relation listing entry.
    pub async fn create_supplier(&self, relation: &SourceRelation) -> MigrateResult<InsertOutcome> {
        self.store
            .insert_supplier(Supplier {
                name: party_name(relation),
                supplier_group: DEFAULT_SUPPLIER_GROUP.to_string(),
                relation_id: Some(relation.id),
            })
            .await
    }
}

/// Display name for a relation, falling back to the source ID.
fn party_name(relation: &SourceRelation) -> String {
    let name = relation.name.trim();
    if name.is_empty() {
        format!("Relation {}", relation.id)
    } else {
        name.to_string()
    }
}
