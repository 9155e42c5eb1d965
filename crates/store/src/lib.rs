//! Target document model, the `DocumentStore` persistence seam, and
//! the mutation cache.
//!
//! # Modules
//!
//! - `documents` - Target entities (accounts, parties, items, posting documents)
//! - `repositories` - The `DocumentStore` trait with unique-constraint semantics
//! - `memory` - In-memory reference implementation
//! - `cache` - Mutation cache keyed by source ID

pub mod cache;
pub mod documents;
pub mod memory;
pub mod repositories;

pub use cache::{CacheEntry, CacheStatistics, MemoryMutationCache, MutationCache};
pub use documents::{
    Customer, DocStatus, InvoiceLine, Item, ItemGroup, JournalEntry, JournalLine, PaymentEntry,
    PurchaseInvoice, SalesInvoice, Supplier, TargetAccount, TargetDocument,
};
pub use memory::MemoryStore;
pub use repositories::{DocumentStore, InsertOutcome};
