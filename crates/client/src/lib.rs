//! Source REST client and mutation iterator.
//!
//! # Modules
//!
//! - `session` - Session token lifecycle with an expiry margin
//! - `client` - reqwest-backed source API client
//! - `source` - The `MutationSource` seam and an in-memory fake
//! - `iterator` - ID-space probing and gap-tolerant walking

pub mod client;
pub mod iterator;
pub mod session;
pub mod source;

pub use client::SourceClient;
pub use iterator::{IterationStats, IteratorConfig, MutationIterator};
pub use session::SessionState;
pub use source::{FakeSource, MutationSource};
