//! Storage scan collaborator for submitted forms.
//!
//! A scan reads every record of a forms table, optionally narrowed by a
//! [`FilterExpression`] built from placeholder-based conditions. Stores
//! page through results internally and hand back the aggregated records.

pub mod filter;
pub mod memory;
pub mod sqlite;
pub mod store;

pub use filter::{Comparison, Condition, FilterBuilder, FilterExpression, ScanRequest};
pub use memory::MemoryFormStore;
pub use sqlite::SqliteFormStore;
pub use store::{FormStore, StoreError};
