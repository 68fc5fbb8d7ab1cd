use async_trait::async_trait;
use forms_core::FormRecord;

use crate::filter::ScanRequest;

/// Errors raised while scanning or writing a forms table.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// A stored document could not be decoded into a form record.
    #[error("Malformed form document: {0}")]
    Document(#[from] serde_json::Error),

    #[error("Table not found: {0}")]
    TableNotFound(String),

    #[error("Invalid table name: {0:?}")]
    InvalidTableName(String),

    #[error("Filtering on attribute {0:?} is not supported")]
    UnsupportedAttribute(String),

    #[error("Unbound placeholder in filter: {0}")]
    UnboundPlaceholder(String),
}

/// A key-value table of form records that can be scanned.
#[async_trait]
pub trait FormStore: Send + Sync {
    /// Read every record of `request.table_name` that satisfies the filter.
    async fn scan(&self, request: &ScanRequest) -> Result<Vec<FormRecord>, StoreError>;
}

/// Table names are interpolated into SQL, so only `[A-Za-z0-9_]` is accepted.
pub fn validate_table_name(name: &str) -> Result<(), StoreError> {
    let valid = !name.is_empty() && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_');
    if valid {
        Ok(())
    } else {
        Err(StoreError::InvalidTableName(name.to_string()))
    }
}
