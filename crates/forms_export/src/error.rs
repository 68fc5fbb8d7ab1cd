use forms_store::StoreError;

/// Reasons a report could not be produced. Callers only ever see a
/// generic failure; the variant is for logs.
#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("Storage scan failed: {0}")]
    Store(#[from] StoreError),

    #[error("CSV serialization failed: {0}")]
    Csv(String),

    #[error("Timestamp {0} cannot be represented as a calendar date")]
    InvalidTimestamp(i64),

    #[error("UTC offset of {0} hours is out of range")]
    InvalidOffset(i32),

    #[error("Invalid request parameter {name}: {value:?}")]
    InvalidParameter { name: String, value: String },
}

impl ExportError {
    pub(crate) fn csv(err: anyhow::Error) -> Self {
        ExportError::Csv(format!("{err:#}"))
    }
}
