use async_trait::async_trait;
use forms_core::FormRecord;
use parking_lot::Mutex;
use std::collections::HashMap;

use crate::filter::ScanRequest;
use crate::store::{FormStore, StoreError, validate_table_name};

/// Vector-backed store that evaluates filters in memory.
///
/// Every scan request is recorded so callers can check whether (and how)
/// the store was queried.
#[derive(Default)]
pub struct MemoryFormStore {
    tables: Mutex<HashMap<String, Vec<FormRecord>>>,
    scans: Mutex<Vec<ScanRequest>>,
}

impl MemoryFormStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_forms(table: &str, forms: Vec<FormRecord>) -> Self {
        let store = Self::new();
        store.tables.lock().insert(table.to_string(), forms);
        store
    }

    pub fn insert(&self, table: &str, form: FormRecord) {
        self.tables
            .lock()
            .entry(table.to_string())
            .or_default()
            .push(form);
    }

    pub fn scan_count(&self) -> usize {
        self.scans.lock().len()
    }

    pub fn last_scan(&self) -> Option<ScanRequest> {
        self.scans.lock().last().cloned()
    }
}

#[async_trait]
impl FormStore for MemoryFormStore {
    async fn scan(&self, request: &ScanRequest) -> Result<Vec<FormRecord>, StoreError> {
        self.scans.lock().push(request.clone());
        validate_table_name(&request.table_name)?;

        let tables = self.tables.lock();
        let forms = tables
            .get(&request.table_name)
            .ok_or_else(|| StoreError::TableNotFound(request.table_name.clone()))?;

        let mut matched = Vec::new();
        for form in forms {
            if request.matches(form)? {
                matched.push(form.clone());
            }
        }
        Ok(matched)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::FilterExpression;

    #[tokio::test]
    async fn test_scan_filters_and_records_requests() {
        let store = MemoryFormStore::with_forms(
            "forms",
            vec![
                FormRecord::new("a", 10, "a@x"),
                FormRecord::new("b", 20, "b@x"),
                FormRecord::new("c", 30, "c@x"),
            ],
        );
        assert_eq!(store.scan_count(), 0);

        let request = ScanRequest::new("forms", FilterExpression::timestamp_range(Some(15), None));
        let forms = store.scan(&request).await.unwrap();
        assert_eq!(forms.len(), 2);
        assert_eq!(store.scan_count(), 1);
        assert_eq!(store.last_scan(), Some(request));
    }

    #[tokio::test]
    async fn test_scan_unknown_table() {
        let store = MemoryFormStore::new();
        store.insert("other", FormRecord::new("a", 1, "a@x"));
        let err = store.scan(&ScanRequest::new("forms", None)).await.unwrap_err();
        assert!(matches!(err, StoreError::TableNotFound(_)));
    }
}
