use async_trait::async_trait;
use forms_core::FormRecord;
use parking_lot::Mutex;
use rusqlite::{Connection, OptionalExtension, params, params_from_iter};
use std::path::Path;
use tracing::{debug, info};

use crate::filter::{FilterExpression, ScanRequest, TIMESTAMP_ATTRIBUTE};
use crate::store::{FormStore, StoreError, validate_table_name};

/// SQLite-backed forms table.
///
/// Each table keeps the indexed `ts` attribute next to the full JSON
/// document. Scans read `page_size` rows at a time and aggregate them.
pub struct SqliteFormStore {
    conn: Mutex<Connection>,
    page_size: usize,
}

impl SqliteFormStore {
    /// Open (or create) a forms database at the given file path.
    pub fn open(path: &Path, page_size: usize) -> Result<Self, StoreError> {
        let conn = Connection::open(path)?;
        conn.pragma_update(None, "journal_mode", "WAL")?;
        conn.pragma_update(None, "synchronous", "NORMAL")?;
        info!("Forms database opened at {}", path.display());
        Ok(Self::from_connection(conn, page_size))
    }

    /// Create an in-memory forms database (useful for tests).
    pub fn in_memory(page_size: usize) -> Result<Self, StoreError> {
        let conn = Connection::open_in_memory()?;
        Ok(Self::from_connection(conn, page_size))
    }

    fn from_connection(conn: Connection, page_size: usize) -> Self {
        Self {
            conn: Mutex::new(conn),
            page_size: page_size.max(1),
        }
    }

    /// Creates the table and its timestamp index if they do not exist yet.
    pub fn create_table(&self, table: &str) -> Result<(), StoreError> {
        validate_table_name(table)?;
        let conn = self.conn.lock();
        Self::ensure_table(&conn, table)
    }

    fn ensure_table(conn: &Connection, table: &str) -> Result<(), StoreError> {
        conn.execute_batch(&format!(
            "
            CREATE TABLE IF NOT EXISTS \"{table}\" (
                id TEXT PRIMARY KEY,
                ts INTEGER NOT NULL,
                document TEXT NOT NULL
            );
            CREATE INDEX IF NOT EXISTS \"idx_{table}_ts\" ON \"{table}\"(ts);
            "
        ))?;
        Ok(())
    }

    fn table_exists(conn: &Connection, table: &str) -> Result<bool, StoreError> {
        let found = conn
            .query_row(
                "SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = ?1",
                params![table],
                |_| Ok(()),
            )
            .optional()?;
        Ok(found.is_some())
    }

    /// Insert or replace a form record.
    pub fn put(&self, table: &str, form: &FormRecord) -> Result<(), StoreError> {
        validate_table_name(table)?;
        let document = serde_json::to_string(form)?;
        let conn = self.conn.lock();
        Self::ensure_table(&conn, table)?;
        conn.execute(
            &format!(
                "INSERT INTO \"{table}\" (id, ts, document) VALUES (?1, ?2, ?3)
                 ON CONFLICT(id) DO UPDATE SET ts = excluded.ts, document = excluded.document"
            ),
            params![form.id, form.ts, document],
        )?;
        Ok(())
    }

    /// Import a JSON array of form records. Returns the number imported.
    pub fn import_json(&self, table: &str, json: &str) -> Result<usize, StoreError> {
        let forms: Vec<FormRecord> = serde_json::from_str(json)?;
        for form in &forms {
            self.put(table, form)?;
        }
        info!("Imported {} forms into {table}", forms.len());
        Ok(forms.len())
    }

    /// Translate filter conditions into a SQL predicate plus bound values.
    fn where_clause(filter: Option<&FilterExpression>) -> Result<(String, Vec<i64>), StoreError> {
        let Some(filter) = filter else {
            return Ok((String::new(), Vec::new()));
        };
        let mut predicates = Vec::with_capacity(filter.conditions.len());
        let mut values = Vec::with_capacity(filter.conditions.len());
        for condition in &filter.conditions {
            let column = match filter.attribute_of(condition) {
                TIMESTAMP_ATTRIBUTE => "ts",
                other => return Err(StoreError::UnsupportedAttribute(other.to_string())),
            };
            predicates.push(format!("{column} {} ?", condition.comparison.operator()));
            values.push(filter.value_of(condition)?);
        }
        Ok((format!("WHERE {}", predicates.join(" AND ")), values))
    }

    fn scan_blocking(&self, request: &ScanRequest) -> Result<Vec<FormRecord>, StoreError> {
        let table = request.table_name.as_str();
        validate_table_name(table)?;
        let (where_sql, values) = Self::where_clause(request.filter.as_ref())?;

        let conn = self.conn.lock();
        if !Self::table_exists(&conn, table)? {
            return Err(StoreError::TableNotFound(table.to_string()));
        }

        let sql = format!(
            "SELECT document FROM \"{table}\" {where_sql} ORDER BY rowid LIMIT ? OFFSET ?"
        );
        let mut stmt = conn.prepare(&sql)?;

        let page_size = self.page_size as i64;
        let mut results = Vec::new();
        let mut offset = 0i64;
        let mut pages = 0usize;
        loop {
            let bound = values.iter().copied().chain([page_size, offset]);
            let documents = stmt
                .query_map(params_from_iter(bound), |row| row.get::<_, String>(0))?
                .collect::<Result<Vec<_>, _>>()?;
            pages += 1;

            let fetched = documents.len();
            for document in documents {
                results.push(serde_json::from_str(&document)?);
            }
            if (fetched as i64) < page_size {
                break;
            }
            offset += page_size;
        }

        debug!("Scanned {} forms from {table} in {pages} page(s)", results.len());
        Ok(results)
    }
}

#[async_trait]
impl FormStore for SqliteFormStore {
    async fn scan(&self, request: &ScanRequest) -> Result<Vec<FormRecord>, StoreError> {
        self.scan_blocking(request)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::{Comparison, FilterBuilder};

    fn seeded(page_size: usize, count: i64) -> SqliteFormStore {
        let store = SqliteFormStore::in_memory(page_size).unwrap();
        for i in 0..count {
            let form = FormRecord::new(format!("f-{i}"), 1_000 + i, format!("u{i}@example.com"));
            store.put("forms", &form).unwrap();
        }
        store
    }

    #[tokio::test]
    async fn test_scan_without_filter_returns_all_pages() {
        let store = seeded(3, 10);
        let forms = store.scan(&ScanRequest::new("forms", None)).await.unwrap();
        assert_eq!(forms.len(), 10);
        assert_eq!(forms[0].id, "f-0");
        assert_eq!(forms[9].id, "f-9");
    }

    #[tokio::test]
    async fn test_scan_exact_page_multiple() {
        let store = seeded(5, 10);
        let forms = store.scan(&ScanRequest::new("forms", None)).await.unwrap();
        assert_eq!(forms.len(), 10);
    }

    #[tokio::test]
    async fn test_scan_with_range_filter() {
        let store = seeded(2, 10);
        let filter = FilterExpression::timestamp_range(Some(1_003), Some(1_006));
        let forms = store.scan(&ScanRequest::new("forms", filter)).await.unwrap();
        let ids: Vec<&str> = forms.iter().map(|f| f.id.as_str()).collect();
        assert_eq!(ids, vec!["f-3", "f-4", "f-5", "f-6"]);
    }

    #[tokio::test]
    async fn test_scan_missing_table() {
        let store = SqliteFormStore::in_memory(10).unwrap();
        let err = store.scan(&ScanRequest::new("forms", None)).await.unwrap_err();
        assert!(matches!(err, StoreError::TableNotFound(t) if t == "forms"));
    }

    #[tokio::test]
    async fn test_scan_empty_table() {
        let store = SqliteFormStore::in_memory(10).unwrap();
        store.create_table("forms").unwrap();
        let forms = store.scan(&ScanRequest::new("forms", None)).await.unwrap();
        assert!(forms.is_empty());
    }

    #[tokio::test]
    async fn test_scan_rejects_unsupported_attribute() {
        let store = seeded(10, 1);
        let filter = FilterBuilder::new()
            .condition("#e", "email", Comparison::LessOrEqual, ":e", 1)
            .build();
        let err = store.scan(&ScanRequest::new("forms", filter)).await.unwrap_err();
        assert!(matches!(err, StoreError::UnsupportedAttribute(_)));
    }

    #[test]
    fn test_put_upserts() {
        let store = seeded(10, 1);
        let mut form = FormRecord::new("f-0", 5, "new@example.com");
        form.comment = Some("editado".into());
        store.put("forms", &form).unwrap();

        let forms = store.scan_blocking(&ScanRequest::new("forms", None)).unwrap();
        assert_eq!(forms.len(), 1);
        assert_eq!(forms[0].email, "new@example.com");
        assert_eq!(forms[0].ts, 5);
    }

    #[test]
    fn test_import_json() {
        let store = SqliteFormStore::in_memory(10).unwrap();
        let json = r#"[
            {"id": "a", "ts": 1, "email": "a@x"},
            {"id": "b", "ts": 2, "email": "b@x", "questions": [{"id": "q1", "answer": "Si", "isCorrect": true}]}
        ]"#;
        assert_eq!(store.import_json("forms", json).unwrap(), 2);
        let forms = store.scan_blocking(&ScanRequest::new("forms", None)).unwrap();
        assert_eq!(forms[1].questions.len(), 1);
    }

    #[tokio::test]
    async fn test_scan_tolerates_loosely_typed_documents() {
        let store = SqliteFormStore::in_memory(2).unwrap();
        let json = r#"[
            {"id": "a", "ts": 1, "email": "a@x", "age": "34"},
            {"id": "b", "ts": 2, "email": null},
            {"id": "c", "ts": 3, "email": "c@x", "triedMoravec": "Si"},
            {"id": "d", "ts": 4, "email": "d@x", "questions": [{"id": "q1", "answer": "Si", "isCorrect": null}]}
        ]"#;
        assert_eq!(store.import_json("forms", json).unwrap(), 4);

        let forms = store.scan(&ScanRequest::new("forms", None)).await.unwrap();
        assert_eq!(forms.len(), 4);
        assert_eq!(forms[0].age, Some(34));
        assert_eq!(forms[1].email, "");
        assert_eq!(forms[2].tried_moravec, serde_json::json!("Si"));
        assert!(!forms[3].questions[0].is_correct);
    }

    #[test]
    fn test_invalid_table_name() {
        let store = SqliteFormStore::in_memory(10).unwrap();
        let err = store.put("bad name", &FormRecord::new("x", 0, "")).unwrap_err();
        assert!(matches!(err, StoreError::InvalidTableName(_)));
    }

    #[test]
    fn test_open_file_database() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("forms.db");
        {
            let store = SqliteFormStore::open(&path, 10).unwrap();
            store.put("forms", &FormRecord::new("x", 0, "x@x")).unwrap();
        }
        let reopened = SqliteFormStore::open(&path, 10).unwrap();
        let forms = reopened.scan_blocking(&ScanRequest::new("forms", None)).unwrap();
        assert_eq!(forms.len(), 1);
    }
}
