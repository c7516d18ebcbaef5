//! Database schema initialization.

use super::SqliteDocumentStore;
use crate::repository::Result;

impl SqliteDocumentStore {
    /// Create the documents table and its indexes if they are missing.
    pub(crate) fn init_schema(&self) -> Result<()> {
        let conn = self.connect()?;
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS documents (
                id TEXT PRIMARY KEY,
                title TEXT NOT NULL,
                content TEXT NOT NULL,
                summary TEXT NOT NULL DEFAULT '',
                tags TEXT NOT NULL DEFAULT '[]',
                language TEXT NOT NULL DEFAULT 'en',
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL,
                source_file TEXT
            );

            CREATE INDEX IF NOT EXISTS idx_documents_title ON documents(title);
            CREATE INDEX IF NOT EXISTS idx_documents_created_at ON documents(created_at);
            CREATE INDEX IF NOT EXISTS idx_documents_tagged ON documents(created_at)
                WHERE tags != '[]';
        "#,
        )?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::super::tests::setup;

    #[test]
    fn test_schema_is_idempotent() {
        let (_dir, store) = setup();
        store.init_schema().unwrap();
        store.init_schema().unwrap();

        let conn = store.connect().unwrap();
        let indexes: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM sqlite_master WHERE type = 'index' AND name LIKE 'idx_documents_%'",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(indexes, 3);
    }
}
