//! Document counting and tag statistics.

use super::SqliteDocumentStore;
use crate::repository::Result;

impl SqliteDocumentStore {
    /// Count stored documents.
    pub(crate) fn count_sync(&self) -> Result<u64> {
        let conn = self.connect()?;
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM documents", [], |row| row.get(0))?;
        Ok(count as u64)
    }

    /// Get all unique tags across all documents with usage counts.
    pub(crate) fn all_tags_sync(&self) -> Result<Vec<(String, u64)>> {
        let conn = self.connect()?;

        let mut stmt = conn.prepare(
            r#"
            SELECT json_each.value AS tag, COUNT(*) AS cnt
            FROM documents, json_each(documents.tags)
            WHERE documents.tags != '[]'
            GROUP BY json_each.value
            ORDER BY cnt DESC, tag ASC
            "#,
        )?;

        let tags = stmt
            .query_map([], |row| {
                Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)? as u64))
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(tags)
    }
}
