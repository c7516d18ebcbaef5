//! Search and listing queries.

use rusqlite::types::Value;
use rusqlite::{params, params_from_iter};

use super::{row_to_document, SqliteDocumentStore, DOCUMENT_COLUMNS};
use crate::models::Document;
use crate::repository::{DocumentQuery, Result};

impl SqliteDocumentStore {
    /// Documents matching the query, newest first.
    ///
    /// Tags are filtered in SQL. SQLite's `lower()` only folds ASCII, so an
    /// ASCII needle is also pre-filtered in SQL; the final text match runs
    /// over the candidate rows so that case folding covers non-ASCII text.
    pub(crate) fn search_sync(&self, query: &DocumentQuery) -> Result<Vec<Document>> {
        let conn = self.connect()?;
        let needle = query.needle();

        let mut conditions: Vec<String> = Vec::new();
        let mut bindings: Vec<Value> = Vec::new();
        if !query.tags.is_empty() {
            let placeholders = vec!["?"; query.tags.len()].join(", ");
            conditions.push(format!(
                "EXISTS (SELECT 1 FROM json_each(documents.tags) WHERE json_each.value IN ({}))",
                placeholders
            ));
            bindings.extend(query.tags.iter().cloned().map(Value::Text));
        }
        if let Some(needle) = needle.as_deref().filter(|n| n.is_ascii()) {
            conditions.push(
                "(instr(lower(title), ?) > 0 OR instr(lower(content), ?) > 0 \
                 OR instr(lower(summary), ?) > 0)"
                    .to_string(),
            );
            bindings.extend(std::iter::repeat(Value::Text(needle.to_string())).take(3));
        }

        let mut sql = format!("SELECT {} FROM documents", DOCUMENT_COLUMNS);
        if !conditions.is_empty() {
            sql.push_str(" WHERE ");
            sql.push_str(&conditions.join(" AND "));
        }
        sql.push_str(" ORDER BY created_at DESC, rowid DESC");

        let mut stmt = conn.prepare(&sql)?;
        let candidates = stmt
            .query_map(params_from_iter(bindings), row_to_document)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        let Some(needle) = needle else {
            return Ok(candidates);
        };

        Ok(candidates
            .into_iter()
            .filter(|doc| matches_text(doc, &needle))
            .collect())
    }

    /// A page of documents, newest first.
    pub(crate) fn list_sync(&self, skip: usize, limit: usize) -> Result<Vec<Document>> {
        let conn = self.connect()?;
        let sql = format!(
            "SELECT {} FROM documents ORDER BY created_at DESC, rowid DESC LIMIT ? OFFSET ?",
            DOCUMENT_COLUMNS
        );
        let mut stmt = conn.prepare(&sql)?;
        let docs = stmt
            .query_map(params![limit as i64, skip as i64], row_to_document)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(docs)
    }
}

/// Case-insensitive substring match over title, content and summary.
fn matches_text(doc: &Document, needle: &str) -> bool {
    [&doc.title, &doc.content, &doc.summary]
        .iter()
        .any(|field| field.to_lowercase().contains(needle))
}

#[cfg(test)]
mod tests {
    use super::super::tests::{new_document, setup};
    use super::*;

    fn titles(docs: &[Document]) -> Vec<&str> {
        docs.iter().map(|d| d.title.as_str()).collect()
    }

    #[test]
    fn test_search_text_case_insensitive() {
        let (_dir, store) = setup();
        store
            .insert_sync(&new_document("Budget", "Annual BUDGET review", &[]))
            .unwrap();
        store
            .insert_sync(&new_document("Báo cáo", "Tổng kết NĂM", &[]))
            .unwrap();
        store
            .insert_sync(&new_document("Unrelated", "nothing here", &[]))
            .unwrap();

        let found = store.search_sync(&DocumentQuery::text("budget")).unwrap();
        assert_eq!(titles(&found), vec!["Budget"]);

        // Non-ASCII case folding
        let found = store.search_sync(&DocumentQuery::text("năm")).unwrap();
        assert_eq!(titles(&found), vec!["Báo cáo"]);

        // Summary is searched too
        let found = store
            .search_sync(&DocumentQuery::text("summary of unrelated"))
            .unwrap();
        assert_eq!(titles(&found), vec!["Unrelated"]);
    }

    #[test]
    fn test_search_ascii_needle_in_mixed_text() {
        let (_dir, store) = setup();
        store
            .insert_sync(&new_document("BÁO CÁO", "NGÂN SÁCH TAX 2024", &[]))
            .unwrap();
        store
            .insert_sync(&new_document("Other", "no match", &[]))
            .unwrap();

        let found = store.search_sync(&DocumentQuery::text("tax 2024")).unwrap();
        assert_eq!(titles(&found), vec!["BÁO CÁO"]);
        let found = store.search_sync(&DocumentQuery::text("ngân sách")).unwrap();
        assert_eq!(titles(&found), vec!["BÁO CÁO"]);
        assert!(store
            .search_sync(&DocumentQuery::text("missing"))
            .unwrap()
            .is_empty());
    }

    #[test]
    fn test_search_by_any_tag() {
        let (_dir, store) = setup();
        store
            .insert_sync(&new_document("A", "a", &["finance", "memo"]))
            .unwrap();
        store.insert_sync(&new_document("B", "b", &["legal"])).unwrap();
        store.insert_sync(&new_document("C", "c", &[])).unwrap();

        let query = DocumentQuery::default().with_tags(vec!["memo".into(), "legal".into()]);
        let found = store.search_sync(&query).unwrap();
        assert_eq!(titles(&found), vec!["B", "A"]);

        let query = DocumentQuery::default().with_tags(vec!["Finance".into()]);
        assert!(store.search_sync(&query).unwrap().is_empty());
    }

    #[test]
    fn test_search_text_and_tags_combined() {
        let (_dir, store) = setup();
        store
            .insert_sync(&new_document("Tax memo", "tax", &["memo"]))
            .unwrap();
        store
            .insert_sync(&new_document("Tax law", "tax", &["legal"]))
            .unwrap();

        let query = DocumentQuery::text("tax").with_tags(vec!["legal".into()]);
        assert_eq!(titles(&store.search_sync(&query).unwrap()), vec!["Tax law"]);
    }

    #[test]
    fn test_empty_query_returns_all_newest_first() {
        let (_dir, store) = setup();
        for title in ["first", "second", "third"] {
            store.insert_sync(&new_document(title, "x", &[])).unwrap();
        }
        let found = store.search_sync(&DocumentQuery::default()).unwrap();
        assert_eq!(titles(&found), vec!["third", "second", "first"]);
    }

    #[test]
    fn test_list_pagination() {
        let (_dir, store) = setup();
        for i in 0..5 {
            store
                .insert_sync(&new_document(&format!("doc{}", i), "x", &[]))
                .unwrap();
        }
        assert_eq!(titles(&store.list_sync(0, 2).unwrap()), vec!["doc4", "doc3"]);
        assert_eq!(titles(&store.list_sync(2, 2).unwrap()), vec!["doc2", "doc1"]);
        assert_eq!(titles(&store.list_sync(4, 10).unwrap()), vec!["doc0"]);
        assert!(store.list_sync(10, 10).unwrap().is_empty());
    }
}
