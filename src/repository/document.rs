//! Document repository.

use std::path::{Path, PathBuf};

use chrono::NaiveDateTime;
use rusqlite::{params, Connection, OptionalExtension, Row};
use uuid::Uuid;

use super::{format_naive, parse_datetime, parse_naive_opt, RepositoryError, Result};
use crate::inference::InferenceResult;
use crate::models::{
    filter_documents, normalize_tag_name, DocumentCard, SidebarFilter, UpcomingWindow,
};

const SELECT_COLUMNS: &str = "id, image_paths, title, event_date, deadline_date, child_tag, notes, is_archived, created_at";

/// SQLite-backed document repository.
pub struct DocumentRepository {
    db_path: PathBuf,
}

impl DocumentRepository {
    /// Create a new document repository, initializing the schema.
    pub fn new(db_path: &Path) -> Result<Self> {
        let repo = Self {
            db_path: db_path.to_path_buf(),
        };
        repo.init_schema()?;
        Ok(repo)
    }

    fn connect(&self) -> Result<Connection> {
        super::connect(&self.db_path)
    }

    /// Get the database path.
    pub fn database_path(&self) -> &Path {
        &self.db_path
    }

    fn init_schema(&self) -> Result<()> {
        let conn = self.connect()?;
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS documents (
                id TEXT PRIMARY KEY,
                image_paths TEXT NOT NULL DEFAULT '[]',
                title TEXT NOT NULL DEFAULT '',
                event_date TEXT,
                deadline_date TEXT,
                child_tag TEXT NOT NULL DEFAULT '',
                notes TEXT NOT NULL DEFAULT '',
                is_archived INTEGER NOT NULL DEFAULT 0,
                created_at TEXT NOT NULL
            );
            CREATE INDEX IF NOT EXISTS idx_documents_created_at ON documents(created_at);
            CREATE INDEX IF NOT EXISTS idx_documents_child_tag ON documents(child_tag);
        "#,
        )?;
        Ok(())
    }

    fn row_to_document(row: &Row) -> rusqlite::Result<(DocumentCard, String)> {
        let id: String = row.get("id")?;
        let image_paths: String = row.get("image_paths")?;
        let created_at: String = row.get("created_at")?;
        let id = Uuid::parse_str(&id).map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(0, rusqlite::types::Type::Text, Box::new(e))
        })?;

        let doc = DocumentCard {
            id,
            image_paths: Vec::new(),
            title: row.get("title")?,
            event_date: parse_naive_opt(row.get("event_date")?),
            deadline_date: parse_naive_opt(row.get("deadline_date")?),
            child_tag: row.get("child_tag")?,
            notes: row.get("notes")?,
            is_archived: row.get::<_, i64>("is_archived")? != 0,
            created_at: parse_datetime(&created_at),
        };
        Ok((doc, image_paths))
    }

    fn finish(partial: (DocumentCard, String)) -> Result<DocumentCard> {
        let (mut doc, image_paths) = partial;
        doc.image_paths = serde_json::from_str::<Vec<PathBuf>>(&image_paths)?;
        Ok(doc)
    }

    /// Insert or replace a document.
    pub fn save(&self, doc: &DocumentCard) -> Result<()> {
        let conn = self.connect()?;
        conn.execute(
            r#"INSERT OR REPLACE INTO documents
               (id, image_paths, title, event_date, deadline_date, child_tag, notes, is_archived, created_at)
               VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)"#,
            params![
                doc.id.to_string(),
                serde_json::to_string(&doc.image_paths)?,
                doc.title,
                doc.event_date.as_ref().map(format_naive),
                doc.deadline_date.as_ref().map(format_naive),
                doc.child_tag,
                doc.notes,
                doc.is_archived as i64,
                doc.created_at.to_rfc3339(),
            ],
        )?;
        Ok(())
    }

    /// Get a document by ID.
    pub fn get(&self, id: &Uuid) -> Result<Option<DocumentCard>> {
        let conn = self.connect()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM documents WHERE id = ?",
            SELECT_COLUMNS
        ))?;
        let partial = stmt
            .query_row(params![id.to_string()], Self::row_to_document)
            .optional()?;
        partial.map(Self::finish).transpose()
    }

    /// Get a document by ID or by a unique ID prefix (as typed on the CLI).
    pub fn find(&self, id_or_prefix: &str) -> Result<DocumentCard> {
        if let Ok(id) = Uuid::parse_str(id_or_prefix) {
            return self
                .get(&id)?
                .ok_or_else(|| RepositoryError::NotFound(id_or_prefix.to_string()));
        }

        let prefix = id_or_prefix.trim().to_lowercase();
        if prefix.is_empty() || !prefix.chars().all(|c| c.is_ascii_hexdigit() || c == '-') {
            return Err(RepositoryError::Invalid(format!(
                "not a document id: {}",
                id_or_prefix
            )));
        }

        let conn = self.connect()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM documents WHERE id LIKE ?1 || '%' LIMIT 2",
            SELECT_COLUMNS
        ))?;
        let mut found = stmt
            .query_map(params![prefix], Self::row_to_document)?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        match found.len() {
            0 => Err(RepositoryError::NotFound(id_or_prefix.to_string())),
            1 => Self::finish(found.remove(0)),
            _ => Err(RepositoryError::Invalid(format!(
                "ambiguous document id prefix: {}",
                id_or_prefix
            ))),
        }
    }

    /// All documents, newest first.
    pub fn all(&self) -> Result<Vec<DocumentCard>> {
        let conn = self.connect()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM documents ORDER BY created_at DESC",
            SELECT_COLUMNS
        ))?;
        let rows = stmt
            .query_map([], Self::row_to_document)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        rows.into_iter().map(Self::finish).collect()
    }

    /// Documents in a sidebar folder matching the search text, newest first.
    pub fn list(
        &self,
        filter: &SidebarFilter,
        search: &str,
        window: &UpcomingWindow,
    ) -> Result<Vec<DocumentCard>> {
        let docs = self.all()?;
        Ok(filter_documents(&docs, filter, search, window)
            .into_iter()
            .cloned()
            .collect())
    }

    /// Distinct non-empty tags used by documents.
    pub fn used_tags(&self) -> Result<Vec<String>> {
        let conn = self.connect()?;
        let mut stmt = conn.prepare(
            "SELECT DISTINCT child_tag FROM documents WHERE child_tag != '' ORDER BY child_tag",
        )?;
        let tags = stmt
            .query_map([], |row| row.get::<_, String>(0))?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(tags)
    }

    fn update(&self, id: &Uuid, sql: &str, params: &[&dyn rusqlite::ToSql]) -> Result<()> {
        let conn = self.connect()?;
        let mut all: Vec<&dyn rusqlite::ToSql> = params.to_vec();
        let id_str = id.to_string();
        all.push(&id_str);
        let changed = conn.execute(sql, all.as_slice())?;
        if changed == 0 {
            return Err(RepositoryError::NotFound(id_str));
        }
        Ok(())
    }

    /// Write inferred title and event date onto a document.
    pub fn update_inference(&self, id: &Uuid, result: &InferenceResult) -> Result<()> {
        let event_date = result.event_date.as_ref().map(format_naive);
        self.update(
            id,
            "UPDATE documents SET title = ?1, event_date = ?2 WHERE id = ?3",
            &[&result.title, &event_date],
        )
    }

    pub fn set_title(&self, id: &Uuid, title: &str) -> Result<()> {
        self.update(id, "UPDATE documents SET title = ?1 WHERE id = ?2", &[&title])
    }

    pub fn set_archived(&self, id: &Uuid, archived: bool) -> Result<()> {
        let flag = archived as i64;
        self.update(
            id,
            "UPDATE documents SET is_archived = ?1 WHERE id = ?2",
            &[&flag],
        )
    }

    pub fn set_event_date(&self, id: &Uuid, date: Option<NaiveDateTime>) -> Result<()> {
        let value = date.as_ref().map(format_naive);
        self.update(
            id,
            "UPDATE documents SET event_date = ?1 WHERE id = ?2",
            &[&value],
        )
    }

    pub fn set_deadline(&self, id: &Uuid, date: Option<NaiveDateTime>) -> Result<()> {
        let value = date.as_ref().map(format_naive);
        self.update(
            id,
            "UPDATE documents SET deadline_date = ?1 WHERE id = ?2",
            &[&value],
        )
    }

    /// Set the folder tag; an empty string files the document as uncategorized.
    pub fn set_tag(&self, id: &Uuid, tag: &str) -> Result<()> {
        let tag = normalize_tag_name(tag).unwrap_or_default();
        self.update(
            id,
            "UPDATE documents SET child_tag = ?1 WHERE id = ?2",
            &[&tag],
        )
    }

    pub fn set_notes(&self, id: &Uuid, notes: &str) -> Result<()> {
        self.update(id, "UPDATE documents SET notes = ?1 WHERE id = ?2", &[&notes])
    }

    /// Delete a document. Returns whether a row was removed.
    pub fn delete(&self, id: &Uuid) -> Result<bool> {
        let conn = self.connect()?;
        let changed = conn.execute("DELETE FROM documents WHERE id = ?", params![id.to_string()])?;
        Ok(changed > 0)
    }

    /// Count all documents.
    pub fn count(&self) -> Result<u64> {
        let conn = self.connect()?;
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM documents", [], |row| row.get(0))?;
        Ok(count as u64)
    }
}
