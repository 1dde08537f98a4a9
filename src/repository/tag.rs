//! Tag (folder) repository.

use std::path::{Path, PathBuf};

use rusqlite::{params, Connection, OptionalExtension, Row};
use uuid::Uuid;

use super::{parse_datetime, RepositoryError, Result};
use crate::models::{normalize_tag_name, AppTag};

/// SQLite-backed tag repository.
pub struct TagRepository {
    db_path: PathBuf,
}

impl TagRepository {
    /// Create a new tag repository, initializing the schema.
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

    fn init_schema(&self) -> Result<()> {
        let conn = self.connect()?;
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS app_tags (
                id TEXT PRIMARY KEY,
                name TEXT NOT NULL UNIQUE,
                color_hex TEXT NOT NULL,
                created_at TEXT NOT NULL
            );
        "#,
        )?;
        Ok(())
    }

    fn row_to_tag(row: &Row) -> rusqlite::Result<AppTag> {
        let id: String = row.get("id")?;
        let created_at: String = row.get("created_at")?;
        let id = Uuid::parse_str(&id).map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(0, rusqlite::types::Type::Text, Box::new(e))
        })?;
        Ok(AppTag {
            id,
            name: row.get("name")?,
            color_hex: row.get("color_hex")?,
            created_at: parse_datetime(&created_at),
        })
    }

    fn insert(&self, conn: &Connection, tag: &AppTag) -> Result<()> {
        conn.execute(
            "INSERT INTO app_tags (id, name, color_hex, created_at) VALUES (?1, ?2, ?3, ?4)",
            params![
                tag.id.to_string(),
                tag.name,
                tag.color_hex,
                tag.created_at.to_rfc3339()
            ],
        )?;
        Ok(())
    }

    /// Create a tag. Returns the existing tag if the name is already taken.
    pub fn create(&self, name: &str, color_hex: Option<&str>) -> Result<AppTag> {
        let tag = match color_hex {
            Some(color) => AppTag::with_color(name, color),
            None => AppTag::new(name),
        }
        .ok_or_else(|| RepositoryError::Invalid("tag name is empty".to_string()))?;

        if let Some(existing) = self.get_by_name(&tag.name)? {
            return Ok(existing);
        }

        let conn = self.connect()?;
        self.insert(&conn, &tag)?;
        Ok(tag)
    }

    /// Get a tag by its name (after normalization).
    pub fn get_by_name(&self, name: &str) -> Result<Option<AppTag>> {
        let Some(name) = normalize_tag_name(name) else {
            return Ok(None);
        };
        let conn = self.connect()?;
        let mut stmt = conn.prepare("SELECT * FROM app_tags WHERE name = ?")?;
        let tag = stmt.query_row(params![name], Self::row_to_tag).optional()?;
        Ok(tag)
    }

    /// All tags, oldest first.
    pub fn list(&self) -> Result<Vec<AppTag>> {
        let conn = self.connect()?;
        let mut stmt = conn.prepare("SELECT * FROM app_tags ORDER BY created_at, name")?;
        let tags = stmt
            .query_map([], Self::row_to_tag)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(tags)
    }

    /// Delete a tag by name. Documents keep their tag text.
    pub fn delete(&self, name: &str) -> Result<bool> {
        let Some(name) = normalize_tag_name(name) else {
            return Ok(false);
        };
        let conn = self.connect()?;
        let changed = conn.execute("DELETE FROM app_tags WHERE name = ?", params![name])?;
        Ok(changed > 0)
    }

    /// Create tags for names used by documents but not yet known.
    ///
    /// Returns the newly created tags.
    pub fn sync_from_documents(&self, used: &[String]) -> Result<Vec<AppTag>> {
        let existing: std::collections::HashSet<String> =
            self.list()?.into_iter().map(|t| t.name).collect();

        let conn = self.connect()?;
        let mut created = Vec::new();
        for name in used {
            let Some(tag) = AppTag::new(name) else {
                continue;
            };
            if existing.contains(&tag.name) || created.iter().any(|t: &AppTag| t.name == tag.name)
            {
                continue;
            }
            self.insert(&conn, &tag)?;
            tracing::info!("Created tag '{}' from existing documents", tag.name);
            created.push(tag);
        }
        Ok(created)
    }
}
