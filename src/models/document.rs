//! Document models for scanned paper documents.
//!
//! A document is a stack of page images plus the fields inferred from their
//! text (title, event date) and the ones the user manages (deadline, tag,
//! notes, archive flag).

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use uuid::Uuid;

use crate::inference::InferenceResult;

/// Longest tag name accepted, in characters.
pub const MAX_TAG_NAME_CHARS: usize = 20;

/// Default color assigned to new tags.
pub const DEFAULT_TAG_COLOR: &str = "#FF9500";

/// A scanned document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentCard {
    /// Unique identifier for this document.
    pub id: Uuid,
    /// Stored page images, in page order.
    pub image_paths: Vec<PathBuf>,
    /// Inferred or user-edited title. Empty until inference completes.
    pub title: String,
    /// Date of the event the document announces.
    pub event_date: Option<NaiveDateTime>,
    /// Submission or reply deadline.
    pub deadline_date: Option<NaiveDateTime>,
    /// Folder tag (e.g. a child's name). Empty when uncategorized.
    pub child_tag: String,
    /// Free-form notes.
    pub notes: String,
    pub is_archived: bool,
    /// When the document was scanned.
    pub created_at: DateTime<Utc>,
}

impl DocumentCard {
    /// Create a new document with placeholder fields.
    pub fn new(image_paths: Vec<PathBuf>) -> Self {
        Self {
            id: Uuid::new_v4(),
            image_paths,
            title: String::new(),
            event_date: None,
            deadline_date: None,
            child_tag: String::new(),
            notes: String::new(),
            is_archived: false,
            created_at: Utc::now(),
        }
    }

    /// Set the folder tag, normalized like [`AppTag`] names.
    pub fn with_tag(mut self, tag: impl AsRef<str>) -> Self {
        self.child_tag = normalize_tag_name(tag.as_ref()).unwrap_or_default();
        self
    }

    /// Copy inferred fields onto the document.
    pub fn apply_inference(&mut self, result: &InferenceResult) {
        self.title = result.title.clone();
        self.event_date = result.event_date;
    }

    /// Whether inference has filled in a title yet.
    pub fn is_pending_inference(&self) -> bool {
        self.title.is_empty()
    }

    pub fn page_count(&self) -> usize {
        self.image_paths.len()
    }

    /// Date to use when a single date is needed: deadline, then event date.
    pub fn target_date(&self) -> Option<NaiveDateTime> {
        self.deadline_date.or(self.event_date)
    }

    /// Whether `search` occurs in the title, tag, or notes.
    ///
    /// An empty search matches every document.
    pub fn matches_search(&self, search: &str) -> bool {
        search.is_empty()
            || self.title.contains(search)
            || self.child_tag.contains(search)
            || self.notes.contains(search)
    }
}

/// A user-created folder that documents can be filed under.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppTag {
    pub id: Uuid,
    pub name: String,
    /// Display color as `#RRGGBB`.
    pub color_hex: String,
    pub created_at: DateTime<Utc>,
}

impl AppTag {
    /// Create a tag with the default color.
    ///
    /// Returns `None` if the name is blank after trimming.
    pub fn new(name: &str) -> Option<Self> {
        Self::with_color(name, DEFAULT_TAG_COLOR)
    }

    /// Create a tag with a specific color.
    pub fn with_color(name: &str, color_hex: &str) -> Option<Self> {
        let name = normalize_tag_name(name)?;
        let color_hex = if is_hex_color(color_hex) {
            color_hex.to_uppercase()
        } else {
            DEFAULT_TAG_COLOR.to_string()
        };
        Some(Self {
            id: Uuid::new_v4(),
            name,
            color_hex,
            created_at: Utc::now(),
        })
    }
}

/// Trim a tag name and cut it to [`MAX_TAG_NAME_CHARS`].
pub fn normalize_tag_name(name: &str) -> Option<String> {
    let trimmed: String = name.trim().chars().take(MAX_TAG_NAME_CHARS).collect();
    let trimmed = trimmed.trim_end().to_string();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed)
    }
}

fn is_hex_color(s: &str) -> bool {
    s.len() == 7 && s.starts_with('#') && s[1..].chars().all(|c| c.is_ascii_hexdigit())
}
