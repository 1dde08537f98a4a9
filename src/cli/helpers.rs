//! Shared helper functions for CLI commands.

use chrono::{Local, NaiveDateTime};

use staqq::config::Settings;
use staqq::dates::DateExtractor;
use staqq::models::{parse_document_link, DocumentCard};
use staqq::repository::{DocumentRepository, TagRepository};

/// Open the document and tag repositories, failing if `staqq init` was never run.
pub fn open_repositories(settings: &Settings) -> anyhow::Result<(DocumentRepository, TagRepository)> {
    if !settings.database_exists() {
        anyhow::bail!(
            "No database at {}. Run 'staqq init' first.",
            settings.database_path().display()
        );
    }
    let db_path = settings.database_path();
    Ok((DocumentRepository::new(&db_path)?, TagRepository::new(&db_path)?))
}

/// Current local wall-clock time.
pub fn now() -> NaiveDateTime {
    Local::now().naive_local()
}

/// Look up a document by ID, ID prefix, or `staqq://` deep link.
pub fn find_document(repo: &DocumentRepository, reference: &str) -> anyhow::Result<DocumentCard> {
    if let Some(id) = parse_document_link(reference) {
        return repo
            .get(&id)?
            .ok_or_else(|| anyhow::anyhow!("Document not found: {}", id));
    }
    Ok(repo.find(reference)?)
}

/// Parse a date argument.
///
/// Accepts any phrase the date extractor understands (`2026-03-15`,
/// `3月15日 14:00`, `March 15`); `none` or `clear` removes the date.
pub fn parse_date_arg(settings: &Settings, input: &str) -> anyhow::Result<Option<NaiveDateTime>> {
    let trimmed = input.trim();
    if trimmed.eq_ignore_ascii_case("none") || trimmed.eq_ignore_ascii_case("clear") {
        return Ok(None);
    }

    let extractor = settings.date_extractor(now().date());
    match extractor.first_date(trimmed) {
        Some(date) => Ok(Some(date)),
        None => anyhow::bail!("Could not read a date from '{}'", input),
    }
}

/// Shorten to `max` characters, marking the cut with an ellipsis.
pub fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max.saturating_sub(1)).collect();
        format!("{}…", kept)
    }
}

/// First eight characters of a document ID.
pub fn short_id(doc: &DocumentCard) -> String {
    doc.id.to_string()[..8].to_string()
}
