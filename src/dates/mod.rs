//! Date phrase extraction from recognized document text.
//!
//! Finds calendar dates written the way Japanese and English school and
//! office notices write them:
//! - Japanese: `2026年3月15日`, `令和8年3月15日`, `3月15日(土) 午前10時`
//! - Numeric: `2026-03-15`, `2026/3/15`, `3/15`
//! - English: `March 15, 2026`, `15 March 2026`, `Mar. 15th`
//!
//! Extraction is deterministic: matches are reported in text order and a
//! phrase without a year resolves against a fixed reference date.

mod patterns;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

pub use patterns::PatternDateExtractor;

/// A date phrase found in text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateMatch {
    /// Byte offset where the phrase starts.
    pub start: usize,
    /// Byte offset just past the phrase (including any time suffix).
    pub end: usize,
    /// Resolved wall-clock date and time.
    pub value: NaiveDateTime,
    /// Whether the phrase carried an explicit time of day.
    pub has_time: bool,
}

/// Recognizer for date phrases in free text.
pub trait DateExtractor: Send + Sync {
    /// Find all date phrases, ordered by start offset, non-overlapping.
    fn extract(&self, text: &str) -> Vec<DateMatch>;

    /// The first date phrase in the text, if any.
    fn first_date(&self, text: &str) -> Option<NaiveDateTime> {
        self.extract(text).into_iter().next().map(|m| m.value)
    }
}

/// Language families the extractor understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DateLocale {
    Japanese,
    English,
}

impl DateLocale {
    pub fn as_str(&self) -> &'static str {
        match self {
            DateLocale::Japanese => "ja-JP",
            DateLocale::English => "en-US",
        }
    }

    /// Parse a BCP 47 style tag (`ja-JP`, `en_US`, `en`).
    pub fn from_tag(tag: &str) -> Option<Self> {
        let lang = tag
            .trim()
            .split(['-', '_'])
            .next()
            .unwrap_or("")
            .to_lowercase();
        match lang.as_str() {
            "ja" | "jpn" => Some(DateLocale::Japanese),
            "en" | "eng" => Some(DateLocale::English),
            _ => None,
        }
    }

    /// Tesseract language code for this locale.
    pub fn tesseract_code(&self) -> &'static str {
        match self {
            DateLocale::Japanese => "jpn",
            DateLocale::English => "eng",
        }
    }
}

impl std::fmt::Display for DateLocale {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Parse a list of locale tags, skipping unknown ones and duplicates.
pub fn parse_locales<S: AsRef<str>>(tags: &[S]) -> Vec<DateLocale> {
    let mut locales = Vec::new();
    for tag in tags {
        match DateLocale::from_tag(tag.as_ref()) {
            Some(locale) if !locales.contains(&locale) => locales.push(locale),
            Some(_) => {}
            None => tracing::warn!("Ignoring unsupported date locale: {}", tag.as_ref()),
        }
    }
    locales
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_locale_from_tag() {
        assert_eq!(DateLocale::from_tag("ja-JP"), Some(DateLocale::Japanese));
        assert_eq!(DateLocale::from_tag("en_US"), Some(DateLocale::English));
        assert_eq!(DateLocale::from_tag("EN"), Some(DateLocale::English));
        assert_eq!(DateLocale::from_tag("fr-FR"), None);
    }

    #[test]
    fn test_parse_locales_dedupes() {
        let locales = parse_locales(&["ja-JP", "en-US", "ja", "de"]);
        assert_eq!(locales, vec![DateLocale::Japanese, DateLocale::English]);
    }
}
