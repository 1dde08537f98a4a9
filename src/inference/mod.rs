//! Title and date inference over recognized page text.
//!
//! Given the text lines recognized on each page of a scan, infers a
//! best-guess document title (the most prominent line that reads like
//! words) and an event date (the first date phrase in reading order).
//!
//! The engine is a pure function of its input: no I/O, no state between
//! calls, and it never fails. Recognition itself happens upstream in
//! [`crate::ocr`]; persisting the result happens in [`crate::services::scan`].

mod title;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::dates::{DateExtractor, PatternDateExtractor};

pub use title::{is_title_candidate, is_title_letter, select_title};

/// Title used when no recognized line qualifies.
pub const UNTITLED_DOCUMENT: &str = "Untitled Document";

/// Smallest height a fragment can carry; zero is outside the valid range.
const MIN_RELATIVE_HEIGHT: f64 = f64::MIN_POSITIVE;

/// One recognized line of text on one page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextFragment {
    /// Recognized text of the line.
    pub text: String,
    /// Line bounding-box height as a fraction (0, 1] of the page height.
    pub relative_height: f64,
}

impl TextFragment {
    /// Create a fragment, clamping the height into (0, 1].
    pub fn new(text: impl Into<String>, relative_height: f64) -> Self {
        Self {
            text: text.into(),
            relative_height: clamp_height(relative_height),
        }
    }

    /// Create a fragment from a pixel height and the page's pixel height.
    pub fn from_pixels(text: impl Into<String>, line_height: u32, page_height: u32) -> Self {
        let ratio = if page_height == 0 {
            1.0
        } else {
            line_height as f64 / page_height as f64
        };
        Self::new(text, ratio)
    }
}

fn clamp_height(h: f64) -> f64 {
    if h.is_nan() {
        MIN_RELATIVE_HEIGHT
    } else {
        h.clamp(MIN_RELATIVE_HEIGHT, 1.0)
    }
}

/// Best-guess title and event date for one scanned document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InferenceResult {
    pub title: String,
    pub event_date: Option<NaiveDateTime>,
}

/// Inference result together with the concatenated recognized text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Analysis {
    pub title: String,
    pub event_date: Option<NaiveDateTime>,
    /// Every page's lines joined by newlines, each page followed by a newline.
    pub full_text: String,
}

impl From<Analysis> for InferenceResult {
    fn from(analysis: Analysis) -> Self {
        Self {
            title: analysis.title,
            event_date: analysis.event_date,
        }
    }
}

/// Build the full recognized text used for date detection.
pub fn full_text<P: AsRef<[TextFragment]>>(pages: &[P]) -> String {
    let mut text = String::new();
    for page in pages {
        let lines: Vec<&str> = page.as_ref().iter().map(|f| f.text.as_str()).collect();
        text.push_str(&lines.join("\n"));
        text.push('\n');
    }
    text
}

/// Infer a title and event date from per-page fragments.
///
/// Uses [`UNTITLED_DOCUMENT`] as the fallback title.
pub fn infer_title_and_date<P: AsRef<[TextFragment]>>(
    pages: &[P],
    extractor: &dyn DateExtractor,
) -> InferenceResult {
    analyze_pages(pages, extractor, UNTITLED_DOCUMENT).into()
}

fn analyze_pages<P: AsRef<[TextFragment]>>(
    pages: &[P],
    extractor: &dyn DateExtractor,
    fallback_title: &str,
) -> Analysis {
    let flat: Vec<&TextFragment> = pages.iter().flat_map(|p| p.as_ref().iter()).collect();
    let full_text = full_text(pages);

    let title = select_title(&flat)
        .map(str::to_string)
        .unwrap_or_else(|| fallback_title.to_string());

    // First match in reading order; event vs deadline is decided by the caller.
    let event_date = extractor.first_date(&full_text);

    Analysis {
        title,
        event_date,
        full_text,
    }
}

/// Inference engine bound to a date extractor and a fallback title.
pub struct InferenceEngine<E: DateExtractor = PatternDateExtractor> {
    extractor: E,
    fallback_title: String,
}

impl Default for InferenceEngine<PatternDateExtractor> {
    fn default() -> Self {
        Self::new(PatternDateExtractor::default())
    }
}

impl<E: DateExtractor> InferenceEngine<E> {
    /// Create an engine with the default fallback title.
    pub fn new(extractor: E) -> Self {
        Self {
            extractor,
            fallback_title: UNTITLED_DOCUMENT.to_string(),
        }
    }

    /// Override the fallback title (for localisation).
    pub fn with_fallback_title(mut self, title: impl Into<String>) -> Self {
        let title = title.into();
        if !title.trim().is_empty() {
            self.fallback_title = title;
        }
        self
    }

    pub fn fallback_title(&self) -> &str {
        &self.fallback_title
    }

    pub fn extractor(&self) -> &E {
        &self.extractor
    }

    /// Infer title and event date.
    pub fn infer<P: AsRef<[TextFragment]>>(&self, pages: &[P]) -> InferenceResult {
        self.analyze(pages).into()
    }

    /// Infer title and event date, keeping the full recognized text.
    pub fn analyze<P: AsRef<[TextFragment]>>(&self, pages: &[P]) -> Analysis {
        analyze_pages(pages, &self.extractor, &self.fallback_title)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn extractor() -> PatternDateExtractor {
        PatternDateExtractor::new(NaiveDate::from_ymd_opt(2026, 1, 10).unwrap())
    }

    fn frag(text: &str, h: f64) -> TextFragment {
        TextFragment::new(text, h)
    }

    #[test]
    fn test_empty_input_falls_back() {
        let pages: Vec<Vec<TextFragment>> = Vec::new();
        let result = infer_title_and_date(&pages, &extractor());
        assert_eq!(result.title, UNTITLED_DOCUMENT);
        assert_eq!(result.event_date, None);
    }

    #[test]
    fn test_pages_without_fragments_fall_back() {
        let pages: Vec<Vec<TextFragment>> = vec![Vec::new(), Vec::new()];
        let result = infer_title_and_date(&pages, &extractor());
        assert_eq!(result.title, UNTITLED_DOCUMENT);
        assert_eq!(result.event_date, None);
    }

    #[test]
    fn test_tallest_qualifying_fragment_wins() {
        let pages = vec![vec![
            frag("電話番号 03-1234", 0.05),
            frag("運動会のお知らせ", 0.09),
            frag("小さい文字", 0.03),
        ]];
        let result = infer_title_and_date(&pages, &extractor());
        assert_eq!(result.title, "運動会のお知らせ");
    }

    #[test]
    fn test_phone_label_with_letters_still_qualifies() {
        let pages = vec![vec![
            frag("電話番号 03-1234", 0.09),
            frag("運動会のお知らせ", 0.05),
        ]];
        let result = infer_title_and_date(&pages, &extractor());
        assert_eq!(result.title, "電話番号 03-1234");
    }

    #[test]
    fn test_numeric_only_tallest_is_skipped() {
        let pages = vec![vec![
            frag("03-1234-5678", 0.2),
            frag("2026/03/15", 0.15),
            frag("PTA総会", 0.04),
        ]];
        let result = infer_title_and_date(&pages, &extractor());
        assert_eq!(result.title, "PTA総会");
    }

    #[test]
    fn test_ties_keep_page_order() {
        let pages = vec![
            vec![frag("First page heading", 0.08)],
            vec![frag("Second page heading", 0.08)],
        ];
        let result = infer_title_and_date(&pages, &extractor());
        assert_eq!(result.title, "First page heading");
    }

    #[test]
    fn test_full_text_layout() {
        let pages = vec![vec![frag("a", 0.1), frag("b", 0.1)], vec![], vec![frag("c", 0.1)]];
        assert_eq!(full_text(&pages), "a\nb\n\nc\n");
    }

    #[test]
    fn test_date_from_text_after_other_content() {
        let pages = vec![vec![
            frag("遠足のお知らせ", 0.1),
            frag("持ち物: お弁当、水筒", 0.03),
            frag("日時 2026年3月15日 集合は校庭", 0.03),
        ]];
        let result = infer_title_and_date(&pages, &extractor());
        let date = result.event_date.unwrap();
        assert_eq!(date.date(), NaiveDate::from_ymd_opt(2026, 3, 15).unwrap());
    }

    #[test]
    fn test_first_date_in_reading_order() {
        let pages = vec![
            vec![frag("Spring concert", 0.1), frag("April 20, 2026", 0.02)],
            vec![frag("Reply by 2026-04-10", 0.02)],
        ];
        let result = infer_title_and_date(&pages, &extractor());
        assert_eq!(
            result.event_date.unwrap().date(),
            NaiveDate::from_ymd_opt(2026, 4, 20).unwrap()
        );
    }

    #[test]
    fn test_engine_custom_fallback() {
        let engine = InferenceEngine::new(extractor()).with_fallback_title("新しいドキュメント");
        let pages: Vec<Vec<TextFragment>> = vec![vec![frag("12", 0.5)]];
        assert_eq!(engine.infer(&pages).title, "新しいドキュメント");
    }

    #[test]
    fn test_engine_ignores_blank_fallback() {
        let engine = InferenceEngine::new(extractor()).with_fallback_title("   ");
        assert_eq!(engine.fallback_title(), UNTITLED_DOCUMENT);
    }

    #[test]
    fn test_analyze_keeps_full_text() {
        let engine = InferenceEngine::new(extractor());
        let pages = vec![vec![frag("Class newsletter", 0.1)]];
        let analysis = engine.analyze(&pages);
        assert_eq!(analysis.full_text, "Class newsletter\n");
        assert_eq!(analysis.title, "Class newsletter");
    }

    #[test]
    fn test_repeated_calls_are_identical() {
        let engine = InferenceEngine::new(extractor());
        let pages = vec![vec![
            frag("Notice A", 0.05),
            frag("Notice B", 0.05),
            frag("3月1日", 0.05),
        ]];
        assert_eq!(engine.infer(&pages), engine.infer(&pages));
    }

    #[test]
    fn test_height_is_clamped() {
        assert_eq!(TextFragment::new("x", 3.0).relative_height, 1.0);
        assert!(TextFragment::new("x", 0.0).relative_height > 0.0);
        assert!(TextFragment::new("x", f64::NAN).relative_height > 0.0);
        assert_eq!(TextFragment::from_pixels("x", 50, 1000).relative_height, 0.05);
        assert_eq!(TextFragment::from_pixels("x", 50, 0).relative_height, 1.0);
    }
}
