//! Title candidate selection.
//!
//! The tallest recognized line is usually the heading of a handout, but OCR
//! also picks up large phone numbers, dates and stray marks. Candidates are
//! ranked by height and the first one that reads like words wins.

use super::TextFragment;

/// Minimum number of characters (exclusive) a title candidate must have.
const MIN_TITLE_CHARS: usize = 2;

/// Returns `true` for characters that count as letters when judging a title.
///
/// Covers Unicode alphabetic characters plus the Japanese kana and CJK
/// ideograph blocks explicitly, so iteration marks and halfwidth katakana
/// are treated the same as full letters.
pub fn is_title_letter(c: char) -> bool {
    if c.is_alphabetic() {
        return true;
    }
    let cp = c as u32;
    matches!(
        cp,
        // Hiragana (letters and iteration marks)
        0x3041..=0x3096
        | 0x309D..=0x309F
        // Katakana (excluding the middle dot)
        | 0x30A1..=0x30FA
        | 0x30FC..=0x30FF
        // Katakana Phonetic Extensions
        | 0x31F0..=0x31FF
        // Halfwidth Katakana
        | 0xFF66..=0xFF9F
        // CJK Unified Ideographs
        | 0x4E00..=0x9FFF
        // CJK Unified Ideographs Extension A
        | 0x3400..=0x4DBF
        // CJK Compatibility Ideographs
        | 0xF900..=0xFAFF
        // CJK Unified Ideographs Extension B
        | 0x20000..=0x2A6DF
        // Ideographic iteration mark
        | 0x3005
    )
}

/// Check whether trimmed text is acceptable as a document title.
pub fn is_title_candidate(trimmed: &str) -> bool {
    !trimmed.is_empty()
        && trimmed.chars().count() > MIN_TITLE_CHARS
        && trimmed.chars().any(is_title_letter)
}

/// Pick the title from a flat, page-ordered fragment sequence.
///
/// Fragments are stably sorted by height (tallest first) so that equal
/// heights keep their original page/line order. Returns the trimmed text of
/// the first fragment passing [`is_title_candidate`].
pub fn select_title<'a>(fragments: &[&'a TextFragment]) -> Option<&'a str> {
    let mut ranked: Vec<&TextFragment> = fragments.to_vec();
    ranked.sort_by(|a, b| b.relative_height.total_cmp(&a.relative_height));

    ranked
        .into_iter()
        .map(|f| f.text.trim())
        .find(|text| is_title_candidate(text))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_letters_include_japanese_scripts() {
        assert!(is_title_letter('a'));
        assert!(is_title_letter('Z'));
        assert!(is_title_letter('あ'));
        assert!(is_title_letter('カ'));
        assert!(is_title_letter('ｶ'));
        assert!(is_title_letter('運'));
        assert!(is_title_letter('々'));
        assert!(!is_title_letter('3'));
        assert!(!is_title_letter('-'));
        assert!(!is_title_letter('・'));
        assert!(!is_title_letter('／'));
    }

    #[test]
    fn test_candidate_rejects_short_and_numeric() {
        assert!(!is_title_candidate(""));
        assert!(!is_title_candidate("ab"));
        assert!(!is_title_candidate("お知"));
        assert!(!is_title_candidate("03-1234-5678"));
        assert!(!is_title_candidate("2026/03/15"));
        assert!(is_title_candidate("お知ら"));
        assert!(is_title_candidate("abc"));
    }

    #[test]
    fn test_candidate_counts_code_points_not_bytes() {
        // Two kanji are six bytes but only two characters.
        assert!(!is_title_candidate("連絡"));
        assert!(is_title_candidate("連絡帳"));
    }

    #[test]
    fn test_select_title_trims_whitespace() {
        let fragments = [TextFragment::new("  Field Trip \n", 0.1)];
        let refs: Vec<&TextFragment> = fragments.iter().collect();
        assert_eq!(select_title(&refs), Some("Field Trip"));
    }

    #[test]
    fn test_select_title_none_when_nothing_qualifies() {
        let fragments = [
            TextFragment::new("12", 0.2),
            TextFragment::new("2026.04.01", 0.1),
        ];
        let refs: Vec<&TextFragment> = fragments.iter().collect();
        assert_eq!(select_title(&refs), None);
    }
}
