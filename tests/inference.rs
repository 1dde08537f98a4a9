//! Title and date inference over recognized fragments.

use chrono::{NaiveDate, NaiveDateTime};

use staqq::dates::{DateLocale, PatternDateExtractor};
use staqq::inference::{infer_title_and_date, InferenceEngine, TextFragment, UNTITLED_DOCUMENT};
use staqq::utils::{display_title, format_date};

fn extractor() -> PatternDateExtractor {
    PatternDateExtractor::new(NaiveDate::from_ymd_opt(2026, 1, 10).unwrap())
}

fn frag(text: &str, h: f64) -> TextFragment {
    TextFragment::new(text, h)
}

fn noon(y: i32, m: u32, d: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(y, m, d)
        .unwrap()
        .and_hms_opt(12, 0, 0)
        .unwrap()
}

#[test]
fn tallest_wordy_line_becomes_title() {
    let pages = vec![vec![
        frag("電話番号 03-1234", 0.05),
        frag("運動会のお知らせ", 0.09),
        frag("小さい文字", 0.03),
    ]];
    let result = infer_title_and_date(&pages, &extractor());
    assert_eq!(result.title, "運動会のお知らせ");
}

#[test]
fn line_with_digits_still_wins_when_tallest() {
    let pages = vec![vec![
        frag("電話番号 03-1234", 0.09),
        frag("運動会のお知らせ", 0.05),
    ]];
    let result = infer_title_and_date(&pages, &extractor());
    assert_eq!(result.title, "電話番号 03-1234");
}

#[test]
fn numeric_and_short_lines_fall_back() {
    let pages = vec![vec![frag("2026", 0.2), frag("12:30", 0.1), frag("ok", 0.3)]];
    let result = infer_title_and_date(&pages, &extractor());
    assert_eq!(result.title, UNTITLED_DOCUMENT);
}

#[test]
fn empty_input_gives_fallback_and_no_date() {
    let pages: Vec<Vec<TextFragment>> = vec![Vec::new(), Vec::new()];
    let result = infer_title_and_date(&pages, &extractor());
    assert_eq!(result.title, UNTITLED_DOCUMENT);
    assert_eq!(result.event_date, None);
}

#[test]
fn first_date_after_other_text() {
    let pages = vec![
        vec![frag("学年だより", 0.1), frag("いつも ご協力ありがとうございます", 0.03)],
        vec![frag("日時: 2026年3月15日", 0.03), frag("締切 2026年3月1日", 0.03)],
    ];
    let result = infer_title_and_date(&pages, &extractor());
    assert_eq!(result.event_date, Some(noon(2026, 3, 15)));
}

#[test]
fn ties_keep_page_then_line_order() {
    let pages = vec![
        vec![frag("First heading", 0.07)],
        vec![frag("Second heading", 0.07)],
    ];
    let result = infer_title_and_date(&pages, &extractor());
    assert_eq!(result.title, "First heading");
}

#[test]
fn results_are_deterministic() {
    let pages = vec![vec![
        frag("Field Trip", 0.08),
        frag("Meet on March 3 9:30 AM", 0.04),
    ]];
    let engine = InferenceEngine::new(PatternDateExtractor::with_locales(
        NaiveDate::from_ymd_opt(2026, 1, 10).unwrap(),
        vec![DateLocale::English],
    ));
    let first = engine.analyze(&pages);
    for _ in 0..5 {
        assert_eq!(engine.analyze(&pages), first);
    }
    assert_eq!(first.title, "Field Trip");
    assert_eq!(
        first.event_date,
        Some(
            NaiveDate::from_ymd_opt(2026, 3, 3)
                .unwrap()
                .and_hms_opt(9, 30, 0)
                .unwrap()
        )
    );
    assert_eq!(first.full_text, "Field Trip\nMeet on March 3 9:30 AM\n");
}

#[test]
fn fallback_flows_through_display_formatting() {
    let engine = InferenceEngine::new(extractor()).with_fallback_title("新しいドキュメント");
    let pages: Vec<Vec<TextFragment>> = Vec::new();
    let result = engine.infer(&pages);
    assert_eq!(result.title, "新しいドキュメント");
    assert!(!display_title(&result.title).is_empty());
    assert!(!format_date(result.event_date).is_empty());
    assert!(!display_title("").is_empty());
}
