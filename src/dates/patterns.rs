//! Regex-based date phrase recognizer.

use chrono::{Datelike, Local, NaiveDate, NaiveDateTime, NaiveTime};
use regex::{Captures, Regex};
use std::sync::LazyLock;

use super::{DateExtractor, DateLocale, DateMatch};

/// Time of day assigned to phrases that carry only a date.
const DEFAULT_HOUR: u32 = 12;

/// First year of each Japanese era, minus one.
const REIWA_BASE: i32 = 2018;
const HEISEI_BASE: i32 = 1988;

/// Which locale family enables a pattern.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Family {
    Japanese,
    English,
    Numeric,
}

/// How to read the capture groups of a pattern.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Format {
    JaYmd,
    JaEra,
    JaMd,
    NumYmd,
    NumMdy,
    NumMd,
    EnMdy,
    EnDmy,
    EnMd,
}

const MONTHS: &str = "January|February|March|April|May|June|July|August|September|October|November|December|JANUARY|FEBRUARY|MARCH|APRIL|MAY|JUNE|JULY|AUGUST|SEPTEMBER|OCTOBER|NOVEMBER|DECEMBER|Jan|Feb|Mar|Apr|Jun|Jul|Aug|Sept|Sep|Oct|Nov|Dec|JAN|FEB|MAR|APR|JUN|JUL|AUG|SEPT|SEP|OCT|NOV|DEC";

static DATE_PATTERNS: LazyLock<Vec<(Regex, Format, Family)>> = LazyLock::new(|| {
    let en = |pattern: &str| pattern.replace("MONTHS", MONTHS);
    vec![
        // 2026年3月15日
        (
            Regex::new(r"(\d{4})\s*年\s*(\d{1,2})\s*月\s*(\d{1,2})\s*日").unwrap(),
            Format::JaYmd,
            Family::Japanese,
        ),
        // 令和8年3月15日, 令和元年5月1日
        (
            Regex::new(r"(令和|平成)\s*(\d{1,2}|元)\s*年\s*(\d{1,2})\s*月\s*(\d{1,2})\s*日").unwrap(),
            Format::JaEra,
            Family::Japanese,
        ),
        // 3月15日
        (
            Regex::new(r"(\d{1,2})\s*月\s*(\d{1,2})\s*日").unwrap(),
            Format::JaMd,
            Family::Japanese,
        ),
        // 2026-03-15, 2026/3/15, 2026.3.15
        (
            Regex::new(r"(\d{4})[-/.](\d{1,2})[-/.](\d{1,2})").unwrap(),
            Format::NumYmd,
            Family::Numeric,
        ),
        // 3/15/2026
        (
            Regex::new(r"(\d{1,2})/(\d{1,2})/(\d{4})").unwrap(),
            Format::NumMdy,
            Family::English,
        ),
        // 3/15
        (
            Regex::new(r"(\d{1,2})/(\d{1,2})").unwrap(),
            Format::NumMd,
            Family::Numeric,
        ),
        // March 15, 2026 / Mar. 15th 2026
        (
            Regex::new(&en(r"\b(MONTHS)\.?\s+(\d{1,2})(?:st|nd|rd|th)?(?:,\s*|\s+)(\d{4})")).unwrap(),
            Format::EnMdy,
            Family::English,
        ),
        // 15 March 2026
        (
            Regex::new(&en(r"(\d{1,2})(?:st|nd|rd|th)?\s+(MONTHS)\.?,?\s+(\d{4})")).unwrap(),
            Format::EnDmy,
            Family::English,
        ),
        // March 15
        (
            Regex::new(&en(r"\b(MONTHS)\.?\s+(\d{1,2})(?:st|nd|rd|th)?\b")).unwrap(),
            Format::EnMd,
            Family::English,
        ),
    ]
});

/// Optional time directly after a date, past an optional weekday like `(土)`.
static TIME_SUFFIX: LazyLock<Regex> = LazyLock::new(|| {
    // Horizontal whitespace only: a time on the next line belongs to that line.
    let pattern = r"^H*(?:[(（][^)）]{1,9}[)）])?H*(?:(午前|午後|AM|PM|am|pm)H*)?(\d{1,2})(?::(\d{2})|H*時(?:H*(\d{1,2})H*分|(半))?)(?:H*(AM|PM|am|pm|a\.m\.|p\.m\.))?"
        .replace('H', r"[ \t\x{3000}]");
    Regex::new(&pattern).unwrap()
});

/// Weekday in parentheses right after a date, such as `(土)` or `（Mon）`.
static WEEKDAY_SUFFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[ \t\x{3000}]*[(（][^)）]{1,9}[)）]").unwrap());

/// Date phrase recognizer driven by a fixed set of regular expressions.
#[derive(Debug, Clone)]
pub struct PatternDateExtractor {
    reference: NaiveDate,
    locales: Vec<DateLocale>,
}

impl Default for PatternDateExtractor {
    /// Japanese and English phrases, year-less dates resolved against today.
    fn default() -> Self {
        Self::new(Local::now().date_naive())
    }
}

impl PatternDateExtractor {
    /// Create an extractor for Japanese and English text.
    pub fn new(reference: NaiveDate) -> Self {
        Self::with_locales(reference, vec![DateLocale::Japanese, DateLocale::English])
    }

    /// Create an extractor restricted to the given locales.
    ///
    /// Numeric forms are recognized regardless of locale; an empty list
    /// leaves only those.
    pub fn with_locales(reference: NaiveDate, locales: Vec<DateLocale>) -> Self {
        Self { reference, locales }
    }

    pub fn reference(&self) -> NaiveDate {
        self.reference
    }

    pub fn locales(&self) -> &[DateLocale] {
        &self.locales
    }

    fn family_enabled(&self, family: Family) -> bool {
        match family {
            Family::Numeric => true,
            Family::Japanese => self.locales.contains(&DateLocale::Japanese),
            Family::English => self.locales.contains(&DateLocale::English),
        }
    }

    /// Every valid candidate from every enabled pattern, possibly overlapping.
    fn candidates(&self, text: &str) -> Vec<DateMatch> {
        let mut found = Vec::new();

        for (pattern, format, family) in DATE_PATTERNS.iter() {
            if !self.family_enabled(*family) {
                continue;
            }

            let mut pos = 0;
            while pos <= text.len() {
                let Some(caps) = pattern.captures_at(text, pos) else {
                    break;
                };
                let Some(whole) = caps.get(0) else {
                    break;
                };

                if digit_bounded(text, whole.start(), whole.end()) {
                    if let Some(date) = self.parse_captured_date(&caps, *format) {
                        let rest = &text[whole.end()..];
                        let (time, time_len) = parse_time_suffix(rest);
                        let has_time = time.is_some();
                        let fraction_like = *format == Format::NumMd
                            && date.day() <= date.month()
                            && !has_time
                            && !WEEKDAY_SUFFIX.is_match(rest);
                        if !fraction_like {
                            let time = time.unwrap_or_else(default_time);
                            found.push(DateMatch {
                                start: whole.start(),
                                end: whole.end() + time_len,
                                value: date.and_time(time),
                                has_time,
                            });
                        }
                    }
                }

                // Retry one character later so a rejected match does not hide
                // a valid one that starts inside it.
                pos = next_char_boundary(text, whole.start());
            }
        }

        found
    }

    fn parse_captured_date(&self, caps: &Captures, format: Format) -> Option<NaiveDate> {
        match format {
            Format::JaYmd | Format::NumYmd => {
                let year = capture_number(caps, 1)? as i32;
                let month = capture_number(caps, 2)?;
                let day = capture_number(caps, 3)?;
                NaiveDate::from_ymd_opt(year, month, day)
            }
            Format::JaEra => {
                let base = match caps.get(1)?.as_str() {
                    "令和" => REIWA_BASE,
                    "平成" => HEISEI_BASE,
                    _ => return None,
                };
                let era_year = match caps.get(2)?.as_str() {
                    "元" => 1,
                    s => parse_digits(s)? as i32,
                };
                if era_year == 0 {
                    return None;
                }
                let month = capture_number(caps, 3)?;
                let day = capture_number(caps, 4)?;
                NaiveDate::from_ymd_opt(base + era_year, month, day)
            }
            Format::JaMd | Format::NumMd => {
                let month = capture_number(caps, 1)?;
                let day = capture_number(caps, 2)?;
                NaiveDate::from_ymd_opt(self.reference.year(), month, day)
            }
            Format::NumMdy => {
                let month = capture_number(caps, 1)?;
                let day = capture_number(caps, 2)?;
                let year = capture_number(caps, 3)? as i32;
                NaiveDate::from_ymd_opt(year, month, day)
            }
            Format::EnMdy => {
                let month = month_from_name(caps.get(1)?.as_str())?;
                let day = capture_number(caps, 2)?;
                let year = capture_number(caps, 3)? as i32;
                NaiveDate::from_ymd_opt(year, month, day)
            }
            Format::EnDmy => {
                let day = capture_number(caps, 1)?;
                let month = month_from_name(caps.get(2)?.as_str())?;
                let year = capture_number(caps, 3)? as i32;
                NaiveDate::from_ymd_opt(year, month, day)
            }
            Format::EnMd => {
                let month = month_from_name(caps.get(1)?.as_str())?;
                let day = capture_number(caps, 2)?;
                NaiveDate::from_ymd_opt(self.reference.year(), month, day)
            }
        }
    }
}

impl DateExtractor for PatternDateExtractor {
    fn extract(&self, text: &str) -> Vec<DateMatch> {
        let mut candidates = self.candidates(text);

        // Earliest first; at the same offset the longest phrase wins.
        candidates.sort_by(|a, b| a.start.cmp(&b.start).then(b.end.cmp(&a.end)));

        let mut matches: Vec<DateMatch> = Vec::new();
        let mut covered_until = 0;
        for candidate in candidates {
            if !matches.is_empty() && candidate.start < covered_until {
                continue;
            }
            covered_until = candidate.end;
            matches.push(candidate);
        }
        matches
    }
}

fn default_time() -> NaiveTime {
    NaiveTime::from_hms_opt(DEFAULT_HOUR, 0, 0).unwrap_or(NaiveTime::MIN)
}

/// Parse a time suffix, returning the time and the number of bytes consumed.
fn parse_time_suffix(rest: &str) -> (Option<NaiveTime>, usize) {
    let Some(caps) = TIME_SUFFIX.captures(rest) else {
        return (None, 0);
    };

    let Some(mut hour) = capture_number(&caps, 2) else {
        return (None, 0);
    };
    let minute = if caps.get(5).is_some() {
        30
    } else {
        capture_number(&caps, 3)
            .or_else(|| capture_number(&caps, 4))
            .unwrap_or(0)
    };

    let meridiem = caps
        .get(1)
        .or_else(|| caps.get(6))
        .map(|m| m.as_str().to_lowercase());
    match meridiem.as_deref() {
        Some("午後") | Some("pm") | Some("p.m.") if hour < 12 => hour += 12,
        Some("午前") | Some("am") | Some("a.m.") if hour == 12 => hour = 0,
        _ => {}
    }

    match NaiveTime::from_hms_opt(hour, minute, 0) {
        Some(time) => (Some(time), caps.get(0).map(|m| m.end()).unwrap_or(0)),
        None => (None, 0),
    }
}

/// Reject matches glued to other digits (`12026/3/15`, `3/150`).
fn digit_bounded(text: &str, start: usize, end: usize) -> bool {
    let before = text[..start].chars().next_back();
    let after = text[end..].chars().next();
    !before.is_some_and(|c| c.is_numeric()) && !after.is_some_and(|c| c.is_numeric())
}

fn next_char_boundary(text: &str, from: usize) -> usize {
    text[from..]
        .chars()
        .next()
        .map(|c| from + c.len_utf8())
        .unwrap_or(text.len() + 1)
}

fn capture_number(caps: &Captures, group: usize) -> Option<u32> {
    caps.get(group).and_then(|m| parse_digits(m.as_str()))
}

/// Parse ASCII or fullwidth digits.
fn parse_digits(s: &str) -> Option<u32> {
    let mut value: u32 = 0;
    for c in s.chars() {
        let digit = match c {
            '0'..='9' => c as u32 - '0' as u32,
            '０'..='９' => c as u32 - '０' as u32,
            _ => return None,
        };
        value = value.checked_mul(10)?.checked_add(digit)?;
    }
    Some(value)
}

fn month_from_name(name: &str) -> Option<u32> {
    let prefix: String = name.chars().take(3).collect::<String>().to_lowercase();
    let month = match prefix.as_str() {
        "jan" => 1,
        "feb" => 2,
        "mar" => 3,
        "apr" => 4,
        "may" => 5,
        "jun" => 6,
        "jul" => 7,
        "aug" => 8,
        "sep" => 9,
        "oct" => 10,
        "nov" => 11,
        "dec" => 12,
        _ => return None,
    };
    Some(month)
}
