//! Calendar export for documents.
//!
//! Builds an event draft from a document and renders it as an iCalendar
//! file that any calendar application can import.

use chrono::{DateTime, Duration, NaiveDateTime, Utc};
use serde::Serialize;

use crate::models::DocumentCard;
use crate::utils::display_title;

/// Default event length in minutes.
pub const DEFAULT_EVENT_MINUTES: i64 = 60;

/// Longest event length accepted, one week.
pub const MAX_EVENT_MINUTES: i64 = 7 * 24 * 60;

/// First line of every exported event's notes.
pub const EVENT_NOTES_HEADER: &str = "Scanned with Staqq";

/// Maximum octets per iCalendar content line, excluding the line break.
const ICS_LINE_LIMIT: usize = 75;

/// A calendar event ready to be exported.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EventDraft {
    pub title: String,
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    pub notes: String,
}

impl EventDraft {
    /// Build an event for a document.
    ///
    /// The start is the deadline if set, otherwise the event date, otherwise
    /// `now`.
    pub fn from_document(doc: &DocumentCard, now: NaiveDateTime) -> Self {
        let start = doc.target_date().unwrap_or(now);
        let mut notes = EVENT_NOTES_HEADER.to_string();
        if !doc.child_tag.is_empty() {
            notes.push_str(&format!("\nTag: {}", doc.child_tag));
        }

        Self {
            title: display_title(&doc.title).to_string(),
            start,
            end: end_after(start, DEFAULT_EVENT_MINUTES),
            notes,
        }
    }

    /// Change the event length, kept between one minute and one week.
    pub fn with_duration(mut self, minutes: i64) -> Self {
        self.end = end_after(self.start, minutes.clamp(1, MAX_EVENT_MINUTES));
        self
    }

    /// Render as a single-event iCalendar document with floating times.
    pub fn to_ics(&self, uid: &str, stamp: DateTime<Utc>) -> String {
        let lines = [
            "BEGIN:VCALENDAR".to_string(),
            "VERSION:2.0".to_string(),
            "PRODID:-//Staqq//Document Export//EN".to_string(),
            "CALSCALE:GREGORIAN".to_string(),
            "BEGIN:VEVENT".to_string(),
            format!("UID:{}", uid),
            format!("DTSTAMP:{}", stamp.format("%Y%m%dT%H%M%SZ")),
            format!("DTSTART:{}", self.start.format("%Y%m%dT%H%M%S")),
            format!("DTEND:{}", self.end.format("%Y%m%dT%H%M%S")),
            format!("SUMMARY:{}", escape_text(&self.title)),
            format!("DESCRIPTION:{}", escape_text(&self.notes)),
            "END:VEVENT".to_string(),
            "END:VCALENDAR".to_string(),
        ];

        let mut out = String::new();
        for line in &lines {
            out.push_str(&fold_line(line));
            out.push_str("\r\n");
        }
        out
    }
}

/// `start + minutes`, or the default length when that leaves the calendar's range.
fn end_after(start: NaiveDateTime, minutes: i64) -> NaiveDateTime {
    Duration::try_minutes(minutes)
        .and_then(|span| start.checked_add_signed(span))
        .or_else(|| start.checked_add_signed(Duration::minutes(DEFAULT_EVENT_MINUTES)))
        .unwrap_or(start)
}

/// Escape a TEXT value (RFC 5545 section 3.3.11).
fn escape_text(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            ';' => out.push_str("\\;"),
            ',' => out.push_str("\\,"),
            '\n' => out.push_str("\\n"),
            '\r' => {}
            other => out.push(other),
        }
    }
    out
}

/// Fold a content line at 75 octets without splitting UTF-8 sequences.
fn fold_line(line: &str) -> String {
    if line.len() <= ICS_LINE_LIMIT {
        return line.to_string();
    }

    let mut out = String::with_capacity(line.len() + line.len() / ICS_LINE_LIMIT * 3);
    let mut current = 0;
    // Continuation lines start with a space, which counts toward the limit.
    let mut limit = ICS_LINE_LIMIT;
    for c in line.chars() {
        if current + c.len_utf8() > limit {
            out.push_str("\r\n ");
            current = 0;
            limit = ICS_LINE_LIMIT - 1;
        }
        out.push(c);
        current += c.len_utf8();
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, TimeZone};

    fn at(m: u32, d: u32, h: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, m, d)
            .unwrap()
            .and_hms_opt(h, 0, 0)
            .unwrap()
    }

    #[test]
    fn test_deadline_beats_event_beats_now() {
        let now = at(1, 1, 9);
        let mut doc = DocumentCard::new(Vec::new());

        assert_eq!(EventDraft::from_document(&doc, now).start, now);

        doc.event_date = Some(at(3, 15, 12));
        assert_eq!(EventDraft::from_document(&doc, now).start, at(3, 15, 12));

        doc.deadline_date = Some(at(3, 1, 12));
        assert_eq!(EventDraft::from_document(&doc, now).start, at(3, 1, 12));
    }

    #[test]
    fn test_one_hour_default() {
        let doc = DocumentCard::new(Vec::new());
        let draft = EventDraft::from_document(&doc, at(1, 1, 9));
        assert_eq!(draft.end, at(1, 1, 10));

        let long = draft.with_duration(120);
        assert_eq!(long.end, at(1, 1, 11));
        assert_eq!(long.clone().with_duration(0).end - long.start, Duration::minutes(1));
    }

    #[test]
    fn test_oversized_duration_is_capped() {
        let doc = DocumentCard::new(Vec::new());
        let draft = EventDraft::from_document(&doc, at(1, 1, 9)).with_duration(1_000_000_000_000);
        assert_eq!(draft.end - draft.start, Duration::minutes(MAX_EVENT_MINUTES));

        let draft = EventDraft::from_document(&doc, NaiveDateTime::MAX).with_duration(120);
        assert_eq!(draft.end, NaiveDateTime::MAX);
    }

    #[test]
    fn test_placeholder_title_and_notes() {
        let doc = DocumentCard::new(Vec::new());
        let draft = EventDraft::from_document(&doc, at(1, 1, 9));
        assert_eq!(draft.title, "Untitled Document");
        assert_eq!(draft.notes, EVENT_NOTES_HEADER);

        let tagged = DocumentCard::new(Vec::new()).with_tag("Hana");
        let draft = EventDraft::from_document(&tagged, at(1, 1, 9));
        assert_eq!(draft.notes, "Scanned with Staqq\nTag: Hana");
    }

    #[test]
    fn test_ics_rendering() {
        let mut doc = DocumentCard::new(Vec::new()).with_tag("Hana");
        doc.title = "Concert; rehearsal, hall".to_string();
        doc.event_date = Some(at(3, 15, 12));
        let draft = EventDraft::from_document(&doc, at(1, 1, 9));
        let stamp = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();
        let ics = draft.to_ics("abc@staqq", stamp);

        assert!(ics.starts_with("BEGIN:VCALENDAR\r\n"));
        assert!(ics.contains("UID:abc@staqq\r\n"));
        assert!(ics.contains("DTSTAMP:20260101T000000Z\r\n"));
        assert!(ics.contains("DTSTART:20260315T120000\r\n"));
        assert!(ics.contains("DTEND:20260315T130000\r\n"));
        assert!(ics.contains("SUMMARY:Concert\\; rehearsal\\, hall\r\n"));
        assert!(ics.contains("DESCRIPTION:Scanned with Staqq\\nTag: Hana\r\n"));
        assert!(ics.ends_with("END:VCALENDAR\r\n"));
    }

    #[test]
    fn test_fold_respects_utf8_and_limit() {
        let line = format!("SUMMARY:{}", "運動会".repeat(20));
        let folded = fold_line(&line);
        for (i, part) in folded.split("\r\n").enumerate() {
            assert!(part.len() <= ICS_LINE_LIMIT, "line {} too long", i);
            if i > 0 {
                assert!(part.starts_with(' '));
            }
        }
        let unfolded = folded.replace("\r\n ", "");
        assert_eq!(unfolded, line);
    }
}
