//! Sidebar filters over the document collection.

use chrono::{Duration, NaiveDateTime};
use serde::{Deserialize, Serialize};

use super::document::{AppTag, DocumentCard};

/// Default look-ahead for the upcoming-deadlines filter.
pub const DEFAULT_UPCOMING_DAYS: i64 = 3;

/// Longest configurable look-ahead, about ten years.
pub const MAX_UPCOMING_DAYS: i64 = 3650;

/// A smart folder or user folder in the sidebar.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SidebarFilter {
    /// Every document.
    All,
    /// Documents that are not archived.
    Inbox,
    /// Unarchived documents whose deadline falls within the window.
    Upcoming,
    Archived,
    /// Documents filed under a tag.
    Tag(String),
}

impl SidebarFilter {
    pub fn id(&self) -> String {
        match self {
            SidebarFilter::All => "all".to_string(),
            SidebarFilter::Inbox => "unprocessed".to_string(),
            SidebarFilter::Upcoming => "upcoming".to_string(),
            SidebarFilter::Archived => "archived".to_string(),
            SidebarFilter::Tag(name) => format!("child_{}", name),
        }
    }

    pub fn display_name(&self) -> String {
        match self {
            SidebarFilter::All => "All Docs".to_string(),
            SidebarFilter::Inbox => "Inbox".to_string(),
            SidebarFilter::Upcoming => "Upcoming Deadlines".to_string(),
            SidebarFilter::Archived => "Archived".to_string(),
            SidebarFilter::Tag(name) => format!("#{}", name),
        }
    }

    /// Parse a filter name as typed on the command line.
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "all" => Some(SidebarFilter::All),
            "inbox" | "unprocessed" => Some(SidebarFilter::Inbox),
            "upcoming" | "deadlines" => Some(SidebarFilter::Upcoming),
            "archived" | "archive" => Some(SidebarFilter::Archived),
            _ => None,
        }
    }

    /// Whether a document belongs to this folder.
    pub fn matches(&self, doc: &DocumentCard, window: &UpcomingWindow) -> bool {
        match self {
            SidebarFilter::All => true,
            SidebarFilter::Inbox => !doc.is_archived,
            SidebarFilter::Archived => doc.is_archived,
            SidebarFilter::Upcoming => {
                !doc.is_archived && doc.deadline_date.is_some_and(|d| window.contains(d))
            }
            SidebarFilter::Tag(name) => doc.child_tag == *name,
        }
    }
}

impl Default for SidebarFilter {
    fn default() -> Self {
        SidebarFilter::Inbox
    }
}

/// Cut-off for "upcoming" deadlines. Overdue deadlines stay upcoming.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UpcomingWindow {
    threshold: NaiveDateTime,
}

impl UpcomingWindow {
    /// Window ending `days` after `now`. Past the calendar's range it never ends.
    pub fn new(now: NaiveDateTime, days: i64) -> Self {
        let threshold = Duration::try_days(days)
            .and_then(|span| now.checked_add_signed(span))
            .unwrap_or(NaiveDateTime::MAX);
        Self { threshold }
    }

    pub fn threshold(&self) -> NaiveDateTime {
        self.threshold
    }

    pub fn contains(&self, deadline: NaiveDateTime) -> bool {
        deadline <= self.threshold
    }
}

/// Apply a filter and search text, newest documents first.
pub fn filter_documents<'a>(
    docs: &'a [DocumentCard],
    filter: &SidebarFilter,
    search: &str,
    window: &UpcomingWindow,
) -> Vec<&'a DocumentCard> {
    let mut matched: Vec<&DocumentCard> = docs
        .iter()
        .filter(|d| filter.matches(d, window) && d.matches_search(search))
        .collect();
    matched.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    matched
}

/// Document counts shown next to each sidebar entry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SidebarCounts {
    pub inbox: usize,
    pub upcoming: usize,
    pub all: usize,
    pub archived: usize,
    /// Per-tag counts, in tag order.
    pub tags: Vec<(String, usize)>,
}

impl SidebarCounts {
    pub fn compute(docs: &[DocumentCard], tags: &[AppTag], window: &UpcomingWindow) -> Self {
        let count = |filter: &SidebarFilter| docs.iter().filter(|d| filter.matches(d, window)).count();
        Self {
            inbox: count(&SidebarFilter::Inbox),
            upcoming: count(&SidebarFilter::Upcoming),
            all: docs.len(),
            archived: count(&SidebarFilter::Archived),
            tags: tags
                .iter()
                .map(|t| (t.name.clone(), count(&SidebarFilter::Tag(t.name.clone()))))
                .collect(),
        }
    }
}
