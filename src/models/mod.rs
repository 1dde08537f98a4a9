//! Data models for Staqq.

mod document;
mod filter;
mod link;

pub use document::{
    normalize_tag_name, AppTag, DocumentCard, DEFAULT_TAG_COLOR, MAX_TAG_NAME_CHARS,
};
pub use filter::{
    filter_documents, SidebarCounts, SidebarFilter, UpcomingWindow, DEFAULT_UPCOMING_DAYS,
    MAX_UPCOMING_DAYS,
};
pub use link::{document_link, parse_document_link};
