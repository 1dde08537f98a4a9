//! Service layer.
//!
//! - `scan`: recognition and inference for new documents
//! - `calendar`: calendar export of documents

pub mod calendar;
pub mod scan;

pub use calendar::{EventDraft, DEFAULT_EVENT_MINUTES, MAX_EVENT_MINUTES};
pub use scan::{ScanEvent, ScanResult, ScanService};
