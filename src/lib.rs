//! Staqq - scanned document organizer.
//!
//! Recognizes the text of multi-page paper handouts, infers a title and an
//! event date from it, and keeps the documents in a local SQLite store where
//! they can be tagged, given deadlines, archived and exported to a calendar.

pub mod config;
pub mod dates;
pub mod inference;
pub mod models;
pub mod ocr;
pub mod repository;
pub mod services;
pub mod utils;
