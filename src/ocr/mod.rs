//! Text recognition for scanned pages.
//!
//! Produces one [`TextFragment`](crate::inference::TextFragment) per
//! recognized line, with the line height relative to the page image so
//! headings can be told apart from body text regardless of resolution.
//!
//! ## Recognizers
//!
//! - **Tesseract**: command-line OCR, Japanese and English (default)
//! - **Sidecar**: fragments recognized elsewhere, stored as JSON

mod backend;
mod model_utils;
mod sidecar;
mod tesseract;

pub use backend::{
    build_recognizer, ensure_available, OcrError, RecognizerConfig, RecognizerType,
    TextRecognizer,
};
pub use sidecar::SidecarRecognizer;
pub use tesseract::{parse_tsv, TesseractRecognizer};
