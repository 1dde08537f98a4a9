//! Text recognizer abstraction.
//!
//! A recognizer turns one page image into recognized lines with their
//! relative heights. Backends:
//! - Tesseract: command-line OCR with line geometry from TSV output
//! - Sidecar: pre-recognized fragments stored next to the image as JSON

use std::path::Path;
use thiserror::Error;

use crate::dates::DateLocale;
use crate::inference::TextFragment;

/// Errors from text recognizers.
#[derive(Debug, Error)]
pub enum OcrError {
    #[error("Backend not available: {0}")]
    BackendNotAvailable(String),

    #[error("OCR failed: {0}")]
    OcrFailed(String),

    #[error("Malformed recognizer output: {0}")]
    MalformedOutput(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Available recognizer types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecognizerType {
    /// Tesseract OCR via command-line.
    Tesseract,
    /// Fragments read from a `<image>.fragments.json` file.
    Sidecar,
}

impl RecognizerType {
    pub fn as_str(&self) -> &'static str {
        match self {
            RecognizerType::Tesseract => "tesseract",
            RecognizerType::Sidecar => "sidecar",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "tesseract" => Some(RecognizerType::Tesseract),
            "sidecar" | "json" => Some(RecognizerType::Sidecar),
            _ => None,
        }
    }
}

impl std::fmt::Display for RecognizerType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Trait for text recognizers.
pub trait TextRecognizer: Send + Sync {
    /// Get the recognizer type.
    fn recognizer_type(&self) -> RecognizerType;

    /// Check if this recognizer can run (binaries installed, etc.).
    fn is_available(&self) -> bool;

    /// Get a description of what's needed to make this recognizer available.
    fn availability_hint(&self) -> String;

    /// Recognize the lines of text in one page image, in reading order.
    fn recognize(&self, image_path: &Path) -> Result<Vec<TextFragment>, OcrError>;
}

/// Configuration for recognizers.
#[derive(Debug, Clone)]
pub struct RecognizerConfig {
    /// Recognition languages, primary first.
    pub locales: Vec<DateLocale>,
}

impl RecognizerConfig {
    pub fn new(locales: Vec<DateLocale>) -> Self {
        Self { locales }
    }

    /// Tesseract `-l` argument, e.g. `jpn+eng`.
    pub fn tesseract_languages(&self) -> String {
        if self.locales.is_empty() {
            return DateLocale::English.tesseract_code().to_string();
        }
        self.locales
            .iter()
            .map(|l| l.tesseract_code())
            .collect::<Vec<_>>()
            .join("+")
    }
}

impl Default for RecognizerConfig {
    fn default() -> Self {
        Self {
            locales: vec![DateLocale::Japanese, DateLocale::English],
        }
    }
}

/// Build a recognizer by type.
pub fn build_recognizer(
    recognizer_type: RecognizerType,
    config: RecognizerConfig,
) -> Box<dyn TextRecognizer> {
    match recognizer_type {
        RecognizerType::Tesseract => Box::new(super::TesseractRecognizer::with_config(config)),
        RecognizerType::Sidecar => Box::new(super::SidecarRecognizer::new()),
    }
}

/// Ensure a recognizer is ready to use.
pub fn ensure_available(recognizer: &dyn TextRecognizer) -> Result<(), OcrError> {
    if recognizer.is_available() {
        Ok(())
    } else {
        Err(OcrError::BackendNotAvailable(recognizer.availability_hint()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recognizer_type_round_trip() {
        for t in [RecognizerType::Tesseract, RecognizerType::Sidecar] {
            assert_eq!(RecognizerType::from_str(t.as_str()), Some(t));
        }
        assert_eq!(RecognizerType::from_str("JSON"), Some(RecognizerType::Sidecar));
        assert_eq!(RecognizerType::from_str("paddle"), None);
    }

    #[test]
    fn test_tesseract_languages() {
        assert_eq!(RecognizerConfig::default().tesseract_languages(), "jpn+eng");
        assert_eq!(
            RecognizerConfig::new(vec![DateLocale::English]).tesseract_languages(),
            "eng"
        );
        assert_eq!(RecognizerConfig::new(Vec::new()).tesseract_languages(), "eng");
    }
}
