//! Sidecar recognizer.
//!
//! Reads fragments recognized elsewhere (for example on the capturing
//! phone) from `<image>.fragments.json`, a JSON array of
//! `{"text": ..., "relative_height": ...}` objects.

use std::path::{Path, PathBuf};

use super::backend::{OcrError, RecognizerType, TextRecognizer};
use crate::inference::TextFragment;

const SIDECAR_SUFFIX: &str = "fragments.json";

/// Recognizer backed by pre-computed JSON fragment files.
#[derive(Debug, Default)]
pub struct SidecarRecognizer;

impl SidecarRecognizer {
    pub fn new() -> Self {
        Self
    }

    /// Path of the sidecar file for an image.
    pub fn sidecar_path(image_path: &Path) -> PathBuf {
        let mut name = image_path.as_os_str().to_os_string();
        name.push(".");
        name.push(SIDECAR_SUFFIX);
        PathBuf::from(name)
    }
}

impl TextRecognizer for SidecarRecognizer {
    fn recognizer_type(&self) -> RecognizerType {
        RecognizerType::Sidecar
    }

    fn is_available(&self) -> bool {
        true
    }

    fn availability_hint(&self) -> String {
        format!("Reads <image>.{} files", SIDECAR_SUFFIX)
    }

    fn recognize(&self, image_path: &Path) -> Result<Vec<TextFragment>, OcrError> {
        let path = Self::sidecar_path(image_path);
        let contents = std::fs::read_to_string(&path)?;
        let raw: Vec<TextFragment> = serde_json::from_str(&contents)
            .map_err(|e| OcrError::MalformedOutput(format!("{}: {}", path.display(), e)))?;
        // Re-clamp heights that arrived from outside.
        Ok(raw
            .into_iter()
            .map(|f| TextFragment::new(f.text, f.relative_height))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sidecar_path() {
        let path = SidecarRecognizer::sidecar_path(Path::new("/tmp/page-1.jpg"));
        assert_eq!(path, PathBuf::from("/tmp/page-1.jpg.fragments.json"));
    }

    #[test]
    fn test_reads_and_clamps_fragments() {
        let dir = tempfile::tempdir().unwrap();
        let image = dir.path().join("page.png");
        std::fs::write(
            SidecarRecognizer::sidecar_path(&image),
            r#"[{"text": "遠足のお知らせ", "relative_height": 0.08},
                {"text": "huge", "relative_height": 4.0}]"#,
        )
        .unwrap();

        let fragments = SidecarRecognizer::new().recognize(&image).unwrap();
        assert_eq!(fragments.len(), 2);
        assert_eq!(fragments[0].text, "遠足のお知らせ");
        assert_eq!(fragments[1].relative_height, 1.0);
    }

    #[test]
    fn test_missing_sidecar_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let result = SidecarRecognizer::new().recognize(&dir.path().join("none.png"));
        assert!(matches!(result, Err(OcrError::Io(_))));
    }

    #[test]
    fn test_malformed_sidecar() {
        let dir = tempfile::tempdir().unwrap();
        let image = dir.path().join("page.png");
        std::fs::write(SidecarRecognizer::sidecar_path(&image), "{not json").unwrap();
        let result = SidecarRecognizer::new().recognize(&image);
        assert!(matches!(result, Err(OcrError::MalformedOutput(_))));
    }
}
