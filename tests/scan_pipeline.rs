//! End-to-end scan: placeholder document, page recognition, inference.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::NaiveDate;
use tempfile::TempDir;
use tokio::sync::mpsc;

use staqq::dates::PatternDateExtractor;
use staqq::inference::{InferenceEngine, TextFragment, UNTITLED_DOCUMENT};
use staqq::ocr::{OcrError, RecognizerType, SidecarRecognizer, TextRecognizer};
use staqq::repository::DocumentRepository;
use staqq::services::{ScanEvent, ScanService};

/// Recognizer returning canned fragments keyed by file name.
struct FakeRecognizer {
    pages: HashMap<String, Vec<TextFragment>>,
}

impl TextRecognizer for FakeRecognizer {
    fn recognizer_type(&self) -> RecognizerType {
        RecognizerType::Sidecar
    }

    fn is_available(&self) -> bool {
        true
    }

    fn availability_hint(&self) -> String {
        String::new()
    }

    fn recognize(&self, image_path: &Path) -> Result<Vec<TextFragment>, OcrError> {
        let name = image_path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or_default();
        self.pages
            .get(name)
            .cloned()
            .ok_or_else(|| OcrError::OcrFailed(format!("unreadable: {}", name)))
    }
}

fn engine() -> InferenceEngine<PatternDateExtractor> {
    InferenceEngine::new(PatternDateExtractor::new(
        NaiveDate::from_ymd_opt(2026, 1, 10).unwrap(),
    ))
}

fn touch_images(dir: &TempDir, names: &[&str]) -> Vec<PathBuf> {
    names
        .iter()
        .map(|name| {
            let path = dir.path().join(name);
            std::fs::write(&path, b"").unwrap();
            path
        })
        .collect()
}

fn service(dir: &TempDir, recognizer: Arc<dyn TextRecognizer>) -> ScanService {
    let repo = DocumentRepository::new(&dir.path().join("staqq.db")).unwrap();
    ScanService::new(repo, recognizer, engine())
}

#[tokio::test]
async fn failing_page_does_not_abort_scan() {
    let dir = tempfile::tempdir().unwrap();
    let images = touch_images(&dir, &["p1.png", "p2.png", "p3.png"]);

    let mut pages = HashMap::new();
    pages.insert(
        "p1.png".to_string(),
        vec![
            TextFragment::new("運動会のお知らせ", 0.09),
            TextFragment::new("小さい文字", 0.03),
        ],
    );
    pages.insert(
        "p3.png".to_string(),
        vec![TextFragment::new("日時 2026年5月23日(土) 午前9時", 0.03)],
    );
    let svc = service(&dir, Arc::new(FakeRecognizer { pages }));

    let (tx, mut rx) = mpsc::channel(32);
    let result = svc.scan(images, Some("Hana"), Some(tx)).await.unwrap();

    assert_eq!(result.pages_failed, 1);
    assert_eq!(result.pages_recognized, 2);
    assert_eq!(result.lines, 3);
    assert_eq!(result.inference.title, "運動会のお知らせ");
    assert_eq!(
        result.inference.event_date,
        Some(
            NaiveDate::from_ymd_opt(2026, 5, 23)
                .unwrap()
                .and_hms_opt(9, 0, 0)
                .unwrap()
        )
    );

    let stored = svc.repository().get(&result.document_id).unwrap().unwrap();
    assert_eq!(stored.title, "運動会のお知らせ");
    assert_eq!(stored.child_tag, "Hana");
    assert_eq!(stored.page_count(), 3);
    assert!(!stored.is_pending_inference());

    let mut failed = Vec::new();
    let mut inferred = false;
    while let Some(event) = rx.recv().await {
        match event {
            ScanEvent::PageFailed { page, .. } => failed.push(page),
            ScanEvent::Inferred { .. } => inferred = true,
            _ => {}
        }
    }
    assert_eq!(failed, vec![2]);
    assert!(inferred);
}

#[tokio::test]
async fn all_pages_failing_gives_fallback() {
    let dir = tempfile::tempdir().unwrap();
    let images = touch_images(&dir, &["blank.jpg"]);
    let svc = service(
        &dir,
        Arc::new(FakeRecognizer {
            pages: HashMap::new(),
        }),
    );

    let result = svc.scan(images, None, None).await.unwrap();
    assert_eq!(result.inference.title, UNTITLED_DOCUMENT);
    assert_eq!(result.inference.event_date, None);
    assert_eq!(result.pages_failed, 1);
}

#[tokio::test]
async fn rejects_missing_or_unsupported_images() {
    let dir = tempfile::tempdir().unwrap();
    let svc = service(&dir, Arc::new(SidecarRecognizer::new()));

    assert!(svc.scan(Vec::new(), None, None).await.is_err());
    assert!(svc
        .scan(vec![dir.path().join("missing.png")], None, None)
        .await
        .is_err());
    let text = touch_images(&dir, &["notes.txt"]);
    assert!(svc.scan(text, None, None).await.is_err());
    assert_eq!(svc.repository().count().unwrap(), 0);
}

#[tokio::test]
async fn sidecar_scan_and_rescan() {
    let dir = tempfile::tempdir().unwrap();
    let images = touch_images(&dir, &["page.png"]);
    let sidecar = SidecarRecognizer::sidecar_path(&images[0]);
    std::fs::write(
        &sidecar,
        r#"[{"text": "Spring Concert", "relative_height": 0.1},
            {"text": "April 18, 2026", "relative_height": 0.04}]"#,
    )
    .unwrap();

    let svc = service(&dir, Arc::new(SidecarRecognizer::new()));
    let result = svc.scan(images, None, None).await.unwrap();
    assert_eq!(result.inference.title, "Spring Concert");

    std::fs::write(
        &sidecar,
        r#"[{"text": "Spring Concert (revised)", "relative_height": 0.1}]"#,
    )
    .unwrap();
    let doc = svc.repository().get(&result.document_id).unwrap().unwrap();
    let again = svc.rescan(&doc, None).await.unwrap();
    assert_eq!(again.inference.title, "Spring Concert (revised)");
    assert_eq!(again.inference.event_date, None);

    let stored = svc.repository().get(&doc.id).unwrap().unwrap();
    assert_eq!(stored.title, "Spring Concert (revised)");
    assert_eq!(stored.event_date, None);
}
