//! Document scan service.
//!
//! Stores a new document for a stack of page images, recognizes the text of
//! every page concurrently, then fills in the inferred title and event date.
//! Separated from UI concerns - emits events for progress tracking.

mod types;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::bail;
use futures::future::join_all;
use tokio::sync::mpsc;

use crate::dates::PatternDateExtractor;
use crate::inference::{InferenceEngine, TextFragment};
use crate::models::DocumentCard;
use crate::ocr::TextRecognizer;
use crate::repository::DocumentRepository;
use crate::utils::is_supported_image;

pub use types::{ScanEvent, ScanResult};

/// Service that turns page images into stored, titled documents.
pub struct ScanService {
    doc_repo: DocumentRepository,
    recognizer: Arc<dyn TextRecognizer>,
    engine: Arc<InferenceEngine<PatternDateExtractor>>,
}

impl ScanService {
    /// Create a new scan service.
    pub fn new(
        doc_repo: DocumentRepository,
        recognizer: Arc<dyn TextRecognizer>,
        engine: InferenceEngine<PatternDateExtractor>,
    ) -> Self {
        Self {
            doc_repo,
            recognizer,
            engine: Arc::new(engine),
        }
    }

    pub fn repository(&self) -> &DocumentRepository {
        &self.doc_repo
    }

    /// Scan a document made of `images`, in page order.
    ///
    /// The document is stored with an empty title before recognition starts,
    /// so it is visible (as pending) while pages are processed. Pages that
    /// fail recognition are logged and contribute no text.
    pub async fn scan(
        &self,
        images: Vec<PathBuf>,
        tag: Option<&str>,
        event_tx: Option<mpsc::Sender<ScanEvent>>,
    ) -> anyhow::Result<ScanResult> {
        if images.is_empty() {
            bail!("No page images given");
        }
        for image in &images {
            if !image.is_file() {
                bail!("Page image not found: {}", image.display());
            }
            if !is_supported_image(image) {
                bail!("Unsupported image type: {}", image.display());
            }
        }

        let images: Vec<PathBuf> = images.iter().map(|p| absolute(p)).collect();
        let mut doc = DocumentCard::new(images);
        if let Some(tag) = tag {
            doc = doc.with_tag(tag);
        }
        self.doc_repo.save(&doc)?;
        tracing::info!(
            "Created document {} with {} page(s)",
            doc.id,
            doc.page_count()
        );

        self.process(&doc, event_tx).await
    }

    /// Re-run recognition and inference for an existing document.
    ///
    /// Overwrites the stored title and event date.
    pub async fn rescan(
        &self,
        doc: &DocumentCard,
        event_tx: Option<mpsc::Sender<ScanEvent>>,
    ) -> anyhow::Result<ScanResult> {
        self.process(doc, event_tx).await
    }

    async fn process(
        &self,
        doc: &DocumentCard,
        event_tx: Option<mpsc::Sender<ScanEvent>>,
    ) -> anyhow::Result<ScanResult> {
        let pages = self.recognize_pages(doc, event_tx.as_ref()).await;
        let pages_failed = pages.iter().filter(|p| p.is_none()).count();
        let pages: Vec<Vec<TextFragment>> =
            pages.into_iter().map(Option::unwrap_or_default).collect();
        let lines = pages.iter().map(Vec::len).sum();

        let inference = self.engine.infer(&pages);
        self.doc_repo.update_inference(&doc.id, &inference)?;
        tracing::info!(
            "Inferred title '{}' for document {}",
            inference.title,
            doc.id
        );

        send(
            event_tx.as_ref(),
            ScanEvent::Inferred {
                document_id: doc.id,
                result: inference.clone(),
            },
        )
        .await;

        Ok(ScanResult {
            document_id: doc.id,
            inference,
            pages_recognized: doc.page_count() - pages_failed,
            pages_failed,
            lines,
        })
    }

    /// Recognize every page on the blocking pool, results in page order.
    ///
    /// `None` marks a page whose recognition failed.
    async fn recognize_pages(
        &self,
        doc: &DocumentCard,
        event_tx: Option<&mpsc::Sender<ScanEvent>>,
    ) -> Vec<Option<Vec<TextFragment>>> {
        let tasks = doc.image_paths.iter().enumerate().map(|(index, path)| {
            let recognizer = Arc::clone(&self.recognizer);
            let path = path.clone();
            let document_id = doc.id;
            let page = index + 1;
            async move {
                send(event_tx, ScanEvent::PageStarted { document_id, page }).await;

                let outcome = tokio::task::spawn_blocking(move || recognizer.recognize(&path))
                    .await
                    .map_err(|e| e.to_string())
                    .and_then(|r| r.map_err(|e| e.to_string()));

                match outcome {
                    Ok(fragments) => {
                        tracing::debug!("Page {} of {}: {} lines", page, document_id, fragments.len());
                        send(
                            event_tx,
                            ScanEvent::PageRecognized {
                                document_id,
                                page,
                                lines: fragments.len(),
                            },
                        )
                        .await;
                        Some(fragments)
                    }
                    Err(error) => {
                        tracing::warn!(
                            "Recognition failed for page {} of {}: {}",
                            page,
                            document_id,
                            error
                        );
                        send(
                            event_tx,
                            ScanEvent::PageFailed {
                                document_id,
                                page,
                                error,
                            },
                        )
                        .await;
                        None
                    }
                }
            }
        });

        join_all(tasks).await
    }
}

async fn send(event_tx: Option<&mpsc::Sender<ScanEvent>>, event: ScanEvent) {
    if let Some(tx) = event_tx {
        let _ = tx.send(event).await;
    }
}

fn absolute(path: &Path) -> PathBuf {
    std::fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf())
}
