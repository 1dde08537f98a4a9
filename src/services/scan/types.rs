//! Scan service types and events.

use uuid::Uuid;

use crate::inference::InferenceResult;

/// Events emitted while a scan is processed.
#[derive(Debug, Clone)]
pub enum ScanEvent {
    /// Page recognition started
    PageStarted { document_id: Uuid, page: usize },
    /// Page recognition completed
    PageRecognized {
        document_id: Uuid,
        page: usize,
        lines: usize,
    },
    /// Page recognition failed; the page contributes no text
    PageFailed {
        document_id: Uuid,
        page: usize,
        error: String,
    },
    /// Title and date written to the document
    Inferred {
        document_id: Uuid,
        result: InferenceResult,
    },
}

/// Result of scanning one document.
#[derive(Debug, Clone)]
pub struct ScanResult {
    pub document_id: Uuid,
    pub inference: InferenceResult,
    pub pages_recognized: usize,
    pub pages_failed: usize,
    /// Lines recognized across all pages.
    pub lines: usize,
}
