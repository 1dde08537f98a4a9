//! Scan and inference commands.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::NaiveDate;
use console::style;
use tokio::sync::mpsc;

use staqq::config::Settings;
use staqq::inference::TextFragment;
use staqq::ocr::{build_recognizer, ensure_available, RecognizerType, TextRecognizer};
use staqq::services::{ScanEvent, ScanResult, ScanService};
use staqq::utils::{display_title, format_date_time};

use crate::cli::helpers::{find_document, now, open_repositories};
use crate::cli::icons::{dim_arrow, error, success, warn};

/// Scan page images into a new document.
pub async fn cmd_scan(
    settings: &Settings,
    images: Vec<PathBuf>,
    tag: Option<&str>,
    recognizer: Option<&str>,
) -> anyhow::Result<()> {
    let (doc_repo, tag_repo) = open_repositories(settings)?;
    let service = ScanService::new(
        doc_repo,
        recognizer_for(settings, recognizer)?,
        settings.inference_engine(now().date()),
    );

    println!(
        "{} Scanning {} page(s)",
        style("→").cyan(),
        images.len()
    );

    let (event_tx, event_rx) = mpsc::channel(32);
    let printer = tokio::spawn(print_events(event_rx));
    let result = service.scan(images, tag, Some(event_tx)).await;
    let _ = printer.await;
    let result = result?;

    // Keep the tag list in step with what documents use.
    if let Some(tag) = tag {
        if !tag.trim().is_empty() {
            tag_repo.create(tag, None)?;
        }
    }

    print_result(&result);
    Ok(())
}

/// Run recognition and inference again for an existing document.
pub async fn cmd_rescan(settings: &Settings, reference: &str, recognizer: Option<&str>) -> anyhow::Result<()> {
    let (doc_repo, _) = open_repositories(settings)?;
    let doc = find_document(&doc_repo, reference)?;
    let service = ScanService::new(
        doc_repo,
        recognizer_for(settings, recognizer)?,
        settings.inference_engine(now().date()),
    );

    let (event_tx, event_rx) = mpsc::channel(32);
    let printer = tokio::spawn(print_events(event_rx));
    let result = service.rescan(&doc, Some(event_tx)).await;
    let _ = printer.await;

    print_result(&result?);
    Ok(())
}

/// Infer title and date from pre-recognized fragments and print the analysis as JSON.
pub async fn cmd_infer(settings: &Settings, file: &Path, today: Option<&str>) -> anyhow::Result<()> {
    let contents = tokio::fs::read_to_string(file).await?;
    let pages: Vec<Vec<TextFragment>> = serde_json::from_str(&contents)?;
    // Deserialized heights skip the constructor's clamping.
    let pages: Vec<Vec<TextFragment>> = pages
        .into_iter()
        .map(|page| {
            page.into_iter()
                .map(|f| TextFragment::new(f.text, f.relative_height))
                .collect()
        })
        .collect();

    let reference = match today {
        Some(s) => NaiveDate::parse_from_str(s, "%Y-%m-%d")
            .map_err(|e| anyhow::anyhow!("Invalid --today '{}': {}", s, e))?,
        None => now().date(),
    };

    let analysis = settings.inference_engine(reference).analyze(&pages);
    println!("{}", serde_json::to_string_pretty(&analysis)?);
    Ok(())
}

fn recognizer_for(settings: &Settings, name: Option<&str>) -> anyhow::Result<Arc<dyn TextRecognizer>> {
    let recognizer_type = match name {
        Some(name) => RecognizerType::from_str(name)
            .ok_or_else(|| anyhow::anyhow!("Unknown recognizer: {}", name))?,
        None => settings.recognizer,
    };
    let recognizer: Arc<dyn TextRecognizer> =
        Arc::from(build_recognizer(recognizer_type, settings.recognizer_config()));
    ensure_available(recognizer.as_ref())?;
    Ok(recognizer)
}

async fn print_events(mut event_rx: mpsc::Receiver<ScanEvent>) {
    while let Some(event) = event_rx.recv().await {
        match event {
            ScanEvent::PageStarted { .. } => {}
            ScanEvent::PageRecognized { page, lines, .. } => {
                println!("  {} Page {}: {} lines", success(), page, lines);
            }
            ScanEvent::PageFailed { page, error: e, .. } => {
                println!("  {} Page {}: {}", error(), page, e);
            }
            ScanEvent::Inferred { .. } => {}
        }
    }
}

fn print_result(result: &ScanResult) {
    if result.pages_failed > 0 {
        println!(
            "{} {} page(s) could not be read",
            warn(),
            result.pages_failed
        );
    }
    println!(
        "{} {}",
        success(),
        style(display_title(&result.inference.title)).bold()
    );
    println!("  {} ID: {}", dim_arrow(), result.document_id);
    println!(
        "  {} Event date: {}",
        dim_arrow(),
        format_date_time(result.inference.event_date)
    );
}
