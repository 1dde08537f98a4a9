//! Calendar export command.

use std::path::Path;

use chrono::Utc;

use staqq::config::Settings;
use staqq::services::EventDraft;
use staqq::utils::format_date_time;

use crate::cli::helpers::{find_document, now, open_repositories};
use crate::cli::icons::{dim_arrow, success};

/// Export a document as an iCalendar event.
pub async fn cmd_calendar(settings: &Settings, reference: &str, output: Option<&Path>) -> anyhow::Result<()> {
    let (doc_repo, _) = open_repositories(settings)?;
    let doc = find_document(&doc_repo, reference)?;

    let draft = EventDraft::from_document(&doc, now()).with_duration(settings.event_duration_minutes);
    if doc.target_date().is_none() {
        tracing::info!("Document {} has no dates, exporting for now", doc.id);
    }

    let ics = draft.to_ics(&format!("{}@staqq", doc.id), Utc::now());

    match output {
        Some(path) => {
            tokio::fs::write(path, ics).await?;
            println!("{} Wrote {}", success(), path.display());
            println!("  {} {}", dim_arrow(), draft.title);
            println!("  {} {}", dim_arrow(), format_date_time(Some(draft.start)));
        }
        None => print!("{}", ics),
    }
    Ok(())
}
