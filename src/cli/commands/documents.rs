//! Document management commands.

use console::style;

use staqq::config::Settings;
use staqq::models::{
    document_link, normalize_tag_name, parse_document_link, DocumentCard, SidebarCounts,
    SidebarFilter,
};
use staqq::utils::{display_title, format_date, format_date_time, format_due};

use crate::cli::helpers::{find_document, now, open_repositories, parse_date_arg, short_id, truncate};
use crate::cli::icons::{dim_arrow, error, pending, success, warn};

/// Field changes requested by `staqq edit`.
pub struct DocumentEdits {
    pub title: Option<String>,
    pub event: Option<String>,
    pub deadline: Option<String>,
    pub tag: Option<String>,
    pub notes: Option<String>,
}

impl DocumentEdits {
    fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.event.is_none()
            && self.deadline.is_none()
            && self.tag.is_none()
            && self.notes.is_none()
    }
}

/// List documents in a folder.
pub async fn cmd_list(
    settings: &Settings,
    filter: &str,
    tag: Option<&str>,
    search: &str,
    format: &str,
) -> anyhow::Result<()> {
    let (doc_repo, _) = open_repositories(settings)?;

    let filter = match tag {
        Some(tag) => SidebarFilter::Tag(normalize_tag_name(tag).unwrap_or_default()),
        None => SidebarFilter::from_str(filter)
            .ok_or_else(|| anyhow::anyhow!("Unknown folder: {} (inbox, upcoming, all, archived)", filter))?,
    };

    let now = now();
    let documents = doc_repo.list(&filter, search, &settings.upcoming_window(now))?;

    if documents.is_empty() {
        println!("{} No documents in {}", warn(), filter.display_name());
        return Ok(());
    }

    match format {
        "json" => {
            println!("{}", serde_json::to_string_pretty(&documents)?);
        }
        "ids" => {
            for doc in &documents {
                println!("{}", doc.id);
            }
        }
        _ => {
            println!(
                "\n{}  {}",
                style(filter.display_name()).bold(),
                style(format!("({})", documents.len())).dim()
            );
            println!(
                "{:<8}  {:<30}  {:<10}  {:<10}  Tag",
                "ID", "Title", "Event", "Deadline"
            );
            println!("{}", "-".repeat(76));
            for doc in &documents {
                print_row(doc);
            }
        }
    }

    Ok(())
}

fn print_row(doc: &DocumentCard) {
    let title = if doc.is_pending_inference() {
        format!("{} {}", pending(), "Analyzing…")
    } else {
        truncate(display_title(&doc.title), 30)
    };
    let tag = if doc.child_tag.is_empty() {
        String::new()
    } else {
        format!("#{}", doc.child_tag)
    };
    println!(
        "{:<8}  {:<30}  {:<10}  {:<10}  {}",
        short_id(doc),
        title,
        format_date(doc.event_date),
        format_date(doc.deadline_date),
        tag
    );
}

/// Show document counts for each folder.
pub async fn cmd_counts(settings: &Settings) -> anyhow::Result<()> {
    let (doc_repo, tag_repo) = open_repositories(settings)?;
    let docs = doc_repo.all()?;
    let tags = tag_repo.list()?;
    let counts = SidebarCounts::compute(&docs, &tags, &settings.upcoming_window(now()));

    println!("\n{}", style("Folders").bold());
    println!("{}", "-".repeat(40));
    println!("{:<24} {}", SidebarFilter::Inbox.display_name(), counts.inbox);
    println!("{:<24} {}", SidebarFilter::Upcoming.display_name(), counts.upcoming);
    println!("{:<24} {}", SidebarFilter::All.display_name(), counts.all);
    println!("{:<24} {}", SidebarFilter::Archived.display_name(), counts.archived);

    if !counts.tags.is_empty() {
        println!("\n{}", style("Tags").bold());
        println!("{}", "-".repeat(40));
        for (name, count) in &counts.tags {
            println!("{:<24} {}", format!("#{}", name), count);
        }
    }

    Ok(())
}

/// Show a document.
pub async fn cmd_show(settings: &Settings, reference: &str) -> anyhow::Result<()> {
    let (doc_repo, _) = open_repositories(settings)?;
    let doc = find_document(&doc_repo, reference)?;
    print_document(&doc, now());
    Ok(())
}

fn print_document(doc: &DocumentCard, now: chrono::NaiveDateTime) {
    println!("\n{}", style(display_title(&doc.title)).bold());
    println!("{}", "=".repeat(60));
    println!("{:<14} {}", "ID:", doc.id);
    println!("{:<14} {}", "Link:", document_link(&doc.id));
    if doc.is_pending_inference() {
        println!("{:<14} {} {}", "Status:", pending(), "Analyzing…");
    } else if doc.is_archived {
        println!("{:<14} {}", "Status:", style("Archived").dim());
    } else {
        println!("{:<14} {}", "Status:", style("Inbox").green());
    }
    println!("{:<14} {}", "Event:", format_date_time(doc.event_date));
    println!("{:<14} {}", "Deadline:", format_date_time(doc.deadline_date));
    if doc.deadline_date.is_some() && !doc.is_archived {
        println!("{:<14} {}", "", style(format_due(doc.deadline_date, now)).yellow());
    }
    if !doc.child_tag.is_empty() {
        println!("{:<14} #{}", "Tag:", doc.child_tag);
    }
    println!(
        "{:<14} {}",
        "Scanned:",
        doc.created_at
            .with_timezone(&chrono::Local)
            .format("%Y-%m-%d %H:%M")
    );

    println!("\n{} ({})", style("Pages").bold(), doc.page_count());
    println!("{}", "-".repeat(60));
    for (i, path) in doc.image_paths.iter().enumerate() {
        let marker = if path.exists() { success() } else { error() };
        println!("  {} {:>2}. {}", marker, i + 1, path.display());
    }

    if !doc.notes.is_empty() {
        println!("\n{}", style("Notes").bold());
        println!("{}", "-".repeat(60));
        println!("{}", doc.notes);
    }
}

/// Edit document fields.
pub async fn cmd_edit(settings: &Settings, reference: &str, edits: DocumentEdits) -> anyhow::Result<()> {
    if edits.is_empty() {
        println!("{} Nothing to change", warn());
        return Ok(());
    }

    let (doc_repo, tag_repo) = open_repositories(settings)?;
    let doc = find_document(&doc_repo, reference)?;

    // Parse every date before writing anything.
    let event = edits
        .event
        .as_deref()
        .map(|s| parse_date_arg(settings, s))
        .transpose()?;
    let deadline = edits
        .deadline
        .as_deref()
        .map(|s| parse_date_arg(settings, s))
        .transpose()?;

    if let Some(title) = &edits.title {
        doc_repo.set_title(&doc.id, title.trim())?;
        println!("  {} Title: {}", dim_arrow(), display_title(title.trim()));
    }
    if let Some(event) = event {
        doc_repo.set_event_date(&doc.id, event)?;
        println!("  {} Event: {}", dim_arrow(), format_date_time(event));
    }
    if let Some(deadline) = deadline {
        doc_repo.set_deadline(&doc.id, deadline)?;
        println!("  {} Deadline: {}", dim_arrow(), format_date_time(deadline));
    }
    if let Some(tag) = &edits.tag {
        doc_repo.set_tag(&doc.id, tag)?;
        if tag.trim().is_empty() {
            println!("  {} Tag removed", dim_arrow());
        } else {
            let tag = tag_repo.create(tag, None)?;
            println!("  {} Tag: #{}", dim_arrow(), tag.name);
        }
    }
    if let Some(notes) = &edits.notes {
        doc_repo.set_notes(&doc.id, notes)?;
        println!("  {} Notes updated", dim_arrow());
    }

    println!("{} Updated {}", success(), short_id(&doc));
    Ok(())
}

/// Archive or unarchive a document.
pub async fn cmd_set_archived(settings: &Settings, reference: &str, archived: bool) -> anyhow::Result<()> {
    let (doc_repo, _) = open_repositories(settings)?;
    let doc = find_document(&doc_repo, reference)?;

    if doc.is_archived == archived {
        let state = if archived { "archived" } else { "in the inbox" };
        println!("{} Already {}", warn(), state);
        return Ok(());
    }

    doc_repo.set_archived(&doc.id, archived)?;
    let verb = if archived { "Archived" } else { "Moved to inbox" };
    println!("{} {}: {}", success(), verb, display_title(&doc.title));
    Ok(())
}

/// Delete a document. Page images are left on disk.
pub async fn cmd_delete(settings: &Settings, reference: &str, yes: bool) -> anyhow::Result<()> {
    use std::io::{self, Write};

    let (doc_repo, _) = open_repositories(settings)?;
    let doc = find_document(&doc_repo, reference)?;

    println!(
        "Delete '{}' ({}, {} pages)?",
        display_title(&doc.title),
        short_id(&doc),
        doc.page_count()
    );

    if !yes {
        print!("Proceed? [y/N] ");
        io::stdout().flush()?;
        let mut input = String::new();
        io::stdin().read_line(&mut input)?;
        if !input.trim().eq_ignore_ascii_case("y") {
            println!("{} Cancelled", warn());
            return Ok(());
        }
    }

    if doc_repo.delete(&doc.id)? {
        println!("{} Deleted", success());
    } else {
        println!("{} Document was already gone", warn());
    }
    Ok(())
}

/// Resolve a deep link and show the document.
pub async fn cmd_open(settings: &Settings, link: &str) -> anyhow::Result<()> {
    if parse_document_link(link).is_none() {
        anyhow::bail!("Not a document link: {}", link);
    }
    cmd_show(settings, link).await
}
