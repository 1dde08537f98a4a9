//! Tag management commands.

use console::style;

use staqq::config::Settings;
use staqq::models::{SidebarCounts, DEFAULT_TAG_COLOR};

use crate::cli::helpers::{now, open_repositories};
use crate::cli::icons::{success, warn};

/// List tags with their document counts.
pub async fn cmd_tags_list(settings: &Settings) -> anyhow::Result<()> {
    let (doc_repo, tag_repo) = open_repositories(settings)?;
    let tags = tag_repo.list()?;

    if tags.is_empty() {
        println!("{} No tags yet. Create one with 'staqq tags add <name>'", warn());
        return Ok(());
    }

    let docs = doc_repo.all()?;
    let counts = SidebarCounts::compute(&docs, &tags, &settings.upcoming_window(now()));

    println!("\n{:<22} {:<9} Documents", "Tag", "Color");
    println!("{}", "-".repeat(42));
    for (tag, (_, count)) in tags.iter().zip(counts.tags.iter()) {
        println!("{:<22} {:<9} {}", format!("#{}", tag.name), tag.color_hex, count);
    }

    Ok(())
}

/// Create a tag.
pub async fn cmd_tags_add(settings: &Settings, name: &str, color: Option<&str>) -> anyhow::Result<()> {
    let (_, tag_repo) = open_repositories(settings)?;

    if let Some(existing) = tag_repo.get_by_name(name)? {
        println!("{} Tag already exists: #{}", warn(), existing.name);
        return Ok(());
    }

    let tag = tag_repo.create(name, color)?;
    if color.is_some_and(|c| !c.eq_ignore_ascii_case(&tag.color_hex)) {
        println!(
            "{} Invalid color, using {}",
            warn(),
            style(DEFAULT_TAG_COLOR).dim()
        );
    }
    println!("{} Created tag #{}", success(), tag.name);
    Ok(())
}

/// Delete a tag. Documents keep their tag text.
pub async fn cmd_tags_remove(settings: &Settings, name: &str) -> anyhow::Result<()> {
    let (_, tag_repo) = open_repositories(settings)?;

    if tag_repo.delete(name)? {
        println!("{} Deleted tag #{}", success(), name.trim());
    } else {
        println!("{} No tag named {}", warn(), name.trim());
    }
    Ok(())
}

/// Create tags for every tag name used by a document.
pub async fn cmd_tags_sync(settings: &Settings) -> anyhow::Result<()> {
    let (doc_repo, tag_repo) = open_repositories(settings)?;
    let created = tag_repo.sync_from_documents(&doc_repo.used_tags()?)?;

    if created.is_empty() {
        println!("{} Tags already up to date", success());
    } else {
        for tag in &created {
            println!("  {} Added #{}", success(), tag.name);
        }
        println!("{} Created {} tag(s)", success(), created.len());
    }
    Ok(())
}
