//! Initialize command.

use console::style;

use staqq::config::{Config, Settings};
use staqq::repository::{DocumentRepository, TagRepository};

use crate::cli::icons::{dim_arrow, success, warn};

/// Initialize the data directory and database.
pub async fn cmd_init(settings: &Settings, config: &Config, write_config: bool) -> anyhow::Result<()> {
    settings.ensure_directories()?;

    let db_path = settings.database_path();
    let doc_repo = DocumentRepository::new(&db_path)?;
    let tag_repo = TagRepository::new(&db_path)?;

    // Create a tag row for every tag text already used by a document.
    let created = tag_repo.sync_from_documents(&doc_repo.used_tags()?)?;
    for tag in &created {
        println!("  {} Added tag: {}", success(), tag.name);
    }

    if write_config {
        let path = settings.data_dir.join("staqq.toml");
        if path.exists() {
            println!("{} Config already exists: {}", warn(), path.display());
        } else {
            let mut snapshot = config.clone();
            snapshot.locales = settings.locales.iter().map(|l| l.as_str().to_string()).collect();
            snapshot.recognizer = Some(settings.recognizer.as_str().to_string());
            snapshot.upcoming_days = Some(settings.upcoming_days as u64);
            tokio::fs::write(&path, snapshot.to_toml()).await?;
            println!("  {} Wrote {}", dim_arrow(), path.display());
        }
    }

    println!(
        "{} Initialized Staqq in {}",
        success(),
        style(settings.data_dir.display()).bold()
    );
    println!("  {} {} documents", dim_arrow(), doc_repo.count()?);

    Ok(())
}
