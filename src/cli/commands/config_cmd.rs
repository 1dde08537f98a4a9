//! Configuration commands.

use console::style;

use staqq::config::{Config, Settings};

/// Show the resolved settings and where they came from.
pub async fn cmd_config_show(settings: &Settings, config: &Config, as_toml: bool) -> anyhow::Result<()> {
    if as_toml {
        print!("{}", config.to_toml());
        return Ok(());
    }

    let source = config
        .source_path
        .as_ref()
        .map(|p| p.display().to_string())
        .unwrap_or_else(|| "defaults (no config file found)".to_string());

    let locales: Vec<&str> = settings.locales.iter().map(|l| l.as_str()).collect();

    println!("\n{}", style("Configuration").bold());
    println!("{}", "-".repeat(40));
    println!("{:<20} {}", "Config:", source);
    println!("{:<20} {}", "Data dir:", settings.data_dir.display());
    println!("{:<20} {}", "Database:", settings.database_path().display());
    println!("{:<20} {}", "Locales:", locales.join(", "));
    println!("{:<20} {}", "Recognizer:", settings.recognizer);
    println!("{:<20} {} days", "Upcoming window:", settings.upcoming_days);
    println!("{:<20} {}", "Fallback title:", settings.fallback_title);
    println!(
        "{:<20} {} min",
        "Event duration:", settings.event_duration_minutes
    );

    Ok(())
}
