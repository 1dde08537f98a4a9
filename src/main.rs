//! Staqq - scanned document organizer.

mod cli;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Log filter used when `RUST_LOG` is unset.
fn default_log_filter(verbose: bool) -> &'static str {
    if verbose {
        "staqq=info"
    } else {
        "staqq=warn"
    }
}

fn init_logging(verbose: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_log_filter(verbose)));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env before reading RUST_LOG.
    let _ = dotenvy::dotenv();
    init_logging(cli::is_verbose());

    cli::run().await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_log_filter() {
        assert_eq!(default_log_filter(true), "staqq=info");
        assert_eq!(default_log_filter(false), "staqq=warn");
        assert!(EnvFilter::try_new(default_log_filter(false)).is_ok());
    }
}
