//! CLI commands implementation.
//!
//! This module contains the CLI parser and dispatches to command-specific modules.

mod calendar;
mod config_cmd;
mod documents;
mod init;
mod scan;
mod tags;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use staqq::config::{load_settings_with_options, LoadOptions};

#[derive(Parser)]
#[command(name = "staqq")]
#[command(about = "Scan paper handouts and keep track of their dates")]
#[command(version)]
pub struct Cli {
    /// Data directory or database file (overrides config file).
    /// Can be a directory containing staqq.db or a .db file directly.
    #[arg(long, short = 'd', global = true, env = "STAQQ_DATA")]
    data: Option<PathBuf>,

    /// Config file path (overrides auto-discovery)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Resolve relative paths from current working directory instead of config file location
    #[arg(long, global = true)]
    cwd: bool,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Check if verbose mode is enabled (for early logging setup).
pub fn is_verbose() -> bool {
    std::env::args().any(|arg| arg == "-v" || arg == "--verbose")
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize the data directory and database
    Init {
        /// Also write a config file with the current settings
        #[arg(long)]
        write_config: bool,
    },

    /// Scan page images into a new document
    Scan {
        /// Page images, in page order
        #[arg(required = true)]
        images: Vec<PathBuf>,
        /// File the document under this tag
        #[arg(short, long)]
        tag: Option<String>,
        /// Recognizer to use (tesseract, sidecar)
        #[arg(short, long)]
        recognizer: Option<String>,
    },

    /// Infer title and date from recognized fragments in a JSON file
    Infer {
        /// JSON file: an array of pages, each an array of {text, relative_height}
        file: PathBuf,
        /// Reference date for dates written without a year (YYYY-MM-DD)
        #[arg(long)]
        today: Option<String>,
    },

    /// List documents
    #[command(alias = "ls")]
    List {
        /// Folder: inbox, upcoming, all, archived
        #[arg(short, long, default_value = "inbox")]
        filter: String,
        /// Only documents filed under this tag
        #[arg(short, long)]
        tag: Option<String>,
        /// Only documents whose title, tag or notes contain this text
        #[arg(short, long, default_value = "")]
        search: String,
        /// Output format (table, json, ids)
        #[arg(long, default_value = "table")]
        format: String,
        /// Show document counts per folder instead of documents
        #[arg(long)]
        counts: bool,
    },

    /// Show a document
    Show {
        /// Document ID, ID prefix, or staqq:// link
        doc: String,
    },

    /// Edit document fields
    Edit {
        /// Document ID, ID prefix, or staqq:// link
        doc: String,
        #[arg(long)]
        title: Option<String>,
        /// Event date ("none" clears)
        #[arg(long)]
        event: Option<String>,
        /// Deadline ("none" clears)
        #[arg(long)]
        deadline: Option<String>,
        /// Tag ("" files the document as uncategorized)
        #[arg(long)]
        tag: Option<String>,
        #[arg(long)]
        notes: Option<String>,
    },

    /// Run recognition and inference again for a document
    Rescan {
        /// Document ID, ID prefix, or staqq:// link
        doc: String,
        /// Recognizer to use (tesseract, sidecar)
        #[arg(short, long)]
        recognizer: Option<String>,
    },

    /// Archive a document
    Archive {
        /// Document ID, ID prefix, or staqq:// link
        doc: String,
    },

    /// Move an archived document back to the inbox
    Unarchive {
        /// Document ID, ID prefix, or staqq:// link
        doc: String,
    },

    /// Delete a document
    Delete {
        /// Document ID, ID prefix, or staqq:// link
        doc: String,
        /// Skip confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },

    /// Manage tags
    Tags {
        #[command(subcommand)]
        command: TagCommands,
    },

    /// Export a document as a calendar event (.ics)
    Calendar {
        /// Document ID, ID prefix, or staqq:// link
        doc: String,
        /// Write to this file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Open a staqq://document link
    Open {
        /// Link such as staqq://document?id=<uuid>
        link: String,
    },

    /// Show resolved configuration
    Config {
        /// Print as TOML config file contents
        #[arg(long)]
        toml: bool,
    },
}

#[derive(Subcommand)]
enum TagCommands {
    /// List tags with document counts
    List,
    /// Create a tag
    Add {
        name: String,
        /// Color as #RRGGBB
        #[arg(long)]
        color: Option<String>,
    },
    /// Delete a tag (documents keep their tag text)
    Remove { name: String },
    /// Create tags for every tag used by a document
    Sync,
}

/// Run the CLI.
pub async fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let options = LoadOptions {
        config_path: cli.config,
        use_cwd: cli.cwd,
        data: cli.data,
    };
    let (settings, config) = load_settings_with_options(options).await;

    match cli.command {
        Commands::Init { write_config } => init::cmd_init(&settings, &config, write_config).await,
        Commands::Scan {
            images,
            tag,
            recognizer,
        } => scan::cmd_scan(&settings, images, tag.as_deref(), recognizer.as_deref()).await,
        Commands::Infer { file, today } => {
            scan::cmd_infer(&settings, &file, today.as_deref()).await
        }
        Commands::List {
            filter,
            tag,
            search,
            format,
            counts,
        } => {
            if counts {
                documents::cmd_counts(&settings).await
            } else {
                documents::cmd_list(&settings, &filter, tag.as_deref(), &search, &format).await
            }
        }
        Commands::Show { doc } => documents::cmd_show(&settings, &doc).await,
        Commands::Edit {
            doc,
            title,
            event,
            deadline,
            tag,
            notes,
        } => {
            let edits = documents::DocumentEdits {
                title,
                event,
                deadline,
                tag,
                notes,
            };
            documents::cmd_edit(&settings, &doc, edits).await
        }
        Commands::Rescan { doc, recognizer } => {
            scan::cmd_rescan(&settings, &doc, recognizer.as_deref()).await
        }
        Commands::Archive { doc } => documents::cmd_set_archived(&settings, &doc, true).await,
        Commands::Unarchive { doc } => documents::cmd_set_archived(&settings, &doc, false).await,
        Commands::Delete { doc, yes } => documents::cmd_delete(&settings, &doc, yes).await,
        Commands::Tags { command } => match command {
            TagCommands::List => tags::cmd_tags_list(&settings).await,
            TagCommands::Add { name, color } => {
                tags::cmd_tags_add(&settings, &name, color.as_deref()).await
            }
            TagCommands::Remove { name } => tags::cmd_tags_remove(&settings, &name).await,
            TagCommands::Sync => tags::cmd_tags_sync(&settings).await,
        },
        Commands::Calendar { doc, output } => {
            calendar::cmd_calendar(&settings, &doc, output.as_deref()).await
        }
        Commands::Open { link } => documents::cmd_open(&settings, &link).await,
        Commands::Config { toml } => config_cmd::cmd_config_show(&settings, &config, toml).await,
    }
}
