//! Configuration management for Staqq using the prefer crate.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::dates::{parse_locales, DateLocale, PatternDateExtractor};
use crate::inference::{InferenceEngine, UNTITLED_DOCUMENT};
use crate::models::{UpcomingWindow, DEFAULT_UPCOMING_DAYS, MAX_UPCOMING_DAYS};
use crate::ocr::{RecognizerConfig, RecognizerType};
use crate::services::{DEFAULT_EVENT_MINUTES, MAX_EVENT_MINUTES};

/// Default database filename.
pub const DEFAULT_DATABASE_FILENAME: &str = "staqq.db";

/// Environment variable overriding the data directory.
pub const DATA_DIR_ENV: &str = "STAQQ_DATA_DIR";

/// Environment variable overriding the locale list (comma separated).
pub const LOCALES_ENV: &str = "STAQQ_LOCALES";

/// Errors from loading configuration files.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse TOML config: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Failed to parse YAML config: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Failed to parse JSON config: {0}")]
    Json(#[from] serde_json::Error),
}

/// Application settings.
#[derive(Debug, Clone)]
pub struct Settings {
    /// Base data directory.
    pub data_dir: PathBuf,
    /// Database filename inside the data directory.
    pub database_filename: String,
    /// Recognition and date locales, primary first.
    pub locales: Vec<DateLocale>,
    /// Text recognizer used for new scans.
    pub recognizer: RecognizerType,
    /// Look-ahead of the upcoming-deadlines filter.
    pub upcoming_days: i64,
    /// Title given to documents with no usable heading.
    pub fallback_title: String,
    /// Length of exported calendar events.
    pub event_duration_minutes: i64,
}

impl Default for Settings {
    fn default() -> Self {
        // Platform data dir -> Home dir -> Current dir
        let data_dir = dirs::data_dir()
            .or_else(dirs::home_dir)
            .unwrap_or_else(|| PathBuf::from("."))
            .join("staqq");

        Self {
            data_dir,
            database_filename: DEFAULT_DATABASE_FILENAME.to_string(),
            locales: vec![DateLocale::Japanese, DateLocale::English],
            recognizer: RecognizerType::Tesseract,
            upcoming_days: DEFAULT_UPCOMING_DAYS,
            fallback_title: UNTITLED_DOCUMENT.to_string(),
            event_duration_minutes: DEFAULT_EVENT_MINUTES,
        }
    }
}

impl Settings {
    /// Create settings with a custom data directory.
    pub fn with_data_dir(data_dir: PathBuf) -> Self {
        Self {
            data_dir,
            ..Default::default()
        }
    }

    /// Get the full path to the database.
    pub fn database_path(&self) -> PathBuf {
        self.data_dir.join(&self.database_filename)
    }

    /// Check if the database appears to be initialized.
    pub fn database_exists(&self) -> bool {
        self.database_path().exists()
    }

    /// Ensure the data directory exists.
    pub fn ensure_directories(&self) -> std::io::Result<()> {
        fs::create_dir_all(&self.data_dir).map_err(|e| {
            std::io::Error::new(
                e.kind(),
                format!(
                    "Failed to create data directory '{}': {}",
                    self.data_dir.display(),
                    e
                ),
            )
        })
    }

    /// Date extractor resolving year-less dates against `reference`.
    pub fn date_extractor(&self, reference: NaiveDate) -> PatternDateExtractor {
        PatternDateExtractor::with_locales(reference, self.locales.clone())
    }

    /// Inference engine for the configured locales and fallback title.
    pub fn inference_engine(&self, reference: NaiveDate) -> InferenceEngine {
        InferenceEngine::new(self.date_extractor(reference))
            .with_fallback_title(self.fallback_title.clone())
    }

    pub fn recognizer_config(&self) -> RecognizerConfig {
        RecognizerConfig::new(self.locales.clone())
    }

    pub fn upcoming_window(&self, now: NaiveDateTime) -> UpcomingWindow {
        UpcomingWindow::new(now, self.upcoming_days)
    }
}

/// Configuration file structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize, prefer::FromValue)]
pub struct Config {
    /// Data directory path.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_dir: Option<String>,
    /// Database filename.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub database: Option<String>,
    /// Locale tags such as `ja-JP` and `en-US`, primary first.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    #[prefer(default)]
    pub locales: Vec<String>,
    /// Recognizer name (`tesseract` or `sidecar`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recognizer: Option<String>,
    /// Days ahead counted as upcoming.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub upcoming_days: Option<u64>,
    /// Title for documents without a usable heading.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fallback_title: Option<String>,
    /// Calendar event length in minutes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub event_duration_minutes: Option<u64>,
    /// Path to the config file this was loaded from (not serialized).
    #[serde(skip)]
    #[prefer(skip)]
    pub source_path: Option<PathBuf>,
}

impl Config {
    /// Load configuration using prefer crate for discovery.
    /// Automatically discovers staqq config files in standard locations.
    pub async fn load() -> Self {
        match prefer::load("staqq").await {
            Ok(pref_config) => {
                if let Some(path) = pref_config.source_path() {
                    match Self::load_from_path(path).await {
                        Ok(config) => config,
                        Err(e) => {
                            tracing::warn!("Ignoring config {}: {}", path.display(), e);
                            Self::default()
                        }
                    }
                } else {
                    Self::default()
                }
            }
            // No config file found
            Err(_) => Self::default(),
        }
    }

    /// Load configuration from a specific file path.
    /// Supports JSON, TOML and YAML based on file extension.
    pub async fn load_from_path(path: &Path) -> Result<Self, ConfigError> {
        let contents =
            tokio::fs::read_to_string(path)
                .await
                .map_err(|source| ConfigError::Read {
                    path: path.to_path_buf(),
                    source,
                })?;

        let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("json");
        let mut config = Self::parse(&contents, ext)?;
        config.source_path = Some(path.to_path_buf());
        Ok(config)
    }

    /// Parse config text in the format named by `ext`.
    pub fn parse(contents: &str, ext: &str) -> Result<Self, ConfigError> {
        let config = match ext {
            "toml" => toml::from_str(contents)?,
            "yaml" | "yml" => serde_yaml::from_str(contents)?,
            _ => serde_json::from_str(contents)?,
        };
        Ok(config)
    }

    /// Get the base directory for resolving relative paths.
    pub fn base_dir(&self) -> Option<PathBuf> {
        self.source_path
            .as_ref()
            .and_then(|p| p.parent().map(|p| p.to_path_buf()))
    }

    /// Resolve a path that may be relative to the config file.
    /// - Absolute paths are returned as-is
    /// - Paths starting with ~ are expanded
    /// - Relative paths are resolved relative to `base_dir`
    pub fn resolve_path(&self, path_str: &str, base_dir: &Path) -> PathBuf {
        let expanded = shellexpand::tilde(path_str);
        let path = Path::new(expanded.as_ref());
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            base_dir.join(path)
        }
    }

    /// Apply configuration to settings.
    /// `base_dir` is used to resolve relative paths (typically config file dir or CWD).
    pub fn apply_to_settings(&self, settings: &mut Settings, base_dir: &Path) {
        if let Some(ref data_dir) = self.data_dir {
            settings.data_dir = self.resolve_path(data_dir, base_dir);
        }
        if let Some(ref database) = self.database {
            settings.database_filename = database.clone();
        }
        if !self.locales.is_empty() {
            let locales = parse_locales(&self.locales);
            if !locales.is_empty() {
                settings.locales = locales;
            }
        }
        if let Some(ref name) = self.recognizer {
            match RecognizerType::from_str(name) {
                Some(recognizer) => settings.recognizer = recognizer,
                None => tracing::warn!("Unknown recognizer '{}', using {}", name, settings.recognizer),
            }
        }
        if let Some(days) = self.upcoming_days {
            settings.upcoming_days = i64::try_from(days)
                .unwrap_or(i64::MAX)
                .min(MAX_UPCOMING_DAYS);
        }
        if let Some(ref title) = self.fallback_title {
            if !title.trim().is_empty() {
                settings.fallback_title = title.clone();
            }
        }
        if let Some(minutes) = self.event_duration_minutes {
            settings.event_duration_minutes = i64::try_from(minutes)
                .unwrap_or(i64::MAX)
                .clamp(1, MAX_EVENT_MINUTES);
        }
    }

    /// Serialize to TOML, the format `staqq init` writes.
    pub fn to_toml(&self) -> String {
        toml::to_string_pretty(self).unwrap_or_default()
    }
}

/// Options for loading settings.
#[derive(Debug, Clone, Default)]
pub struct LoadOptions {
    /// Explicit config file path (overrides auto-discovery).
    pub config_path: Option<PathBuf>,
    /// Use CWD for relative paths instead of config file directory.
    pub use_cwd: bool,
    /// Data directory or database file (--data flag).
    pub data: Option<PathBuf>,
}

/// Resolved data path information.
#[derive(Debug, Clone)]
pub struct ResolvedData {
    /// Directory holding the database.
    pub data_dir: PathBuf,
    /// The database filename.
    pub database_filename: String,
}

impl ResolvedData {
    /// Resolve a data path to a directory and database filename.
    /// - If path is a .db file, use its parent and file name
    /// - If path is a directory, look for staqq.db inside
    pub fn from_path(path: &Path) -> Self {
        let path = if path.is_absolute() {
            path.to_path_buf()
        } else {
            std::env::current_dir()
                .unwrap_or_else(|_| PathBuf::from("."))
                .join(path)
        };

        let is_db_file = path
            .extension()
            .is_some_and(|ext| ext == "db" || ext == "sqlite" || ext == "sqlite3")
            || path.is_file();

        if is_db_file {
            let database_filename = path
                .file_name()
                .and_then(|n| n.to_str())
                .unwrap_or(DEFAULT_DATABASE_FILENAME)
                .to_string();
            Self {
                data_dir: path.parent().unwrap_or(Path::new(".")).to_path_buf(),
                database_filename,
            }
        } else {
            Self {
                data_dir: path,
                database_filename: DEFAULT_DATABASE_FILENAME.to_string(),
            }
        }
    }
}

/// Look for a config file next to the database.
fn find_config_next_to_db(data_dir: &Path) -> Option<PathBuf> {
    let extensions = ["toml", "yaml", "yml", "json"];
    let basenames = ["staqq", "config"];

    for basename in basenames {
        for ext in extensions {
            let path = data_dir.join(format!("{}.{}", basename, ext));
            if path.exists() {
                return Some(path);
            }
        }
    }
    None
}

/// Load config from file sources.
async fn load_file_config(options: &LoadOptions, data_dir: Option<&Path>) -> Config {
    // Priority 1: Explicit --config flag
    if let Some(ref config_path) = options.config_path {
        return match Config::load_from_path(config_path).await {
            Ok(config) => config,
            Err(e) => {
                tracing::warn!("{}", e);
                Config::default()
            }
        };
    }

    // Priority 2: Config next to data dir
    if let Some(data_dir) = data_dir {
        if let Some(config_path) = find_config_next_to_db(data_dir) {
            tracing::debug!("Found config next to data dir: {}", config_path.display());
            match Config::load_from_path(&config_path).await {
                Ok(config) => return config,
                Err(e) => tracing::warn!("{}", e),
            }
        }
    }

    // Priority 3: Auto-discover via prefer
    Config::load().await
}

/// Apply `STAQQ_*` environment overrides.
fn apply_env_overrides(settings: &mut Settings) {
    if let Some(dir) = std::env::var(DATA_DIR_ENV).ok().filter(|s| !s.is_empty()) {
        tracing::debug!("Using {} from environment: {}", DATA_DIR_ENV, dir);
        settings.data_dir = PathBuf::from(shellexpand::tilde(&dir).as_ref());
    }

    if let Some(tags) = std::env::var(LOCALES_ENV).ok().filter(|s| !s.is_empty()) {
        let tags: Vec<&str> = tags.split(',').map(str::trim).collect();
        let locales = parse_locales(&tags);
        if !locales.is_empty() {
            settings.locales = locales;
        }
    }
}

/// Load settings with explicit options.
/// Returns (Settings, Config) tuple.
pub async fn load_settings_with_options(options: LoadOptions) -> (Settings, Config) {
    let resolved = options.data.as_deref().map(ResolvedData::from_path);
    let config = load_file_config(&options, resolved.as_ref().map(|r| r.data_dir.as_path())).await;

    let mut settings = Settings::default();

    let base_dir = if options.use_cwd {
        std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."))
    } else {
        config
            .base_dir()
            .unwrap_or_else(|| std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")))
    };

    config.apply_to_settings(&mut settings, &base_dir);
    apply_env_overrides(&mut settings);

    // --data override takes precedence over config and environment
    if let Some(resolved) = resolved {
        settings.data_dir = resolved.data_dir;
        settings.database_filename = resolved.database_filename;
    }

    (settings, config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_formats() {
        let toml = Config::parse("locales = [\"en-US\"]\nupcoming_days = 7\n", "toml").unwrap();
        assert_eq!(toml.locales, vec!["en-US".to_string()]);
        assert_eq!(toml.upcoming_days, Some(7));

        let yaml = Config::parse("recognizer: sidecar\n", "yaml").unwrap();
        assert_eq!(yaml.recognizer.as_deref(), Some("sidecar"));

        let json = Config::parse(r#"{"fallback_title": "新しいドキュメント"}"#, "json").unwrap();
        assert_eq!(json.fallback_title.as_deref(), Some("新しいドキュメント"));

        assert!(Config::parse("not = [valid", "toml").is_err());
    }

    #[test]
    fn test_apply_to_settings() {
        let config = Config {
            data_dir: Some("data".to_string()),
            database: Some("docs.db".to_string()),
            locales: vec!["en-US".to_string(), "xx".to_string()],
            recognizer: Some("sidecar".to_string()),
            upcoming_days: Some(5),
            fallback_title: Some("  ".to_string()),
            event_duration_minutes: Some(0),
            source_path: None,
        };
        let mut settings = Settings::default();
        config.apply_to_settings(&mut settings, Path::new("/base"));

        assert_eq!(settings.data_dir, PathBuf::from("/base/data"));
        assert_eq!(settings.database_path(), PathBuf::from("/base/data/docs.db"));
        assert_eq!(settings.locales, vec![DateLocale::English]);
        assert_eq!(settings.recognizer, RecognizerType::Sidecar);
        assert_eq!(settings.upcoming_days, 5);
        assert_eq!(settings.fallback_title, UNTITLED_DOCUMENT);
        assert_eq!(settings.event_duration_minutes, 1);
    }

    #[test]
    fn test_large_values_are_clamped() {
        let config = Config::parse(
            "upcoming_days = 1000000000\nevent_duration_minutes = 1000000000000\n",
            "toml",
        )
        .unwrap();
        let mut settings = Settings::default();
        config.apply_to_settings(&mut settings, Path::new("/"));
        assert_eq!(settings.upcoming_days, MAX_UPCOMING_DAYS);
        assert_eq!(settings.event_duration_minutes, MAX_EVENT_MINUTES);

        let now = chrono::NaiveDate::from_ymd_opt(2026, 3, 10)
            .unwrap()
            .and_hms_opt(9, 0, 0)
            .unwrap();
        let window = settings.upcoming_window(now);
        assert_eq!(window.threshold(), now + chrono::Duration::days(MAX_UPCOMING_DAYS));
    }

    #[test]
    fn test_unknown_recognizer_keeps_default() {
        let config = Config {
            recognizer: Some("paddle".to_string()),
            ..Default::default()
        };
        let mut settings = Settings::default();
        config.apply_to_settings(&mut settings, Path::new("/"));
        assert_eq!(settings.recognizer, RecognizerType::Tesseract);
    }

    #[test]
    fn test_resolved_data() {
        let file = ResolvedData::from_path(Path::new("/tmp/somewhere/mine.db"));
        assert_eq!(file.data_dir, PathBuf::from("/tmp/somewhere"));
        assert_eq!(file.database_filename, "mine.db");

        let dir = ResolvedData::from_path(Path::new("/tmp/staqq-data-dir-that-does-not-exist"));
        assert_eq!(dir.database_filename, DEFAULT_DATABASE_FILENAME);
    }

    #[test]
    fn test_config_file_next_to_data() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(find_config_next_to_db(dir.path()), None);
        std::fs::write(dir.path().join("staqq.yaml"), "upcoming_days: 2\n").unwrap();
        assert_eq!(
            find_config_next_to_db(dir.path()),
            Some(dir.path().join("staqq.yaml"))
        );
    }
}
