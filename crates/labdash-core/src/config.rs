//! Configuration types for labdash.
//!
//! [`Config::load`] reads `~/.config/labdash/config.toml`, creating it with
//! hardcoded defaults if it does not yet exist, then applies `LABDASH_*`
//! environment overrides (`LABDASH_API__BASE_URL=http://…`).
//! [`Config::defaults`] returns the same defaults without touching the
//! filesystem (useful in tests).

use crate::period::Period;
use chrono::{FixedOffset, Offset, Utc};
use serde::{Deserialize, Deserializer};
use std::path::{Path, PathBuf};

// ---------------------------------------------------------------------------
// Embedded defaults
// ---------------------------------------------------------------------------

const DEFAULT_CONFIG: &str = r#"
[api]
base_url     = "http://localhost:3000"
timeout_secs = 30
# Offset for API timestamps that carry none ("utc", "-06:00"). Local time when unset.
# timestamp_offset = "utc"

[tables]
users_page_size = 10
logs_page_size  = 25

[dashboard]
default_period = "7days"

[logging]
debug_file = "/tmp/labdash-debug.log"

[session]
# file = "/path/to/session.json"
"#;

// ---------------------------------------------------------------------------
// Public config types
// ---------------------------------------------------------------------------

/// Top-level application configuration, loaded from `~/.config/labdash/config.toml`.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub tables: TablesConfig,
    #[serde(default)]
    pub dashboard: DashboardConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub session: SessionConfig,
}

/// `[api]` section of `config.toml`.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Zone for offset-less API timestamps; `None` reads them as local time.
    #[serde(default, deserialize_with = "deserialize_offset")]
    pub timestamp_offset: Option<FixedOffset>,
}

fn default_base_url() -> String { "http://localhost:3000".to_string() }
fn default_timeout_secs() -> u64 { 30 }

fn deserialize_offset<'de, D: Deserializer<'de>>(de: D) -> Result<Option<FixedOffset>, D::Error> {
    let raw: Option<String> = Option::deserialize(de)?;
    raw.map(|s| {
        if s.trim().eq_ignore_ascii_case("utc") {
            Ok(Utc.fix())
        } else {
            s.trim().parse::<FixedOffset>().map_err(serde::de::Error::custom)
        }
    })
    .transpose()
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
            timestamp_offset: None,
        }
    }
}

/// `[tables]` section of `config.toml`.
#[derive(Debug, Clone, Deserialize)]
pub struct TablesConfig {
    #[serde(default = "default_users_page_size")]
    pub users_page_size: usize,
    #[serde(default = "default_logs_page_size")]
    pub logs_page_size: usize,
}

fn default_users_page_size() -> usize { 10 }
fn default_logs_page_size() -> usize { 25 }

impl Default for TablesConfig {
    fn default() -> Self {
        Self {
            users_page_size: default_users_page_size(),
            logs_page_size: default_logs_page_size(),
        }
    }
}

/// `[dashboard]` section of `config.toml`.
#[derive(Debug, Clone, Deserialize)]
pub struct DashboardConfig {
    #[serde(default = "default_period")]
    pub default_period: Period,
}

fn default_period() -> Period { Period::SevenDays }

impl Default for DashboardConfig {
    fn default() -> Self {
        Self { default_period: default_period() }
    }
}

/// `[logging]` section of `config.toml`.
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Written to when the binary runs with `--debug`.
    #[serde(default = "default_debug_file")]
    pub debug_file: PathBuf,
}

fn default_debug_file() -> PathBuf { PathBuf::from("/tmp/labdash-debug.log") }

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { debug_file: default_debug_file() }
    }
}

/// `[session]` section of `config.toml`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SessionConfig {
    /// Defaults to `~/.config/labdash/session.json`.
    #[serde(default)]
    pub file: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self::defaults()
    }
}

impl Config {
    /// Load from `~/.config/labdash/config.toml`, layered on top of the
    /// built-in defaults. Creates the file with defaults if it does not exist.
    pub fn load() -> anyhow::Result<Self> {
        let path = config_dir().join("config.toml");

        if !path.exists() {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::write(&path, DEFAULT_CONFIG.trim_start())?;
        }

        Self::load_from(&path)
    }

    /// Defaults, then `path` (if present), then the environment.
    pub fn load_from(path: &Path) -> anyhow::Result<Self> {
        config::Config::builder()
            .add_source(config::File::from_str(DEFAULT_CONFIG, config::FileFormat::Toml))
            .add_source(config::File::from(path).required(false))
            .add_source(
                config::Environment::with_prefix("LABDASH")
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()?
            .try_deserialize()
            .map_err(Into::into)
    }

    /// Return the built-in defaults without touching the filesystem.
    pub fn defaults() -> Self {
        config::Config::builder()
            .add_source(config::File::from_str(DEFAULT_CONFIG, config::FileFormat::Toml))
            .build()
            .expect("built-in default config must be valid TOML")
            .try_deserialize()
            .expect("built-in default config must deserialize correctly")
    }

    /// Session file from config, or the default location.
    pub fn session_path(&self) -> PathBuf {
        self.session
            .file
            .clone()
            .unwrap_or_else(crate::session::SessionStore::default_path)
    }
}

// ---------------------------------------------------------------------------
// Path helpers
// ---------------------------------------------------------------------------

/// `$XDG_CONFIG_HOME/labdash`, falling back to `~/.config/labdash`.
pub fn config_dir() -> PathBuf {
    std::env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".to_string()))
                .join(".config")
        })
        .join("labdash")
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
