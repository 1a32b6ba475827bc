use anyhow::{anyhow, Context, Result};
use log::warn;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use crate::database::connection::DEFAULT_DB_FILENAME;
use crate::importer::ErrorLogMode;

/// Application configuration module
/// This module handles the application configuration including loading,
/// validating and saving configuration settings.
/// Represents the application configuration
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Config {
    /// SQLite file holding every batch
    #[serde(default = "default_database_path")]
    pub database_path: PathBuf,

    /// File receiving the rejected rows of an import
    #[serde(default = "default_error_log_path")]
    pub error_log_path: PathBuf,

    /// Whether each import truncates the error log or appends to it
    #[serde(default)]
    pub error_log_mode: ErrorLogMode,

    /// How a ranking is rendered
    #[serde(default)]
    pub view: ViewStyle,

    /// Log level
    #[serde(default)]
    pub log_level: LogLevel,
}

/// Ranking presentation
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum ViewStyle {
    // @view: Grid with position, name, level and score columns
    #[default]
    Table,
    // @view: One line per player
    Text,
    // @view: Machine-readable output
    Json,
}

impl std::fmt::Display for ViewStyle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Table => "table",
            Self::Text => "text",
            Self::Json => "json",
        };
        f.write_str(name)
    }
}

impl std::str::FromStr for ViewStyle {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "table" => Ok(Self::Table),
            "text" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            _ => Err(anyhow!("Invalid view style: {}", s)),
        }
    }
}

/// Log verbosity level
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    /// Matching `log` crate filter
    pub fn to_level_filter(&self) -> log::LevelFilter {
        match self {
            Self::Error => log::LevelFilter::Error,
            Self::Warn => log::LevelFilter::Warn,
            Self::Info => log::LevelFilter::Info,
            Self::Debug => log::LevelFilter::Debug,
            Self::Trace => log::LevelFilter::Trace,
        }
    }
}

fn default_database_path() -> PathBuf {
    PathBuf::from(DEFAULT_DB_FILENAME)
}

fn default_error_log_path() -> PathBuf {
    PathBuf::from("erros.log")
}

impl Config {
    /// Load the configuration at `path`, writing a default one first if the
    /// file does not exist yet
    pub fn load_or_create<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        if path.exists() {
            let file = File::open(path)
                .with_context(|| format!("Failed to open config file: {:?}", path))?;
            let reader = BufReader::new(file);
            let config: Config = serde_json::from_reader(reader)
                .with_context(|| format!("Failed to parse config file: {:?}", path))?;
            return Ok(config);
        }

        warn!("Config file not found at {:?}, creating default config.", path);

        let config = Config::default();
        config.save(path)?;
        Ok(config)
    }

    /// Write the configuration as pretty JSON
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let config_json = serde_json::to_string_pretty(self)
            .context("Failed to serialize config to JSON")?;

        std::fs::write(path, config_json)
            .with_context(|| format!("Failed to write config to file: {:?}", path))?;
        Ok(())
    }

    /// Validate the configuration for consistency and required values
    pub fn validate(&self) -> Result<()> {
        if self.database_path.as_os_str().is_empty() {
            return Err(anyhow!("Database path must not be empty"));
        }

        if self.error_log_path.as_os_str().is_empty() {
            return Err(anyhow!("Error log path must not be empty"));
        }

        // The importer truncates the error log, which would wipe the store
        if self.error_log_path == self.database_path {
            return Err(anyhow!(
                "Error log path must differ from the database path ({:?})",
                self.database_path
            ));
        }

        Ok(())
    }
}

/// Default implementation for Config
impl Default for Config {
    fn default() -> Self {
        Config {
            database_path: default_database_path(),
            error_log_path: default_error_log_path(),
            error_log_mode: ErrorLogMode::default(),
            view: ViewStyle::default(),
            log_level: LogLevel::default(),
        }
    }
}
