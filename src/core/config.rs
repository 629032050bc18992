//! Configuration management with layered hierarchy
//!
//! Sources, lowest priority first:
//! 1. Built-in defaults
//! 2. Global user config (`<config dir>/areg/config.yaml`)
//! 3. Local config (`areg.yaml` in the working directory)
//! 4. Environment variables (`AREG_DATABASE`, `AREG_TABLE`)
//!
//! Command-line flags are applied on top by the CLI.

use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, warn};

use crate::core::filter::FilterGate;
use crate::core::loader::{NormalizeOptions, RegistrySource, DEFAULT_DATABASE, DEFAULT_TABLE};
use crate::core::normalize::{DateParsePolicy, NullTextPolicy};

/// Name of the per-directory config file
pub const LOCAL_CONFIG_FILE: &str = "areg.yaml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config file {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config file {path:?}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yml::Error,
    },
}

/// Registry configuration
#[derive(Debug, Default, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Config {
    /// SQLite file holding the registry
    pub database: Option<PathBuf>,

    /// Registry table name
    pub table: Option<String>,

    /// Rendering of NULL text columns
    pub null_text: Option<NullTextPolicy>,

    /// Behaviour on malformed acquisition dates
    pub date_parsing: Option<DateParsePolicy>,

    /// Whether zero age bounds count as an active filter
    pub filter_gate: Option<FilterGate>,

    /// Default output format
    pub default_format: Option<String>,
}

impl Config {
    /// Load configuration from all sources, merging in priority order
    pub fn load() -> Self {
        let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
        let mut config = Self::load_files(Self::global_config_path().as_deref(), &cwd);

        if let Ok(database) = std::env::var("AREG_DATABASE") {
            config.database = Some(PathBuf::from(database));
        }
        if let Ok(table) = std::env::var("AREG_TABLE") {
            config.table = Some(table);
        }

        config
    }

    /// Merge the global file (if any) and the local file from `dir`
    ///
    /// Unreadable or invalid files are skipped with a warning.
    pub fn load_files(global: Option<&Path>, dir: &Path) -> Self {
        let mut config = Config::default();

        let local = dir.join(LOCAL_CONFIG_FILE);
        for path in global.into_iter().chain(std::iter::once(local.as_path())) {
            if !path.exists() {
                continue;
            }
            match Self::read_file(path) {
                Ok(layer) => {
                    debug!(path = %path.display(), "config layer loaded");
                    config.merge(layer);
                }
                Err(e) => warn!("{}", e),
            }
        }

        config
    }

    /// Parse one YAML config file
    pub fn read_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        if contents.trim().is_empty() {
            return Ok(Self::default());
        }

        serde_yml::from_str(&contents).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Get the path to the global config file
    fn global_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("", "", "areg").map(|dirs| dirs.config_dir().join("config.yaml"))
    }

    /// Merge another config into this one (other takes precedence)
    pub fn merge(&mut self, other: Config) {
        if other.database.is_some() {
            self.database = other.database;
        }
        if other.table.is_some() {
            self.table = other.table;
        }
        if other.null_text.is_some() {
            self.null_text = other.null_text;
        }
        if other.date_parsing.is_some() {
            self.date_parsing = other.date_parsing;
        }
        if other.filter_gate.is_some() {
            self.filter_gate = other.filter_gate;
        }
        if other.default_format.is_some() {
            self.default_format = other.default_format;
        }
    }

    pub fn database(&self) -> PathBuf {
        self.database
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_DATABASE))
    }

    pub fn table(&self) -> String {
        self.table.clone().unwrap_or_else(|| DEFAULT_TABLE.to_string())
    }

    pub fn filter_gate(&self) -> FilterGate {
        self.filter_gate.unwrap_or_default()
    }

    pub fn normalize_options(&self) -> NormalizeOptions {
        NormalizeOptions {
            null_text: self.null_text.unwrap_or_default(),
            date_parsing: self.date_parsing.unwrap_or_default(),
            today: None,
        }
    }

    /// The registry source described by this configuration
    pub fn source(&self) -> RegistrySource {
        RegistrySource::new(self.database(), self.table()).with_options(self.normalize_options())
    }
}
