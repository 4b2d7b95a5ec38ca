//! Configuration loading and run settings resolution
//!
//! Each setting is resolved in priority order:
//! 1. Command-line argument (or its environment variable, handled by the CLI)
//! 2. TOML config file
//! 3. Built-in default

use crate::profiles::ProfileTable;
use crate::{Error, Result};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;

/// Default number of concurrent download/probe workers
pub const DEFAULT_WORKERS: usize = 5;

/// Default per-download timeout in seconds
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Contents of the optional TOML config file
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TomlConfig {
    /// Concurrent worker count
    #[serde(default)]
    pub workers: Option<usize>,

    /// Per-download timeout in seconds
    #[serde(default)]
    pub timeout_secs: Option<u64>,

    /// Directory that receives the updated collection
    #[serde(default)]
    pub output_dir: Option<PathBuf>,

    /// Logging configuration (optional)
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Extra named profiles (name = "path/to/file.json")
    #[serde(default)]
    pub profiles: BTreeMap<String, PathBuf>,

    /// File this config was read from; `None` when built-in defaults are used
    #[serde(skip)]
    pub source: Option<PathBuf>,
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

impl TomlConfig {
    /// Profile table built from the built-ins plus `[profiles]`
    pub fn profile_table(&self) -> ProfileTable {
        ProfileTable::new(&self.profiles)
    }
}

/// Default config file location: `<config_dir>/durafill/config.toml`
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("durafill").join("config.toml"))
}

/// Parse TOML config text
pub fn parse_toml_config(content: &str) -> Result<TomlConfig> {
    Ok(toml::from_str(content)?)
}

/// Load the TOML config
///
/// An explicitly requested file must exist. When no file is requested the
/// default location is tried and a missing file yields the defaults.
/// The file used is recorded in [`TomlConfig::source`]; nothing is logged
/// here because callers load the config before logging is set up.
pub fn load_toml_config(explicit: Option<&Path>) -> Result<TomlConfig> {
    let path = match explicit {
        Some(path) => {
            if !path.exists() {
                return Err(Error::Config(format!(
                    "Config file not found: {}",
                    path.display()
                )));
            }
            path.to_path_buf()
        }
        None => match default_config_path() {
            Some(path) if path.exists() => path,
            _ => return Ok(TomlConfig::default()),
        },
    };

    let content = std::fs::read_to_string(&path)?;
    let mut config = parse_toml_config(&content)
        .map_err(|e| Error::Config(format!("{}: {}", path.display(), e)))?;

    config.source = Some(path);
    Ok(config)
}

/// Settings consumed by one enrichment run
#[derive(Debug, Clone, PartialEq)]
pub struct RunSettings {
    pub workers: usize,
    pub timeout: Duration,
    pub output_dir: Option<PathBuf>,
}

impl RunSettings {
    /// Merge command-line values over the TOML config and defaults
    pub fn resolve(
        cli_workers: Option<usize>,
        cli_timeout_secs: Option<u64>,
        cli_output_dir: Option<PathBuf>,
        toml: &TomlConfig,
    ) -> Result<Self> {
        let workers = cli_workers.or(toml.workers).unwrap_or(DEFAULT_WORKERS);
        if workers == 0 {
            return Err(Error::Config("workers must be a positive integer".to_string()));
        }

        let timeout_secs = cli_timeout_secs
            .or(toml.timeout_secs)
            .unwrap_or(DEFAULT_TIMEOUT_SECS);
        if timeout_secs == 0 {
            return Err(Error::Config("timeout_secs must be at least 1".to_string()));
        }

        let settings = Self {
            workers,
            timeout: Duration::from_secs(timeout_secs),
            output_dir: cli_output_dir.or_else(|| toml.output_dir.clone()),
        };

        debug!(
            workers = settings.workers,
            timeout_secs,
            output_dir = ?settings.output_dir,
            "Resolved run settings"
        );
        Ok(settings)
    }
}

impl Default for RunSettings {
    fn default() -> Self {
        Self {
            workers: DEFAULT_WORKERS,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            output_dir: None,
        }
    }
}
