//! Configuration management
//!
//! Handles TOML configuration parsing, validation and merging with
//! command-line overrides

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::constants::CONFIG_FILE_NAME;
use crate::fetch::{HttpOptions, Source};

/// Main browser configuration structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BrowserConfiguration {
    pub source: SourceSettings,
    pub logging: LoggingSettings,
    pub http: HttpSettings,
}

/// Where the snapshot is read from
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceSettings {
    /// URL or local directory; the current directory when unset
    pub location: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    /// off | error | warn | info | debug | trace
    pub level: String,
    pub backend: LogBackend,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "warn".to_string(),
            backend: LogBackend::Stderr,
        }
    }
}

/// Log sink selection
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogBackend {
    #[default]
    Stderr,
    /// macOS Unified Logging
    Unified,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpSettings {
    pub user_agent: Option<String>,
    /// Request timeout in seconds (no timeout when unset)
    pub timeout_secs: Option<u64>,
}

impl BrowserConfiguration {
    /// Load configuration from a TOML file
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let config: Self = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
        config.validate()?;
        Ok(config)
    }

    /// `<config dir>/appdex/config.toml`
    pub fn default_config_path() -> Result<PathBuf> {
        let base = dirs::config_dir().context("Could not determine the user config directory")?;
        Ok(base.join("appdex").join(CONFIG_FILE_NAME))
    }

    /// Resolve the configuration to use.
    ///
    /// An explicit path must exist. Without one, the default path is used if
    /// present and built-in defaults otherwise.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            if !path.exists() {
                bail!("Config file does not exist: {}", path.display());
            }
            return Self::load_from_file(path);
        }

        match Self::default_config_path() {
            Ok(path) if path.exists() => {
                log::debug!("Using config file {}", path.display());
                Self::load_from_file(&path)
            }
            _ => Ok(Self::default()),
        }
    }

    /// Check values that deserialize fine but cannot be used
    pub fn validate(&self) -> Result<()> {
        self.log_level()?;

        if self.http.timeout_secs == Some(0) {
            bail!("http.timeout_secs must be greater than zero");
        }

        if self.logging.backend == LogBackend::Unified && !cfg!(target_os = "macos") {
            bail!("logging.backend = \"unified\" is only available on macOS");
        }

        if let Some(location) = &self.source.location {
            if location.trim().is_empty() {
                bail!("source.location must not be empty");
            }
        }

        Ok(())
    }

    pub fn log_level(&self) -> Result<log::LevelFilter> {
        self.logging
            .level
            .parse()
            .with_context(|| format!("Invalid logging.level: {}", self.logging.level))
    }

    /// The configured source, or the current directory
    pub fn source(&self) -> Source {
        match &self.source.location {
            Some(location) => Source::parse(location),
            None => Source::Local(PathBuf::from(".")),
        }
    }

    pub fn http_options(&self) -> HttpOptions {
        HttpOptions {
            user_agent: self.http.user_agent.clone(),
            timeout: self.http.timeout_secs.map(Duration::from_secs),
        }
    }
}
