use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::str::FromStr;

use tracing::{debug, warn, Level};

use crate::analysis::checker::DEFAULT_MAX_DEPTH;
use crate::errors::ConfigError;
use crate::infrastructure::logging::{LogConfig, LogFormat};

/// File name looked up by [`Config::discover`].
pub const CONFIG_FILE: &str = ".symath.toml";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub analysis: AnalysisConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisConfig {
    /// Deepest tree `TypeAnalyzer::check` accepts; 0 disables the guard.
    #[serde(default = "default_max_depth")]
    pub max_depth: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_level")]
    pub level: String,

    #[serde(default)]
    pub format: LogFormat,

    #[serde(default = "default_false")]
    pub span_events: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filter: Option<String>,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

impl AnalysisConfig {
    pub fn depth_limit(&self) -> Option<usize> {
        (self.max_depth > 0).then_some(self.max_depth)
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_level(),
            format: LogFormat::default(),
            span_events: false,
            filter: None,
        }
    }
}

fn default_max_depth() -> usize { DEFAULT_MAX_DEPTH }
fn default_level() -> String { "info".to_string() }
fn default_false() -> bool { false }

impl Config {
    /// Load configuration from a TOML file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        Self::parse(&content)
    }

    /// Parse configuration from a TOML string
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// Find and load `.symath.toml` from the current directory or its parents
    pub fn discover() -> Self {
        match std::env::current_dir() {
            Ok(dir) => Self::discover_from(&dir),
            Err(err) => {
                warn!("cannot read current directory: {}", err);
                Self::default()
            }
        }
    }

    /// Like [`discover`](Self::discover), starting at `start`.
    ///
    /// A file that exists but fails to load is reported and skipped.
    pub fn discover_from(start: &Path) -> Self {
        for dir in start.ancestors() {
            let config_path = dir.join(CONFIG_FILE);
            if !config_path.is_file() {
                continue;
            }
            match Self::load(&config_path) {
                Ok(config) => {
                    debug!(path = %config_path.display(), "loaded config");
                    return config;
                }
                Err(err) => warn!(path = %config_path.display(), "ignoring config: {}", err),
            }
        }

        debug!("no {} found, using defaults", CONFIG_FILE);
        Self::default()
    }

    /// Generate default configuration file content
    pub fn generate_default() -> String {
        toml::to_string_pretty(&Self::default())
            .unwrap_or_else(|_| String::from("# Failed to generate config"))
    }

    /// Save configuration to file
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let content = toml::to_string_pretty(self)?;

        fs::write(path, content).map_err(|source| ConfigError::Write {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Logging settings as an initializable [`LogConfig`] writing to stderr.
    pub fn log_config(&self) -> Result<LogConfig, ConfigError> {
        let level = Level::from_str(self.logging.level.trim())
            .map_err(|_| ConfigError::InvalidLevel(self.logging.level.clone()))?;

        let mut config = LogConfig::new()
            .with_level(level)
            .with_format(self.logging.format)
            .with_span_events(self.logging.span_events);
        if let Some(filter) = &self.logging.filter {
            config = config.with_filter(filter.clone());
        }
        Ok(config)
    }
}
