//! Parser-facing construction helpers and configuration.

pub mod build;
pub mod config;

pub use config::{AnalysisConfig, Config, LoggingConfig, CONFIG_FILE};
