use std::{io, path::PathBuf};

use sphinxconf_settings::SettingsError;
use thiserror::Error;

use crate::templates::TemplateError;

/// Errors raised while loading, overriding or writing sphinxconf
/// configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
  /// A `--config KEY=VALUE` override could not be applied.
  #[error("Configuration error: {0}")]
  Config(String),

  #[error("Failed to read config file {path}: {source}")]
  Read {
    path:   PathBuf,
    #[source]
    source: io::Error,
  },

  #[error("Failed to write config file {path}: {source}")]
  Write {
    path:   PathBuf,
    #[source]
    source: io::Error,
  },

  #[error("Failed to parse JSON config from {path}: {source}")]
  Json {
    path:   PathBuf,
    #[source]
    source: serde_json::Error,
  },

  #[error("Failed to parse TOML config from {path}: {source}")]
  Toml {
    path:   PathBuf,
    #[source]
    source: toml::de::Error,
  },

  /// Only `.toml` and `.json` files are understood.
  #[error("Unsupported config file format: {0}")]
  UnsupportedFormat(PathBuf),

  #[error("Invalid managed_extensions: {0}")]
  InvalidPattern(#[source] SettingsError),

  #[error("Template error: {0}")]
  Template(#[from] TemplateError),
}
