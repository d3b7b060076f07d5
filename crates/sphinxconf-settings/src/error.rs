use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while reading text into a [`crate::SettingsDocument`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
  /// No top-level `conf.py:` line was found.
  #[error("no top-level `conf.py:` block found")]
  MissingConfPy,
}

/// Errors that can occur when reading, rendering or editing settings files.
#[derive(Debug, Error)]
pub enum SettingsError {
  /// The settings file could not be read from disk.
  #[error("failed to read settings file `{path}`: {source}")]
  Read {
    path:   PathBuf,
    #[source]
    source: std::io::Error,
  },

  /// The settings file (or its temporary sibling) could not be written.
  #[error("failed to write settings file `{path}`: {source}")]
  Write {
    path:   PathBuf,
    #[source]
    source: std::io::Error,
  },

  /// The settings file does not have the expected structure.
  #[error("failed to parse settings file `{path}`: {source}")]
  Parse {
    path:   PathBuf,
    #[source]
    source: ParseError,
  },

  /// A setting has a shape the renderer has no rule for. Only raised by a
  /// strict [`crate::Renderer`]; the lenient one logs and skips the key.
  #[error("setting `{key}` has an unsupported shape: {shape}")]
  UnsupportedShape { key: String, shape: String },

  /// A managed-extension pattern is not a valid regular expression.
  #[error("invalid managed extension pattern: {0}")]
  InvalidPattern(#[from] regex::Error),
}
