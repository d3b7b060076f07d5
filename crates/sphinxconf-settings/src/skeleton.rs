//! The settings file written when a project has none yet.
use crate::{
  document::{Setting, SettingsDocument},
  value::Value,
};

/// Comment header above the `---` marker of a new settings file.
pub const DEFAULT_HEADER: &[&str] = &[
  "# This is the project specific Settings.yml file.",
  "# Place Sphinx specific build information here.",
  "# Settings given here will replace the settings of 'conf.py'.",
  "",
];

pub const DEFAULT_PROJECT: &str = "No project name";
pub const DEFAULT_VERSION: &str = "1.0";
pub const DEFAULT_RELEASE: &str = "1.0.0";

/// Contents of a freshly synthesized settings file.
///
/// Serialized, the default skeleton reads:
///
/// ```yaml
/// # This is the project specific Settings.yml file.
/// # Place Sphinx specific build information here.
/// # Settings given here will replace the settings of 'conf.py'.
///
/// ---
/// conf.py:
///   copyright: 2026
///   project: No project name
///   version: 1.0
///   release: 1.0.0
/// ...
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DefaultSkeleton {
  pub header:    Vec<String>,
  pub copyright: String,
  pub project:   String,
  pub version:   String,
  pub release:   String,
}

impl DefaultSkeleton {
  /// The default skeleton with `year` as copyright.
  #[must_use]
  pub fn for_year(year: i16) -> Self {
    Self {
      header:    DEFAULT_HEADER.iter().map(ToString::to_string).collect(),
      copyright: year.to_string(),
      project:   DEFAULT_PROJECT.to_string(),
      version:   DEFAULT_VERSION.to_string(),
      release:   DEFAULT_RELEASE.to_string(),
    }
  }

  /// The default skeleton dated with the current year of the local clock.
  #[must_use]
  pub fn current() -> Self {
    Self::for_year(jiff::Zoned::now().year())
  }

  #[must_use]
  pub fn with_project(mut self, project: impl Into<String>) -> Self {
    self.project = project.into();
    self
  }

  /// Build the document, wrapped in `---`/`...` and ending with a newline.
  #[must_use]
  pub fn to_document(&self) -> SettingsDocument {
    let mut doc = SettingsDocument {
      preamble: self.header.clone(),
      start_marker: Some("---".to_string()),
      end_marker: Some("...".to_string()),
      trailing_newline: true,
      ..SettingsDocument::default()
    };
    for (key, text) in [
      ("copyright", &self.copyright),
      ("project", &self.project),
      ("version", &self.version),
      ("release", &self.release),
    ] {
      doc
        .conf_py
        .insert(key.to_string(), Setting::new(Value::scalar(text.as_str())));
    }
    doc
  }
}

impl Default for DefaultSkeleton {
  fn default() -> Self {
    Self::current()
  }
}
