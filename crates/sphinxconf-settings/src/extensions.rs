use regex::RegexSet;

use crate::error::SettingsError;

/// Patterns of Sphinx extensions that the documentation toolchain loads on
/// its own (`t3sphinx.ext.t3extras`, `t3sphinx.ext.t3tablerows`,
/// `t3sphinx.ext.targets`, ...). Listing them again in `conf.py` would load
/// them twice.
pub const DEFAULT_MANAGED_EXTENSIONS: &[&str] = &[r"^t3sphinx\."];

/// Decides which `extensions` entries are dropped from the rendered
/// `conf.py`.
#[derive(Debug, Clone)]
pub struct ExtensionFilter {
  managed: RegexSet,
}

impl ExtensionFilter {
  /// Build a filter that drops every extension matching one of `patterns`.
  ///
  /// # Errors
  ///
  /// Returns [`SettingsError::InvalidPattern`] if a pattern is not a valid
  /// regular expression.
  pub fn new<I, S>(patterns: I) -> Result<Self, SettingsError>
  where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
  {
    Ok(Self {
      managed: RegexSet::new(patterns)?,
    })
  }

  /// A filter that keeps every extension.
  #[must_use]
  pub fn allow_all() -> Self {
    Self {
      managed: RegexSet::empty(),
    }
  }

  #[must_use]
  pub fn is_managed(&self, extension: &str) -> bool {
    self.managed.is_match(extension)
  }

  /// The extensions that should be listed, in their original order.
  pub fn retain<'a>(
    &'a self,
    extensions: impl IntoIterator<Item = &'a str>,
  ) -> impl Iterator<Item = &'a str> {
    extensions.into_iter().filter(move |ext| {
      let managed = self.is_managed(ext);
      if managed {
        log::debug!("dropping managed extension `{ext}`");
      }
      !managed
    })
  }
}

impl Default for ExtensionFilter {
  fn default() -> Self {
    Self::new(DEFAULT_MANAGED_EXTENSIONS).unwrap_or_else(|e| {
      log::error!("failed to compile default managed extension patterns: {e}");
      Self::allow_all()
    })
  }
}

#[cfg(test)]
mod tests {
  #![allow(clippy::expect_used, reason = "Fine in tests")]
  use super::*;

  #[test]
  fn test_default_filter_drops_t3sphinx_namespace() {
    let filter = ExtensionFilter::default();
    assert!(filter.is_managed("t3sphinx.ext.t3extras"));
    assert!(filter.is_managed("t3sphinx.ext.targets"));
    assert!(!filter.is_managed("sphinx.ext.intersphinx"));
    assert!(!filter.is_managed("sphinxcontrib.youtube"));
    assert!(!filter.is_managed("my.t3sphinx.ext"));
  }

  #[test]
  fn test_retain_keeps_order() {
    let filter = ExtensionFilter::default();
    let kept: Vec<&str> = filter
      .retain([
        "sphinx.ext.intersphinx",
        "t3sphinx.ext.t3extras",
        "sphinxcontrib.youtube",
      ])
      .collect();
    assert_eq!(kept, vec!["sphinx.ext.intersphinx", "sphinxcontrib.youtube"]);
  }

  #[test]
  fn test_custom_patterns() {
    let filter =
      ExtensionFilter::new([r"^sphinx\.ext\.todo$", r"^internal\."]).expect("valid");
    assert!(filter.is_managed("sphinx.ext.todo"));
    assert!(filter.is_managed("internal.anything"));
    assert!(!filter.is_managed("t3sphinx.ext.t3extras"));
  }

  #[test]
  fn test_invalid_pattern_is_reported() {
    assert!(matches!(
      ExtensionFilter::new(["("]),
      Err(SettingsError::InvalidPattern(_))
    ));
  }
}
