use std::{
  fs,
  path::{Path, PathBuf},
  sync::OnceLock,
};

use serde::{Deserialize, Serialize};
use sphinxconf_settings::{
  DefaultSkeleton,
  ExtensionFilter,
  Renderer,
  extensions::DEFAULT_MANAGED_EXTENSIONS,
  skeleton::DEFAULT_PROJECT,
};

use crate::error::ConfigError;

/// Settings file used when none is given.
pub const DEFAULT_SETTINGS_FILE: &str = "Documentation/Settings.yml";

/// Configuration for sphinxconf.
///
/// [`Config`] controls which settings file is read, where rendered
/// statements go and how unusual settings are treated. Fields are typically
/// loaded from a TOML or JSON config file, but can also be set via CLI
/// arguments.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
  /// The `Settings.yml` file to render or edit.
  pub settings_file: PathBuf,

  /// File that receives the rendered statements. Standard output if unset.
  pub output: Option<PathBuf>,

  /// Fail on settings of unsupported shape instead of skipping them.
  pub strict: bool,

  /// Regular expressions matching extensions that are never rendered.
  pub managed_extensions: Vec<String>,

  /// Project name written into newly created settings files.
  pub default_project: String,
}

impl Default for Config {
  fn default() -> Self {
    Self {
      settings_file:      PathBuf::from(DEFAULT_SETTINGS_FILE),
      output:             None,
      strict:             false,
      managed_extensions: DEFAULT_MANAGED_EXTENSIONS
        .iter()
        .map(ToString::to_string)
        .collect(),
      default_project:    DEFAULT_PROJECT.to_string(),
    }
  }
}

impl Config {
  /// Load configuration from a file (TOML or JSON).
  ///
  /// # Arguments
  ///
  /// * `path` - Path to the configuration file.
  ///
  /// # Errors
  ///
  /// Returns an error if the file cannot be read or parsed, or if the format is
  /// unsupported.
  pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
    let path = path.as_ref();
    let content = fs::read_to_string(path).map_err(|source| {
      ConfigError::Read {
        path: path.to_path_buf(),
        source,
      }
    })?;

    let extension = path
      .extension()
      .and_then(|ext| ext.to_str())
      .map(str::to_lowercase);
    match extension.as_deref() {
      Some("json") => {
        serde_json::from_str(&content).map_err(|source| {
          ConfigError::Json {
            path: path.to_path_buf(),
            source,
          }
        })
      },
      Some("toml") => {
        toml::from_str(&content).map_err(|source| {
          ConfigError::Toml {
            path: path.to_path_buf(),
            source,
          }
        })
      },
      _ => Err(ConfigError::UnsupportedFormat(path.to_path_buf())),
    }
  }

  /// Load configuration from the given files, or a discovered one, then
  /// apply `KEY=VALUE` overrides and validate the result.
  ///
  /// # Errors
  ///
  /// Returns an error if a config file cannot be loaded, an override is
  /// malformed, or a managed extension pattern does not compile.
  pub fn load(
    config_files: &[PathBuf],
    config_overrides: &[String],
  ) -> Result<Self, ConfigError> {
    let mut config = if let Some((first, rest)) = config_files.split_first() {
      // Config file(s) explicitly specified via CLI, merged in order
      let mut merged_config = Self::from_file(first)?;
      for config_path in rest {
        merged_config.merge(Self::from_file(config_path)?);
      }

      if config_files.len() > 1 {
        log::info!("Loaded and merged {} config files", config_files.len());
      }

      merged_config
    } else if let Some(discovered_config) = Self::find_config_file() {
      log::info!(
        "Using discovered config file: {}",
        discovered_config.display()
      );
      Self::from_file(&discovered_config)?
    } else {
      Self::default()
    };

    // Apply config overrides from --config KEY=VALUE flags
    if !config_overrides.is_empty() {
      config.apply_overrides(config_overrides)?;
    }

    config.validate()?;
    Ok(config)
  }

  /// Apply configuration overrides from KEY=VALUE strings.
  ///
  /// # Errors
  ///
  /// Returns an error if:
  ///
  /// - An override string is not in KEY=VALUE format
  /// - A key is not recognized
  /// - A value cannot be parsed as the expected type
  ///
  /// # Example
  ///
  /// ```rust, ignore
  /// config.apply_overrides(&vec![
  ///     "strict=true".to_string(),
  ///     "settings_file=Docs/Settings.yml".to_string(),
  /// ])?;
  /// ```
  pub fn apply_overrides(
    &mut self,
    overrides: &[String],
  ) -> Result<(), ConfigError> {
    for override_str in overrides {
      let (key, value) = override_str.split_once('=').ok_or_else(|| {
        ConfigError::Config(format!(
          "Invalid config override format: '{override_str}'. Expected \
           KEY=VALUE"
        ))
      })?;

      self.apply_override(key.trim(), value.trim())?;
    }

    Ok(())
  }

  /// Apply a configuration override by key.
  ///
  /// `managed_extensions` takes a comma-separated list and replaces the
  /// current one; an empty value clears it. An empty `output` unsets it.
  ///
  /// # Errors
  ///
  /// Returns an error if the key is unknown or the value cannot be parsed.
  pub fn apply_override(
    &mut self,
    key: &str,
    value: &str,
  ) -> Result<(), ConfigError> {
    match key {
      "settings_file" => self.settings_file = PathBuf::from(value),
      "output" => {
        self.output = (!value.is_empty()).then(|| PathBuf::from(value));
      },
      "strict" => self.strict = parse_bool(key, value)?,
      "managed_extensions" => {
        self.managed_extensions = value
          .split(',')
          .map(str::trim)
          .filter(|pattern| !pattern.is_empty())
          .map(ToString::to_string)
          .collect();
      },
      "default_project" => self.default_project = value.to_string(),
      _ => {
        return Err(ConfigError::Config(format!(
          "Unknown configuration key: '{key}'. See documentation for \
           supported keys."
        )));
      },
    }
    Ok(())
  }

  /// Merge another config into this one, with the other config's values taking
  /// precedence.
  ///
  /// # Merge Rules
  ///
  /// - [`Option<T>`] fields: Other's [`Some`] value replaces this config's
  ///   value
  /// - [`Vec<T>`] fields: Other's entries are appended, skipping duplicates
  /// - Plain fields (String, bool, etc.): Other's value always replaces
  pub fn merge(&mut self, other: Self) {
    self.settings_file = other.settings_file;
    if other.output.is_some() {
      self.output = other.output;
    }
    self.strict = other.strict;
    for pattern in other.managed_extensions {
      if !self.managed_extensions.contains(&pattern) {
        self.managed_extensions.push(pattern);
      }
    }
    self.default_project = other.default_project;
  }

  /// Search for config files in common locations
  #[must_use]
  pub fn find_config_file() -> Option<PathBuf> {
    static RESULT: OnceLock<Option<PathBuf>> = OnceLock::new();
    RESULT
      .get_or_init(|| {
        let config_filenames = [
          "sphinxconf.toml",
          "sphinxconf.json",
          ".sphinxconf.toml",
          ".sphinxconf.json",
          ".config/sphinxconf.toml",
          ".config/sphinxconf.json",
        ];

        let current_dir = std::env::current_dir().ok()?;
        for filename in &config_filenames {
          let config_path = current_dir.join(filename);
          if config_path.exists() {
            return Some(config_path);
          }
        }

        if let Ok(xdg_config_home) = std::env::var("XDG_CONFIG_HOME") {
          let xdg_config_dir = PathBuf::from(xdg_config_home);
          for filename in &["sphinxconf.toml", "sphinxconf.json"] {
            let config_path = xdg_config_dir.join(filename);
            if config_path.exists() {
              return Some(config_path);
            }
          }
        }

        None
      })
      .clone()
  }

  /// Check that every managed extension pattern compiles.
  ///
  /// # Errors
  ///
  /// Returns an error naming the first pattern that is not a valid regular
  /// expression.
  pub fn validate(&self) -> Result<(), ConfigError> {
    self.extension_filter().map(|_| ())
  }

  /// The filter built from `managed_extensions`.
  ///
  /// # Errors
  ///
  /// Returns an error if a pattern is not a valid regular expression.
  pub fn extension_filter(&self) -> Result<ExtensionFilter, ConfigError> {
    ExtensionFilter::new(&self.managed_extensions)
      .map_err(ConfigError::InvalidPattern)
  }

  /// A renderer honoring `managed_extensions` and `strict`.
  ///
  /// # Errors
  ///
  /// Returns an error if a managed extension pattern is invalid.
  pub fn renderer(&self) -> Result<Renderer, ConfigError> {
    Ok(Renderer::new(self.extension_filter()?).strict(self.strict))
  }

  /// The skeleton for new settings files, dated with the current year.
  #[must_use]
  pub fn skeleton(&self) -> DefaultSkeleton {
    DefaultSkeleton::current().with_project(self.default_project.as_str())
  }

  /// Generate a default configuration file with commented explanations
  ///
  /// # Errors
  ///
  /// Returns an error if the template cannot be retrieved or the file cannot be
  /// written.
  pub fn generate_default_config(
    format: &str,
    path: &Path,
  ) -> Result<(), ConfigError> {
    let config_content = crate::templates::get_template(format)?;

    fs::write(path, config_content).map_err(|source| {
      ConfigError::Write {
        path: path.to_path_buf(),
        source,
      }
    })?;

    log::info!("Created default configuration file: {}", path.display());
    Ok(())
  }
}

fn parse_bool(key: &str, value: &str) -> Result<bool, ConfigError> {
  match value.to_lowercase().as_str() {
    "true" | "yes" | "1" => Ok(true),
    "false" | "no" | "0" => Ok(false),
    _ => {
      Err(ConfigError::Config(format!(
        "Invalid boolean value for '{key}': '{value}'. Expected true/false, \
         yes/no, or 1/0"
      )))
    },
  }
}
