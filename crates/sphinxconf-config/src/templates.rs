use std::fmt;

/// Error type for template operations.
#[derive(Debug)]
pub enum TemplateError {
  /// Indicates that the requested configuration format is not supported.
  /// Contains the name of the unsupported format.
  UnsupportedFormat(String),
}

impl fmt::Display for TemplateError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Self::UnsupportedFormat(format) => {
        write!(f, "Unsupported config format: {format}")
      },
    }
  }
}

impl std::error::Error for TemplateError {}

/// Default configuration template in TOML, commented so that every field is
/// explained where it is set.
pub const DEFAULT_TOML_TEMPLATE: &str = r#"# sphinxconf Configuration File

# Settings file read by `render` and edited by `add-mapping`
settings_file = "Documentation/Settings.yml"

# Where `render` writes the Python statements (stdout when unset)
# output = "conf_settings.py"

# Fail on settings that have no Python form instead of skipping them
strict = false

# Extensions loaded by the documentation toolchain itself. Entries of
# `extensions` matching any of these regular expressions are not rendered.
managed_extensions = ['^t3sphinx\.']

# Project name written into new settings files
default_project = "No project name"
"#;

/// Default configuration template in JSON format.
pub const DEFAULT_JSON_TEMPLATE: &str = r#"{
  "settings_file": "Documentation/Settings.yml",
  "strict": false,
  "managed_extensions": [
    "^t3sphinx\\."
  ],
  "default_project": "No project name"
}
"#;

/// Get the correct configuration template based on the requested format.
///
/// # Errors
///
/// Returns an error if the requested format is not supported.
pub fn get_template(format: &str) -> Result<&'static str, TemplateError> {
  match format.to_lowercase().as_str() {
    "toml" => Ok(DEFAULT_TOML_TEMPLATE),
    "json" => Ok(DEFAULT_JSON_TEMPLATE),
    _ => Err(TemplateError::UnsupportedFormat(format.to_string())),
  }
}
