//! Translation of `conf.py` settings into Python assignment statements.
use indexmap::IndexMap;

use crate::{
  SettingsDocument,
  error::SettingsError,
  extensions::ExtensionFilter,
  parser::PAIR_MAPPING_KEYS,
  python::{bool_literal, is_numeric, str_literal, unicode_literal},
  value::{Scalar, Value},
};

/// Settings that are strings in `conf.py` even when they look like numbers.
pub const FORCED_STRING_KEYS: &[&str] = &["copyright", "version", "release"];

/// Renders settings to Python source, one statement per setting.
///
/// Statements carry no trailing newline; join them with `\n` to build the
/// body of a `conf.py`.
#[derive(Debug, Clone, Default)]
pub struct Renderer {
  extensions: ExtensionFilter,
  strict:     bool,
}

impl Renderer {
  #[must_use]
  pub const fn new(extensions: ExtensionFilter) -> Self {
    Self {
      extensions,
      strict: false,
    }
  }

  /// In strict mode a setting of unsupported shape fails the whole render
  /// instead of being skipped with a warning.
  #[must_use]
  pub const fn strict(mut self, strict: bool) -> Self {
    self.strict = strict;
    self
  }

  /// Render every setting of `doc`, in document order.
  ///
  /// # Errors
  ///
  /// Returns [`SettingsError::UnsupportedShape`] in strict mode.
  pub fn render(
    &self,
    doc: &SettingsDocument,
  ) -> Result<Vec<String>, SettingsError> {
    self.render_settings(doc.settings())
  }

  /// Render `(key, value)` pairs, in the given order.
  ///
  /// # Errors
  ///
  /// Returns [`SettingsError::UnsupportedShape`] in strict mode.
  pub fn render_settings<'a>(
    &self,
    settings: impl IntoIterator<Item = (&'a str, &'a Value)>,
  ) -> Result<Vec<String>, SettingsError> {
    let mut statements = Vec::new();
    for (key, value) in settings {
      if let Some(statement) = self.render_setting(key, value) {
        statements.push(statement);
      } else if self.strict {
        return Err(SettingsError::UnsupportedShape {
          key:   key.to_string(),
          shape: value.shape(),
        });
      } else {
        log::warn!(
          "skipping setting `{key}`: unsupported shape {}",
          value.shape()
        );
      }
    }
    Ok(statements)
  }

  /// Render one setting, or `None` if its shape has no Python form.
  #[must_use]
  pub fn render_setting(&self, key: &str, value: &Value) -> Option<String> {
    match value {
      Value::Scalar(scalar)
        if scalar.is_null() && PAIR_MAPPING_KEYS.contains(&key) =>
      {
        Some(format!("{key} = {{}}"))
      },
      Value::Scalar(scalar) => Some(scalar_statement(key, scalar)),
      Value::Pair { url, alias } => {
        Some(format!("{key} = {}", pair_literal(url, alias.as_deref())))
      },
      Value::List(items) if key == "extensions" => {
        let names = scalar_texts(items)?;
        let kept: Vec<String> = self
          .extensions
          .retain(names)
          .map(str_literal)
          .collect();
        Some(format!("{key} = [{}]", kept.join(", ")))
      },
      Value::List(items) => list_statement(key, items),
      Value::Mapping(entries) => dict_statement(key, entries),
    }
  }
}

fn scalar_statement(key: &str, scalar: &Scalar) -> String {
  if FORCED_STRING_KEYS.contains(&key) {
    return format!("{key} = {}", unicode_literal(&scalar.text));
  }
  match scalar.as_bool() {
    Some(flag) => format!("{key} = {}", bool_literal(flag)),
    None => format!("{key} = {}", unicode_literal(&scalar.text)),
  }
}

/// A scalar as a dictionary value: booleans and numbers stay bare.
fn dict_value(scalar: &Scalar) -> String {
  if let Some(flag) = scalar.as_bool() {
    return bool_literal(flag).to_string();
  }
  if scalar.is_plain() && is_numeric(&scalar.text) {
    return scalar.text.clone();
  }
  str_literal(&scalar.text)
}

fn pair_literal(url: &str, alias: Option<&str>) -> String {
  let alias = alias.map_or_else(|| "None".to_string(), str_literal);
  format!("({}, {alias})", str_literal(url))
}

fn scalar_texts(items: &[Value]) -> Option<Vec<&str>> {
  items
    .iter()
    .map(|item| item.as_scalar().map(|s| s.text.as_str()))
    .collect()
}

fn list_statement(key: &str, items: &[Value]) -> Option<String> {
  if let Some(texts) = scalar_texts(items) {
    let literals: Vec<String> = texts.into_iter().map(str_literal).collect();
    return Some(format!("{key} = [{}]", literals.join(", ")));
  }

  // A list of lists, as in `latex_documents`: a list of tuples, one element
  // per line.
  let tuples = items
    .iter()
    .map(|item| {
      match item {
        Value::List(inner) => scalar_texts(inner),
        _ => None,
      }
    })
    .collect::<Option<Vec<_>>>()?;
  let bodies: Vec<String> = tuples
    .iter()
    .map(|texts| {
      texts
        .iter()
        .map(|text| unicode_literal(text))
        .collect::<Vec<_>>()
        .join(",\n")
    })
    .collect();
  Some(format!("{key} = [(\n{}\n)]", bodies.join("\n),\n(\n")))
}

fn dict_statement(key: &str, entries: &IndexMap<String, Value>) -> Option<String> {
  if entries.is_empty() {
    return Some(format!("{key} = {{}}"));
  }

  let lines = entries
    .iter()
    .map(|(name, value)| {
      let rendered = match value {
        Value::Pair { url, alias } => pair_literal(url, alias.as_deref()),
        Value::Scalar(scalar) => dict_value(scalar),
        Value::List(_) | Value::Mapping(_) => return None,
      };
      Some(format!("{}: {rendered}", str_literal(name)))
    })
    .collect::<Option<Vec<_>>>()?;

  Some(format!("{key} = {{\n{}\n}}", lines.join(",\n")))
}
