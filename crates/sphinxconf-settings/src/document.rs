//! The ordered, comment-aware model of a `Settings.yml` file.
//!
//! Everything the parser does not need to understand is kept as raw lines,
//! and every setting remembers its source lines until it is modified.
//! Serializing therefore copies unchanged regions byte for byte and only
//! re-emits settings that were touched.
use std::fmt;

use indexmap::IndexMap;

use crate::value::{Scalar, Value};

/// Indentation used when a document does not show its own.
pub const DEFAULT_INDENT: usize = 2;

/// Line terminator style of a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LineEnding {
  #[default]
  Lf,
  CrLf,
}

impl LineEnding {
  /// Suffix appended to generated lines. Raw lines are split on `\n` only,
  /// so a CRLF document keeps the `\r` inside each line.
  const fn line_suffix(self) -> &'static str {
    match self {
      Self::Lf => "",
      Self::CrLf => "\r",
    }
  }
}

/// One child of the `conf.py:` block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Setting {
  /// Comment and blank lines directly above the key.
  pub(crate) leading: Vec<String>,
  pub(crate) value:   Value,
  /// The key line and its nested lines as read, or `None` once modified.
  pub(crate) source:  Option<Vec<String>>,
}

impl Setting {
  /// A setting that has no source text yet and will be emitted from its
  /// value.
  #[must_use]
  pub const fn new(value: Value) -> Self {
    Self {
      leading: Vec::new(),
      value,
      source: None,
    }
  }

  #[must_use]
  pub const fn value(&self) -> &Value {
    &self.value
  }

  /// Whether the setting will be re-emitted instead of copied verbatim.
  #[must_use]
  pub const fn is_modified(&self) -> bool {
    self.source.is_none()
  }
}

/// The settings held by the `conf.py:` block, in file order.
pub type ConfPy = IndexMap<String, Setting>;

/// A parsed (or synthesized) settings file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SettingsDocument {
  pub(crate) preamble:         Vec<String>,
  pub(crate) start_marker:     Option<String>,
  /// Lines between the start marker and the `conf.py:` line.
  pub(crate) lead_in:          Vec<String>,
  pub(crate) header:           String,
  pub(crate) conf_py:          ConfPy,
  /// Lines after the `conf.py:` block and before the end marker.
  pub(crate) epilogue:         Vec<String>,
  pub(crate) end_marker:       Option<String>,
  pub(crate) trailer:          Vec<String>,
  pub(crate) indent:           usize,
  pub(crate) line_ending:      LineEnding,
  pub(crate) trailing_newline: bool,
}

impl Default for SettingsDocument {
  fn default() -> Self {
    Self {
      preamble:         Vec::new(),
      start_marker:     None,
      lead_in:          Vec::new(),
      header:           "conf.py:".to_string(),
      conf_py:          ConfPy::new(),
      epilogue:         Vec::new(),
      end_marker:       None,
      trailer:          Vec::new(),
      indent:           DEFAULT_INDENT,
      line_ending:      LineEnding::Lf,
      trailing_newline: true,
    }
  }
}

impl SettingsDocument {
  /// Comment and blank lines before the first structural line.
  #[must_use]
  pub fn preamble(&self) -> &[String] {
    &self.preamble
  }

  /// Whether `---` and `...` wrap the structural content.
  #[must_use]
  pub const fn has_document_markers(&self) -> bool {
    self.start_marker.is_some() && self.end_marker.is_some()
  }

  #[must_use]
  pub const fn conf_py(&self) -> &ConfPy {
    &self.conf_py
  }

  #[must_use]
  pub fn get(&self, key: &str) -> Option<&Value> {
    self.conf_py.get(key).map(Setting::value)
  }

  /// Iterate over `(key, value)` in document order.
  pub fn settings(&self) -> impl Iterator<Item = (&str, &Value)> {
    self.conf_py.iter().map(|(k, s)| (k.as_str(), &s.value))
  }

  /// Replace the value of `key` in place, or append it as the last setting.
  pub fn set(&mut self, key: impl Into<String>, value: Value) {
    let key = key.into();
    if let Some(setting) = self.conf_py.get_mut(&key) {
      setting.value = value;
      setting.source = None;
    } else {
      self.conf_py.insert(key, Setting::new(value));
    }
  }

  /// Serialize back to text. Unmodified regions are reproduced exactly.
  #[must_use]
  pub fn to_yaml_string(&self) -> String {
    let mut lines: Vec<String> = Vec::new();
    lines.extend(self.preamble.iter().cloned());
    lines.extend(self.start_marker.iter().cloned());
    lines.extend(self.lead_in.iter().cloned());
    lines.push(self.header.clone());

    let suffix = self.line_ending.line_suffix();
    for (key, setting) in &self.conf_py {
      lines.extend(setting.leading.iter().cloned());
      match &setting.source {
        Some(source) => lines.extend(source.iter().cloned()),
        None => {
          let mut emitted = Vec::new();
          emit_entry(key, &setting.value, self.indent, self.indent, &mut emitted);
          lines.extend(emitted.into_iter().map(|line| line + suffix));
        },
      }
    }

    lines.extend(self.epilogue.iter().cloned());
    lines.extend(self.end_marker.iter().cloned());
    lines.extend(self.trailer.iter().cloned());

    let mut out = lines.join("\n");
    if self.trailing_newline {
      out.push('\n');
    }
    out
  }
}

impl fmt::Display for SettingsDocument {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(&self.to_yaml_string())
  }
}

/// Emit `key: value` in block style at `indent` columns.
///
/// Sequences are written at the same indentation as their key, which is the
/// layout Settings.yml files use:
///
/// ```yaml
/// restdoc:
/// - https://docs.typo3.org/typo3cms/extensions/restdoc/
/// - null
/// ```
pub(crate) fn emit_entry(
  key: &str,
  value: &Value,
  indent: usize,
  unit: usize,
  out: &mut Vec<String>,
) {
  let pad = " ".repeat(indent);
  let key = Scalar::plain(key).to_yaml();
  match value {
    Value::Scalar(scalar) if scalar.text.is_empty() && scalar.is_plain() => {
      out.push(format!("{pad}{key}:"));
    },
    Value::Scalar(scalar) => out.push(format!("{pad}{key}: {}", scalar.to_yaml())),
    Value::Mapping(entries) => {
      out.push(format!("{pad}{key}:"));
      for (child_key, child) in entries {
        emit_entry(child_key, child, indent + unit, unit, out);
      }
    },
    Value::List(_) | Value::Pair { .. } => {
      out.push(format!("{pad}{key}:"));
      emit_items(value, indent, unit, out);
    },
  }
}

/// A pair member as a scalar that reads back as the same string, never as
/// null or a boolean.
fn pair_scalar(text: &str) -> Scalar {
  let plain = Scalar::plain(text);
  if plain.is_null() || plain.as_bool().is_some() {
    Scalar::quoted(text)
  } else {
    plain
  }
}

/// Emit the items of a list-like value as `- item` lines at `indent`.
fn emit_items(value: &Value, indent: usize, unit: usize, out: &mut Vec<String>) {
  match value {
    Value::Pair { url, alias } => {
      let pad = " ".repeat(indent);
      out.push(format!("{pad}- {}", pair_scalar(url).to_yaml()));
      out.push(match alias {
        Some(alias) => format!("{pad}- {}", pair_scalar(alias).to_yaml()),
        None => format!("{pad}- null"),
      });
    },
    Value::List(items) => {
      for item in items {
        emit_item(item, indent, unit, out);
      }
    },
    Value::Scalar(_) | Value::Mapping(_) => emit_item(value, indent, unit, out),
  }
}

fn emit_item(item: &Value, indent: usize, unit: usize, out: &mut Vec<String>) {
  let pad = " ".repeat(indent);
  match item {
    Value::Scalar(scalar) => out.push(format!("{pad}- {}", scalar.to_yaml())),
    Value::List(_) | Value::Pair { .. } | Value::Mapping(_) => {
      // Lay the nested node out two columns deeper, then fold its first line
      // onto the dash.
      let start = out.len();
      match item {
        Value::Mapping(entries) => {
          for (key, child) in entries {
            emit_entry(key, child, indent + 2, unit, out);
          }
        },
        _ => emit_items(item, indent + 2, unit, out),
      }
      if let Some(first) = out.get_mut(start) {
        first.replace_range(indent..indent + 2, "- ");
      } else {
        out.push(format!("{pad}- []"));
      }
    },
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn emit(key: &str, value: &Value) -> Vec<String> {
    let mut out = Vec::new();
    emit_entry(key, value, 2, 2, &mut out);
    out
  }

  #[test]
  fn test_emit_pair_mapping() {
    let mut entries = IndexMap::new();
    entries.insert(
      "restdoc".to_string(),
      Value::pair("https://docs.typo3.org/typo3cms/extensions/restdoc/", None),
    );
    entries.insert(
      "forge".to_string(),
      Value::pair("https://forge.typo3.org/issues/%s", Some("forge: ".into())),
    );

    assert_eq!(emit("intersphinx_mapping", &Value::Mapping(entries)), vec![
      "  intersphinx_mapping:",
      "    restdoc:",
      "    - https://docs.typo3.org/typo3cms/extensions/restdoc/",
      "    - null",
      "    forge:",
      "    - https://forge.typo3.org/issues/%s",
      "    - 'forge: '",
    ]);
  }

  #[test]
  fn test_emit_nested_list() {
    let value = Value::List(vec![Value::List(vec![
      Value::scalar("Index"),
      Value::scalar("sphinx.tex"),
      Value::scalar("manual"),
    ])]);

    assert_eq!(emit("latex_documents", &value), vec![
      "  latex_documents:",
      "  - - Index",
      "    - sphinx.tex",
      "    - manual",
    ]);
  }

  #[test]
  fn test_emit_scalars() {
    assert_eq!(emit("version", &Value::scalar("1.0")), vec!["  version: 1.0"]);
    assert_eq!(emit("empty", &Value::scalar("")), vec!["  empty:"]);
  }

  #[test]
  fn test_default_document_serializes_header_only() {
    let doc = SettingsDocument::default();
    assert_eq!(doc.to_yaml_string(), "conf.py:\n");
    assert!(!doc.has_document_markers());
  }

  #[test]
  fn test_set_appends_and_replaces() {
    let mut doc = SettingsDocument::default();
    doc.set("project", Value::scalar("One"));
    doc.set("version", Value::scalar("1.0"));
    doc.set("project", Value::scalar("Two"));

    let keys: Vec<&str> = doc.settings().map(|(k, _)| k).collect();
    assert_eq!(keys, vec!["project", "version"]);
    assert_eq!(
      doc.to_yaml_string(),
      "conf.py:\n  project: Two\n  version: 1.0\n"
    );
  }

  #[test]
  fn test_crlf_documents_emit_crlf_lines() {
    let mut doc = SettingsDocument {
      header: "conf.py:\r".to_string(),
      line_ending: LineEnding::CrLf,
      ..SettingsDocument::default()
    };
    doc.set("project", Value::scalar("Demo"));
    assert_eq!(doc.to_yaml_string(), "conf.py:\r\n  project: Demo\r\n");
  }
}
