//! Idempotent registration of `intersphinx_mapping` entries.
use std::{
  fmt,
  fs,
  io::{self, Write},
  path::Path,
};

use indexmap::IndexMap;
use log::{debug, info, warn};
use tempfile::NamedTempFile;

use crate::{
  document::{Setting, SettingsDocument},
  error::SettingsError,
  parser::parse,
  skeleton::DefaultSkeleton,
  value::Value,
};

pub const INTERSPHINX_MAPPING: &str = "intersphinx_mapping";

/// What an upsert did to the mapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MappingOutcome {
  /// The key was new and now leads the mapping.
  Added,
  /// The key existed with another URL; it was moved to the front with the
  /// new one.
  Updated,
  /// The key already pointed at the URL. Nothing was written.
  Unchanged,
}

impl MappingOutcome {
  #[must_use]
  pub const fn is_changed(self) -> bool {
    !matches!(self, Self::Unchanged)
  }
}

impl fmt::Display for MappingOutcome {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(match self {
      Self::Added => "added",
      Self::Updated => "updated",
      Self::Unchanged => "unchanged",
    })
  }
}

/// Intersphinx base URLs always end with a slash.
#[must_use]
pub fn normalize_url(url: &str) -> String {
  if url.ends_with('/') {
    url.to_string()
  } else {
    format!("{url}/")
  }
}

impl SettingsDocument {
  /// Registered intersphinx mappings as `(key, url, alias)`, in file order.
  /// Entries that are not `[url, alias]` pairs are skipped.
  pub fn intersphinx_entries(
    &self,
  ) -> impl Iterator<Item = (&str, &str, Option<&str>)> {
    self
      .get(INTERSPHINX_MAPPING)
      .and_then(Value::as_mapping)
      .into_iter()
      .flatten()
      .filter_map(|(key, value)| {
        match value {
          Value::Pair { url, alias } => {
            Some((key.as_str(), url.as_str(), alias.as_deref()))
          },
          _ => None,
        }
      })
  }

  /// Point `key` at `url` in `intersphinx_mapping`, as its first entry.
  ///
  /// The mapping is created as the last setting if missing. Only the mapping
  /// is re-emitted on serialization; comments directly above it are kept.
  pub fn upsert_intersphinx(&mut self, key: &str, url: &str) -> MappingOutcome {
    let url = normalize_url(url);

    let current = self
      .get(INTERSPHINX_MAPPING)
      .and_then(Value::as_mapping)
      .and_then(|entries| entries.get(key));
    if let Some(Value::Pair { url: existing, .. }) = current
      && *existing == url
    {
      return MappingOutcome::Unchanged;
    }

    let setting = self
      .conf_py
      .entry(INTERSPHINX_MAPPING.to_string())
      .or_insert_with(|| Setting::new(Value::Mapping(IndexMap::new())));
    setting.source = None;

    let mut entries =
      match std::mem::replace(&mut setting.value, Value::Mapping(IndexMap::new()))
      {
        Value::Mapping(entries) => entries,
        other => {
          warn!(
            "replacing `{INTERSPHINX_MAPPING}` of shape {} with a mapping",
            other.shape()
          );
          IndexMap::new()
        },
      };

    let outcome = if entries.shift_remove(key).is_some() {
      MappingOutcome::Updated
    } else {
      MappingOutcome::Added
    };
    entries.shift_insert(0, key.to_string(), Value::pair(url, None));
    setting.value = Value::Mapping(entries);

    outcome
  }
}

/// Read and parse a settings file.
///
/// # Errors
///
/// Returns [`SettingsError::Read`] if the file cannot be read and
/// [`SettingsError::Parse`] if it has no `conf.py:` block.
pub fn read_settings(
  path: impl AsRef<Path>,
) -> Result<SettingsDocument, SettingsError> {
  let path = path.as_ref();
  let text = fs::read_to_string(path).map_err(|source| {
    SettingsError::Read {
      path: path.to_path_buf(),
      source,
    }
  })?;
  parse_file(path, &text)
}

fn parse_file(path: &Path, text: &str) -> Result<SettingsDocument, SettingsError> {
  parse(text).map_err(|source| {
    SettingsError::Parse {
      path: path.to_path_buf(),
      source,
    }
  })
}

/// Replace the file at `path` with the serialized document.
///
/// The text goes to a temporary file in the same directory that is then
/// renamed over `path`, so a failed write leaves the old file intact.
///
/// # Errors
///
/// Returns [`SettingsError::Write`] if the temporary file cannot be created,
/// written or renamed.
pub fn write_settings(
  path: impl AsRef<Path>,
  doc: &SettingsDocument,
) -> Result<(), SettingsError> {
  let path = path.as_ref();
  let write_err = |source: io::Error| {
    SettingsError::Write {
      path: path.to_path_buf(),
      source,
    }
  };

  let dir = path
    .parent()
    .filter(|parent| !parent.as_os_str().is_empty())
    .unwrap_or_else(|| Path::new("."));
  let mut tmp = NamedTempFile::new_in(dir).map_err(write_err)?;
  tmp
    .write_all(doc.to_yaml_string().as_bytes())
    .map_err(write_err)?;
  tmp.as_file().sync_all().map_err(write_err)?;

  // Temporary files are private; keep the mode of the file being replaced.
  if let Ok(meta) = fs::metadata(path) {
    tmp
      .as_file()
      .set_permissions(meta.permissions())
      .map_err(write_err)?;
  }

  tmp.persist(path).map_err(|e| write_err(e.error))?;
  debug!("wrote {}", path.display());
  Ok(())
}

/// Register `key` → `url` in the settings file at `path`.
///
/// A missing file is created from the default skeleton dated with the
/// current year. See [`upsert_intersphinx_mapping_with`].
///
/// # Errors
///
/// See [`upsert_intersphinx_mapping_with`].
pub fn upsert_intersphinx_mapping(
  path: impl AsRef<Path>,
  key: &str,
  url: &str,
) -> Result<MappingOutcome, SettingsError> {
  upsert_intersphinx_mapping_with(path, key, url, &DefaultSkeleton::current())
}

/// Register `key` → `url` in the settings file at `path`, creating it from
/// `skeleton` if it does not exist.
///
/// When the mapping already holds the URL the file is not touched at all.
///
/// # Errors
///
/// Returns [`SettingsError::Read`] or [`SettingsError::Parse`] if an
/// existing file cannot be loaded and [`SettingsError::Write`] if the result
/// cannot be written. Nothing is written on error.
pub fn upsert_intersphinx_mapping_with(
  path: impl AsRef<Path>,
  key: &str,
  url: &str,
  skeleton: &DefaultSkeleton,
) -> Result<MappingOutcome, SettingsError> {
  let path = path.as_ref();
  let mut doc = match fs::read_to_string(path) {
    Ok(text) => parse_file(path, &text)?,
    Err(e) if e.kind() == io::ErrorKind::NotFound => {
      debug!("{} does not exist, starting from the skeleton", path.display());
      skeleton.to_document()
    },
    Err(source) => {
      return Err(SettingsError::Read {
        path: path.to_path_buf(),
        source,
      });
    },
  };

  let outcome = doc.upsert_intersphinx(key, url);
  if outcome.is_changed() {
    write_settings(path, &doc)?;
    info!(
      "{outcome} intersphinx mapping `{key}` in {}",
      path.display()
    );
  } else {
    debug!(
      "intersphinx mapping `{key}` in {} is up to date",
      path.display()
    );
  }
  Ok(outcome)
}

#[cfg(test)]
mod tests {
  #![allow(clippy::expect_used, reason = "Fine in tests")]
  use super::*;

  #[test]
  fn test_normalize_url() {
    assert_eq!(
      normalize_url("https://typo3.org/api/typo3cms"),
      "https://typo3.org/api/typo3cms/"
    );
    assert_eq!(normalize_url("https://x.org/"), "https://x.org/");
  }

  #[test]
  fn test_upsert_into_document_without_mapping() {
    let mut doc = parse("conf.py:\n  project: Demo\n").expect("parse");
    assert_eq!(
      doc.upsert_intersphinx("restdoc", "https://example.org/restdoc"),
      MappingOutcome::Added
    );
    assert_eq!(
      doc.to_yaml_string(),
      "conf.py:\n  project: Demo\n  intersphinx_mapping:\n    restdoc:\n    - \
       https://example.org/restdoc/\n    - null\n"
    );
  }

  #[test]
  fn test_newest_entry_comes_first() {
    let mut doc = SettingsDocument::default();
    for key in ["a", "b", "c"] {
      doc.upsert_intersphinx(key, &format!("https://{key}.org"));
    }
    let keys: Vec<&str> = doc.intersphinx_entries().map(|(k, ..)| k).collect();
    assert_eq!(keys, vec!["c", "b", "a"]);
  }

  #[test]
  fn test_changed_url_moves_entry_to_front() {
    let mut doc = SettingsDocument::default();
    doc.upsert_intersphinx("a", "https://a.org/");
    doc.upsert_intersphinx("b", "https://b.org/");

    assert_eq!(
      doc.upsert_intersphinx("a", "https://a.example/"),
      MappingOutcome::Updated
    );
    let entries: Vec<_> = doc.intersphinx_entries().collect();
    assert_eq!(entries, vec![
      ("a", "https://a.example/", None),
      ("b", "https://b.org/", None),
    ]);
  }

  #[test]
  fn test_same_url_is_unchanged_and_keeps_source() {
    let text = "conf.py:\n  intersphinx_mapping:\n    a:\n    - \
                https://a.org/\n    - null # keep me\n";
    let mut doc = parse(text).expect("parse");

    assert_eq!(
      doc.upsert_intersphinx("a", "https://a.org"),
      MappingOutcome::Unchanged
    );
    assert!(!doc.conf_py()[INTERSPHINX_MAPPING].is_modified());
    assert_eq!(doc.to_yaml_string(), text);
  }

  #[test]
  fn test_comments_above_mapping_survive() {
    let mut doc = parse(
      "conf.py:\n  project: Demo\n  # cross links\n  intersphinx_mapping:\n    \
       a:\n    - https://a.org/\n    - null\n",
    )
    .expect("parse");
    doc.upsert_intersphinx("b", "https://b.org");
    assert_eq!(
      doc.to_yaml_string(),
      "conf.py:\n  project: Demo\n  # cross links\n  intersphinx_mapping:\n    \
       b:\n    - https://b.org/\n    - null\n    a:\n    - https://a.org/\n    \
       - null\n"
    );
  }

  #[test]
  fn test_empty_mapping_value_is_filled_in_place() {
    let mut doc =
      parse("conf.py:\n  intersphinx_mapping:\n  project: Demo\n").expect("parse");
    assert_eq!(
      doc.upsert_intersphinx("a", "https://a.org/"),
      MappingOutcome::Added
    );
    assert_eq!(
      doc.to_yaml_string(),
      "conf.py:\n  intersphinx_mapping:\n    a:\n    - https://a.org/\n    - \
       null\n  project: Demo\n"
    );
  }

  #[test]
  fn test_keys_that_need_quoting_read_back() {
    let mut doc = SettingsDocument::default();
    doc.upsert_intersphinx("my: proj", "https://a.org/");
    doc.upsert_intersphinx("#hash", "https://b.org/");

    let text = doc.to_yaml_string();
    assert!(text.contains("\n    'my: proj':\n"));
    assert!(text.contains("\n    '#hash':\n"));

    let reread = parse(&text).expect("parse");
    let entries: Vec<_> = reread.intersphinx_entries().collect();
    assert_eq!(entries, vec![
      ("#hash", "https://b.org/", None),
      ("my: proj", "https://a.org/", None),
    ]);
  }

  #[test]
  fn test_string_aliases_stay_strings() {
    let mut doc = parse(
      "conf.py:\n  intersphinx_mapping:\n    a:\n    - https://a.org/\n    \
       - 'null'\n    t:\n    - https://t.org/\n    - 'true'\n",
    )
    .expect("parse");
    doc.upsert_intersphinx("b", "https://b.org/");

    let reread = parse(&doc.to_yaml_string()).expect("parse");
    let entries: Vec<_> = reread.intersphinx_entries().collect();
    assert_eq!(entries, vec![
      ("b", "https://b.org/", None),
      ("a", "https://a.org/", Some("null")),
      ("t", "https://t.org/", Some("true")),
    ]);
  }

  #[test]
  fn test_crlf_document_gets_crlf_lines() {
    let mut doc = parse("conf.py:\r\n  project: Demo\r\n").expect("parse");
    doc.upsert_intersphinx("a", "https://a.org/");
    assert_eq!(
      doc.to_yaml_string(),
      "conf.py:\r\n  project: Demo\r\n  intersphinx_mapping:\r\n    a:\r\n    \
       - https://a.org/\r\n    - null\r\n"
    );
  }
}
