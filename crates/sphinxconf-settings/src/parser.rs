//! Reader for the constrained YAML subset used by `Settings.yml`.
//!
//! Supported: comment and blank lines, optional `---`/`...` markers, one
//! top-level `conf.py:` block, block mappings, block sequences (also at the
//! indentation of their parent key), and plain, single- or double-quoted
//! scalars. Anything else is read on a best-effort basis and never panics.
use indexmap::IndexMap;

use crate::{
  document::{LineEnding, Setting, SettingsDocument, DEFAULT_INDENT},
  error::ParseError,
  value::{Scalar, ScalarStyle, Value},
};

/// Keys whose entries are `[url, alias]` pairs.
pub const PAIR_MAPPING_KEYS: &[&str] = &["intersphinx_mapping", "extlinks"];

const CONF_PY_KEY: &str = "conf.py";

/// A structural line: indentation plus content, with line terminator and
/// trailing whitespace removed.
#[derive(Debug, Clone, Copy)]
struct Line<'a> {
  indent: usize,
  text:   &'a str,
}

impl<'a> Line<'a> {
  fn new(raw: &'a str) -> Self {
    let content = raw.trim_end();
    let text = content.trim_start_matches(' ');
    Self {
      indent: content.len() - text.len(),
      text,
    }
  }

  fn is_sequence_item(&self) -> bool {
    self.text == "-" || self.text.starts_with("- ")
  }
}

/// Whether a raw line carries no structure (blank or a comment).
fn is_trivia(raw: &str) -> bool {
  let trimmed = raw.trim();
  trimmed.is_empty() || trimmed.starts_with('#')
}

fn is_start_marker(raw: &str) -> bool {
  let raw = raw.trim_end();
  raw == "---" || raw.starts_with("--- ")
}

fn is_end_marker(raw: &str) -> bool {
  raw.trim_end() == "..."
}

fn is_conf_py_header(raw: &str) -> bool {
  if raw.starts_with([' ', '\t']) {
    return false;
  }
  split_key(strip_comment(raw.trim_end()))
    .is_some_and(|(key, rest)| key == CONF_PY_KEY && rest.is_empty())
}

/// Drop a trailing ` # comment` from a line that is not quoted.
fn strip_comment(text: &str) -> &str {
  if text.starts_with('#') {
    return "";
  }
  if text.starts_with(['\'', '"']) {
    return text;
  }
  text.find(" #").map_or(text, |pos| text[..pos].trim_end())
}

/// Split `key: rest` or `key:` into its parts. Quoted keys are unquoted.
fn split_key(text: &str) -> Option<(String, &str)> {
  if text.starts_with(['\'', '"']) {
    let end = quoted_end(text)?;
    let rest = text[end..].strip_prefix(':')?;
    if !(rest.is_empty() || rest.starts_with(' ')) {
      return None;
    }
    return Some((parse_scalar(&text[..end]).text, rest.trim()));
  }
  if let Some(pos) = text.find(": ") {
    return Some((text[..pos].trim_end().to_string(), text[pos + 2..].trim()));
  }
  text
    .strip_suffix(':')
    .map(|key| (key.trim_end().to_string(), ""))
}

/// Byte offset just past the closing quote of the quoted scalar that starts
/// `text`.
fn quoted_end(text: &str) -> Option<usize> {
  let mut chars = text.char_indices();
  let (_, quote) = chars.next()?;
  let mut escaped = false;
  while let Some((i, c)) = chars.next() {
    if quote == '"' {
      match c {
        _ if escaped => escaped = false,
        '\\' => escaped = true,
        '"' => return Some(i + 1),
        _ => {},
      }
    } else if c == '\'' {
      // `''` inside single quotes is a literal quote
      if text[i + 1..].starts_with('\'') {
        chars.next();
        continue;
      }
      return Some(i + 1);
    }
  }
  None
}

/// Parse the text of a settings file.
///
/// # Errors
///
/// Returns [`ParseError::MissingConfPy`] if there is no top-level
/// `conf.py:` line.
pub fn parse(text: &str) -> Result<SettingsDocument, ParseError> {
  let trailing_newline = text.ends_with('\n');
  let mut lines: Vec<&str> = text.split('\n').collect();
  if trailing_newline {
    lines.pop();
  }
  let line_ending = if lines.first().is_some_and(|l| l.ends_with('\r')) {
    LineEnding::CrLf
  } else {
    LineEnding::Lf
  };

  let mut idx = 0;
  while idx < lines.len() && is_trivia(lines[idx]) {
    idx += 1;
  }
  let preamble = to_owned(&lines[..idx]);

  let start_marker = if idx < lines.len() && is_start_marker(lines[idx]) {
    idx += 1;
    Some(lines[idx - 1].to_string())
  } else {
    None
  };

  let header_idx = lines[idx..]
    .iter()
    .position(|raw| is_conf_py_header(raw))
    .map(|offset| idx + offset)
    .ok_or(ParseError::MissingConfPy)?;
  let lead_in = to_owned(&lines[idx..header_idx]);

  // The block runs until the first structural line at column 0.
  let body_start = header_idx + 1;
  let mut body_end = body_start;
  while body_end < lines.len() {
    let raw = lines[body_end];
    if !is_trivia(raw) && !raw.starts_with([' ', '\t']) {
      break;
    }
    body_end += 1;
  }
  // Trailing comments and blank lines belong after the block.
  while body_end > body_start && is_trivia(lines[body_end - 1]) {
    body_end -= 1;
  }

  let body = &lines[body_start..body_end];
  let indent = body
    .iter()
    .find(|raw| !is_trivia(raw))
    .map_or(DEFAULT_INDENT, |raw| Line::new(raw).indent.max(1));
  let (conf_py, mut epilogue) = parse_settings(body, indent);

  let rest = &lines[body_end..];
  let (end_marker, trailer) =
    match rest.iter().position(|raw| is_end_marker(raw)) {
      Some(pos) => {
        epilogue.extend(to_owned(&rest[..pos]));
        (Some(rest[pos].to_string()), to_owned(&rest[pos + 1..]))
      },
      None => {
        epilogue.extend(to_owned(rest));
        (None, Vec::new())
      },
    };

  log::debug!(
    "parsed settings: {} setting(s), markers: {}, indent: {indent}",
    conf_py.len(),
    start_marker.is_some() && end_marker.is_some(),
  );

  Ok(SettingsDocument {
    preamble,
    start_marker,
    lead_in,
    header: lines[header_idx].to_string(),
    conf_py,
    epilogue,
    end_marker,
    trailer,
    indent,
    line_ending,
    trailing_newline,
  })
}

fn to_owned(lines: &[&str]) -> Vec<String> {
  lines.iter().map(|l| (*l).to_string()).collect()
}

/// Split the body of the `conf.py:` block into settings, keeping every raw
/// line with the setting it belongs to.
///
/// Lines that belong to no setting are returned separately.
fn parse_settings(
  body: &[&str],
  indent: usize,
) -> (IndexMap<String, Setting>, Vec<String>) {
  struct Pending<'a> {
    key:     String,
    inline:  &'a str,
    leading: Vec<String>,
    source:  Vec<&'a str>,
  }

  fn finish(pending: Pending<'_>, out: &mut IndexMap<String, Setting>) {
    let children: Vec<Line<'_>> = pending.source[1..]
      .iter()
      .filter(|raw| !is_trivia(raw))
      .map(|raw| Line::new(raw))
      .collect();
    let mut value = entry_value(pending.inline, &children);
    if PAIR_MAPPING_KEYS.contains(&pending.key.as_str()) {
      value = value.into_pairs();
    }
    let mut leading = pending.leading;
    // A shadowed setting keeps its lines as leading text of the setting that
    // followed it, so the file still serializes unchanged.
    if let Some((index, _, shadowed)) = out.shift_remove_full(&pending.key) {
      log::warn!("duplicate setting `{}`, keeping the last one", pending.key);
      let mut raw = shadowed.leading;
      raw.extend(shadowed.source.unwrap_or_default());
      match out.get_index_mut(index) {
        Some((_, next)) => {
          raw.append(&mut next.leading);
          next.leading = raw;
        },
        None => {
          raw.append(&mut leading);
          leading = raw;
        },
      }
    }
    out.insert(pending.key, Setting {
      leading,
      value,
      source: Some(to_owned(&pending.source)),
    });
  }

  let mut out = IndexMap::new();
  let mut current: Option<Pending<'_>> = None;
  let mut trivia: Vec<&str> = Vec::new();

  for &raw in body {
    if is_trivia(raw) {
      trivia.push(raw);
      continue;
    }

    let line = Line::new(raw);
    if line.indent > indent || line.is_sequence_item() {
      if let Some(pending) = current.as_mut() {
        pending.source.append(&mut trivia);
        pending.source.push(raw);
      } else {
        log::debug!("ignoring stray line in `conf.py` block: {raw:?}");
        trivia.push(raw);
      }
      continue;
    }

    if let Some(done) = current.take() {
      finish(done, &mut out);
    }
    let (key, inline) =
      split_key(line.text).unwrap_or_else(|| (line.text.to_string(), ""));
    current = Some(Pending {
      key,
      inline,
      leading: to_owned(&trivia),
      source: vec![raw],
    });
    trivia.clear();
  }

  if let Some(mut done) = current.take() {
    done.source.append(&mut trivia);
    finish(done, &mut out);
  }
  (out, to_owned(&trivia))
}

/// Value of a mapping entry from its inline text and nested lines.
fn entry_value(inline: &str, children: &[Line<'_>]) -> Value {
  let inline = strip_comment(inline);
  if !inline.is_empty() {
    return Value::Scalar(parse_scalar(inline));
  }
  if children.is_empty() {
    return Value::Scalar(Scalar::default());
  }
  parse_node(children)
}

fn parse_node(lines: &[Line<'_>]) -> Value {
  match lines.first() {
    None => Value::Scalar(Scalar::default()),
    Some(first) if first.is_sequence_item() => {
      parse_sequence(lines, first.indent)
    },
    Some(first) => parse_mapping(lines, first.indent),
  }
}

fn parse_sequence(lines: &[Line<'_>], indent: usize) -> Value {
  let mut items = Vec::new();
  let mut i = 0;
  while i < lines.len() {
    let line = lines[i];
    if line.indent != indent || !line.is_sequence_item() {
      log::debug!("ignoring misplaced sequence line: {:?}", line.text);
      i += 1;
      continue;
    }

    let rest = line.text[1..].trim_start();
    let rest_indent = indent + (line.text.len() - rest.len());
    let mut end = i + 1;
    while end < lines.len() && lines[end].indent > indent {
      end += 1;
    }
    let children = &lines[i + 1..end];

    let item = if rest.is_empty() {
      parse_node(children)
    } else if children.is_empty()
      && !(rest == "-" || rest.starts_with("- "))
      && split_key(rest).is_none()
    {
      Value::Scalar(parse_scalar(rest))
    } else {
      let mut nested = Vec::with_capacity(children.len() + 1);
      nested.push(Line {
        indent: rest_indent,
        text:   rest,
      });
      nested.extend_from_slice(children);
      parse_node(&nested)
    };
    items.push(item);
    i = end;
  }
  Value::List(items)
}

fn parse_mapping(lines: &[Line<'_>], indent: usize) -> Value {
  let mut entries = IndexMap::new();
  let mut i = 0;
  while i < lines.len() {
    let line = lines[i];
    if line.indent != indent || line.is_sequence_item() {
      log::debug!("ignoring misplaced mapping line: {:?}", line.text);
      i += 1;
      continue;
    }

    let (key, inline) =
      split_key(line.text).unwrap_or_else(|| (line.text.to_string(), ""));
    let mut end = i + 1;
    while end < lines.len()
      && (lines[end].indent > indent
        || (lines[end].indent == indent && lines[end].is_sequence_item()))
    {
      end += 1;
    }
    entries.insert(key, entry_value(inline, &lines[i + 1..end]));
    i = end;
  }
  Value::Mapping(entries)
}

/// Decode an inline scalar, removing quotes and trailing comments.
pub(crate) fn parse_scalar(text: &str) -> Scalar {
  let text = text.trim();
  if let Some(inner) = text.strip_prefix('\'') {
    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.chars().peekable();
    while let Some(c) = chars.next() {
      if c == '\'' {
        if chars.peek() == Some(&'\'') {
          chars.next();
          out.push('\'');
        } else {
          break;
        }
      } else {
        out.push(c);
      }
    }
    return Scalar {
      text:  out,
      style: ScalarStyle::SingleQuoted,
    };
  }

  if let Some(inner) = text.strip_prefix('"') {
    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(c) = chars.next() {
      match c {
        '"' => break,
        '\\' => {
          match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some('r') => out.push('\r'),
            Some('0') => out.push('\0'),
            Some(other) => out.push(other),
            None => out.push('\\'),
          }
        },
        other => out.push(other),
      }
    }
    return Scalar {
      text:  out,
      style: ScalarStyle::DoubleQuoted,
    };
  }

  Scalar::plain(strip_comment(text))
}
