use indexmap::IndexMap;

/// How a scalar was written in the settings file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScalarStyle {
  #[default]
  Plain,
  SingleQuoted,
  DoubleQuoted,
}

/// A scalar value, already unquoted.
///
/// The style is kept so that `'true'` stays a string while `true` becomes a
/// boolean, and so that re-emitted YAML keeps the author's quoting.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Scalar {
  pub text:  String,
  pub style: ScalarStyle,
}

impl Scalar {
  #[must_use]
  pub fn plain(text: impl Into<String>) -> Self {
    Self {
      text:  text.into(),
      style: ScalarStyle::Plain,
    }
  }

  #[must_use]
  pub fn quoted(text: impl Into<String>) -> Self {
    Self {
      text:  text.into(),
      style: ScalarStyle::SingleQuoted,
    }
  }

  #[must_use]
  pub const fn is_plain(&self) -> bool {
    matches!(self.style, ScalarStyle::Plain)
  }

  /// Whether this is a plain YAML null (`null`, `~` or nothing at all).
  #[must_use]
  pub fn is_null(&self) -> bool {
    self.is_plain()
      && matches!(self.text.as_str(), "" | "~" | "null" | "Null" | "NULL")
  }

  /// Whether this is a plain `true`/`false`, ignoring case.
  #[must_use]
  pub fn as_bool(&self) -> Option<bool> {
    if !self.is_plain() {
      return None;
    }
    if self.text.eq_ignore_ascii_case("true") {
      Some(true)
    } else if self.text.eq_ignore_ascii_case("false") {
      Some(false)
    } else {
      None
    }
  }

  /// Format the scalar for a YAML line, quoting only when the text would
  /// not read back as the same plain scalar.
  #[must_use]
  pub fn to_yaml(&self) -> String {
    match self.style {
      ScalarStyle::Plain if is_plain_safe(&self.text) => self.text.clone(),
      ScalarStyle::DoubleQuoted => {
        let mut out = String::with_capacity(self.text.len() + 2);
        out.push('"');
        for c in self.text.chars() {
          match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            other => out.push(other),
          }
        }
        out.push('"');
        out
      },
      _ => format!("'{}'", self.text.replace('\'', "''")),
    }
  }
}

/// Whether `text` can be written as a plain scalar without changing meaning.
fn is_plain_safe(text: &str) -> bool {
  let Some(first) = text.chars().next() else {
    return true;
  };

  if text.trim() != text {
    return false;
  }
  if matches!(
    first,
    '\'' | '"' | '-' | '?' | ':' | ',' | '[' | ']' | '{' | '}' | '#' | '&'
      | '*' | '!' | '|' | '>' | '%' | '@' | '`'
  ) && !(first == '-' && text.len() > 1 && !text.starts_with("- "))
  {
    return false;
  }

  !(text.contains(": ")
    || text.contains(" #")
    || text.ends_with(':')
    || text.contains('\n'))
}

/// A node of the settings tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
  Scalar(Scalar),
  List(Vec<Self>),
  Mapping(IndexMap<String, Self>),
  /// The `[url, alias]` form of `intersphinx_mapping` and `extlinks`
  /// entries. A null alias is `None`.
  Pair { url: String, alias: Option<String> },
}

impl Value {
  #[must_use]
  pub fn scalar(text: impl Into<String>) -> Self {
    Self::Scalar(Scalar::plain(text))
  }

  #[must_use]
  pub fn pair(url: impl Into<String>, alias: Option<String>) -> Self {
    Self::Pair {
      url: url.into(),
      alias,
    }
  }

  #[must_use]
  pub const fn as_scalar(&self) -> Option<&Scalar> {
    match self {
      Self::Scalar(s) => Some(s),
      _ => None,
    }
  }

  #[must_use]
  pub const fn as_mapping(&self) -> Option<&IndexMap<String, Self>> {
    match self {
      Self::Mapping(m) => Some(m),
      _ => None,
    }
  }

  /// Short name of the value's shape, used in diagnostics.
  #[must_use]
  pub fn shape(&self) -> String {
    match self {
      Self::Scalar(_) => "scalar".to_string(),
      Self::Pair { .. } => "pair".to_string(),
      Self::List(items) => {
        let inner: Vec<String> = items.iter().map(Self::shape).collect();
        format!("list[{}]", inner.join(", "))
      },
      Self::Mapping(entries) => {
        let inner: Vec<String> = entries
          .iter()
          .map(|(k, v)| format!("{k}: {}", v.shape()))
          .collect();
        format!("mapping{{{}}}", inner.join(", "))
      },
    }
  }

  /// Turn every two-scalar list directly under a mapping into a
  /// [`Value::Pair`]. Other entries are left alone.
  #[must_use]
  pub fn into_pairs(self) -> Self {
    let Self::Mapping(entries) = self else {
      return self;
    };

    Self::Mapping(
      entries
        .into_iter()
        .map(|(key, value)| {
          let value = match value {
            Self::List(items) => list_to_pair(items),
            other => other,
          };
          (key, value)
        })
        .collect(),
    )
  }
}

fn list_to_pair(items: Vec<Value>) -> Value {
  match items.as_slice() {
    [Value::Scalar(url), Value::Scalar(alias)] => {
      Value::Pair {
        url:   url.text.clone(),
        alias: (!alias.is_null()).then(|| alias.text.clone()),
      }
    },
    _ => Value::List(items),
  }
}
