//! Python literal syntax.

/// Escape `text` for use inside a single-quoted Python string literal.
#[must_use]
pub fn escape(text: &str) -> String {
  let mut out = String::with_capacity(text.len());
  for c in text.chars() {
    match c {
      '\\' => out.push_str("\\\\"),
      '\'' => out.push_str("\\'"),
      '\n' => out.push_str("\\n"),
      '\r' => out.push_str("\\r"),
      other => out.push(other),
    }
  }
  out
}

/// `'text'`
#[must_use]
pub fn str_literal(text: &str) -> String {
  format!("'{}'", escape(text))
}

/// `u'text'`
#[must_use]
pub fn unicode_literal(text: &str) -> String {
  format!("u'{}'", escape(text))
}

#[must_use]
pub const fn bool_literal(value: bool) -> &'static str {
  if value { "True" } else { "False" }
}

/// Whether `text` is a decimal number Python accepts as a bare literal:
/// optional sign, digits with an optional fraction, optional exponent.
#[must_use]
pub fn is_numeric(text: &str) -> bool {
  let unsigned = text.strip_prefix(['+', '-']).unwrap_or(text);
  let (mantissa, exponent) = match unsigned.find(['e', 'E']) {
    Some(pos) => (&unsigned[..pos], Some(&unsigned[pos + 1..])),
    None => (unsigned, None),
  };

  let (int_part, frac_part) = match mantissa.split_once('.') {
    Some((int_part, frac_part)) => (int_part, Some(frac_part)),
    None => (mantissa, None),
  };
  let all_digits = |s: &str| s.bytes().all(|b| b.is_ascii_digit());
  let mantissa_ok = all_digits(int_part)
    && frac_part.is_none_or(all_digits)
    && (!int_part.is_empty() || frac_part.is_some_and(|f| !f.is_empty()));

  let exponent_ok = exponent.is_none_or(|exp| {
    let digits = exp.strip_prefix(['+', '-']).unwrap_or(exp);
    !digits.is_empty() && all_digits(digits)
  });

  mantissa_ok && exponent_ok
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_escape_backslash_and_quote() {
    assert_eq!(escape(r"\usepackage{typo3}"), r"\\usepackage{typo3}");
    assert_eq!(escape("it's"), r"it\'s");
    assert_eq!(str_literal("a\nb"), r"'a\nb'");
    assert_eq!(unicode_literal("2014"), "u'2014'");
  }

  #[test]
  fn test_numeric_detection() {
    for yes in ["300", "-2", "+7", "1.5", ".5", "5.", "1e3", "2.5E-4"] {
      assert!(is_numeric(yes), "{yes} should be numeric");
    }
    for no in ["", "-", ".", "10pt", "1.2.0", "e5", "1e", "0x1F", "inf", "1 000"]
    {
      assert!(!is_numeric(no), "{no} should not be numeric");
    }
  }

  #[test]
  fn test_bool_literal() {
    assert_eq!(bool_literal(true), "True");
    assert_eq!(bool_literal(false), "False");
  }
}
