use std::{borrow::Cow, fmt, sync::LazyLock};

use regex::Regex;

#[cfg(feature = "tracing")]
use tracing::{debug, trace};

const ASSIGNMENT_OPERATOR: char = '=';
const ALLOWED_VALUES_SEPARATOR: char = '|';

static SOURCE_LINE: LazyLock<Regex> = LazyLock::new(|| {
  Regex::new(r"^[0-9A-Za-z_]+=([0-9A-Za-z_]+(\|[0-9A-Za-z_]+)*)?$")
    .expect("static source line regex must compile")
});

static TARGET_LINE: LazyLock<Regex> = LazyLock::new(|| {
  Regex::new(r"^[0-9A-Za-z_]+=[0-9A-Za-z_]+$").expect("static target line regex must compile")
});

/// Splits file content into lines.
///
/// Trailing line breaks are dropped first, so a file with or without a final
/// newline yields the same lines. Blank lines elsewhere are kept.
pub fn split_lines(content: &str) -> Vec<&str> {
  let lines: Vec<&str> = content.trim_end_matches(['\r', '\n']).lines().collect();

  #[cfg(feature = "tracing")]
  debug!("Split content into {} lines", lines.len());

  lines
}

/// The shape a line must have in the template or in the target file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineFormat {
  /// `KEY=`, `KEY=VALUE` or `KEY=VALUE1|VALUE2|...`
  Source,
  /// `KEY=VALUE` with a non-empty value
  Target,
}

impl LineFormat {
  pub fn matches(self, line: &str) -> bool {
    let pattern = match self {
      LineFormat::Source => &SOURCE_LINE,
      LineFormat::Target => &TARGET_LINE,
    };
    pattern.is_match(line)
  }

  /// Lines not matching this format, with their 1-based line numbers.
  pub fn violations<'a>(self, lines: &[&'a str]) -> impl Iterator<Item = (usize, &'a str)> {
    lines
      .iter()
      .copied()
      .enumerate()
      .filter(move |(_, line)| !self.matches(line))
      .map(|(index, line)| (index + 1, line))
  }

  /// Which file this format applies to.
  pub fn role(self) -> &'static str {
    match self {
      LineFormat::Source => "source",
      LineFormat::Target => "target",
    }
  }
}

impl fmt::Display for LineFormat {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      LineFormat::Source => write!(f, "<KEY>=<?ALLOWED_VALUES>"),
      LineFormat::Target => write!(f, "<KEY>=<VALUE>"),
    }
  }
}

/// Non-empty set of values a template allows for a key.
#[derive(Debug, Clone, PartialEq)]
pub struct AllowedValues<'a>(Vec<Cow<'a, str>>);

impl<'a> AllowedValues<'a> {
  /// Exact, case-sensitive membership.
  pub fn contains(&self, value: &str) -> bool {
    self.0.iter().any(|allowed| allowed == value)
  }

  pub fn iter(&self) -> impl Iterator<Item = &str> {
    self.0.iter().map(|value| value.as_ref())
  }

  pub fn to_vec(&self) -> Vec<String> {
    self.iter().map(str::to_string).collect()
  }
}

impl<'a> fmt::Display for AllowedValues<'a> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    for (index, value) in self.0.iter().enumerate() {
      if index > 0 {
        write!(f, " {} ", ALLOWED_VALUES_SEPARATOR)?;
      }
      write!(f, "{}", value)?;
    }
    Ok(())
  }
}

/// A declaration line of the template file.
#[derive(Debug, Clone, PartialEq)]
pub struct SourceEntry<'a> {
  pub key: Cow<'a, str>,
  /// `None` when the key accepts any value.
  pub allowed_values: Option<AllowedValues<'a>>,
}

impl<'a> From<&'a str> for SourceEntry<'a> {
  fn from(s: &'a str) -> Self {
    #[cfg(feature = "tracing")]
    trace!("Tokenizing source line: {:?}", s);

    let (key, rest) = s.split_once(ASSIGNMENT_OPERATOR).unwrap_or((s, ""));

    let allowed_values = (!rest.is_empty()).then(|| {
      AllowedValues(
        rest
          .split(ALLOWED_VALUES_SEPARATOR)
          .map(Cow::Borrowed)
          .collect(),
      )
    });

    SourceEntry {
      key: Cow::Borrowed(key),
      allowed_values,
    }
  }
}

/// A declaration line of the file being checked.
#[derive(Debug, Clone, PartialEq)]
pub struct TargetEntry<'a> {
  pub key: Cow<'a, str>,
  pub value: Cow<'a, str>,
}

impl<'a> From<&'a str> for TargetEntry<'a> {
  fn from(s: &'a str) -> Self {
    #[cfg(feature = "tracing")]
    trace!("Tokenizing target line: {:?}", s);

    let (key, value) = s.split_once(ASSIGNMENT_OPERATOR).unwrap_or((s, ""));

    TargetEntry {
      key: Cow::Borrowed(key),
      value: Cow::Borrowed(value),
    }
  }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct TargetFile<'a> {
  pub entries: Vec<TargetEntry<'a>>,
}

impl<'a> TargetFile<'a> {
  /// First entry declaring `key`.
  pub fn get(&self, key: &str) -> Option<&TargetEntry<'a>> {
    self.entries.iter().find(|entry| entry.key == key)
  }
}

impl<'a> FromIterator<TargetEntry<'a>> for TargetFile<'a> {
  fn from_iter<I: IntoIterator<Item = TargetEntry<'a>>>(iter: I) -> Self {
    Self {
      entries: iter.into_iter().collect(),
    }
  }
}
