//! Template conformance checking for environment files.
//!
//! # Check Logic
//!
//! The check process runs, in order:
//! 1. Source and target must have the same number of lines
//! 2. Every source line must match `<KEY>=<?ALLOWED_VALUES>`
//! 3. Every target line must match `<KEY>=<VALUE>`
//! 4. For each template key, in template order:
//!    - the target must declare it (first declaration wins)
//!    - if the template lists allowed values, the target value must be one of them
//!
//! In [`CheckMode::FailFast`] the first failure ends the run. In
//! [`CheckMode::CollectAll`] every check runs and every failure is kept.
//!
//! # Examples
//!
//! ```rust
//! use env_check::check::{CheckMode, EnvCheck};
//!
//! let result = EnvCheck::check("MODE=dev|prod\nAPI_KEY=", "MODE=prod\nAPI_KEY=abc", CheckMode::FailFast);
//! assert!(result.is_ok());
//! ```

use std::{fmt, ops::ControlFlow, path::PathBuf};

#[cfg(feature = "tracing")]
use tracing::{debug, info, trace};

use crate::parse::{LineFormat, SourceEntry, TargetEntry, TargetFile, split_lines};

pub const DEFAULT_SOURCE_FILENAME: &str = ".env.example";
pub const DEFAULT_TARGET_FILENAME: &str = ".env";

/// Main checking service for environment files.
pub struct EnvCheck;

impl EnvCheck {
  /// Reads both files and checks the target against the template.
  ///
  /// A missing or unreadable file is an error; a target that does not satisfy
  /// the template is reported through [`CheckRun::result`].
  pub fn check_with_options(options: EnvCheckOptions) -> Result<CheckRun, EnvCheckError> {
    #[cfg(feature = "tracing")]
    info!("Starting env check");

    let EnvCheckOptions {
      source_file,
      target_file,
      mode,
    } = options;

    let source_file = source_file.unwrap_or_else(|| PathBuf::from(DEFAULT_SOURCE_FILENAME));
    let target_file = target_file.unwrap_or_else(|| PathBuf::from(DEFAULT_TARGET_FILENAME));

    #[cfg(feature = "tracing")]
    debug!(?source_file, ?target_file, ?mode, "Resolved file paths");

    if !source_file.exists() {
      return Err(EnvCheckError::SourceNotFound(source_file));
    }

    if !target_file.exists() {
      return Err(EnvCheckError::TargetNotFound(target_file));
    }

    let source_str = std::fs::read_to_string(&source_file).map_err(EnvCheckError::SourceIo)?;
    let target_str = std::fs::read_to_string(&target_file).map_err(EnvCheckError::TargetIo)?;

    let result = Self::check(&source_str, &target_str, mode);

    #[cfg(feature = "tracing")]
    info!(ok = result.is_ok(), "Env check completed");

    Ok(CheckRun {
      source_file,
      target_file,
      result,
    })
  }

  /// Checks target content against template content.
  pub fn check(source: &str, target: &str, mode: CheckMode) -> ValidationResult {
    let source_lines = split_lines(source);
    let target_lines = split_lines(target);

    let mut run = Run {
      mode,
      result: ValidationResult::default(),
    };
    let _ = run.all_checks(&source_lines, &target_lines);

    run.result
  }
}

struct Run {
  mode: CheckMode,
  result: ValidationResult,
}

impl Run {
  fn all_checks(&mut self, source_lines: &[&str], target_lines: &[&str]) -> ControlFlow<()> {
    let line_count = (source_lines.len() != target_lines.len()).then(|| {
      CheckFailure::LineCountMismatch {
        source_lines: source_lines.len(),
        target_lines: target_lines.len(),
      }
    });
    self.record(Check::LineCount, line_count)?;

    self.format(LineFormat::Source, source_lines)?;
    self.format(LineFormat::Target, target_lines)?;

    let target: TargetFile = target_lines.iter().copied().map(TargetEntry::from).collect();

    for entry in source_lines.iter().copied().map(SourceEntry::from) {
      #[cfg(feature = "tracing")]
      trace!("Reconciling key: {}", entry.key);

      let key = entry.key.to_string();
      let Some(found) = target.get(&entry.key) else {
        let failure = CheckFailure::MissingKey { key: key.clone() };
        self.record(Check::KeyPresent { key }, Some(failure))?;
        continue;
      };
      self.record(Check::KeyPresent { key: key.clone() }, None)?;

      let Some(allowed) = &entry.allowed_values else {
        continue;
      };

      let failure = (!allowed.contains(&found.value)).then(|| CheckFailure::InvalidValue {
        key: key.clone(),
        allowed: allowed.to_vec(),
        actual: found.value.to_string(),
      });
      self.record(
        Check::AllowedValue {
          key,
          allowed: allowed.to_vec(),
        },
        failure,
      )?;
    }

    ControlFlow::Continue(())
  }

  fn format(&mut self, format: LineFormat, lines: &[&str]) -> ControlFlow<()> {
    let mut violations = format.violations(lines).peekable();

    if violations.peek().is_none() {
      return self.record(Check::Format(format), None);
    }

    for (line_number, line) in violations {
      let failure = CheckFailure::Format {
        format,
        line_number,
        line: line.to_string(),
      };
      self.record(Check::Format(format), Some(failure))?;
    }

    ControlFlow::Continue(())
  }

  fn record(&mut self, check: Check, failure: Option<CheckFailure>) -> ControlFlow<()> {
    #[cfg(feature = "tracing")]
    match &failure {
      Some(failure) => debug!("Check failed: {}: {}", check, failure),
      None => trace!("Check passed: {}", check),
    }

    let failed = failure.is_some();
    self.result.outcomes.push(Outcome { check, failure });

    if failed && self.mode == CheckMode::FailFast {
      ControlFlow::Break(())
    } else {
      ControlFlow::Continue(())
    }
  }
}

/// How many failures a run reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CheckMode {
  /// Stop at the first failure.
  #[default]
  FailFast,
  /// Run every check and keep every failure.
  CollectAll,
}

/// A single check performed during a run.
#[derive(Debug, Clone, PartialEq)]
pub enum Check {
  LineCount,
  Format(LineFormat),
  KeyPresent { key: String },
  AllowedValue { key: String, allowed: Vec<String> },
}

impl fmt::Display for Check {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Check::LineCount => write!(f, "source and target files have the same number of lines"),
      Check::Format(format) => write!(f, "{} env lines match {} pattern", format.role(), format),
      Check::KeyPresent { key } => write!(f, "target has key: ${}", key),
      Check::AllowedValue { key, allowed } => write!(
        f,
        "target key ${} equals one of the following values: {}",
        key,
        allowed.join(" | ")
      ),
    }
  }
}

/// A check together with the way it failed, if it did.
#[derive(Debug, Clone, PartialEq)]
pub struct Outcome {
  pub check: Check,
  pub failure: Option<CheckFailure>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct ValidationResult {
  /// Every check performed, in order.
  pub outcomes: Vec<Outcome>,
}

impl ValidationResult {
  pub fn is_ok(&self) -> bool {
    self.failures().next().is_none()
  }

  pub fn failures(&self) -> impl Iterator<Item = &CheckFailure> {
    self
      .outcomes
      .iter()
      .filter_map(|outcome| outcome.failure.as_ref())
  }
}

/// Ways a target can fail to satisfy its template.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CheckFailure {
  /// The files declare a different number of lines
  #[error("source has {source_lines} lines but target has {target_lines}")]
  LineCountMismatch {
    source_lines: usize,
    target_lines: usize,
  },
  /// A line does not match the pattern of its file
  #[error("{} line {line_number} does not match {format}: {line:?}", .format.role())]
  Format {
    format: LineFormat,
    line_number: usize,
    line: String,
  },
  /// A template key is not declared in the target
  #[error("key ${key} not found in target")]
  MissingKey { key: String },
  /// A target value is outside the template's allowed values
  #[error("${key} must be one of {} but is {actual}", .allowed.join("|"))]
  InvalidValue {
    key: String,
    allowed: Vec<String>,
    actual: String,
  },
}

impl CheckFailure {
  /// How to fix the failure.
  pub fn hint(&self) -> String {
    match self {
      CheckFailure::LineCountMismatch { .. } => {
        "Source and target files should have the same number of declared variables. Double check it!"
          .to_string()
      }
      CheckFailure::Format { format, .. } => format!(
        "Check variables declaration in your {} file. They should match {} pattern",
        format.role(),
        format
      ),
      CheckFailure::MissingKey { key } => {
        format!("Declare {}=<VALUE> in your target env file", key)
      }
      CheckFailure::InvalidValue {
        key,
        allowed,
        actual,
      } => format!(
        "${} in your target env file must match one of these values: {}. Current value is: {}",
        key,
        allowed.join(", "),
        actual
      ),
    }
  }
}

/// Errors that stop a check before any comparison happens.
#[derive(Debug, thiserror::Error)]
pub enum EnvCheckError {
  /// Template file does not exist
  #[error("Source file ({0}) doesn't exist")]
  SourceNotFound(PathBuf),
  /// Target file does not exist
  #[error("Target file ({0}) doesn't exist")]
  TargetNotFound(PathBuf),
  /// Error reading the template file
  #[error("Source file IO error: {0}")]
  SourceIo(std::io::Error),
  /// Error reading the target file
  #[error("Target file IO error: {0}")]
  TargetIo(std::io::Error),
}

impl EnvCheckError {
  pub fn hint(&self) -> Option<String> {
    match self {
      EnvCheckError::SourceNotFound(_) => {
        Some("Provide the source file path with the -s argument".to_string())
      }
      EnvCheckError::TargetNotFound(_) => {
        Some("Provide the target file path with the -t argument".to_string())
      }
      EnvCheckError::SourceIo(_) | EnvCheckError::TargetIo(_) => None,
    }
  }
}

/// Configuration options for an env check.
#[derive(Debug, Clone, Default)]
pub struct EnvCheckOptions {
  /// Path to the template file. If None, defaults to `.env.example`.
  pub source_file: Option<PathBuf>,
  /// Path to the file being checked. If None, defaults to `.env`.
  pub target_file: Option<PathBuf>,
  pub mode: CheckMode,
}

/// A completed check over two files.
#[derive(Debug, Clone)]
pub struct CheckRun {
  pub source_file: PathBuf,
  pub target_file: PathBuf,
  pub result: ValidationResult,
}

#[cfg(test)]
mod tests {
  use super::*;

  fn fail_fast(source: &str, target: &str) -> ValidationResult {
    EnvCheck::check(source, target, CheckMode::FailFast)
  }

  fn only_failure(result: &ValidationResult) -> CheckFailure {
    let failures: Vec<_> = result.failures().cloned().collect();
    assert_eq!(failures.len(), 1, "expected exactly one failure: {failures:?}");
    failures.into_iter().next().unwrap()
  }

  #[test]
  fn test_matching_files_pass() {
    let source = "NODE_ENV=development|production\nAPI_KEY=\nPORT=8080\n";
    let target = "PORT=8080\nNODE_ENV=production\nAPI_KEY=secret123\n";

    let result = fail_fast(source, target);
    assert!(result.is_ok());
    assert_eq!(result.outcomes[0].check, Check::LineCount);
    assert_eq!(result.outcomes.len(), 8);
  }

  #[test]
  fn test_line_count_mismatch() {
    let result = fail_fast("A=\nB=", "A=1");
    assert_eq!(
      only_failure(&result),
      CheckFailure::LineCountMismatch {
        source_lines: 2,
        target_lines: 1
      }
    );
    assert_eq!(result.outcomes.len(), 1);
  }

  #[test]
  fn test_line_count_mismatch_ignores_key_content() {
    let result = fail_fast("A=x", "A=x\nA=x");
    assert!(matches!(
      only_failure(&result),
      CheckFailure::LineCountMismatch { .. }
    ));
  }

  #[test]
  fn test_trailing_newline_does_not_change_line_count() {
    assert!(fail_fast("A=\nB=\n", "A=1\nB=2").is_ok());
    assert!(fail_fast("A=\nB=", "A=1\nB=2\n").is_ok());
  }

  #[test]
  fn test_allowed_values() {
    assert!(fail_fast("FOO=a|b|c", "FOO=b").is_ok());

    let result = fail_fast("FOO=a|b|c", "FOO=d");
    let failure = only_failure(&result);
    assert_eq!(
      failure,
      CheckFailure::InvalidValue {
        key: "FOO".to_string(),
        allowed: vec!["a".to_string(), "b".to_string(), "c".to_string()],
        actual: "d".to_string(),
      }
    );
    assert_eq!(failure.to_string(), "$FOO must be one of a|b|c but is d");
  }

  #[test]
  fn test_allowed_values_match_whole_string() {
    assert!(!fail_fast("FOO=prod", "FOO=production").is_ok());
    assert!(!fail_fast("FOO=production", "FOO=prod").is_ok());
    assert!(!fail_fast("FOO=prod", "FOO=PROD").is_ok());
  }

  #[test]
  fn test_unrestricted_key_accepts_any_value() {
    assert!(fail_fast("FOO=", "FOO=anything").is_ok());
  }

  #[test]
  fn test_missing_key() {
    let result = fail_fast("FOO=\nBAR=x", "FOO=1\nBAZ=x");
    assert_eq!(
      only_failure(&result),
      CheckFailure::MissingKey {
        key: "BAR".to_string()
      }
    );
  }

  #[test]
  fn test_empty_target_value_fails_format() {
    let result = fail_fast("BAZ=", "BAZ=");
    assert_eq!(
      only_failure(&result),
      CheckFailure::Format {
        format: LineFormat::Target,
        line_number: 1,
        line: "BAZ=".to_string(),
      }
    );
  }

  #[test]
  fn test_source_format_checked_before_target() {
    let result = fail_fast("BAD-KEY=1", "ALSO BAD");
    match only_failure(&result) {
      CheckFailure::Format { format, .. } => assert_eq!(format, LineFormat::Source),
      other => panic!("Expected Format error, got {other:?}"),
    }
  }

  #[test]
  fn test_first_match_wins_for_duplicate_target_keys() {
    assert!(fail_fast("FOO=a|b\nFOO=", "FOO=a\nFOO=z").is_ok());
    assert!(!fail_fast("FOO=a|b\nFOO=", "FOO=z\nFOO=a").is_ok());
  }

  #[test]
  fn test_check_is_idempotent() {
    let source = "FOO=a|b\nBAR=";
    let target = "FOO=c\nBAR=1";
    assert_eq!(fail_fast(source, target), fail_fast(source, target));
  }

  #[test]
  fn test_collect_all_reports_every_failure() {
    let source = "FOO=a|b\nBAR=\nQUX=";
    let target = "FOO=c\nBAZ=1\nQUX=";

    let result = EnvCheck::check(source, target, CheckMode::CollectAll);
    let failures: Vec<_> = result.failures().collect();

    assert_eq!(failures.len(), 3);
    assert!(matches!(failures[0], CheckFailure::Format { line_number: 3, .. }));
    assert!(matches!(failures[1], CheckFailure::InvalidValue { .. }));
    assert!(matches!(failures[2], CheckFailure::MissingKey { key } if key == "BAR"));
  }

  #[test]
  fn test_check_descriptions() {
    assert_eq!(
      Check::Format(LineFormat::Source).to_string(),
      "source env lines match <KEY>=<?ALLOWED_VALUES> pattern"
    );
    assert_eq!(
      Check::AllowedValue {
        key: "FOO".to_string(),
        allowed: vec!["a".to_string(), "b".to_string()],
      }
      .to_string(),
      "target key $FOO equals one of the following values: a | b"
    );
  }

  #[test]
  fn test_source_not_found() {
    let options = EnvCheckOptions {
      source_file: Some(PathBuf::from("nonexistent.env.example")),
      target_file: None,
      mode: CheckMode::FailFast,
    };

    match EnvCheck::check_with_options(options).unwrap_err() {
      EnvCheckError::SourceNotFound(path) => {
        assert_eq!(path, PathBuf::from("nonexistent.env.example"));
      }
      other => panic!("Expected SourceNotFound error, got {other:?}"),
    }
  }
}
