//! Human-readable diagnostics for a check run.

use std::{fmt, io::Write};

use crate::check::{CheckRun, EnvCheckError};

const LOG_PREFIX: &str = "[DOTENV CHECK]";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tag {
  Info,
  Success,
  Error,
  Hint,
}

impl fmt::Display for Tag {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Tag::Info => write!(f, "[INFO]"),
      Tag::Success => write!(f, "[OK]"),
      Tag::Error => write!(f, "[ERROR]"),
      Tag::Hint => write!(f, "[HINT]"),
    }
  }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReportLine {
  pub tag: Tag,
  pub message: String,
}

impl ReportLine {
  fn new(tag: Tag, message: impl Into<String>) -> Self {
    Self {
      tag,
      message: message.into(),
    }
  }
}

impl fmt::Display for ReportLine {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{} {} {}", LOG_PREFIX, self.tag, self.message)
  }
}

/// One line per check performed, framed by what was compared and the verdict.
pub fn render(run: &CheckRun) -> Vec<ReportLine> {
  let source = run.source_file.display();
  let target = run.target_file.display();

  let mut lines = vec![ReportLine::new(
    Tag::Info,
    format!("Comparing {} against {}", target, source),
  )];

  for outcome in &run.result.outcomes {
    match &outcome.failure {
      None => lines.push(ReportLine::new(Tag::Success, outcome.check.to_string())),
      Some(failure) => {
        lines.push(ReportLine::new(
          Tag::Error,
          format!("{}: {}", outcome.check, failure),
        ));
        lines.push(ReportLine::new(Tag::Hint, failure.hint()));
      }
    }
  }

  if run.result.is_ok() {
    lines.push(ReportLine::new(
      Tag::Success,
      format!("{} matches {}", target, source),
    ));
  } else {
    lines.push(ReportLine::new(
      Tag::Error,
      format!("{} does not match {}", target, source),
    ));
  }

  lines
}

pub fn render_error(error: &EnvCheckError) -> Vec<ReportLine> {
  let mut lines = vec![ReportLine::new(Tag::Error, error.to_string())];
  if let Some(hint) = error.hint() {
    lines.push(ReportLine::new(Tag::Hint, hint));
  }
  lines
}

/// Writes report lines, or nothing at all when silent.
pub struct Reporter<W> {
  out: W,
  silent: bool,
}

impl<W: Write> Reporter<W> {
  pub fn new(out: W, silent: bool) -> Self {
    Self { out, silent }
  }

  pub fn emit(&mut self, lines: &[ReportLine]) -> std::io::Result<()> {
    if self.silent {
      return Ok(());
    }
    for line in lines {
      writeln!(self.out, "{}", line)?;
    }
    self.out.flush()
  }
}
