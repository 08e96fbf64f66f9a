use clap::Parser;
use env_check::check::{
  CheckMode, DEFAULT_SOURCE_FILENAME, DEFAULT_TARGET_FILENAME, EnvCheck, EnvCheckOptions,
};
use env_check::report::{self, Reporter};
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser)]
#[command(
  name = "env-check",
  about = "Check that a local env file satisfies a git-trackable template",
  version,
  author
)]
struct Cli {
  /// Path to the template file
  #[arg(short, long, default_value = DEFAULT_SOURCE_FILENAME)]
  source: PathBuf,

  /// Path to the env file to check
  #[arg(short, long, default_value = DEFAULT_TARGET_FILENAME)]
  target: PathBuf,

  /// Suppress all diagnostics
  #[arg(long)]
  silent: bool,

  /// Report every violation instead of stopping at the first one
  #[arg(long)]
  all: bool,

  /// Verbose output (-v for verbose, -vv for very verbose)
  #[arg(short, long, action = clap::ArgAction::Count)]
  verbose: u8,
}

fn setup_tracing(verbose: u8, silent: bool) {
  use tracing_subscriber::fmt;
  use tracing_subscriber::prelude::*;

  let log_level = match (silent, verbose) {
    (true, _) => "off",
    (false, 1) => "debug",
    (false, 2..) => "trace",
    (false, 0) => "info",
  };

  tracing_subscriber::registry()
    .with(fmt::layer().with_writer(std::io::stderr))
    .with(tracing_subscriber::EnvFilter::new(
      std::env::var("RUST_LOG").unwrap_or_else(|_| log_level.into()),
    ))
    .init();
}

fn main() -> ExitCode {
  let cli = match Cli::try_parse() {
    Ok(cli) => cli,
    Err(err) => {
      let _ = err.print();
      return if err.use_stderr() {
        ExitCode::FAILURE
      } else {
        ExitCode::SUCCESS
      };
    }
  };

  setup_tracing(cli.verbose, cli.silent);

  let options = EnvCheckOptions {
    source_file: Some(cli.source),
    target_file: Some(cli.target),
    mode: if cli.all {
      CheckMode::CollectAll
    } else {
      CheckMode::FailFast
    },
  };

  let (lines, ok) = match EnvCheck::check_with_options(options) {
    Ok(run) => (report::render(&run), run.result.is_ok()),
    Err(err) => (report::render_error(&err), false),
  };

  let mut reporter = Reporter::new(std::io::stdout().lock(), cli.silent);
  if reporter.emit(&lines).is_err() || !ok {
    return ExitCode::FAILURE;
  }

  ExitCode::SUCCESS
}
