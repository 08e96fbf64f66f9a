//! Environment file template checking library.
//!
//! This library checks that a local `.env` file satisfies the contract declared
//! by a git-trackable template: every template key is declared, and keys the
//! template restricts with `KEY=VALUE1|VALUE2` hold one of the listed values.
//!
//! # Features
//!
//! - **Zero-copy tokenizing**: Uses `Cow<str>` borrowed from the file contents
//! - **Fail fast or collect all**: Stop at the first violation or report every one
//! - **Structured results**: Presentation is left to [`report`]
//! - **Optional tracing**: Detailed logging when the `tracing` feature is enabled
//!
//! # Example
//!
//! ```rust,no_run
//! use env_check::check::{CheckMode, EnvCheck, EnvCheckOptions};
//! use std::path::PathBuf;
//!
//! let options = EnvCheckOptions {
//!     source_file: Some(PathBuf::from(".env.example")),
//!     target_file: None, // defaults to .env
//!     mode: CheckMode::FailFast,
//! };
//!
//! let run = EnvCheck::check_with_options(options).unwrap();
//! assert!(run.result.is_ok());
//! ```

pub mod check;
pub mod parse;
pub mod report;
