//! Blame-resolution and aggregation engine for sediment.
//!
//! Given a structural pattern, this crate finds every occurrence across a set
//! of files and works out which commit introduced each one.
//!
//! # Main Types
//!
//! - [`SelectorMatcher`] - Compiles a tree-sitter query and finds matches
//! - [`LocationMap`] - Matched line ranges grouped by file
//! - [`GitCli`] - Runs `git blame` and friends as child processes
//! - [`ConcurrencyLimiter`] - Bounded dispatch with progress reporting
//! - [`AggregatedCommit`] - A commit with every file it was attributed in
//! - [`QueryOptions`] - Query inputs, validated into a [`ValidatedQuery`]
//!
//! # Error Handling
//!
//! This crate uses [`thiserror`] for typed errors. Every failure surfaces as a
//! [`QueryError`]; nothing is retried and no partial result is returned.
//!
//! The CLI crate (`sediment_cli`) uses `anyhow` for error propagation.

/// Line-level history queries and porcelain parsing.
pub mod blame;
/// Commit records and cross-file aggregation.
pub mod commit;
/// User configuration loaded from `.sediment.toml`.
pub mod config;
pub mod discovery;
pub mod edit_count;
/// Error types for option validation, matching and history queries.
pub mod error;
pub mod git;
pub mod limiter;
pub mod location;
pub mod matcher;
/// Query options and validation.
pub mod options;
/// Common re-exports for internal use.
pub mod prelude;
pub mod query;
pub mod survey;
#[cfg(test)]
pub(crate) mod test_utils;
pub mod window;

pub use blame::{BlameOutput, LineHistory, parse_porcelain};
pub use commit::{AggregatedCommit, CommitRecord, aggregate};
pub use config::{Config, ConfigError};
pub use edit_count::{EditCountOptions, FileEditCount, query_file_edit_count};
pub use error::{InvocationFailure, OptionsError, QueryError};
pub use git::GitCli;
pub use limiter::{ConcurrencyLimiter, Progress, ProgressCallback};
pub use location::{LineRange, LocationMap};
pub use matcher::{SelectorMatcher, SourceLanguage};
pub use options::{QueryOptions, ValidatedQuery};
pub use query::{Located, QueryContext, QueryOutcome, locate, run_query, run_query_located};
pub use survey::SurveySummary;
pub use window::CutoffDate;

/// Default filename for sediment configuration.
pub const CONFIG_FILENAME: &str = ".sediment.toml";
