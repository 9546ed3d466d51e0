//! Convenience re-exports of the most commonly used types.

pub use crate::commit::{AggregatedCommit, CommitRecord};
pub use crate::config::{Config, ConfigError};
pub use crate::error::{OptionsError, QueryError};
pub use crate::git::GitCli;
pub use crate::limiter::{ConcurrencyLimiter, Progress};
pub use crate::location::{LineRange, LocationMap};
pub use crate::matcher::{SelectorMatcher, SourceLanguage};
pub use crate::options::{QueryOptions, ValidatedQuery};
pub use crate::query::{QueryContext, QueryOutcome, run_query};
pub use crate::survey::SurveySummary;
