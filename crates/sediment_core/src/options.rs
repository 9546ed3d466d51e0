//! Query options and their validation.

use crate::config::Config;
use crate::discovery::DiscoveryOptions;
use crate::error::{OptionsError, QueryError};
use crate::limiter::default_concurrency;
use crate::matcher::SourceLanguage;
use crate::window::CutoffDate;

/// Everything a pattern-age query needs, merged from config and arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryOptions {
    /// Files, directories or glob patterns to search.
    pub paths: Vec<String>,
    /// Tree-sitter query describing the pattern.
    pub selector: String,
    /// Restrict matching to one language.
    pub language: Option<SourceLanguage>,
    /// Keep only commits authored on or after this `YYYY-M-D` date.
    pub after: Option<String>,
    /// Summarize matches instead of blaming them.
    pub survey: bool,
    /// URL template for commit links. Only meaningful for commit output.
    pub hash_url_format: Option<String>,
    /// Exclude globs.
    pub excludes: Vec<String>,
    /// Honour `.gitignore` rules during discovery.
    pub respect_gitignore: bool,
    /// Skip files larger than this many bytes.
    pub max_file_size: Option<u64>,
    /// Concurrent blame limit. `None` uses [`default_concurrency`].
    pub concurrency: Option<usize>,
    /// Completions between progress reports.
    pub progress_interval: usize,
    /// Seed for the survey sample. `None` draws from entropy.
    pub seed: Option<u64>,
}

impl QueryOptions {
    /// Options with defaults for everything but `paths` and `selector`.
    #[must_use]
    pub fn new(paths: Vec<String>, selector: impl Into<String>) -> Self {
        Self::from_config(&Config::default(), paths, selector)
    }

    /// Options seeded from a loaded configuration.
    #[must_use]
    pub fn from_config(config: &Config, paths: Vec<String>, selector: impl Into<String>) -> Self {
        Self {
            paths,
            selector: selector.into(),
            language: config.language,
            after: None,
            survey: false,
            hash_url_format: config.hash_url_format.clone(),
            excludes: config.exclude_paths.clone(),
            respect_gitignore: config.respect_gitignore,
            max_file_size: config.max_file_size,
            concurrency: config.concurrency,
            progress_interval: config.progress_interval,
            seed: None,
        }
    }

    pub(crate) fn discovery(&self) -> DiscoveryOptions {
        DiscoveryOptions {
            excludes: self.excludes.clone(),
            respect_gitignore: self.respect_gitignore,
        }
    }

    /// Checks option combinations and parses the cutoff date.
    ///
    /// Runs before any file is read, so a rejected query does no work.
    pub fn validate(self) -> Result<ValidatedQuery, QueryError> {
        if self.paths.iter().all(|p| p.trim().is_empty()) {
            return Err(OptionsError::NoPaths.into());
        }
        if self.selector.trim().is_empty() {
            return Err(OptionsError::EmptySelector.into());
        }
        if self.survey && self.after.is_some() {
            return Err(OptionsError::Conflict {
                first: "survey",
                second: "after",
            }
            .into());
        }
        if self.survey && self.hash_url_format.is_some() {
            return Err(OptionsError::Conflict {
                first: "survey",
                second: "hash-url-format",
            }
            .into());
        }
        if let Some(format) = &self.hash_url_format
            && !format.contains("%s")
        {
            return Err(OptionsError::HashUrlPlaceholder(format.clone()).into());
        }
        if self.progress_interval == 0 {
            return Err(OptionsError::ZeroProgressInterval.into());
        }

        let cutoff = self.after.as_deref().map(CutoffDate::parse).transpose()?;
        let concurrency = self.concurrency.unwrap_or_else(default_concurrency).max(1);

        Ok(ValidatedQuery {
            options: self,
            cutoff,
            concurrency,
        })
    }
}

/// Options that passed validation.
#[derive(Debug, Clone)]
pub struct ValidatedQuery {
    /// The original options.
    pub options: QueryOptions,
    /// Parsed `after` date.
    pub cutoff: Option<CutoffDate>,
    /// Resolved concurrency limit.
    pub concurrency: usize,
}
