//! How often each file changed since a date.

use std::path::PathBuf;
use std::sync::Arc;

use serde::Serialize;
#[cfg(feature = "tracing")]
use tracing::debug;

use crate::config::{Config, DEFAULT_PROGRESS_INTERVAL};
use crate::discovery::{DiscoveryOptions, discover_files};
use crate::error::{OptionsError, QueryError};
use crate::git::GitCli;
use crate::limiter::{ConcurrencyLimiter, ProgressCallback, default_concurrency};
use crate::window::CutoffDate;

/// Options for [`query_file_edit_count`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditCountOptions {
    /// Files, directories or glob patterns.
    pub paths: Vec<String>,
    /// Count only commits on or after this `YYYY-M-D` date.
    pub after: Option<String>,
    /// Exclude globs.
    pub excludes: Vec<String>,
    /// Honour `.gitignore` rules during discovery.
    pub respect_gitignore: bool,
    /// Concurrent `git log` limit.
    pub concurrency: Option<usize>,
    /// Completions between progress reports.
    pub progress_interval: usize,
}

impl EditCountOptions {
    /// Options seeded from a loaded configuration.
    #[must_use]
    pub fn from_config(config: &Config, paths: Vec<String>) -> Self {
        Self {
            paths,
            after: None,
            excludes: config.exclude_paths.clone(),
            respect_gitignore: config.respect_gitignore,
            concurrency: config.concurrency,
            progress_interval: config.progress_interval,
        }
    }
}

impl Default for EditCountOptions {
    fn default() -> Self {
        Self {
            paths: Vec::new(),
            after: None,
            excludes: Vec::new(),
            respect_gitignore: true,
            concurrency: None,
            progress_interval: DEFAULT_PROGRESS_INTERVAL,
        }
    }
}

/// Number of commits touching one file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileEditCount {
    /// The file.
    pub path: PathBuf,
    /// Commits in range that modified it.
    pub edits: usize,
}

/// Counts the commits touching each matched file, most edited first.
///
/// The range starts at the oldest commit since `after` (or the root commit)
/// and ends at `HEAD`. The starting commit itself is not counted. When no
/// commit falls in the range every file counts zero.
pub async fn query_file_edit_count(
    git: GitCli,
    options: &EditCountOptions,
    on_progress: Option<ProgressCallback>,
) -> Result<Vec<FileEditCount>, QueryError> {
    if options.paths.iter().all(|p| p.trim().is_empty()) {
        return Err(OptionsError::NoPaths.into());
    }
    if options.progress_interval == 0 {
        return Err(OptionsError::ZeroProgressInterval.into());
    }
    let cutoff = options.after.as_deref().map(CutoffDate::parse).transpose()?;

    let patterns = options.paths.clone();
    let discovery = DiscoveryOptions {
        excludes: options.excludes.clone(),
        respect_gitignore: options.respect_gitignore,
    };
    let files = tokio::task::spawn_blocking(move || discover_files(&patterns, &discovery)).await??;

    let Some(from) = git.first_commit_since(cutoff.as_ref()).await? else {
        #[cfg(feature = "tracing")]
        debug!("no commits in range");
        return Ok(files
            .into_iter()
            .map(|path| FileEditCount { path, edits: 0 })
            .collect());
    };

    #[cfg(feature = "tracing")]
    debug!(%from, files = files.len(), "counting edits");

    let mut limiter = ConcurrencyLimiter::new(options.concurrency.unwrap_or_else(default_concurrency))
        .with_interval(options.progress_interval);
    if let Some(callback) = on_progress {
        limiter = limiter.with_progress(callback);
    }

    let git = Arc::new(git);
    let from: Arc<str> = Arc::from(from);
    let mut counts = limiter
        .run(files, move |path| {
            let git = Arc::clone(&git);
            let from = Arc::clone(&from);
            async move {
                let edits = git.count_commits_touching(&from, &path).await?;
                Ok(FileEditCount { path, edits })
            }
        })
        .await?;

    counts.sort_by(|a, b| b.edits.cmp(&a.edits));
    Ok(counts)
}
