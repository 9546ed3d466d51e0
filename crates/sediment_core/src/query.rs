//! The pattern-age query: discover, match, then blame or survey.

use std::collections::BTreeSet;
use std::path::PathBuf;
use std::sync::Arc;

use rand::SeedableRng;
use rand::rngs::StdRng;
#[cfg(feature = "tracing")]
use tracing::{debug, info};

use crate::blame::{LineHistory, blame_file};
use crate::commit::{AggregatedCommit, aggregate};
use crate::discovery::discover_files;
use crate::error::QueryError;
use crate::limiter::{ConcurrencyLimiter, ProgressCallback};
use crate::location::{LineRange, LocationMap};
use crate::matcher::{SelectorMatcher, SourceLanguage};
use crate::options::{QueryOptions, ValidatedQuery};
use crate::survey::{SurveySummary, summarize};
use crate::window::filter_after;

/// Result of a pattern-age query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryOutcome {
    /// Survey mode: counts and a sample, no commit attribution.
    Survey(SurveySummary),
    /// Commits that introduced the matched lines, oldest first.
    Commits(Vec<AggregatedCommit>),
}

/// Matches found for a query, before any history lookup.
#[derive(Debug, Clone)]
pub struct Located {
    /// Searched files and their matched ranges.
    pub locations: LocationMap,
    /// Files produced by discovery, searched or not.
    pub files_discovered: usize,
    /// Languages the selector was not valid for, with the compile error.
    pub skipped_languages: Vec<(SourceLanguage, String)>,
}

/// Per-query collaborators: the history source and the dispatch limiter.
#[derive(Debug)]
pub struct QueryContext<H> {
    history: Arc<H>,
    limiter: ConcurrencyLimiter,
}

impl<H: LineHistory> QueryContext<H> {
    /// Creates a context blaming through `history`.
    #[must_use]
    pub fn new(history: H, limiter: ConcurrencyLimiter) -> Self {
        Self {
            history: Arc::new(history),
            limiter,
        }
    }

    /// Creates a context whose limiter follows the validated options.
    #[must_use]
    pub fn for_query(history: H, query: &ValidatedQuery, on_progress: Option<ProgressCallback>) -> Self {
        let mut limiter = ConcurrencyLimiter::new(query.concurrency).with_interval(query.options.progress_interval);
        if let Some(callback) = on_progress {
            limiter = limiter.with_progress(callback);
        }
        Self::new(history, limiter)
    }

    /// The history source.
    #[must_use]
    pub fn history(&self) -> &H {
        &self.history
    }

    /// Blames every file with matches and aggregates the commits.
    ///
    /// Files are blamed concurrently, one invocation per file covering all of
    /// its ranges. The first failure aborts the query.
    pub async fn resolve_commits(&self, locations: &LocationMap) -> Result<Vec<AggregatedCommit>, QueryError> {
        let items: Vec<(PathBuf, Vec<LineRange>)> = locations
            .files_with_matches()
            .map(|file| (file.path.clone(), file.ranges.clone()))
            .collect();

        #[cfg(feature = "tracing")]
        debug!(files = items.len(), limit = self.limiter.limit(), "blaming matched files");

        let history = Arc::clone(&self.history);
        let per_file = self
            .limiter
            .run(items, move |(path, ranges)| {
                let history = Arc::clone(&history);
                async move { blame_file(history.as_ref(), &path, &ranges).await }
            })
            .await?;

        Ok(aggregate(per_file.into_iter().flatten()))
    }
}

/// Discovers files and runs the selector over them.
///
/// With an explicit language the selector must compile for it. Otherwise it
/// is tried for every language present among the discovered files.
pub fn locate(options: &QueryOptions) -> Result<Located, QueryError> {
    let files = discover_files(&options.paths, &options.discovery())?;

    let matcher = match options.language {
        Some(language) => SelectorMatcher::compile(&options.selector, [language], true)?,
        None => {
            let present: BTreeSet<SourceLanguage> =
                files.iter().filter_map(|path| SourceLanguage::from_path(path)).collect();
            SelectorMatcher::compile(&options.selector, present, false)?
        }
    };

    let locations = matcher.match_files(&files, options.max_file_size)?;

    Ok(Located {
        locations,
        files_discovered: files.len(),
        skipped_languages: matcher.rejected().to_vec(),
    })
}

/// Runs a validated query to completion.
///
/// Matching runs on the blocking pool. In survey mode no history lookup is
/// made at all.
pub async fn run_query<H: LineHistory>(ctx: &QueryContext<H>, query: ValidatedQuery) -> Result<QueryOutcome, QueryError> {
    let (outcome, _) = run_query_located(ctx, query).await?;
    Ok(outcome)
}

/// Like [`run_query`], also returning what the matcher found.
pub async fn run_query_located<H: LineHistory>(
    ctx: &QueryContext<H>,
    query: ValidatedQuery,
) -> Result<(QueryOutcome, Located), QueryError> {
    let ValidatedQuery { options, cutoff, .. } = query;
    let survey = options.survey;
    let seed = options.seed;

    let located = tokio::task::spawn_blocking(move || locate(&options)).await??;

    #[cfg(feature = "tracing")]
    info!(
        discovered = located.files_discovered,
        searched = located.locations.len(),
        instances = located.locations.instance_count(),
        "pattern located"
    );

    if survey {
        let mut rng = seed.map_or_else(StdRng::from_entropy, StdRng::seed_from_u64);
        let summary = summarize(&located.locations, located.locations.len(), &mut rng);
        return Ok((QueryOutcome::Survey(summary), located));
    }

    let commits = ctx.resolve_commits(&located.locations).await?;
    let commits = filter_after(commits, cutoff.as_ref());
    Ok((QueryOutcome::Commits(commits), located))
}
