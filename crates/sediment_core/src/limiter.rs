//! Bounded-concurrency task dispatch with progress reporting.

use std::fmt;
use std::num::NonZeroUsize;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use tokio::sync::Semaphore;
use tokio::task::{JoinError, JoinSet};
#[cfg(feature = "tracing")]
use tracing::debug;

use crate::config::DEFAULT_PROGRESS_INTERVAL;
use crate::error::QueryError;

/// Snapshot of limiter progress.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Progress {
    /// Tasks finished so far.
    pub completed: usize,
    /// Tasks submitted.
    pub total: usize,
    /// `completed / total` as a percentage in `0.0..=100.0`.
    pub percentage: f64,
}

impl Progress {
    fn new(completed: usize, total: usize) -> Self {
        #[expect(clippy::cast_precision_loss, reason = "task counts are far below 2^52")]
        let percentage = if total == 0 {
            100.0
        } else {
            completed as f64 / total as f64 * 100.0
        };
        Self {
            completed,
            total,
            percentage,
        }
    }
}

impl fmt::Display for Progress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{} ({:.0}%)", self.completed, self.total, self.percentage)
    }
}

/// Receives progress reports from worker tasks.
pub type ProgressCallback = Arc<dyn Fn(Progress) + Send + Sync>;

/// `max(1, available_parallelism - 1)`.
#[must_use]
pub fn default_concurrency() -> usize {
    std::thread::available_parallelism()
        .map_or(1, NonZeroUsize::get)
        .saturating_sub(1)
        .max(1)
}

/// Runs async tasks with at most `limit` in flight.
///
/// Tasks start in submission order. After each successful completion the
/// shared counter is bumped, and every `interval`-th completion (and the last
/// one) is reported to the progress callback. Once a task fails no further
/// tasks are started; tasks already running are awaited and the first error
/// observed is returned.
#[derive(Clone)]
pub struct ConcurrencyLimiter {
    limit: usize,
    interval: usize,
    on_progress: Option<ProgressCallback>,
}

impl fmt::Debug for ConcurrencyLimiter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConcurrencyLimiter")
            .field("limit", &self.limit)
            .field("interval", &self.interval)
            .field("on_progress", &self.on_progress.is_some())
            .finish()
    }
}

impl Default for ConcurrencyLimiter {
    fn default() -> Self {
        Self::new(default_concurrency())
    }
}

impl ConcurrencyLimiter {
    /// Creates a limiter allowing `limit` concurrent tasks (minimum 1).
    #[must_use]
    pub fn new(limit: usize) -> Self {
        Self {
            limit: limit.max(1),
            interval: DEFAULT_PROGRESS_INTERVAL,
            on_progress: None,
        }
    }

    /// Sets the number of completions between progress reports (minimum 1).
    #[must_use]
    pub fn with_interval(mut self, interval: usize) -> Self {
        self.interval = interval.max(1);
        self
    }

    /// Sets the progress callback.
    #[must_use]
    pub fn with_progress(mut self, callback: ProgressCallback) -> Self {
        self.on_progress = Some(callback);
        self
    }

    /// Maximum number of tasks in flight.
    #[must_use]
    pub const fn limit(&self) -> usize {
        self.limit
    }

    /// Runs `work` over `items` and returns the results in input order.
    pub async fn run<T, R, F, Fut>(&self, items: Vec<T>, work: F) -> Result<Vec<R>, QueryError>
    where
        T: Send + 'static,
        R: Send + 'static,
        F: Fn(T) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<R, QueryError>> + Send + 'static,
    {
        let total = items.len();
        if total == 0 {
            return Ok(Vec::new());
        }

        let semaphore = Arc::new(Semaphore::new(self.limit));
        let completed = Arc::new(AtomicUsize::new(0));
        let halted = Arc::new(AtomicBool::new(false));
        let work = Arc::new(work);

        let mut tasks = JoinSet::new();
        let mut slots: Vec<Option<R>> = std::iter::repeat_with(|| None).take(total).collect();
        let mut first_error: Option<QueryError> = None;

        for (idx, item) in items.into_iter().enumerate() {
            while let Some(joined) = tasks.try_join_next() {
                settle(joined, &mut slots, &mut first_error);
            }
            if halted.load(Ordering::Acquire) || first_error.is_some() {
                break;
            }

            let Ok(permit) = Arc::clone(&semaphore).acquire_owned().await else {
                break;
            };
            if halted.load(Ordering::Acquire) {
                break;
            }

            let work = Arc::clone(&work);
            let completed = Arc::clone(&completed);
            let halted = Arc::clone(&halted);
            let on_progress = self.on_progress.clone();
            let interval = self.interval;

            tasks.spawn(async move {
                let _permit = permit;
                let result = work(item).await;

                if result.is_err() {
                    halted.store(true, Ordering::Release);
                } else {
                    let done = completed.fetch_add(1, Ordering::AcqRel) + 1;
                    if done % interval == 0 || done == total {
                        let progress = Progress::new(done, total);
                        #[cfg(feature = "tracing")]
                        debug!(%progress, "progress");
                        if let Some(callback) = on_progress {
                            callback(progress);
                        }
                    }
                }

                (idx, result)
            });
        }

        while let Some(joined) = tasks.join_next().await {
            settle(joined, &mut slots, &mut first_error);
        }

        if let Some(err) = first_error {
            return Err(err);
        }

        // Every slot is filled when no task failed and none was skipped.
        Ok(slots.into_iter().flatten().collect())
    }
}

type Joined<R> = Result<(usize, Result<R, QueryError>), JoinError>;

fn settle<R>(joined: Joined<R>, slots: &mut [Option<R>], first_error: &mut Option<QueryError>) {
    match joined {
        Ok((idx, Ok(value))) => slots[idx] = Some(value),
        Ok((_, Err(err))) => {
            first_error.get_or_insert(err);
        }
        Err(join_err) => {
            first_error.get_or_insert(QueryError::Runtime(join_err));
        }
    }
}
