//! Commit attribution records and their cross-file aggregation.

use std::collections::HashMap;
use std::path::PathBuf;

use serde::Serialize;

/// One commit attributed to a file's matched lines.
///
/// A file yields at most one record per distinct hash.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitRecord {
    /// Full 40-character commit hash.
    pub hash: String,
    /// File the commit was attributed in.
    pub path: PathBuf,
    /// Rendered blame command that produced the record.
    pub command: String,
    /// Author time, in unix seconds.
    pub timestamp_s: i64,
    /// Author name.
    pub author: String,
}

/// A commit with every file it was attributed in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AggregatedCommit {
    /// Full commit hash.
    pub hash: String,
    /// Author time of the first record seen for this hash, in unix seconds.
    pub timestamp_s: i64,
    /// Author of the first record seen for this hash.
    pub author: String,
    /// Number of files attributed to this commit. Always `files.len()`.
    pub count: usize,
    /// Files attributed to this commit, in discovery order.
    pub files: Vec<PathBuf>,
    /// Blame commands that surfaced this commit, parallel to `files`.
    pub commands: Vec<String>,
}

/// Merges per-file records by hash and sorts the result by author time.
///
/// `timestamp_s` and `author` come from the first record of each hash. The
/// sort is stable, so commits with equal timestamps keep first-seen order.
pub fn aggregate(records: impl IntoIterator<Item = CommitRecord>) -> Vec<AggregatedCommit> {
    let mut index: HashMap<String, usize> = HashMap::new();
    let mut commits: Vec<AggregatedCommit> = Vec::new();

    for record in records {
        if let Some(&idx) = index.get(&record.hash) {
            let commit = &mut commits[idx];
            commit.files.push(record.path);
            commit.commands.push(record.command);
            commit.count = commit.files.len();
            continue;
        }

        index.insert(record.hash.clone(), commits.len());
        commits.push(AggregatedCommit {
            hash: record.hash,
            timestamp_s: record.timestamp_s,
            author: record.author,
            count: 1,
            files: vec![record.path],
            commands: vec![record.command],
        });
    }

    commits.sort_by_key(|c| c.timestamp_s);
    commits
}
