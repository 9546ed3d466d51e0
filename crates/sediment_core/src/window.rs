//! `--after` date handling.

use chrono::{NaiveDate, NaiveTime};

use crate::commit::AggregatedCommit;
use crate::error::QueryError;

/// Midnight UTC of a calendar date, as unix seconds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CutoffDate {
    input: String,
    date: NaiveDate,
    timestamp_s: i64,
}

impl CutoffDate {
    /// Parses a `YYYY-M-D` date. Zero padding is optional.
    pub fn parse(input: &str) -> Result<Self, QueryError> {
        let date = NaiveDate::parse_from_str(input.trim(), "%Y-%m-%d").map_err(|_err| QueryError::InvalidDate {
            input: input.to_string(),
        })?;
        let timestamp_s = date.and_time(NaiveTime::MIN).and_utc().timestamp();

        Ok(Self {
            input: input.trim().to_string(),
            date,
            timestamp_s,
        })
    }

    /// The date as supplied by the caller.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.input
    }

    /// Unix seconds of the cutoff.
    #[must_use]
    pub const fn timestamp_s(&self) -> i64 {
        self.timestamp_s
    }

    /// The cutoff as an explicit UTC time for `git --since`.
    #[must_use]
    pub fn to_git_date(&self) -> String {
        format!("{} 00:00:00 +0000", self.date.format("%Y-%m-%d"))
    }
}

/// Keeps commits authored at or after `cutoff`, ascending by timestamp.
///
/// `None` returns the input unchanged.
#[must_use]
pub fn filter_after(commits: Vec<AggregatedCommit>, cutoff: Option<&CutoffDate>) -> Vec<AggregatedCommit> {
    let Some(cutoff) = cutoff else {
        return commits;
    };

    let mut kept: Vec<_> = commits
        .into_iter()
        .filter(|c| c.timestamp_s >= cutoff.timestamp_s)
        .collect();
    kept.sort_by_key(|c| c.timestamp_s);
    kept
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;

    fn commit(hash: &str, ts: i64) -> AggregatedCommit {
        AggregatedCommit {
            hash: hash.to_string(),
            timestamp_s: ts,
            author: "Ann".to_string(),
            count: 1,
            files: vec![PathBuf::from("a.js")],
            commands: vec![String::new()],
        }
    }

    #[test]
    fn parse_accepts_unpadded_dates() {
        let cutoff = CutoffDate::parse("2017-1-15").unwrap();
        assert_eq!(cutoff.timestamp_s(), 1_484_438_400);
        assert_eq!(cutoff.as_str(), "2017-1-15");
    }

    #[test]
    fn git_date_is_zero_padded_utc() {
        assert_eq!(CutoffDate::parse("2017-1-5").unwrap().to_git_date(), "2017-01-05 00:00:00 +0000");
    }

    #[test]
    fn parse_is_midnight_utc() {
        assert_eq!(CutoffDate::parse("2021-01-01").unwrap().timestamp_s(), 1_609_459_200);
        assert_eq!(CutoffDate::parse("1970-01-01").unwrap().timestamp_s(), 0);
    }

    #[test]
    fn parse_rejects_garbage_and_impossible_dates() {
        for input in ["", "yesterday", "2021/01/01", "2021-13-01", "2021-02-30"] {
            let err = CutoffDate::parse(input).unwrap_err();
            assert!(matches!(err, QueryError::InvalidDate { .. }), "{input}");
        }
    }

    #[test]
    fn filter_keeps_commits_at_or_after_cutoff() {
        let cutoff = CutoffDate::parse("2021-01-01").unwrap();
        let commits = vec![
            commit("old", 1_609_459_199),
            commit("exact", 1_609_459_200),
            commit("new", 1_700_000_000),
        ];

        let kept = filter_after(commits, Some(&cutoff));
        let hashes: Vec<_> = kept.iter().map(|c| c.hash.as_str()).collect();
        assert_eq!(hashes, vec!["exact", "new"]);
    }

    #[test]
    fn filter_without_cutoff_is_identity() {
        let commits = vec![commit("b", 2), commit("a", 1)];
        assert_eq!(filter_after(commits.clone(), None), commits);
    }

    #[test]
    fn filter_output_is_ascending() {
        let cutoff = CutoffDate::parse("1970-01-01").unwrap();
        let kept = filter_after(vec![commit("b", 20), commit("a", 10)], Some(&cutoff));
        assert_eq!(kept[0].hash, "a");
    }
}
