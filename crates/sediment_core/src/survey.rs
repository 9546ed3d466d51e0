//! Summaries of match locations that skip blame entirely.

use std::path::PathBuf;

use rand::Rng;
use rand::seq::SliceRandom;
use serde::Serialize;

use crate::location::LocationMap;

/// Maximum number of sample files in a survey.
pub const SAMPLE_SIZE: usize = 10;

/// How widespread a pattern is.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SurveySummary {
    /// Total number of matched locations.
    pub pattern_instance_count: usize,
    /// Files with at least one match.
    pub files_with_instance_count: usize,
    /// Files the matcher examined.
    pub total_files_searched_count: usize,
    /// Up to [`SAMPLE_SIZE`] matching files, in discovery order.
    pub sample_files_with_pattern: Vec<PathBuf>,
}

/// Summarizes `locations`.
///
/// The sample is drawn with `rng`, then listed in discovery order so output
/// only depends on which files were picked.
pub fn summarize<R: Rng + ?Sized>(locations: &LocationMap, total_files_searched: usize, rng: &mut R) -> SurveySummary {
    let matching: Vec<(usize, &PathBuf)> = locations
        .files_with_matches()
        .map(|file| &file.path)
        .enumerate()
        .collect();

    let mut sample: Vec<(usize, &PathBuf)> = matching.choose_multiple(rng, SAMPLE_SIZE).copied().collect();
    sample.sort_by_key(|(idx, _)| *idx);

    SurveySummary {
        pattern_instance_count: locations.instance_count(),
        files_with_instance_count: matching.len(),
        total_files_searched_count: total_files_searched,
        sample_files_with_pattern: sample.into_iter().map(|(_, path)| path.clone()).collect(),
    }
}
