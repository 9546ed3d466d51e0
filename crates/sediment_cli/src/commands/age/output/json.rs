//! JSON output formatting for age query results.

use std::io::Write;

use sediment_core::{AggregatedCommit, QueryOutcome, SurveySummary};
use serde::Serialize;

use super::Report;

#[derive(Serialize)]
struct JsonReport<'a> {
    selector: &'a str,
    paths: &'a [String],
    #[serde(skip_serializing_if = "Option::is_none")]
    commits: Option<Vec<JsonCommit<'a>>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    survey: Option<&'a SurveySummary>,
}

#[derive(Serialize)]
struct JsonCommit<'a> {
    #[serde(flatten)]
    commit: &'a AggregatedCommit,
    #[serde(skip_serializing_if = "Option::is_none")]
    url: Option<String>,
}

/// Serialises the query result as pretty-printed JSON.
pub fn write(report: &Report, writer: &mut dyn Write) -> anyhow::Result<()> {
    let json = build_report(report);
    serde_json::to_writer_pretty(&mut *writer, &json)?;
    writeln!(writer)?;
    Ok(())
}

fn build_report<'a>(report: &'a Report) -> JsonReport<'a> {
    let (commits, survey) = match report.outcome {
        QueryOutcome::Commits(commits) => {
            let commits = commits
                .iter()
                .map(|commit| JsonCommit {
                    commit,
                    url: report.commit_url(&commit.hash),
                })
                .collect();
            (Some(commits), None)
        }
        QueryOutcome::Survey(summary) => (None, Some(summary)),
    };

    JsonReport {
        selector: report.selector,
        paths: report.paths,
        commits,
        survey,
    }
}
