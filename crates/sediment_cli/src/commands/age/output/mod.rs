//! Output formatting for age query results.

mod json;
mod text;

use std::fs::File;
use std::io::BufWriter;
use std::time::Duration;

use anyhow::Context as _;
use sediment_core::QueryOutcome;

use crate::{AgeArgs, OutputFormat};

/// Statistics for a completed query.
#[derive(Debug)]
pub struct AgeStats {
    /// Files the matcher examined.
    pub files_searched: usize,
    /// Wall-clock time for the whole run.
    pub elapsed: Duration,
}

/// Everything needed to render a query result in any format.
#[derive(Debug)]
pub struct Report<'a> {
    /// The selector as given.
    pub selector: &'a str,
    /// Path patterns as given.
    pub paths: &'a [String],
    /// Commits or survey summary.
    pub outcome: &'a QueryOutcome,
    /// Commit link template with a `%s` placeholder.
    pub hash_url_format: Option<&'a str>,
    /// Run statistics.
    pub stats: AgeStats,
}

impl Report<'_> {
    /// Link for `hash`, when a link format is configured.
    pub fn commit_url(&self, hash: &str) -> Option<String> {
        self.hash_url_format.map(|format| format.replace("%s", hash))
    }
}

/// Writes the report to a file or stdout in the requested format.
pub fn write_output(args: &AgeArgs, report: &Report) -> anyhow::Result<()> {
    if let Some(path) = &args.output {
        let file = File::create(path).with_context(|| format!("failed to create output file: {}", path.display()))?;
        let mut writer = BufWriter::new(file);
        write_format(args.format, report, &mut writer)
    } else {
        let stdout = std::io::stdout();
        let mut writer = stdout.lock();
        write_format(args.format, report, &mut writer)
    }
}

fn write_format(format: OutputFormat, report: &Report, writer: &mut dyn std::io::Write) -> anyhow::Result<()> {
    match format {
        OutputFormat::Text => text::write(report, writer),
        OutputFormat::Json => json::write(report, writer),
    }
}
