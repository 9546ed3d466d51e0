//! Text output formatting for age query results.

use std::io::Write;

use chrono::DateTime;
use sediment_core::{AggregatedCommit, QueryOutcome, SurveySummary};

use super::Report;
use crate::ui::{self, colors, format_duration, indicators, pluralise_word};

const DATE_FORMAT: &str = "%Y/%b/%d";
const COLUMN_GAP: &str = "  ";
const MAX_AUTHOR_WIDTH: usize = 30;

const HEADERS: [&str; 5] = ["Date", "Author", "Occurrences", "Files", "Hash"];

/// Renders the query result as a table or a survey paragraph.
pub fn write(report: &Report, writer: &mut dyn Write) -> anyhow::Result<()> {
    match report.outcome {
        QueryOutcome::Commits(commits) => write_commits(report, commits, writer),
        QueryOutcome::Survey(summary) => write_survey(summary, writer),
    }
}

fn write_survey(summary: &SurveySummary, writer: &mut dyn Write) -> anyhow::Result<()> {
    writeln!(
        writer,
        "\"{}\" instances of this pattern were found across \"{}\" files. \
         In total, \"{}\" files were searched. Sample files with this pattern:",
        summary.pattern_instance_count, summary.files_with_instance_count, summary.total_files_searched_count,
    )?;
    for file in &summary.sample_files_with_pattern {
        writeln!(writer, "* {}", file.display())?;
    }
    Ok(())
}

/// One table row before styling. Continuation rows only carry a file.
struct Row {
    date: String,
    author: String,
    occurrences: String,
    file: String,
    hash: Option<String>,
}

fn rows(commits: &[AggregatedCommit]) -> Vec<Row> {
    let mut rows = Vec::new();
    for commit in commits {
        let mut files = commit.files.iter().map(|f| f.display().to_string());
        rows.push(Row {
            date: format_date(commit.timestamp_s),
            author: ui::truncate_with_ellipsis(&commit.author, MAX_AUTHOR_WIDTH),
            occurrences: commit.count.to_string(),
            file: files.next().unwrap_or_default(),
            hash: Some(commit.hash.clone()),
        });
        rows.extend(files.map(|file| Row {
            date: String::new(),
            author: String::new(),
            occurrences: String::new(),
            file,
            hash: None,
        }));
    }
    rows
}

fn format_date(timestamp_s: i64) -> String {
    DateTime::from_timestamp(timestamp_s, 0)
        .map_or_else(|| timestamp_s.to_string(), |dt| dt.format(DATE_FORMAT).to_string())
}

fn write_commits(report: &Report, commits: &[AggregatedCommit], writer: &mut dyn Write) -> anyhow::Result<()> {
    writeln!(writer)?;

    if commits.is_empty() {
        writeln!(
            writer,
            "{} {}",
            colors::info().apply_to(indicators::INFO),
            colors::secondary().apply_to("No commits introduced a match"),
        )?;
        write_summary(report, commits, writer)?;
        return Ok(());
    }

    let rows = rows(commits);
    let widths = [
        column_width(HEADERS[0], rows.iter().map(|r| r.date.as_str())),
        column_width(HEADERS[1], rows.iter().map(|r| r.author.as_str())),
        column_width(HEADERS[2], rows.iter().map(|r| r.occurrences.as_str())),
        column_width(HEADERS[3], rows.iter().map(|r| r.file.as_str())),
    ];

    writeln!(
        writer,
        "{}{COLUMN_GAP}{}{COLUMN_GAP}{}{COLUMN_GAP}{}{COLUMN_GAP}{}",
        colors::primary().apply_to(pad(HEADERS[0], widths[0])),
        colors::primary().apply_to(pad(HEADERS[1], widths[1])),
        colors::primary().apply_to(pad_left(HEADERS[2], widths[2])),
        colors::primary().apply_to(pad(HEADERS[3], widths[3])),
        colors::primary().apply_to(HEADERS[4]),
    )?;

    for row in &rows {
        let hash = row.hash.as_deref().map(|hash| render_hash(report, hash)).unwrap_or_default();
        let line = format!(
            "{}{COLUMN_GAP}{}{COLUMN_GAP}{}{COLUMN_GAP}{}{COLUMN_GAP}{}",
            colors::secondary().apply_to(pad(&row.date, widths[0])),
            colors::emphasis().apply_to(pad(&row.author, widths[1])),
            colors::emphasis().apply_to(pad_left(&row.occurrences, widths[2])),
            colors::secondary().apply_to(pad(&row.file, widths[3])),
            hash,
        );
        writeln!(writer, "{}", line.trim_end())?;
    }

    write_summary(report, commits, writer)
}

fn column_width<'a>(header: &str, cells: impl Iterator<Item = &'a str>) -> usize {
    cells.map(|cell| cell.chars().count()).fold(header.len(), usize::max)
}

fn render_hash(report: &Report, hash: &str) -> String {
    match report.commit_url(hash) {
        Some(url) if console::colors_enabled() => colors::accent().apply_to(ui::hyperlink(hash, &url)).to_string(),
        Some(url) => format!("{hash} {url}"),
        None => colors::accent().apply_to(hash).to_string(),
    }
}

fn pad(text: &str, width: usize) -> String {
    format!("{text:<width$}")
}

fn pad_left(text: &str, width: usize) -> String {
    format!("{text:>width$}")
}

fn write_summary(report: &Report, commits: &[AggregatedCommit], writer: &mut dyn Write) -> anyhow::Result<()> {
    let occurrences: usize = commits.iter().map(|c| c.count).sum();
    let searched = report.stats.files_searched;

    writeln!(writer)?;
    writeln!(
        writer,
        "{} {} {} {} {} {} {} {}",
        colors::success().apply_to(indicators::SUCCESS),
        colors::emphasis().apply_to(commits.len()),
        colors::secondary().apply_to(pluralise_word(commits.len(), "commit", "commits")),
        colors::muted().apply_to("·"),
        colors::emphasis().apply_to(occurrences),
        colors::secondary().apply_to(pluralise_word(occurrences, "occurrence", "occurrences")),
        colors::muted().apply_to("·"),
        colors::secondary().apply_to(format!(
            "{searched} {} searched in {}",
            pluralise_word(searched, "file", "files"),
            format_duration(report.stats.elapsed)
        )),
    )?;
    writeln!(writer)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::super::fixtures;
    use super::*;

    fn render(report: &Report) -> String {
        console::set_colors_enabled(false);
        let mut buf = Vec::new();
        write(report, &mut buf).unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn dates_render_in_utc() {
        assert_eq!(format_date(1_484_438_400), "2017/Jan/15");
        assert_eq!(format_date(0), "1970/Jan/01");
    }

    #[test]
    fn table_lists_extra_files_on_continuation_lines() {
        let outcome = fixtures::commits();
        let paths = vec!["src".to_string()];
        let out = render(&fixtures::report(&outcome, &paths, None));
        let lines: Vec<&str> = out.lines().collect();

        assert!(lines[1].starts_with("Date"));
        assert!(lines[1].contains("Occurrences"));
        assert!(lines[2].starts_with("2017/Jan/15"));
        assert!(lines[2].contains("src/a.js"));
        assert!(lines[2].ends_with(&"a".repeat(40)));
        assert!(lines[3].trim_start().starts_with("src/b.js"));
        assert!(!lines[3].contains(&"a".repeat(40)));
        assert!(lines[4].contains("Grace Hopper"));
    }

    #[test]
    fn columns_line_up() {
        let outcome = fixtures::commits();
        let paths = vec!["src".to_string()];
        let out = render(&fixtures::report(&outcome, &paths, None));
        let lines: Vec<&str> = out.lines().collect();

        let file_column = lines[1].find("Files").unwrap();
        assert_eq!(lines[2].find("src/a.js"), Some(file_column));
        assert_eq!(lines[3].find("src/b.js"), Some(file_column));
    }

    #[test]
    fn hash_url_is_printed_beside_hash_without_colors() {
        let outcome = fixtures::commits();
        let paths = vec!["src".to_string()];
        let out = render(&fixtures::report(&outcome, &paths, Some("https://example.com/c/%s")));
        let hash = "b".repeat(40);
        assert!(out.contains(&format!("{hash} https://example.com/c/{hash}")));
    }

    #[test]
    fn summary_counts_commits_and_occurrences() {
        let outcome = fixtures::commits();
        let paths = vec!["src".to_string()];
        let out = render(&fixtures::report(&outcome, &paths, None));
        assert!(out.contains("2 commits · 3 occurrences · 4 files searched in 12.0ms"));
    }

    #[test]
    fn empty_result_says_so() {
        let outcome = QueryOutcome::Commits(Vec::new());
        let paths = vec!["src".to_string()];
        let out = render(&fixtures::report(&outcome, &paths, None));
        assert!(out.contains("No commits introduced a match"));
        assert!(out.contains("0 commits · 0 occurrences"));
    }

    #[test]
    fn survey_sentence_and_sample_list() {
        let outcome = fixtures::survey();
        let paths = vec!["src".to_string()];
        let out = render(&fixtures::report(&outcome, &paths, None));
        assert_eq!(
            out,
            "\"5\" instances of this pattern were found across \"2\" files. In total, \"4\" files were \
             searched. Sample files with this pattern:\n* src/a.js\n* src/b.js\n"
        );
    }
}
