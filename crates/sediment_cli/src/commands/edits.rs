//! Edits command - ranks files by how many commits touched them.

use std::fs::File;
use std::io::{BufWriter, Write};

use anyhow::Context as _;
use sediment_core::{EditCountOptions, FileEditCount, GitCli, query_file_edit_count};
use serde::Serialize;

use super::age::{load_config, progress_callback};
use crate::git::require_work_tree;
use crate::ui::{self, colors, indicators, pluralise_word, print_command_header};
use crate::{EditsArgs, OutputFormat};

/// Executes the `sediment edits` command.
pub fn run(args: &EditsArgs) -> super::Result {
    let show_progress = args.output.is_none() && matches!(args.format, OutputFormat::Text);
    if show_progress {
        print_command_header("edits");
    }

    let config = load_config(args.config.as_deref())?;
    let options = merge_options(&config, args);
    require_work_tree()?;

    let progress = show_progress.then(|| ui::create_file_progress("checked"));
    let git = GitCli::new(config.git_binary.clone());

    let rt = super::runtime()?;
    let result = rt.block_on(query_file_edit_count(git, &options, progress.clone().map(progress_callback)));

    if let Some(pb) = &progress {
        pb.finish_and_clear();
    }
    let counts = result?;

    if let Some(path) = &args.output {
        let file = File::create(path).with_context(|| format!("failed to create output file: {}", path.display()))?;
        let mut writer = BufWriter::new(file);
        write_format(args, &counts, &mut writer)
    } else {
        let stdout = std::io::stdout();
        let mut writer = stdout.lock();
        write_format(args, &counts, &mut writer)
    }
}

fn merge_options(config: &sediment_core::Config, args: &EditsArgs) -> EditCountOptions {
    let mut options = EditCountOptions::from_config(config, args.paths.clone());
    options.after.clone_from(&args.after);
    options.excludes.extend(args.exclude.iter().cloned());
    options.concurrency = args.concurrency.or(config.concurrency);
    if args.skip_gitignore {
        options.respect_gitignore = false;
    }
    options
}

fn write_format(args: &EditsArgs, counts: &[FileEditCount], writer: &mut dyn Write) -> super::Result {
    match args.format {
        OutputFormat::Text => write_text(args.after.as_deref(), counts, writer),
        OutputFormat::Json => write_json(args, counts, writer),
    }
}

#[derive(Serialize)]
struct JsonReport<'a> {
    paths: &'a [String],
    #[serde(skip_serializing_if = "Option::is_none")]
    after: Option<&'a str>,
    files: &'a [FileEditCount],
}

fn write_json(args: &EditsArgs, counts: &[FileEditCount], writer: &mut dyn Write) -> super::Result {
    let report = JsonReport {
        paths: &args.paths,
        after: args.after.as_deref(),
        files: counts,
    };
    serde_json::to_writer_pretty(&mut *writer, &report)?;
    writeln!(writer)?;
    Ok(())
}

fn write_text(after: Option<&str>, counts: &[FileEditCount], writer: &mut dyn Write) -> super::Result {
    writeln!(writer)?;

    let width = counts
        .iter()
        .map(|c| c.edits.to_string().len())
        .fold("Edits".len(), usize::max);

    writeln!(
        writer,
        "{}  {}",
        colors::primary().apply_to(format!("{:>width$}", "Edits")),
        colors::primary().apply_to("File"),
    )?;
    for count in counts {
        writeln!(
            writer,
            "{}  {}",
            colors::emphasis().apply_to(format!("{:>width$}", count.edits)),
            colors::secondary().apply_to(count.path.display()),
        )?;
    }

    let total: usize = counts.iter().map(|c| c.edits).sum();
    let since = after.map_or_else(|| "in all history".to_string(), |date| format!("since {date}"));

    writeln!(writer)?;
    writeln!(
        writer,
        "{} {} {} {} {}",
        colors::success().apply_to(indicators::SUCCESS),
        colors::emphasis().apply_to(counts.len()),
        colors::secondary().apply_to(pluralise_word(counts.len(), "file", "files")),
        colors::muted().apply_to("·"),
        colors::secondary().apply_to(format!(
            "{total} {} {since}",
            pluralise_word(total, "edit", "edits")
        )),
    )?;
    writeln!(writer)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use clap::Parser as _;

    use super::*;

    fn counts() -> Vec<FileEditCount> {
        vec![
            FileEditCount {
                path: PathBuf::from("src/busy.js"),
                edits: 12,
            },
            FileEditCount {
                path: PathBuf::from("src/quiet.js"),
                edits: 0,
            },
        ]
    }

    fn args(extra: &[&str]) -> EditsArgs {
        let mut argv = vec!["edits", "-p", "src"];
        argv.extend_from_slice(extra);
        EditsArgs::try_parse_from(argv).unwrap()
    }

    #[test]
    fn text_lists_counts_right_aligned() {
        console::set_colors_enabled(false);
        let mut buf = Vec::new();
        write_text(Some("2024-1-1"), &counts(), &mut buf).unwrap();
        let out = String::from_utf8(buf).unwrap();

        assert!(out.contains("Edits  File"));
        assert!(out.contains("   12  src/busy.js"));
        assert!(out.contains("    0  src/quiet.js"));
        assert!(out.contains("2 files · 12 edits since 2024-1-1"));
    }

    #[test]
    fn json_includes_after_only_when_given() {
        let mut buf = Vec::new();
        write_json(&args(&[]), &counts(), &mut buf).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&buf).unwrap();
        assert!(value.get("after").is_none());
        assert_eq!(value["files"][0]["path"], "src/busy.js");
        assert_eq!(value["files"][0]["edits"], 12);

        let mut buf = Vec::new();
        write_json(&args(&["--after", "2024-1-1"]), &counts(), &mut buf).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&buf).unwrap();
        assert_eq!(value["after"], "2024-1-1");
    }

    #[test]
    fn arguments_override_config() {
        let config = sediment_core::Config {
            exclude_paths: vec!["vendor/**".into()],
            concurrency: Some(2),
            ..sediment_core::Config::default()
        };
        let options = merge_options(&config, &args(&["--concurrency", "5", "-e", "dist/**", "--skip-gitignore"]));

        assert_eq!(options.concurrency, Some(5));
        assert_eq!(options.excludes, vec!["vendor/**".to_string(), "dist/**".to_string()]);
        assert!(!options.respect_gitignore);
    }
}
