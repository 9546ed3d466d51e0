//! # Commands
//!
//! - `sediment age` - Find which commits introduced each occurrence of a pattern
//! - `sediment edits` - Count how often each file changed since a date
//! - `sediment languages` - List languages the selector can target
//! - `sediment completions` - Generate shell completions

#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

mod commands;
mod git;
mod ui;

use std::path::PathBuf;

use clap::{CommandFactory, FromArgMatches, Parser, Subcommand};
use console::style;
pub use sediment_core::CONFIG_FILENAME;
use sediment_core::SourceLanguage;

use crate::ui::colors;

const REPO_URL: &str = "https://github.com/sediment-rs/sediment";

#[derive(Debug, Parser)]
#[command(
    name = "sediment",
    version,
    styles = ui::clap_styles(),
    arg_required_else_help = true,
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Find the commits that introduced each occurrence of a pattern.
    #[command(visible_alias = "a")]
    Age(AgeArgs),

    /// Count the commits touching each file since a date.
    #[command(visible_alias = "e")]
    Edits(EditsArgs),

    /// List supported languages and their file extensions.
    Languages,

    /// Generate shell completions.
    Completions {
        /// Shell to generate completions for.
        shell: clap_complete::Shell,
    },
}

/// Output format for query results.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable terminal output.
    #[default]
    Text,
    /// Machine-readable JSON.
    Json,
}

/// Arguments for the `sediment age` command.
#[derive(Debug, Parser)]
pub struct AgeArgs {
    /// Files, directories or glob patterns to search.
    #[arg(short, long, required = true, num_args = 1..)]
    pub paths: Vec<String>,

    /// Tree-sitter query describing the pattern, with at least one capture.
    #[arg(short, long)]
    pub selector: String,

    /// Only search files of this language.
    #[arg(short, long)]
    pub language: Option<SourceLanguage>,

    /// Output format.
    #[arg(short, long, value_enum, default_value_t)]
    pub format: OutputFormat,

    /// Write output to a file instead of stdout.
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Path to `.sediment.toml` configuration file.
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Count matches and sample files without looking at history.
    #[arg(long)]
    pub survey: bool,

    /// Only report commits made on or after this date (YYYY-M-D).
    #[arg(long, value_name = "DATE")]
    pub after: Option<String>,

    /// URL template for commit links, with `%s` in place of the hash.
    #[arg(long, value_name = "URL")]
    pub hash_url_format: Option<String>,

    /// Glob patterns to exclude from the search.
    #[arg(short, long)]
    pub exclude: Vec<String>,

    /// Skip `.gitignore` rules when collecting files.
    #[arg(long)]
    pub skip_gitignore: bool,

    /// Skip files larger than this size in bytes.
    #[arg(long)]
    pub max_file_size: Option<u64>,

    /// Maximum number of concurrent `git blame` processes.
    #[arg(long)]
    pub concurrency: Option<usize>,

    /// Seed for the survey sample, for reproducible output.
    #[arg(long)]
    pub seed: Option<u64>,
}

/// Arguments for the `sediment edits` command.
#[derive(Debug, Parser)]
pub struct EditsArgs {
    /// Files, directories or glob patterns to count.
    #[arg(short, long, required = true, num_args = 1..)]
    pub paths: Vec<String>,

    /// Only count commits made on or after this date (YYYY-M-D).
    #[arg(long, value_name = "DATE")]
    pub after: Option<String>,

    /// Output format.
    #[arg(short, long, value_enum, default_value_t)]
    pub format: OutputFormat,

    /// Write output to a file instead of stdout.
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Path to `.sediment.toml` configuration file.
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Glob patterns to exclude.
    #[arg(short, long)]
    pub exclude: Vec<String>,

    /// Skip `.gitignore` rules when collecting files.
    #[arg(long)]
    pub skip_gitignore: bool,

    /// Maximum number of concurrent `git log` processes.
    #[arg(long)]
    pub concurrency: Option<usize>,
}

fn main() {
    #[cfg(feature = "tracing")]
    {
        use tracing_subscriber::{EnvFilter, fmt, prelude::*};

        tracing_subscriber::registry()
            .with(fmt::layer().with_target(false).without_time().with_writer(std::io::stderr))
            .with(EnvFilter::from_default_env())
            .init();
    }

    let cli = parse_cli();

    if let Err(e) = run(cli.command) {
        ui::print_error(&format!("{e:#}"));
        std::process::exit(ui::exit::ERROR);
    }
}

fn parse_cli() -> Cli {
    let cmd = Cli::command().about(build_about()).after_help(build_after_help());

    let matches = cmd.get_matches();

    #[expect(clippy::expect_used, reason = "clap already validated args; this cannot fail")]
    Cli::from_arg_matches(&matches).expect("failed to parse arguments")
}

fn run(command: Command) -> anyhow::Result<()> {
    match command {
        Command::Age(args) => commands::age::run(&args),
        Command::Edits(args) => commands::edits::run(&args),
        Command::Languages => commands::languages::run(),
        Command::Completions { shell } => commands::completions::run(shell),
    }
}

fn build_about() -> String {
    format!(
        r"
  {} tells you how old the code matching a pattern is.

  It finds every occurrence of a tree-sitter query, blames the
  matched lines, and reports the commits that introduced them.",
        colors::accent().apply_to("sediment").bold()
    )
}

fn build_after_help() -> String {
    format!(
        r#"
  {}
    sediment age -p src -s '(debugger_statement) @d'
                                        Commits that introduced each debugger
    sediment age -p 'src/**/*.ts' -s QUERY --after 2023-1-1
                                        Only commits from 2023 onwards
    sediment age -p src -s QUERY --survey
                                        Count matches without blaming
    sediment edits -p src --after 2024-6-1
                                        Files ranked by recent churn

  Learn more: {}"#,
        style("Examples:").bold(),
        colors::accent().apply_to(REPO_URL).underlined()
    )
}
