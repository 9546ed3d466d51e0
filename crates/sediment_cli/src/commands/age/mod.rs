//! Age command - attributes pattern occurrences to the commits that added them.

mod context;
mod output;

use std::sync::Arc;
use std::time::Instant;

use sediment_core::{Progress, ProgressCallback, QueryContext, run_query_located};

use self::context::AgeContext;
use self::output::{AgeStats, Report};
use crate::git::require_work_tree;
use crate::ui::{self, print_command_header, print_warning};
use crate::{AgeArgs, OutputFormat};

pub use self::context::load_config;

/// Executes the `sediment age` command.
pub fn run(args: &AgeArgs) -> super::Result {
    let show_progress = should_show_progress(args);
    let start = Instant::now();

    if show_progress {
        print_command_header("age");
    }

    let context = AgeContext::load(args)?;
    let query = context.options.clone().validate()?;

    if !query.options.survey {
        require_work_tree()?;
    }

    let progress = (show_progress && !query.options.survey).then(|| ui::create_file_progress("blamed"));
    let ctx = QueryContext::for_query(context.git(), &query, progress.clone().map(progress_callback));

    let rt = super::runtime()?;
    let result = rt.block_on(run_query_located(&ctx, query));

    if let Some(pb) = &progress {
        pb.finish_and_clear();
    }
    let (outcome, located) = result?;

    for (language, message) in &located.skipped_languages {
        print_warning(&format!("selector skipped for {language}: {message}"));
    }

    let report = Report {
        selector: &context.options.selector,
        paths: &context.options.paths,
        outcome: &outcome,
        hash_url_format: context.options.hash_url_format.as_deref(),
        stats: AgeStats {
            files_searched: located.locations.len(),
            elapsed: start.elapsed(),
        },
    };

    output::write_output(args, &report)
}

/// Forwards limiter progress to a progress bar.
pub fn progress_callback(pb: indicatif::ProgressBar) -> ProgressCallback {
    Arc::new(move |progress: Progress| {
        pb.set_length(u64::try_from(progress.total).unwrap_or(u64::MAX));
        pb.set_position(u64::try_from(progress.completed).unwrap_or(u64::MAX));
    })
}

fn should_show_progress(args: &AgeArgs) -> bool {
    args.output.is_none() && matches!(args.format, OutputFormat::Text)
}
