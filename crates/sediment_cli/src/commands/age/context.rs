//! Age context - configuration loading and option merging.

use std::path::Path;

use anyhow::Context as _;
use sediment_core::prelude::*;

use crate::{AgeArgs, CONFIG_FILENAME};

/// Configuration and merged options for one `age` run.
#[derive(Debug)]
pub struct AgeContext {
    /// Parsed configuration from `.sediment.toml`.
    pub config: Config,
    /// Config values overridden by command-line arguments.
    pub options: QueryOptions,
}

impl AgeContext {
    /// Loads configuration and merges the arguments over it.
    pub fn load(args: &AgeArgs) -> anyhow::Result<Self> {
        let config = load_config(args.config.as_deref())?;
        let options = merge_options(&config, args);
        Ok(Self { config, options })
    }

    /// A git runner using the configured binary.
    pub fn git(&self) -> GitCli {
        GitCli::new(self.config.git_binary.clone())
    }
}

/// Loads `.sediment.toml` from `path` or the working directory.
pub fn load_config(path: Option<&Path>) -> anyhow::Result<Config> {
    let config_path = path.unwrap_or(Path::new(CONFIG_FILENAME));
    Config::load(config_path).context("loading config")
}

fn merge_options(config: &Config, args: &AgeArgs) -> QueryOptions {
    let mut options = QueryOptions::from_config(config, args.paths.clone(), args.selector.clone());

    options.language = args.language.or(config.language);
    options.after.clone_from(&args.after);
    options.survey = args.survey;
    options.seed = args.seed;
    options.excludes.extend(args.exclude.iter().cloned());
    options.max_file_size = args.max_file_size.or(config.max_file_size);
    options.concurrency = args.concurrency.or(config.concurrency);
    if args.skip_gitignore {
        options.respect_gitignore = false;
    }

    // A configured link format only decorates commit output, so survey runs
    // ignore it unless it was passed explicitly.
    options.hash_url_format = match (&args.hash_url_format, args.survey) {
        (Some(format), _) => Some(format.clone()),
        (None, false) => config.hash_url_format.clone(),
        (None, true) => None,
    };

    options
}
