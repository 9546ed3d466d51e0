use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::matcher::SourceLanguage;

/// Default number of completed files between progress reports.
pub const DEFAULT_PROGRESS_INTERVAL: usize = 40;

/// Default program used for blame and history queries.
pub const DEFAULT_GIT_BINARY: &str = "git";

/// Project-level configuration loaded from `.sediment.toml`.
///
/// Every field is optional. Command-line arguments take precedence over the
/// values here when both are given.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Glob patterns for file paths to exclude from discovery.
    #[serde(default)]
    pub exclude_paths: Vec<String>,

    /// Whether `.gitignore` rules are honoured during discovery.
    #[serde(default = "default_true")]
    pub respect_gitignore: bool,

    /// Maximum file size in bytes. Larger files are not searched.
    #[serde(default)]
    pub max_file_size: Option<u64>,

    /// Restrict matching to a single source language.
    #[serde(default)]
    pub language: Option<SourceLanguage>,

    /// Maximum number of concurrent history queries.
    #[serde(default)]
    pub concurrency: Option<usize>,

    /// Completed files between progress reports.
    #[serde(default = "default_progress_interval")]
    pub progress_interval: usize,

    /// Program invoked for `blame`, `rev-list` and `log`.
    #[serde(default = "default_git_binary")]
    pub git_binary: String,

    /// URL template for linking commit hashes, with `%s` in place of the hash.
    #[serde(default)]
    pub hash_url_format: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            exclude_paths: Vec::new(),
            respect_gitignore: true,
            max_file_size: None,
            language: None,
            concurrency: None,
            progress_interval: DEFAULT_PROGRESS_INTERVAL,
            git_binary: DEFAULT_GIT_BINARY.to_string(),
            hash_url_format: None,
        }
    }
}

const fn default_true() -> bool {
    true
}

const fn default_progress_interval() -> usize {
    DEFAULT_PROGRESS_INTERVAL
}

fn default_git_binary() -> String {
    DEFAULT_GIT_BINARY.to_string()
}

impl Config {
    /// Loads configuration from a `.sediment.toml` file.
    ///
    /// Returns the default configuration if the file does not exist.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Parses configuration from a TOML string.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|source| ConfigError::Parse {
            path: PathBuf::from("<inline>"),
            source,
        })
    }
}

/// Errors that can occur when reading or parsing a `.sediment.toml` file.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The config file could not be read from disk.
    #[error("failed to read config '{path}': {source}")]
    Read {
        /// Path to the config file that could not be read.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The config file contained invalid TOML or unexpected values.
    #[error("failed to parse config '{path}': {source}")]
    Parse {
        /// Path to the config file that could not be parsed.
        path: PathBuf,
        /// The underlying TOML deserialization error.
        #[source]
        source: toml::de::Error,
    },
}

impl ConfigError {
    /// Returns the file path associated with this error.
    #[must_use]
    pub fn path(&self) -> &Path {
        match self {
            Self::Read { path, .. } | Self::Parse { path, .. } => path,
        }
    }
}
