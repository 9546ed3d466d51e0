use std::path::PathBuf;

use thiserror::Error;

/// Why an external tool invocation did not produce usable output.
#[derive(Debug, Error)]
pub enum InvocationFailure {
    /// The process could not be spawned or its output could not be read.
    #[error("failed to run: {0}")]
    Spawn(#[from] std::io::Error),

    /// The process ran but exited unsuccessfully.
    #[error("exited with {}: {stderr}", display_code(*.code))]
    Exit {
        /// Exit code, or `None` when the process was terminated by a signal.
        code: Option<i32>,
        /// Trimmed standard error output.
        stderr: String,
    },
}

fn display_code(code: Option<i32>) -> String {
    code.map_or_else(|| "signal".to_string(), |c| format!("status {c}"))
}

/// Option combinations rejected before any work starts.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum OptionsError {
    /// No path patterns were supplied.
    #[error("at least one path pattern is required")]
    NoPaths,

    /// The selector was empty or whitespace.
    #[error("selector must not be empty")]
    EmptySelector,

    /// Two options that cannot be combined were both supplied.
    #[error("--{first} cannot be used together with --{second}")]
    Conflict {
        /// Name of the first option.
        first: &'static str,
        /// Name of the second option.
        second: &'static str,
    },

    /// The hash URL format has no `%s` placeholder for the commit hash.
    #[error("hash URL format '{0}' must contain a '%s' placeholder")]
    HashUrlPlaceholder(String),

    /// The progress reporting interval was zero.
    #[error("progress interval must be at least 1")]
    ZeroProgressInterval,

    /// An unknown language name was requested.
    #[error("unsupported language '{0}'")]
    UnknownLanguage(String),
}

/// Errors that abort a query.
///
/// Every variant is fatal: nothing in the pipeline retries or degrades to a
/// partial result.
#[derive(Debug, Error)]
pub enum QueryError {
    /// Options failed validation.
    #[error(transparent)]
    Options(#[from] OptionsError),

    /// A `--after` date could not be parsed as `YYYY-M-D`.
    #[error("invalid date '{input}' (expected YYYY-M-D, like 2017-1-15)")]
    InvalidDate {
        /// The rejected input.
        input: String,
    },

    /// A path pattern or exclude glob was invalid. Unreadable entries met
    /// during a walk are skipped, not reported here.
    #[error("file discovery failed for '{pattern}': {message}")]
    Discovery {
        /// The path pattern being expanded.
        pattern: String,
        /// Underlying error message.
        message: String,
    },

    /// The selector could not be compiled for any language that was searched.
    #[error("selector is not a valid query for {languages}: {message}")]
    Selector {
        /// Languages the selector was compiled against.
        languages: String,
        /// First compilation error.
        message: String,
    },

    /// The matcher could not parse a source file.
    #[error("failed to parse '{path}': {message}")]
    MatcherParse {
        /// File that failed to parse.
        path: PathBuf,
        /// Description of the first syntax error.
        message: String,
    },

    /// The line-history tool failed for a file.
    #[error("blame failed for '{path}' (`{command}`): {reason}")]
    BlameInvocation {
        /// File being blamed.
        path: PathBuf,
        /// The rendered command line.
        command: String,
        /// What went wrong.
        #[source]
        reason: InvocationFailure,
    },

    /// The line-history tool produced output that violates the porcelain format.
    #[error("malformed blame output for '{path}': commit {hash} {violation}")]
    MalformedBlameOutput {
        /// File whose output was being parsed.
        path: PathBuf,
        /// Commit hash of the offending block.
        hash: String,
        /// What was wrong with the block.
        violation: String,
    },

    /// A non-blame git command (`rev-list`, `log`) failed.
    #[error("`{command}` failed: {reason}")]
    GitCommand {
        /// The rendered command line.
        command: String,
        /// What went wrong.
        #[source]
        reason: InvocationFailure,
    },

    /// A worker task panicked or was cancelled.
    #[error("worker task failed: {0}")]
    Runtime(#[from] tokio::task::JoinError),
}

impl QueryError {
    /// Returns the file path associated with this error, if any.
    #[must_use]
    pub fn path(&self) -> Option<&std::path::Path> {
        match self {
            Self::MatcherParse { path, .. }
            | Self::BlameInvocation { path, .. }
            | Self::MalformedBlameOutput { path, .. } => Some(path),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn conflict_message_names_both_flags() {
        let err = OptionsError::Conflict {
            first: "survey",
            second: "after",
        };
        assert_eq!(err.to_string(), "--survey cannot be used together with --after");
    }

    #[test]
    fn exit_failure_includes_code_and_stderr() {
        let failure = InvocationFailure::Exit {
            code: Some(128),
            stderr: "fatal: no such path".into(),
        };
        assert_eq!(failure.to_string(), "exited with status 128: fatal: no such path");
    }

    #[test]
    fn exit_failure_without_code_reports_signal() {
        let failure = InvocationFailure::Exit {
            code: None,
            stderr: String::new(),
        };
        assert!(failure.to_string().contains("signal"));
    }

    #[test]
    fn blame_error_exposes_path() {
        let err = QueryError::BlameInvocation {
            path: PathBuf::from("src/app.js"),
            command: "git blame src/app.js -L 1,1 --porcelain".into(),
            reason: InvocationFailure::Exit {
                code: Some(1),
                stderr: String::new(),
            },
        };
        assert_eq!(err.path(), Some(std::path::Path::new("src/app.js")));
        assert!(err.to_string().contains("git blame src/app.js"));
    }

    #[test]
    fn invalid_date_has_no_path() {
        let err = QueryError::InvalidDate { input: "soon".into() };
        assert!(err.path().is_none());
        assert!(err.to_string().contains("soon"));
    }
}
