//! The `git` command-line tool as a line-history source.

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::Stdio;

use tokio::process::Command;
#[cfg(feature = "tracing")]
use tracing::trace;

use crate::blame::{BlameOutput, LineHistory, blame_args};
use crate::config::DEFAULT_GIT_BINARY;
use crate::error::{InvocationFailure, QueryError};
use crate::location::LineRange;
use crate::window::CutoffDate;

/// Runs `git` subcommands as child processes.
///
/// Relative paths are resolved against `workdir`, or the current directory
/// when none is set.
#[derive(Debug, Clone)]
pub struct GitCli {
    program: String,
    workdir: Option<PathBuf>,
}

impl Default for GitCli {
    fn default() -> Self {
        Self::new(DEFAULT_GIT_BINARY)
    }
}

impl GitCli {
    /// Uses `program` as the git executable.
    #[must_use]
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            workdir: None,
        }
    }

    /// Runs every command in `dir`.
    #[must_use]
    pub fn with_workdir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.workdir = Some(dir.into());
        self
    }

    /// Renders a command line for messages, e.g. `git blame a.js -L 1,1 --porcelain`.
    #[must_use]
    pub fn render(&self, args: &[OsString]) -> String {
        let mut rendered = self.program.clone();
        for arg in args {
            rendered.push(' ');
            rendered.push_str(&arg.to_string_lossy());
        }
        rendered
    }

    async fn output(&self, args: &[OsString]) -> Result<String, InvocationFailure> {
        let mut cmd = Command::new(&self.program);
        cmd.args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        if let Some(dir) = &self.workdir {
            cmd.current_dir(dir);
        }

        let output = cmd.output().await?;
        if !output.status.success() {
            return Err(InvocationFailure::Exit {
                code: output.status.code(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }

    async fn run_git(&self, args: Vec<OsString>) -> Result<String, QueryError> {
        #[cfg(feature = "tracing")]
        trace!(command = %self.render(&args), "running git");

        self.output(&args).await.map_err(|reason| QueryError::GitCommand {
            command: self.render(&args),
            reason,
        })
    }

    /// Oldest commit reachable from `HEAD`, optionally limited to commits
    /// since `cutoff`. `None` when no commit qualifies.
    pub async fn first_commit_since(&self, cutoff: Option<&CutoffDate>) -> Result<Option<String>, QueryError> {
        let mut args = vec![OsString::from("rev-list"), OsString::from("--reverse")];
        if let Some(cutoff) = cutoff {
            args.push(OsString::from(format!("--since={}", cutoff.to_git_date())));
        }
        args.push(OsString::from("HEAD"));

        let stdout = self.run_git(args).await?;
        Ok(stdout
            .lines()
            .map(str::trim)
            .find(|line| !line.is_empty())
            .map(str::to_string))
    }

    /// Number of commits in `from..HEAD` that touch `path`.
    pub async fn count_commits_touching(&self, from: &str, path: &Path) -> Result<usize, QueryError> {
        let args = vec![
            OsString::from("log"),
            OsString::from("--oneline"),
            OsString::from(format!("{from}..HEAD")),
            OsString::from("--"),
            path.as_os_str().to_os_string(),
        ];

        let stdout = self.run_git(args).await?;
        Ok(stdout.lines().filter(|line| !line.trim().is_empty()).count())
    }
}

impl LineHistory for GitCli {
    async fn blame(&self, path: &Path, ranges: &[LineRange]) -> Result<BlameOutput, QueryError> {
        let args = blame_args(path, ranges);
        let command = self.render(&args);

        #[cfg(feature = "tracing")]
        trace!(%command, "running blame");

        match self.output(&args).await {
            Ok(stdout) => Ok(BlameOutput { command, stdout }),
            Err(reason) => Err(QueryError::BlameInvocation {
                path: path.to_path_buf(),
                command,
                reason,
            }),
        }
    }
}
