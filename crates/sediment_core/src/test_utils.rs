//! Test utilities for `sediment_core` (compiled only during testing).

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use tempfile::TempDir;

use crate::blame::{BlameOutput, LineHistory, blame_args};
use crate::error::{InvocationFailure, QueryError};
use crate::location::LineRange;

/// A throwaway git repository with deterministic authors and dates.
pub struct TestRepo {
    dir: TempDir,
}

impl TestRepo {
    pub fn new() -> Self {
        let dir = TempDir::new().unwrap();
        let repo = Self { dir };
        repo.git(&["init", "--quiet"], &[]);
        repo.git(&["config", "user.email", "test@test.com"], &[]);
        repo.git(&["config", "user.name", "Test User"], &[]);
        repo.git(&["config", "commit.gpgsign", "false"], &[]);
        repo
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Writes `content` to `file` and commits it as `author` at `date` (RFC 3339).
    pub fn commit_at(&self, file: &str, content: &str, msg: &str, author: &str, date: &str) {
        let full = self.dir.path().join(file);
        if let Some(parent) = full.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(&full, content).unwrap();

        let stamp = chrono::DateTime::parse_from_rfc3339(date).unwrap().timestamp();
        let git_date = format!("{stamp} +0000");
        let email = format!("{}@example.com", author.to_lowercase().replace(' ', "."));
        let env = [
            ("GIT_AUTHOR_NAME", author),
            ("GIT_AUTHOR_EMAIL", email.as_str()),
            ("GIT_AUTHOR_DATE", git_date.as_str()),
            ("GIT_COMMITTER_DATE", git_date.as_str()),
        ];

        self.git(&["add", file], &env);
        self.git(&["commit", "--quiet", "-m", msg], &env);
    }

    /// Full hash of `rev`.
    pub fn rev(&self, rev: &str) -> String {
        self.git(&["rev-parse", rev], &[]).trim().to_string()
    }

    fn git(&self, args: &[&str], env: &[(&str, &str)]) -> String {
        let output = Command::new("git")
            .args(args)
            .envs(env.iter().copied())
            .current_dir(self.dir.path())
            .output()
            .unwrap();
        assert!(
            output.status.success(),
            "git {args:?} failed: {}",
            String::from_utf8_lossy(&output.stderr)
        );
        String::from_utf8(output.stdout).unwrap()
    }
}

/// Canned porcelain output per path. Unknown paths fail like a non-zero
/// `git blame` exit.
#[derive(Default)]
pub struct FakeHistory {
    outputs: HashMap<PathBuf, String>,
    calls: AtomicUsize,
    seen: Mutex<Vec<(PathBuf, Vec<LineRange>)>>,
}

impl FakeHistory {
    pub fn with(mut self, path: impl Into<PathBuf>, porcelain: impl Into<String>) -> Self {
        self.outputs.insert(path.into(), porcelain.into());
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn seen(&self) -> Vec<(PathBuf, Vec<LineRange>)> {
        self.seen.lock().unwrap().clone()
    }
}

impl LineHistory for FakeHistory {
    async fn blame(&self, path: &Path, ranges: &[LineRange]) -> Result<BlameOutput, QueryError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.seen.lock().unwrap().push((path.to_path_buf(), ranges.to_vec()));

        let args = blame_args(path, ranges);
        let command = format!(
            "git {}",
            args.iter().map(|a| a.to_string_lossy()).collect::<Vec<_>>().join(" ")
        );

        match self.outputs.get(path) {
            Some(stdout) => Ok(BlameOutput {
                command,
                stdout: stdout.clone(),
            }),
            None => Err(QueryError::BlameInvocation {
                path: path.to_path_buf(),
                command,
                reason: InvocationFailure::Exit {
                    code: Some(128),
                    stderr: format!("fatal: no such path '{}' in HEAD", path.display()),
                },
            }),
        }
    }
}

/// A porcelain block for one line attributed to `hash`.
pub fn porcelain_block(hash: &str, author: &str, time: i64) -> String {
    format!(
        "{hash} 1 1 1\nauthor {author}\nauthor-mail <a@example.com>\nauthor-time {time}\nauthor-tz +0000\n\
         summary change\nfilename file\n\tline\n"
    )
}
