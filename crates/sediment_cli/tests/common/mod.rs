//! Git repository fixtures shared by the end-to-end tests.

#![expect(clippy::expect_used, reason = "tests use expect for clearer failure messages")]
#![allow(dead_code, reason = "each test binary uses a different subset")]

use std::fs;
use std::path::Path;
use std::process::Command as StdCommand;

use assert_cmd::Command;
use tempfile::TempDir;

pub fn sediment() -> Command {
    Command::new(env!("CARGO_BIN_EXE_sediment"))
}

fn git(dir: &Path, args: &[&str], envs: &[(&str, &str)]) -> String {
    let output = StdCommand::new("git")
        .args(args)
        .envs(envs.iter().copied())
        .current_dir(dir)
        .output()
        .expect("failed to run git");
    assert!(
        output.status.success(),
        "git {args:?} failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    String::from_utf8_lossy(&output.stdout).trim().to_string()
}

pub fn init_git_repo(dir: &TempDir) {
    git(dir.path(), &["init", "--quiet"], &[]);
    git(dir.path(), &["config", "user.email", "test@test.com"], &[]);
    git(dir.path(), &["config", "user.name", "Test User"], &[]);
    git(dir.path(), &["config", "commit.gpgsign", "false"], &[]);
}

pub fn write(dir: &TempDir, file: &str, content: &str) {
    let path = dir.path().join(file);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("create dir failed");
    }
    fs::write(path, content).expect("write failed");
}

/// Commits the given files as `author` at `date` (`YYYY-MM-DDTHH:MM:SSZ`) and
/// returns the new commit hash.
pub fn commit_at(dir: &TempDir, files: &[(&str, &str)], msg: &str, author: &str, date: &str) -> String {
    for (file, content) in files {
        write(dir, file, content);
        git(dir.path(), &["add", file], &[]);
    }

    let envs = [
        ("GIT_AUTHOR_NAME", author),
        ("GIT_AUTHOR_EMAIL", "author@test.com"),
        ("GIT_AUTHOR_DATE", date),
        ("GIT_COMMITTER_NAME", author),
        ("GIT_COMMITTER_EMAIL", "author@test.com"),
        ("GIT_COMMITTER_DATE", date),
    ];
    git(dir.path(), &["commit", "--quiet", "-m", msg], &envs);
    git(dir.path(), &["rev-parse", "HEAD"], &[])
}
