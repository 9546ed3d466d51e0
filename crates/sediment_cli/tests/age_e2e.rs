//! End-to-end tests for the `sediment age` command.

mod common;

use std::fs;

use insta::assert_snapshot;
use predicates::prelude::*;
use serde_json::Value;
use tempfile::TempDir;

use common::{commit_at, init_git_repo, sediment, write};

const DEBUGGER: &str = "(debugger_statement) @d";

struct History {
    dir: TempDir,
    old: String,
    new: String,
}

/// `src/a.js` gains a debugger in 2017 and another in 2021; `src/b.js` gets
/// one in 2021; `src/c.js` never has one.
fn history() -> History {
    let dir = TempDir::new().unwrap();
    init_git_repo(&dir);

    let old = commit_at(
        &dir,
        &[("src/a.js", "debugger;\nlet x = 2;\n")],
        "first debugger",
        "Ada",
        "2017-01-15T12:00:00Z",
    );
    let new = commit_at(
        &dir,
        &[
            ("src/a.js", "debugger;\nlet x = 2;\ndebugger;\n"),
            ("src/b.js", "function f() {\n  debugger;\n}\n"),
            ("src/c.js", "let nothing = 1;\n"),
        ],
        "more debuggers",
        "Grace",
        "2021-06-01T12:00:00Z",
    );

    History { dir, old, new }
}

fn json_stdout(output: &std::process::Output) -> Value {
    assert!(
        output.status.success(),
        "command failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    serde_json::from_slice(&output.stdout).unwrap()
}

#[test]
fn commits_are_aggregated_oldest_first() {
    let h = history();

    let output = sediment()
        .args(["age", "-p", "src", "-s", DEBUGGER, "--format", "json"])
        .current_dir(h.dir.path())
        .output()
        .unwrap();
    let value = json_stdout(&output);
    let commits = value["commits"].as_array().unwrap();

    assert_eq!(commits.len(), 2);

    assert_eq!(commits[0]["hash"], h.old.as_str());
    assert_eq!(commits[0]["author"], "Ada");
    assert_eq!(commits[0]["timestampS"], 1_484_481_600);
    assert_eq!(commits[0]["count"], 1);
    assert_eq!(commits[0]["files"], serde_json::json!(["src/a.js"]));

    assert_eq!(commits[1]["hash"], h.new.as_str());
    assert_eq!(commits[1]["author"], "Grace");
    assert_eq!(commits[1]["count"], 2);
    assert_eq!(commits[1]["files"], serde_json::json!(["src/a.js", "src/b.js"]));
    assert_eq!(
        commits[1]["commands"][0],
        "git blame src/a.js -L 1,1 -L 3,3 --porcelain"
    );
}

#[test]
fn after_keeps_only_recent_commits() {
    let h = history();

    let output = sediment()
        .args(["age", "-p", "src", "-s", DEBUGGER, "-f", "json", "--after", "2020-1-1"])
        .current_dir(h.dir.path())
        .output()
        .unwrap();
    let value = json_stdout(&output);
    let commits = value["commits"].as_array().unwrap();

    assert_eq!(commits.len(), 1);
    assert_eq!(commits[0]["hash"], h.new.as_str());
}

#[test]
fn after_in_the_future_yields_no_commits() {
    let h = history();

    let output = sediment()
        .args(["age", "-p", "src", "-s", DEBUGGER, "-f", "json", "--after", "2030-1-1"])
        .current_dir(h.dir.path())
        .output()
        .unwrap();
    assert_eq!(json_stdout(&output)["commits"], serde_json::json!([]));
}

#[test]
fn text_output_is_a_table() {
    let h = history();

    sediment()
        .args(["age", "-p", "src", "-s", DEBUGGER])
        .current_dir(h.dir.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("Occurrences"))
        .stdout(predicate::str::contains("2017/Jan/15"))
        .stdout(predicate::str::contains("2021/Jun/01"))
        .stdout(predicate::str::contains(h.old.as_str()))
        .stdout(predicate::str::contains("2 commits · 3 occurrences"));
}

#[test]
fn hash_url_format_links_commits() {
    let h = history();

    let output = sediment()
        .args([
            "age",
            "-p",
            "src",
            "-s",
            DEBUGGER,
            "-f",
            "json",
            "--hash-url-format",
            "https://example.com/commit/%s",
        ])
        .current_dir(h.dir.path())
        .output()
        .unwrap();
    let value = json_stdout(&output);

    assert_eq!(
        value["commits"][0]["url"],
        format!("https://example.com/commit/{}", h.old)
    );
}

#[test]
fn hash_url_format_without_placeholder_fails() {
    let h = history();

    sediment()
        .args(["age", "-p", "src", "-s", DEBUGGER, "--hash-url-format", "https://example.com/"])
        .current_dir(h.dir.path())
        .assert()
        .code(1)
        .stderr(predicate::str::contains("'%s' placeholder"));
}

#[test]
fn output_flag_writes_file() {
    let h = history();

    sediment()
        .args(["age", "-p", "src", "-s", DEBUGGER, "-f", "json", "-o", "report.json"])
        .current_dir(h.dir.path())
        .assert()
        .success()
        .stdout(predicate::str::is_empty());

    let report: Value = serde_json::from_str(&fs::read_to_string(h.dir.path().join("report.json")).unwrap()).unwrap();
    assert_eq!(report["commits"].as_array().unwrap().len(), 2);
}

#[test]
fn language_restricts_search() {
    let h = history();
    write(&h.dir, "src/tool.py", "def f():\n    pass\n");

    let output = sediment()
        .args(["age", "-p", "src", "-s", DEBUGGER, "-l", "javascript", "-f", "json", "--survey"])
        .current_dir(h.dir.path())
        .output()
        .unwrap();
    let value = json_stdout(&output);
    assert_eq!(value["survey"]["totalFilesSearchedCount"], 3);
}

#[test]
fn uncommitted_match_fails_the_query() {
    let h = history();
    write(&h.dir, "src/d.js", "debugger;\n");

    sediment()
        .args(["age", "-p", "src", "-s", DEBUGGER])
        .current_dir(h.dir.path())
        .assert()
        .code(1)
        .stderr(predicate::str::contains("blame failed for 'src/d.js'"));
}

#[test]
fn blame_requires_a_repository() {
    let dir = TempDir::new().unwrap();
    write(&dir, "src/a.js", "debugger;\n");

    sediment()
        .args(["age", "-p", "src", "-s", DEBUGGER])
        .current_dir(dir.path())
        .assert()
        .code(1)
        .stderr(predicate::str::contains("not a git repository"));
}

fn survey_fixture() -> TempDir {
    let dir = TempDir::new().unwrap();
    write(&dir, "src/a.js", "debugger;\nlet x = 2;\ndebugger;\n");
    write(&dir, "src/b.js", "function f() {\n  debugger;\n}\n");
    write(&dir, "src/c.js", "let nothing = 1;\n");
    dir
}

#[test]
fn survey_json_snapshot() {
    let dir = survey_fixture();

    let output = sediment()
        .args(["age", "-p", "src", "-s", DEBUGGER, "--survey", "--seed", "7", "-f", "json"])
        .current_dir(dir.path())
        .output()
        .unwrap();
    assert!(output.status.success());

    assert_snapshot!("survey_json", String::from_utf8(output.stdout).unwrap());
}

#[test]
fn survey_text_reports_counts_and_sample() {
    let dir = survey_fixture();

    sediment()
        .args(["age", "-p", "src", "-s", DEBUGGER, "--survey"])
        .current_dir(dir.path())
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "\"3\" instances of this pattern were found across \"2\" files. In total, \"3\" files were searched.",
        ))
        .stdout(predicate::str::contains("* src/a.js\n* src/b.js\n"));
}

#[test]
fn survey_ignores_configured_hash_url_format() {
    let dir = survey_fixture();
    write(&dir, ".sediment.toml", "hash_url_format = \"https://example.com/%s\"\n");

    sediment()
        .args(["age", "-p", "src", "-s", DEBUGGER, "--survey"])
        .current_dir(dir.path())
        .assert()
        .success();
}

#[test]
fn survey_with_after_is_rejected() {
    let dir = survey_fixture();

    sediment()
        .args(["age", "-p", "src", "-s", DEBUGGER, "--survey", "--after", "2020-1-1"])
        .current_dir(dir.path())
        .assert()
        .code(1)
        .stderr(predicate::str::contains("--survey cannot be used together with --after"));
}

#[test]
fn invalid_date_is_rejected() {
    let dir = survey_fixture();

    sediment()
        .args(["age", "-p", "src", "-s", DEBUGGER, "--after", "yesterday"])
        .current_dir(dir.path())
        .assert()
        .code(1)
        .stderr(predicate::str::contains("invalid date 'yesterday'"));
}

#[test]
fn invalid_selector_is_rejected() {
    let dir = survey_fixture();

    sediment()
        .args(["age", "-p", "src", "-s", "(not_a_node) @x", "--survey"])
        .current_dir(dir.path())
        .assert()
        .code(1)
        .stderr(predicate::str::contains("selector is not a valid query"));
}

#[test]
fn syntax_error_names_the_file() {
    let dir = survey_fixture();
    write(&dir, "src/broken.js", "function (\n");

    sediment()
        .args(["age", "-p", "src", "-s", DEBUGGER, "--survey"])
        .current_dir(dir.path())
        .assert()
        .code(1)
        .stderr(predicate::str::contains("failed to parse 'src/broken.js'"));
}

#[test]
fn malformed_config_is_reported() {
    let dir = survey_fixture();
    write(&dir, ".sediment.toml", "concurrency = \"lots\"\n");

    sediment()
        .args(["age", "-p", "src", "-s", DEBUGGER, "--survey"])
        .current_dir(dir.path())
        .assert()
        .code(1)
        .stderr(predicate::str::contains("loading config"));
}
