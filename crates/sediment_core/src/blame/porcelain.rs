//! Parser for `git blame --porcelain` output.
//!
//! ```text
//! <40-hex-hash> <orig-line> <final-line> [<num-lines>]
//! author <name>
//! author-time <unix-seconds>
//! ...
//! \t<line content>
//! ```
//!
//! The header fields follow only the first occurrence of a commit; repeats
//! carry the hash line and the content line alone.

use std::collections::{HashMap, HashSet};
use std::path::Path;

use crate::commit::CommitRecord;
use crate::error::QueryError;

const HASH_LEN: usize = 40;

/// Block under construction: its hash and the first value seen per label.
struct OpenBlock<'a> {
    hash: &'a str,
    fields: HashMap<&'a str, &'a str>,
}

/// Parses one file's porcelain output into commit records.
///
/// Produces one record per distinct hash, in first-seen order. A block
/// missing `author` or `author-time`, or with a non-integer `author-time`,
/// fails the parse. Empty or whitespace-only output yields no records.
pub fn parse_porcelain(raw: &str, path: &Path, command: &str) -> Result<Vec<CommitRecord>, QueryError> {
    let mut seen: HashSet<&str> = HashSet::new();
    let mut records = Vec::new();
    let mut open: Option<OpenBlock<'_>> = None;
    let mut skipping = false;

    for line in raw.lines() {
        if line.starts_with('\t') || line.trim().is_empty() {
            continue;
        }

        let (token, rest) = line.split_once(' ').unwrap_or((line, ""));

        if is_hash(token) {
            if let Some(block) = open.take() {
                records.push(close_block(block, path, command)?);
            }
            skipping = !seen.insert(token);
            if !skipping {
                open = Some(OpenBlock {
                    hash: token,
                    fields: HashMap::new(),
                });
            }
            continue;
        }

        if skipping {
            continue;
        }
        if let Some(block) = open.as_mut() {
            block.fields.entry(token).or_insert(rest);
        }
    }

    if let Some(block) = open {
        records.push(close_block(block, path, command)?);
    }

    Ok(records)
}

fn close_block(block: OpenBlock<'_>, path: &Path, command: &str) -> Result<CommitRecord, QueryError> {
    let malformed = |violation: String| QueryError::MalformedBlameOutput {
        path: path.to_path_buf(),
        hash: block.hash.to_string(),
        violation,
    };

    let author = block
        .fields
        .get("author")
        .ok_or_else(|| malformed("is missing 'author'".to_string()))?;
    let raw_time = block
        .fields
        .get("author-time")
        .ok_or_else(|| malformed("is missing 'author-time'".to_string()))?;
    let timestamp_s = raw_time
        .trim()
        .parse::<i64>()
        .map_err(|err| malformed(format!("has non-integer 'author-time' {raw_time:?} ({err})")))?;

    Ok(CommitRecord {
        hash: block.hash.to_string(),
        path: path.to_path_buf(),
        command: command.to_string(),
        timestamp_s,
        author: (*author).to_string(),
    })
}

fn is_hash(token: &str) -> bool {
    token.len() == HASH_LEN && token.bytes().all(|b| b.is_ascii_hexdigit())
}
