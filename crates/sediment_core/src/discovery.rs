//! File discovery and text reading.
//!
//! Expands path arguments (files, directories or glob patterns) into an
//! ordered, deduplicated list of files while honouring gitignore rules and
//! exclude globs.

use std::collections::HashSet;
use std::io::Read;
use std::path::{Component, Path, PathBuf};

use globset::{GlobBuilder, GlobMatcher};
use ignore::WalkBuilder;
use ignore::overrides::{Override, OverrideBuilder};
#[cfg(feature = "tracing")]
use tracing::{debug, trace};

use crate::error::QueryError;

const GLOB_META: &[char] = &['*', '?', '[', '{'];

/// Number of bytes inspected for null bytes when detecting binary content.
const BINARY_CHECK_BYTES: usize = 8000;

/// Files at or above this size are memory-mapped instead of heap-read.
const MMAP_THRESHOLD: u64 = 32 * 1024;

/// Controls which files a discovery walk yields.
#[derive(Debug, Clone, Default)]
pub struct DiscoveryOptions {
    /// Glob patterns to exclude.
    pub excludes: Vec<String>,
    /// Whether `.gitignore`, global and `.git/info/exclude` rules apply.
    pub respect_gitignore: bool,
}

/// Expands `patterns` into a list of files.
///
/// Each pattern is an existing file, an existing directory (walked
/// recursively) or a glob such as `src/**/*.js` (walked from its literal
/// prefix). A glob with no matches yields nothing rather than an error.
///
/// Paths are returned without `.` components, and a file reached through
/// several spellings (`a.js`, `./a.js`, its absolute path) is listed once,
/// under the first spelling seen.
pub fn discover_files(patterns: &[String], opts: &DiscoveryOptions) -> Result<Vec<PathBuf>, QueryError> {
    let mut seen = HashSet::new();
    let mut files = Vec::new();

    for pattern in patterns {
        for path in expand_pattern(pattern, opts)? {
            if seen.insert(dedup_key(&path)) {
                files.push(path);
            }
        }
    }

    #[cfg(feature = "tracing")]
    debug!(patterns = patterns.len(), files = files.len(), "discovered files");

    Ok(files)
}

fn expand_pattern(pattern: &str, opts: &DiscoveryOptions) -> Result<Vec<PathBuf>, QueryError> {
    let path = Path::new(pattern);

    if path.is_file() {
        return Ok(vec![clean_path(path)]);
    }

    if path.is_dir() {
        return walk(path, pattern, None, opts);
    }

    if !pattern.contains(GLOB_META) {
        #[cfg(feature = "tracing")]
        debug!(pattern, "path does not exist");
        return Ok(Vec::new());
    }

    let matcher = GlobBuilder::new(pattern.trim_start_matches("./"))
        .literal_separator(true)
        .build()
        .map_err(|e| discovery_error(pattern, &e))?
        .compile_matcher();

    let base = literal_base(pattern);
    if !base.is_dir() {
        return Ok(Vec::new());
    }

    walk(&base, pattern, Some(&matcher), opts)
}

fn walk(
    root: &Path,
    pattern: &str,
    matcher: Option<&GlobMatcher>,
    opts: &DiscoveryOptions,
) -> Result<Vec<PathBuf>, QueryError> {
    let overrides = build_overrides(root, pattern, &opts.excludes)?;

    let walker = WalkBuilder::new(root)
        .hidden(false)
        .git_ignore(opts.respect_gitignore)
        .git_global(opts.respect_gitignore)
        .git_exclude(opts.respect_gitignore)
        .require_git(false)
        .overrides(overrides)
        .filter_entry(|entry| entry.file_name() != ".git")
        .sort_by_file_name(|a, b| a.cmp(b))
        .build();

    let mut files = Vec::new();

    for result in walker {
        let entry = match result {
            Ok(entry) => entry,
            Err(_err) => {
                #[cfg(feature = "tracing")]
                debug!(error = %_err, "skipping unreadable entry");
                continue;
            }
        };

        if !entry.file_type().is_some_and(|ft| ft.is_file()) {
            continue;
        }

        let path = clean_path(entry.path());
        if matcher.is_none_or(|m| m.is_match(&path)) {
            files.push(path);
        }
    }

    Ok(files)
}

fn build_overrides(root: &Path, pattern: &str, excludes: &[String]) -> Result<Override, QueryError> {
    let mut builder = OverrideBuilder::new(root);

    for exclude in excludes {
        builder
            .add(&format!("!{exclude}"))
            .map_err(|e| discovery_error(pattern, &e))?;
    }

    builder.build().map_err(|e| discovery_error(pattern, &e))
}

fn discovery_error(pattern: &str, err: &dyn std::fmt::Display) -> QueryError {
    QueryError::Discovery {
        pattern: pattern.to_string(),
        message: err.to_string(),
    }
}

/// Returns the deepest existing directory formed by the leading components of
/// `pattern` that contain no glob metacharacters.
fn literal_base(pattern: &str) -> PathBuf {
    let mut dir: PathBuf = Path::new(pattern)
        .components()
        .take_while(|c| !c.as_os_str().to_string_lossy().contains(GLOB_META))
        .collect();

    while !dir.as_os_str().is_empty() && !dir.is_dir() {
        dir.pop();
    }

    if dir.as_os_str().is_empty() {
        PathBuf::from(".")
    } else {
        dir
    }
}

/// Drops every `.` component, so `./src/./a.js` becomes `src/a.js`.
fn clean_path(path: &Path) -> PathBuf {
    path.components().filter(|c| *c != Component::CurDir).collect()
}

/// Identity of a discovered file, independent of how its path was spelled.
fn dedup_key(path: &Path) -> PathBuf {
    std::path::absolute(path).map_or_else(|_| path.to_path_buf(), |abs| clean_path(&abs))
}

/// Reads a file as UTF-8 text, returning `None` if it exceeds `max_size`,
/// cannot be opened, or contains binary content.
#[must_use]
pub fn read_text_file(path: &Path, max_size: Option<u64>) -> Option<String> {
    let mut file = std::fs::File::open(path).ok()?;
    let len = file.metadata().ok()?.len();

    if let Some(max) = max_size
        && len > max
    {
        #[cfg(feature = "tracing")]
        trace!(path = %path.display(), len, "skipping oversized file");
        return None;
    }

    if len >= MMAP_THRESHOLD {
        read_large_file_mmap(&file)
    } else {
        read_small_file(&mut file, len)
    }
}

#[expect(
    clippy::cast_possible_truncation,
    reason = "files are below the mmap threshold here; the size fits in usize"
)]
fn read_small_file(file: &mut std::fs::File, len: u64) -> Option<String> {
    let mut bytes = Vec::with_capacity(len as usize);
    file.read_to_end(&mut bytes).ok()?;
    if is_binary_bytes(&bytes) {
        return None;
    }
    String::from_utf8(bytes).ok()
}

fn read_large_file_mmap(file: &std::fs::File) -> Option<String> {
    // SAFETY: The map is read-only and dropped before this function returns.
    // Concurrent truncation could raise SIGBUS; `git` and `ripgrep` accept the
    // same risk for mmap-based reads.
    #[expect(unsafe_code, reason = "mmap requires unsafe; lifetime is scoped to this function")]
    let mmap = unsafe { memmap2::Mmap::map(file) }.ok()?;

    if is_binary_bytes(&mmap) {
        return None;
    }

    std::str::from_utf8(&mmap).ok().map(String::from)
}

fn is_binary_bytes(bytes: &[u8]) -> bool {
    let check_len = bytes.len().min(BINARY_CHECK_BYTES);
    bytes[..check_len].contains(&0)
}
