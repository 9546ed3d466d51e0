//! Matched source locations, grouped by file.

use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};

use serde::Serialize;

/// A one-based, end-inclusive range of lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct LineRange {
    /// First line of the range.
    pub start: u32,
    /// Last line of the range (inclusive).
    pub end: u32,
}

impl LineRange {
    /// Creates a range, clamping `start` to 1 and ordering the bounds.
    #[must_use]
    pub fn new(start: u32, end: u32) -> Self {
        let start = start.max(1);
        let end = end.max(1);
        Self {
            start: start.min(end),
            end: start.max(end),
        }
    }

    /// Creates a range covering a single line.
    #[must_use]
    pub fn line(line: u32) -> Self {
        Self::new(line, line)
    }
}

impl fmt::Display for LineRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.start, self.end)
    }
}

/// All matched ranges for one file, in match order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileLocations {
    /// File path as discovered.
    pub path: PathBuf,
    /// Matched ranges. Duplicates are kept.
    pub ranges: Vec<LineRange>,
}

impl FileLocations {
    /// Returns `true` if the file has at least one match.
    #[must_use]
    pub fn has_matches(&self) -> bool {
        !self.ranges.is_empty()
    }
}

/// Locations grouped by file, preserving discovery order.
///
/// Files may be present with zero ranges; they count as searched but are never
/// blamed.
#[derive(Debug, Clone, Default)]
pub struct LocationMap {
    files: Vec<FileLocations>,
    index: HashMap<PathBuf, usize>,
}

impl LocationMap {
    /// Creates an empty map.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends ranges for `path`, creating the entry on first use.
    pub fn insert(&mut self, path: impl Into<PathBuf>, ranges: impl IntoIterator<Item = LineRange>) {
        let path = path.into();
        if let Some(&idx) = self.index.get(&path) {
            self.files[idx].ranges.extend(ranges);
            return;
        }

        self.index.insert(path.clone(), self.files.len());
        self.files.push(FileLocations {
            path,
            ranges: ranges.into_iter().collect(),
        });
    }

    /// Number of files in the map, including files without matches.
    #[must_use]
    pub fn len(&self) -> usize {
        self.files.len()
    }

    /// Returns `true` if the map holds no files.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Iterates over every file in discovery order.
    pub fn iter(&self) -> impl Iterator<Item = &FileLocations> {
        self.files.iter()
    }

    /// Iterates over files that have at least one match.
    pub fn files_with_matches(&self) -> impl Iterator<Item = &FileLocations> {
        self.files.iter().filter(|f| f.has_matches())
    }

    /// Total number of locations across all files.
    #[must_use]
    pub fn instance_count(&self) -> usize {
        self.files.iter().map(|f| f.ranges.len()).sum()
    }

    /// Returns the ranges recorded for `path`.
    #[must_use]
    pub fn get(&self, path: &Path) -> Option<&[LineRange]> {
        self.index.get(path).map(|&idx| self.files[idx].ranges.as_slice())
    }
}

impl FromIterator<(PathBuf, Vec<LineRange>)> for LocationMap {
    fn from_iter<I: IntoIterator<Item = (PathBuf, Vec<LineRange>)>>(iter: I) -> Self {
        let mut map = Self::new();
        for (path, ranges) in iter {
            map.insert(path, ranges);
        }
        map
    }
}
