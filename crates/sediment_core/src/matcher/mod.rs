//! Syntactic pattern matching with tree-sitter queries.
//!
//! A selector is a tree-sitter query in S-expression form. It is compiled
//! once per language, then every discovered file of a compiled language is
//! parsed and queried. Each query match becomes one [`LineRange`] spanning
//! all of its captured nodes.

mod language;

use std::cell::RefCell;
use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};

use rayon::prelude::*;
use tree_sitter::{Node, Parser, Query, QueryCursor, StreamingIterator as _};
#[cfg(feature = "tracing")]
use tracing::{debug, warn};

pub use language::SourceLanguage;

use crate::discovery::read_text_file;
use crate::error::QueryError;
use crate::location::{LineRange, LocationMap};

// `tree_sitter::Parser` is not `Send`, so each rayon worker keeps its own set.
thread_local! {
    static PARSERS: RefCell<HashMap<SourceLanguage, Parser>> = RefCell::new(HashMap::new());
}

/// A selector compiled for one or more languages.
#[derive(Debug)]
pub struct SelectorMatcher {
    queries: BTreeMap<SourceLanguage, Query>,
    rejected: Vec<(SourceLanguage, String)>,
}

impl SelectorMatcher {
    /// Compiles `selector` for each of `languages`.
    ///
    /// With `strict` set, a compile failure for any language is an error.
    /// Otherwise languages the selector does not fit are skipped and recorded
    /// in [`rejected`](Self::rejected), and only a failure for every language
    /// is an error. An empty language list yields a matcher that matches
    /// nothing.
    pub fn compile(
        selector: &str,
        languages: impl IntoIterator<Item = SourceLanguage>,
        strict: bool,
    ) -> Result<Self, QueryError> {
        let mut queries = BTreeMap::new();
        let mut rejected = Vec::new();

        for language in languages {
            if queries.contains_key(&language) {
                continue;
            }
            match compile_one(selector, language) {
                Ok(query) => {
                    queries.insert(language, query);
                }
                Err(message) if strict => {
                    return Err(QueryError::Selector {
                        languages: language.to_string(),
                        message,
                    });
                }
                Err(message) => {
                    #[cfg(feature = "tracing")]
                    warn!(%language, %message, "selector skipped for language");
                    rejected.push((language, message));
                }
            }
        }

        if queries.is_empty() && !rejected.is_empty() {
            let languages = rejected
                .iter()
                .map(|(lang, _)| lang.name())
                .collect::<Vec<_>>()
                .join(", ");
            let message = rejected.swap_remove(0).1;
            return Err(QueryError::Selector { languages, message });
        }

        Ok(Self { queries, rejected })
    }

    /// Languages skipped because the selector did not compile, with the reason.
    #[must_use]
    pub fn rejected(&self) -> &[(SourceLanguage, String)] {
        &self.rejected
    }

    /// Returns `true` if `path` would be searched by this matcher.
    #[must_use]
    pub fn handles(&self, path: &Path) -> bool {
        SourceLanguage::from_path(path).is_some_and(|lang| self.queries.contains_key(&lang))
    }

    /// Finds selector matches in `content`.
    ///
    /// Returns `Ok(None)` when `path` is not in a compiled language. A file
    /// with syntax errors is an error, never an empty result.
    pub fn find_matches(&self, path: &Path, content: &str) -> Result<Option<Vec<LineRange>>, QueryError> {
        let Some(language) = SourceLanguage::from_path(path) else {
            return Ok(None);
        };
        let Some(query) = self.queries.get(&language) else {
            return Ok(None);
        };

        let tree = PARSERS.with(|parsers| {
            let mut parsers = parsers.borrow_mut();
            let parser = match parsers.entry(language) {
                std::collections::hash_map::Entry::Occupied(entry) => entry.into_mut(),
                std::collections::hash_map::Entry::Vacant(entry) => {
                    let mut parser = Parser::new();
                    parser
                        .set_language(&language.tree_sitter_language())
                        .map_err(|err| parse_error(path, err.to_string()))?;
                    entry.insert(parser)
                }
            };
            parser
                .parse(content, None)
                .ok_or_else(|| parse_error(path, "parser produced no syntax tree".to_string()))
        })?;

        let root = tree.root_node();
        if root.has_error() {
            let message = first_error(root).map_or_else(
                || "syntax error".to_string(),
                |node| {
                    let pos = node.start_position();
                    format!("syntax error at line {}, column {}", pos.row + 1, pos.column + 1)
                },
            );
            return Err(parse_error(path, message));
        }

        let mut cursor = QueryCursor::new();
        let mut matches = cursor.matches(query, root, content.as_bytes());
        let mut ranges = Vec::new();
        while let Some(m) = matches.next() {
            let span = m.captures.iter().map(|c| node_lines(c.node)).reduce(|a, b| {
                LineRange::new(a.start.min(b.start), a.end.max(b.end))
            });
            if let Some(span) = span {
                ranges.push(span);
            }
        }

        Ok(Some(ranges))
    }

    /// Searches every file in `files` in parallel.
    ///
    /// The returned map holds one entry per searched file, in the order of
    /// `files`, including files with zero matches. Files outside the compiled
    /// languages, binary files and files larger than `max_file_size` are left
    /// out. The first parse error aborts the search.
    pub fn match_files(&self, files: &[PathBuf], max_file_size: Option<u64>) -> Result<LocationMap, QueryError> {
        let results = files
            .par_iter()
            .filter(|path| self.handles(path))
            .map(|path| {
                let Some(content) = read_text_file(path, max_file_size) else {
                    return Ok(None);
                };
                Ok(self
                    .find_matches(path, &content)?
                    .map(|ranges| (path.clone(), ranges)))
            })
            .collect::<Result<Vec<_>, QueryError>>()?;

        let map: LocationMap = results.into_iter().flatten().collect();

        #[cfg(feature = "tracing")]
        debug!(
            searched = map.len(),
            with_matches = map.files_with_matches().count(),
            instances = map.instance_count(),
            "selector matching complete"
        );

        Ok(map)
    }
}

fn compile_one(selector: &str, language: SourceLanguage) -> Result<Query, String> {
    let query = Query::new(&language.tree_sitter_language(), selector).map_err(|err| err.to_string())?;
    if query.capture_names().is_empty() {
        return Err("selector must capture at least one node, e.g. `(identifier) @match`".to_string());
    }
    Ok(query)
}

fn parse_error(path: &Path, message: String) -> QueryError {
    QueryError::MatcherParse {
        path: path.to_path_buf(),
        message,
    }
}

/// One-based lines covered by `node`. A node ending at column 0 does not
/// occupy its final row.
fn node_lines(node: Node<'_>) -> LineRange {
    let start = node.start_position().row;
    let end_pos = node.end_position();
    let end = if end_pos.column == 0 && end_pos.row > start {
        end_pos.row - 1
    } else {
        end_pos.row
    };
    LineRange::new(row_to_line(start), row_to_line(end))
}

fn row_to_line(row: usize) -> u32 {
    u32::try_from(row).map_or(u32::MAX, |r| r.saturating_add(1))
}

fn first_error(root: Node<'_>) -> Option<Node<'_>> {
    let mut cursor = root.walk();
    loop {
        let node = cursor.node();
        if node.is_error() || node.is_missing() {
            return Some(node);
        }
        if node.has_error() && cursor.goto_first_child() {
            continue;
        }
        loop {
            if cursor.goto_next_sibling() {
                break;
            }
            if !cursor.goto_parent() {
                return None;
            }
        }
    }
}
