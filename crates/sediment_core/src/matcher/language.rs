use std::fmt;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tree_sitter::Language;

use crate::error::OptionsError;

/// Source languages the selector matcher can parse.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceLanguage {
    /// `JavaScript` - `.js`, `.jsx`, `.mjs`, `.cjs`
    JavaScript,
    /// `TypeScript` - `.ts`, `.mts`, `.cts`
    TypeScript,
    /// TSX - `.tsx`
    Tsx,
    /// Python (.py)
    Python,
    /// Go (.go)
    Go,
    /// Ruby (.rb)
    Ruby,
    /// Java (.java)
    Java,
    /// Rust (.rs)
    Rust,
}

impl SourceLanguage {
    /// Every supported language.
    pub const ALL: [Self; 8] = [
        Self::JavaScript,
        Self::TypeScript,
        Self::Tsx,
        Self::Python,
        Self::Go,
        Self::Ruby,
        Self::Java,
        Self::Rust,
    ];

    /// Detects the language from a file path extension.
    #[must_use]
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?;
        match ext {
            "js" | "jsx" | "mjs" | "cjs" => Some(Self::JavaScript),
            "ts" | "mts" | "cts" => Some(Self::TypeScript),
            "tsx" => Some(Self::Tsx),
            "py" => Some(Self::Python),
            "go" => Some(Self::Go),
            "rb" => Some(Self::Ruby),
            "java" => Some(Self::Java),
            "rs" => Some(Self::Rust),
            _ => None,
        }
    }

    /// Lower-case name used in configuration and on the command line.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::JavaScript => "javascript",
            Self::TypeScript => "typescript",
            Self::Tsx => "tsx",
            Self::Python => "python",
            Self::Go => "go",
            Self::Ruby => "ruby",
            Self::Java => "java",
            Self::Rust => "rust",
        }
    }

    /// File extensions mapped to this language.
    #[must_use]
    pub const fn extensions(self) -> &'static [&'static str] {
        match self {
            Self::JavaScript => &["js", "jsx", "mjs", "cjs"],
            Self::TypeScript => &["ts", "mts", "cts"],
            Self::Tsx => &["tsx"],
            Self::Python => &["py"],
            Self::Go => &["go"],
            Self::Ruby => &["rb"],
            Self::Java => &["java"],
            Self::Rust => &["rs"],
        }
    }

    pub(crate) fn tree_sitter_language(self) -> Language {
        match self {
            Self::JavaScript => tree_sitter_javascript::LANGUAGE.into(),
            Self::TypeScript => tree_sitter_typescript::LANGUAGE_TYPESCRIPT.into(),
            Self::Tsx => tree_sitter_typescript::LANGUAGE_TSX.into(),
            Self::Python => tree_sitter_python::LANGUAGE.into(),
            Self::Go => tree_sitter_go::LANGUAGE.into(),
            Self::Ruby => tree_sitter_ruby::LANGUAGE.into(),
            Self::Java => tree_sitter_java::LANGUAGE.into(),
            Self::Rust => tree_sitter_rust::LANGUAGE.into(),
        }
    }
}

impl fmt::Display for SourceLanguage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for SourceLanguage {
    type Err = OptionsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lowered = s.to_ascii_lowercase();
        match lowered.as_str() {
            "js" => return Ok(Self::JavaScript),
            "ts" => return Ok(Self::TypeScript),
            "py" => return Ok(Self::Python),
            "rb" => return Ok(Self::Ruby),
            "rs" => return Ok(Self::Rust),
            _ => {}
        }

        Self::ALL
            .into_iter()
            .find(|lang| lang.name() == lowered)
            .ok_or_else(|| OptionsError::UnknownLanguage(s.to_string()))
    }
}
