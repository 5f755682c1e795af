//! Language detection from file extensions.

use serde::{Deserialize, Serialize};

/// Source languages Strata analyzes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Language {
    TypeScript,
    Tsx,
    JavaScript,
}

impl Language {
    /// Map a file extension to a language.
    /// `.mts`/`.cts` parse as TypeScript; `.jsx` parses with the TSX
    /// grammar so JSX elements are understood.
    pub fn from_extension(ext: Option<&str>) -> Option<Self> {
        match ext? {
            "ts" | "mts" | "cts" => Some(Self::TypeScript),
            "tsx" => Some(Self::Tsx),
            "js" | "mjs" | "cjs" => Some(Self::JavaScript),
            "jsx" => Some(Self::Tsx),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::TypeScript => "typescript",
            Self::Tsx => "tsx",
            Self::JavaScript => "javascript",
        }
    }

    /// The tree-sitter grammar for this language.
    pub fn ts_language(&self) -> tree_sitter::Language {
        match self {
            Self::TypeScript => tree_sitter_typescript::LANGUAGE_TYPESCRIPT.into(),
            Self::Tsx => tree_sitter_typescript::LANGUAGE_TSX.into(),
            Self::JavaScript => tree_sitter_javascript::LANGUAGE.into(),
        }
    }
}

/// Extensions scanned by default (TypeScript only).
pub const TYPESCRIPT_EXTENSIONS: &[&str] = &["ts", "tsx"];

/// Extensions added when JavaScript scanning is enabled.
pub const JAVASCRIPT_EXTENSIONS: &[&str] = &["js", "jsx", "mts", "cts"];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detects_typescript_extensions() {
        assert_eq!(Language::from_extension(Some("ts")), Some(Language::TypeScript));
        assert_eq!(Language::from_extension(Some("tsx")), Some(Language::Tsx));
        assert_eq!(Language::from_extension(Some("mts")), Some(Language::TypeScript));
        assert_eq!(Language::from_extension(Some("rs")), None);
        assert_eq!(Language::from_extension(None), None);
    }
}
