//! Tree-sitter parsing for TypeScript, TSX, and JavaScript.

pub mod cache;

use std::path::Path;

use strata_core::errors::ParseError;

use crate::scanner::language_detect::Language;

pub use cache::AnalysisCache;

/// Parse source text with the grammar for the given language.
///
/// A `tree_sitter::Parser` is not shareable across threads, so a fresh
/// parser is created per call; grammar loading is cheap.
pub fn parse(source: &str, path: &Path, language: Language) -> Result<tree_sitter::Tree, ParseError> {
    let mut parser = tree_sitter::Parser::new();
    parser
        .set_language(&language.ts_language())
        .map_err(|e| ParseError::SyntaxError {
            path: path.to_path_buf(),
            message: format!("grammar load: {e}"),
        })?;

    parser
        .parse(source, None)
        .ok_or_else(|| ParseError::SyntaxError {
            path: path.to_path_buf(),
            message: "parser returned no tree".to_string(),
        })
}
