//! Function extraction: one record per function-like construct.

pub mod normalize;
pub mod types;
mod visitor;

use strata_core::errors::ParseError;

use crate::parsers::{self, AnalysisCache};
use crate::scanner::hasher;
use crate::scanner::types::SourceUnit;

pub use types::{CallSiteRecord, ExtractedFunction, FileAnalysis, ImportRecord, VarTypeBinding};
pub(crate) use visitor::simplify_type;

/// Parses and extracts files, memoizing per content hash.
///
/// Extraction output is fully deterministic for a given file content, so
/// cache hits are safe; physical ids are minted downstream.
pub struct FileAnalyzer {
    cache: AnalysisCache,
}

impl FileAnalyzer {
    pub fn new() -> Self {
        Self {
            cache: AnalysisCache::default(),
        }
    }

    pub fn with_cache_capacity(capacity: u64) -> Self {
        Self {
            cache: AnalysisCache::new(capacity),
        }
    }

    /// Analyze one file, using the cache when the content is unchanged.
    pub fn analyze(&self, unit: &SourceUnit) -> Result<FileAnalysis, ParseError> {
        let key = hasher::cache_key(unit.content.as_bytes());
        if let Some(hit) = self.cache.get(key, unit.language) {
            return Ok(hit);
        }
        let analysis = extract_file(unit)?;
        self.cache.insert(key, unit.language, analysis.clone());
        Ok(analysis)
    }

    pub fn cache_entry_count(&self) -> u64 {
        self.cache.entry_count()
    }
}

impl Default for FileAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

/// Parse and walk a single file, bypassing the cache.
pub fn extract_file(unit: &SourceUnit) -> Result<FileAnalysis, ParseError> {
    let tree = parsers::parse(&unit.content, &unit.path, unit.language)?;
    let root = tree.root_node();
    if root.kind() == "ERROR" {
        return Err(ParseError::SyntaxError {
            path: unit.path.clone(),
            message: "file is not parseable".to_string(),
        });
    }

    let mut walker = visitor::Walker::new(&unit.content);
    walker.walk(root);
    Ok(walker.finish(unit))
}
