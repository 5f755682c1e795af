//! Analysis cache: Moka LRU keyed by (content hash, language).
//!
//! Caches extraction output, which is deterministic for a given file
//! content. Physical ids are minted after the cache, so re-analyses of an
//! unchanged file still receive fresh ids.

use moka::sync::Cache;

use crate::extract::types::FileAnalysis;
use crate::scanner::language_detect::Language;

/// Cache key combining content hash with language discriminant.
/// Same content parsed as different languages caches separately.
type CacheKey = (u64, std::mem::Discriminant<Language>);

fn make_key(content_hash: u64, lang: Language) -> CacheKey {
    (content_hash, std::mem::discriminant(&lang))
}

/// In-memory analysis cache using Moka (TinyLFU admission).
pub struct AnalysisCache {
    inner: Cache<CacheKey, FileAnalysis>,
}

impl AnalysisCache {
    /// Create a cache with the given capacity.
    pub fn new(capacity: u64) -> Self {
        Self {
            inner: Cache::new(capacity),
        }
    }

    pub fn get(&self, content_hash: u64, lang: Language) -> Option<FileAnalysis> {
        self.inner.get(&make_key(content_hash, lang))
    }

    pub fn insert(&self, content_hash: u64, lang: Language, analysis: FileAnalysis) {
        self.inner.insert(make_key(content_hash, lang), analysis);
    }

    pub fn entry_count(&self) -> u64 {
        self.inner.entry_count()
    }

    pub fn invalidate(&self, content_hash: u64, lang: Language) {
        self.inner.invalidate(&make_key(content_hash, lang));
    }
}

impl Default for AnalysisCache {
    fn default() -> Self {
        // Default: cache up to 10,000 analyzed files
        Self::new(10_000)
    }
}
