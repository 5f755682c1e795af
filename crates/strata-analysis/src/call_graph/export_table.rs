//! Export table cache: per-module map from exported name to function record.
//!
//! Built lazily on first need per module and reused for the remainder of
//! the snapshot build. Each module's table is computed at most once.

use strata_core::types::collections::{FxHashMap, FxHashSet};
use strata_core::types::PhysicalId;

use crate::identity::AnalyzedFile;

/// Extensions tried, in order, when resolving an extensionless specifier.
const EXTENSION_CANDIDATES: &[&str] = &[".ts", ".tsx", ".js", ".jsx", ".mts", ".cts"];

/// Outcome of module specifier normalization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModuleTarget {
    /// A file inside the analyzed set, by normalized relative path.
    Internal(String),
    /// A module outside the analyzed set (package or unresolved path).
    External(String),
}

/// Lazily built per-pipeline-invocation export tables.
pub struct ExportTableCache<'a> {
    /// Normalized relative path → analyzed file.
    files: FxHashMap<&'a str, &'a AnalyzedFile>,
    /// Module path → exported name → record id (+ class name when exported
    /// symbol is a method of an exported class).
    tables: FxHashMap<String, FxHashMap<String, PhysicalId>>,
    built: FxHashSet<String>,
    build_count: usize,
}

impl<'a> ExportTableCache<'a> {
    pub fn new(files: &'a [AnalyzedFile]) -> Self {
        let index = files
            .iter()
            .map(|f| (f.analysis.relative_path.as_str(), f))
            .collect();
        Self {
            files: index,
            tables: FxHashMap::default(),
            built: FxHashSet::default(),
            build_count: 0,
        }
    }

    /// Resolve a specifier against the caller's file, then look up the
    /// exported name. `None` when the module is external or the name is
    /// not exported.
    pub fn lookup(
        &mut self,
        caller_file: &str,
        specifier: &str,
        exported_name: &str,
    ) -> Option<PhysicalId> {
        match self.resolve_specifier(caller_file, specifier) {
            ModuleTarget::Internal(path) => {
                self.ensure_built(&path);
                self.tables.get(&path)?.get(exported_name).cloned()
            }
            ModuleTarget::External(_) => None,
        }
    }

    /// Whether the specifier resolves into the analyzed set.
    pub fn classify(&self, caller_file: &str, specifier: &str) -> ModuleTarget {
        self.resolve_specifier(caller_file, specifier)
    }

    /// Number of table builds so far. Exposed so callers can assert the
    /// at-most-once-per-module guarantee.
    pub fn build_count(&self) -> usize {
        self.build_count
    }

    fn ensure_built(&mut self, path: &str) {
        if self.built.contains(path) {
            return;
        }
        self.built.insert(path.to_string());
        self.build_count += 1;

        let Some(file) = self.files.get(path) else {
            return;
        };
        let mut table = FxHashMap::default();
        for record in &file.records {
            // Top-level exported functions and variable-bound arrows are
            // importable under their own names.
            if record.is_exported && record.nesting_level == 0 && !record.is_method {
                table.insert(record.name.clone(), record.physical_id.clone());
            }
        }
        self.tables.insert(path.to_string(), table);
    }

    /// Normalize a module specifier:
    /// relative against the caller's directory; `@/`/`#/` aliases against
    /// the project root; absolute as-is; anything else is external.
    fn resolve_specifier(&self, caller_file: &str, specifier: &str) -> ModuleTarget {
        let base = if specifier.starts_with("./") || specifier.starts_with("../") {
            join_relative(parent_dir(caller_file), specifier)
        } else if let Some(rest) = specifier
            .strip_prefix("@/")
            .or_else(|| specifier.strip_prefix("#/"))
        {
            rest.to_string()
        } else if let Some(rest) = specifier.strip_prefix('/') {
            rest.to_string()
        } else {
            return ModuleTarget::External(specifier.to_string());
        };

        // Exact path first (specifier may already carry an extension).
        if self.files.contains_key(base.as_str()) {
            return ModuleTarget::Internal(base);
        }
        for ext in EXTENSION_CANDIDATES {
            let candidate = format!("{base}{ext}");
            if self.files.contains_key(candidate.as_str()) {
                return ModuleTarget::Internal(candidate);
            }
        }
        for ext in EXTENSION_CANDIDATES {
            let candidate = format!("{base}/index{ext}");
            if self.files.contains_key(candidate.as_str()) {
                return ModuleTarget::Internal(candidate);
            }
        }
        ModuleTarget::External(specifier.to_string())
    }
}

fn parent_dir(path: &str) -> &str {
    match path.rfind('/') {
        Some(idx) => &path[..idx],
        None => "",
    }
}

/// Join and normalize `.`/`..` segments without touching the filesystem.
fn join_relative(base: &str, relative: &str) -> String {
    let mut segments: Vec<&str> = base.split('/').filter(|s| !s.is_empty()).collect();
    for part in relative.split('/') {
        match part {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            other => segments.push(other),
        }
    }
    segments.join("/")
}
