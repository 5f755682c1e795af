//! Parallel file walker using the `ignore` crate's `WalkParallel`.
//!
//! Collects TypeScript (and optionally JavaScript) sources under the
//! configured roots, honoring exclude patterns and default ignores.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crossbeam_channel as channel;
use strata_core::config::ScanConfig;
use strata_core::errors::ScanError;

use super::language_detect::{Language, JAVASCRIPT_EXTENSIONS, TYPESCRIPT_EXTENSIONS};
use super::types::DiscoveredFile;

/// Default ignore patterns applied to every scan.
pub const DEFAULT_IGNORES: &[&str] = &[
    "node_modules",
    ".git",
    "dist",
    "build",
    "out",
    ".next",
    ".nuxt",
    "coverage",
    ".nyc_output",
    "vendor",
    ".strata-temp",
];

/// True when the pattern contains glob metacharacters.
fn has_glob_meta(pattern: &str) -> bool {
    pattern.contains(['*', '?', '[', ']', '{', '}'])
}

/// Expand a configured exclude into override patterns.
/// Plain names are treated as directory segments anywhere in the tree.
fn exclude_patterns(pattern: &str) -> Vec<String> {
    if has_glob_meta(pattern) {
        vec![format!("!{pattern}")]
    } else {
        vec![format!("!**/{pattern}/**"), format!("!**/{pattern}")]
    }
}

/// Walk one or more roots in parallel, collecting candidate files.
/// Returns files sorted by path for deterministic output.
pub fn walk_roots(
    project_root: &Path,
    config: &ScanConfig,
    cancelled: &AtomicBool,
) -> Result<Vec<DiscoveredFile>, ScanError> {
    let roots: Vec<PathBuf> = if config.roots.is_empty() {
        vec![project_root.to_path_buf()]
    } else {
        config.roots.iter().map(|r| project_root.join(r)).collect()
    };

    for root in &roots {
        if !root.exists() {
            return Err(ScanError::RootNotFound { root: root.clone() });
        }
    }

    let include_js = config.effective_include_javascript();
    let max_file_size = config.effective_max_file_size();
    let follow_links = config.follow_symlinks.unwrap_or(false);
    let threads = config.effective_threads();

    let mut builder = ignore::WalkBuilder::new(&roots[0]);
    for root in &roots[1..] {
        builder.add(root);
    }
    builder
        .hidden(false)
        .git_ignore(true)
        .git_global(true)
        .git_exclude(true)
        .max_filesize(Some(max_file_size))
        .follow_links(follow_links);

    if threads > 0 {
        builder.threads(threads);
    }

    // Overrides use gitignore syntax: negated patterns are a blacklist.
    let mut overrides = ignore::overrides::OverrideBuilder::new(project_root);
    for pattern in DEFAULT_IGNORES {
        for p in exclude_patterns(pattern) {
            let _ = overrides.add(&p);
        }
    }
    for pattern in &config.exclude {
        for p in exclude_patterns(pattern) {
            let _ = overrides.add(&p);
        }
    }
    if let Ok(built) = overrides.build() {
        builder.overrides(built);
    }

    let walker = builder.build_parallel();
    let (tx, rx) = channel::unbounded();
    let cancelled = Arc::new(AtomicBool::new(cancelled.load(Ordering::Relaxed)));

    walker.run(|| {
        let tx = tx.clone();
        let cancelled = Arc::clone(&cancelled);
        Box::new(move |entry| {
            if cancelled.load(Ordering::Relaxed) {
                return ignore::WalkState::Quit;
            }

            let entry = match entry {
                Ok(e) => e,
                Err(_) => return ignore::WalkState::Continue,
            };

            match entry.file_type() {
                Some(ft) if ft.is_file() => {}
                _ => return ignore::WalkState::Continue,
            }

            let path = entry.path();
            let ext = path.extension().and_then(|e| e.to_str());
            let accepted = match ext {
                Some(e) => {
                    TYPESCRIPT_EXTENSIONS.contains(&e)
                        || (include_js && JAVASCRIPT_EXTENSIONS.contains(&e))
                }
                None => false,
            };
            if !accepted {
                return ignore::WalkState::Continue;
            }

            let language = match Language::from_extension(ext) {
                Some(lang) => lang,
                None => return ignore::WalkState::Continue,
            };

            let metadata = match entry.metadata() {
                Ok(m) => m,
                Err(_) => return ignore::WalkState::Continue,
            };

            let mtime = metadata
                .modified()
                .unwrap_or(std::time::SystemTime::UNIX_EPOCH);

            let _ = tx.send(DiscoveredFile {
                path: path.to_path_buf(),
                file_size: metadata.len(),
                mtime,
                language,
            });

            ignore::WalkState::Continue
        })
    });

    drop(tx);
    let mut files: Vec<DiscoveredFile> = rx.into_iter().collect();
    // Sort for deterministic output
    files.sort_by(|a, b| a.path.cmp(&b.path));
    Ok(files)
}
