//! Top-level Scanner orchestrating walker → read → hash.

use std::path::Path;
use std::time::{Instant, SystemTime, UNIX_EPOCH};

use rayon::prelude::*;
use strata_core::config::ScanConfig;
use strata_core::errors::ScanError;
use strata_core::events::{ScanCompleteEvent, ScanProgressEvent, ScanStartedEvent};
use strata_core::StrataEventHandler;

use super::cancellation::ScanCancellation;
use super::hasher::sha256_hex;
use super::types::{DiscoveredFile, ScanStats, SourceUnit};
use super::walker;

/// Enumerates, reads, and hashes candidate files.
pub struct Scanner {
    config: ScanConfig,
    cancellation: ScanCancellation,
}

impl Scanner {
    pub fn new(config: ScanConfig) -> Self {
        Self {
            config,
            cancellation: ScanCancellation::new(),
        }
    }

    /// The cancellation handle for external cancellation.
    pub fn cancellation(&self) -> &ScanCancellation {
        &self.cancellation
    }

    /// Walk the project, read each accepted file once, and hash it.
    ///
    /// Quick mode (`quick_max_files`) samples files evenly instead of
    /// truncating, so the sample spans the whole tree.
    pub fn scan(
        &self,
        project_root: &Path,
        event_handler: &dyn StrataEventHandler,
    ) -> Result<(Vec<SourceUnit>, ScanStats), ScanError> {
        event_handler.on_scan_started(&ScanStartedEvent {
            root: project_root.to_path_buf(),
        });

        let discovery_start = Instant::now();
        let mut files =
            walker::walk_roots(project_root, &self.config, self.cancellation.as_atomic())?;
        let discovery_ms = discovery_start.elapsed().as_millis() as u64;

        if let Some(cap) = self.config.quick_max_files {
            files = sample_evenly(files, cap);
        }

        let total = files.len();
        event_handler.on_scan_progress(&ScanProgressEvent {
            processed: 0,
            total,
        });

        let read_start = Instant::now();
        let mut units: Vec<SourceUnit> = files
            .par_iter()
            .filter_map(|file| {
                if self.cancellation.is_cancelled() {
                    return None;
                }
                match read_unit(project_root, file) {
                    Ok(unit) => Some(unit),
                    Err(e) => {
                        // Non-fatal — skip file, continue scanning
                        tracing::warn!(
                            path = %file.path.display(),
                            error = %e,
                            "file read error"
                        );
                        None
                    }
                }
            })
            .collect();
        let read_hash_ms = read_start.elapsed().as_millis() as u64;

        // par_iter preserves order, but sort defensively on the relative
        // path used downstream for persistence ordering.
        units.sort_by(|a, b| a.relative_path.cmp(&b.relative_path));

        let stats = ScanStats {
            total_files: units.len(),
            total_size_bytes: units.iter().map(|u| u.file_size).sum(),
            discovery_ms,
            read_hash_ms,
            files_skipped: total.saturating_sub(units.len()),
        };

        event_handler.on_scan_complete(&ScanCompleteEvent {
            files: units.len(),
            duration_ms: discovery_ms + read_hash_ms,
        });

        Ok((units, stats))
    }
}

/// Read one file and compute its stable hash.
fn read_unit(project_root: &Path, file: &DiscoveredFile) -> Result<SourceUnit, ScanError> {
    let bytes = std::fs::read(&file.path).map_err(|e| ScanError::ReadFailed {
        path: file.path.clone(),
        message: e.to_string(),
    })?;
    let content = String::from_utf8_lossy(&bytes).into_owned();
    let file_hash = sha256_hex(content.as_bytes());

    let relative_path = file
        .path
        .strip_prefix(project_root)
        .unwrap_or(&file.path)
        .to_string_lossy()
        .replace('\\', "/");

    let mtime_ms = if file.mtime == SystemTime::UNIX_EPOCH {
        None
    } else {
        file.mtime
            .duration_since(UNIX_EPOCH)
            .ok()
            .map(|d| d.as_millis() as i64)
    };

    Ok(SourceUnit {
        path: file.path.clone(),
        relative_path,
        language: file.language,
        content,
        file_hash,
        file_size: file.file_size,
        mtime_ms,
    })
}

/// Keep at most `cap` files, sampled at an even stride.
fn sample_evenly(files: Vec<DiscoveredFile>, cap: usize) -> Vec<DiscoveredFile> {
    if cap == 0 || files.len() <= cap {
        return files;
    }
    let stride = files.len() as f64 / cap as f64;
    (0..cap)
        .map(|i| files[(i as f64 * stride) as usize].clone())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scanner::language_detect::Language;
    use std::time::SystemTime;

    fn discovered(name: &str) -> DiscoveredFile {
        DiscoveredFile {
            path: name.into(),
            file_size: 0,
            mtime: SystemTime::UNIX_EPOCH,
            language: Language::TypeScript,
        }
    }

    #[test]
    fn sampling_keeps_ends_of_range() {
        let files: Vec<_> = (0..100).map(|i| discovered(&format!("f{i:03}.ts"))).collect();
        let sampled = sample_evenly(files, 10);
        assert_eq!(sampled.len(), 10);
        assert_eq!(sampled[0].path.to_str().unwrap(), "f000.ts");
        assert_eq!(sampled[9].path.to_str().unwrap(), "f090.ts");
    }

    #[test]
    fn sampling_is_noop_under_cap() {
        let files: Vec<_> = (0..5).map(|i| discovered(&format!("f{i}.ts"))).collect();
        assert_eq!(sample_evenly(files, 10).len(), 5);
    }
}
