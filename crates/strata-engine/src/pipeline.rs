//! The full analysis cycle: scan → extract → mint → metrics →
//! basic snapshot write → call graph → edge write.
//!
//! File analysis runs in rayon batches (default 50 files); the
//! cancellation token is checked between batches. Pure stages never block;
//! the only suspension points are file reads and storage writes.

use std::path::Path;
use std::time::Instant;

use rayon::prelude::*;
use strata_analysis::call_graph::{CallGraphBuilder, CallGraphStats};
use strata_analysis::extract::FileAnalyzer;
use strata_analysis::identity::{self, AnalyzedFile};
use strata_analysis::scanner::{ScanCancellation, Scanner, SourceUnit};
use strata_core::config::StrataConfig;
use strata_core::errors::EngineError;
use strata_core::events::{
    AnalyzeProgressEvent, AnalyzeStartedEvent, FileSkippedEvent, SnapshotSavedEvent,
};
use strata_core::types::{FunctionRecord, SnapshotId, SourceFileRecord};
use strata_core::StrataEventHandler;
use strata_storage::{SnapshotOptions, SnapshotStore};
use uuid::Uuid;

use crate::git::GitContext;

/// Caller-facing knobs for one pipeline run.
#[derive(Debug, Clone, Default)]
pub struct PipelineOptions {
    pub label: Option<String>,
    pub comment: Option<String>,
    pub scope: Option<String>,
    /// Skip the call-graph phase, leaving the snapshot at level `basic`.
    pub skip_call_graph: bool,
}

/// Outcome of one pipeline run.
#[derive(Debug)]
pub struct PipelineResult {
    pub snapshot_id: SnapshotId,
    pub files_analyzed: usize,
    pub functions_extracted: usize,
    pub call_edges: usize,
    pub parse_failures: usize,
    pub call_graph_stats: Option<CallGraphStats>,
    pub duration_ms: u64,
}

/// Orchestrates scanner, extractor, identity minter, storage, and the
/// call-graph builder. Owns its analysis cache and cancellation token;
/// the export table cache lives inside each call-graph build.
pub struct AnalysisPipeline {
    config: StrataConfig,
    scanner: Scanner,
    analyzer: FileAnalyzer,
}

impl AnalysisPipeline {
    pub fn new(config: StrataConfig) -> Self {
        let scanner = Scanner::new(config.scan.clone());
        Self {
            config,
            scanner,
            analyzer: FileAnalyzer::new(),
        }
    }

    /// Cancellation handle, checked between files and batches.
    pub fn cancellation(&self) -> &ScanCancellation {
        self.scanner.cancellation()
    }

    /// Run a full analysis cycle over `project_root`, persisting into
    /// `store`. Returns the new snapshot id.
    pub fn run(
        &self,
        project_root: &Path,
        store: &SnapshotStore,
        options: &PipelineOptions,
        events: &dyn StrataEventHandler,
    ) -> Result<PipelineResult, EngineError> {
        let started = Instant::now();
        self.cancellation().reset();

        // Phase 1: discovery + read + hash.
        let (units, _scan_stats) = self.scanner.scan(project_root, events)?;
        if self.cancellation().is_cancelled() {
            return Err(EngineError::Cancelled);
        }

        // Git metadata is best-effort: absent outside a repository.
        let git_info = GitContext::discover(project_root)
            .and_then(|ctx| ctx.head_info())
            .unwrap_or_default();

        // Phase 2: per-file extraction in bounded batches.
        events.on_analyze_started(&AnalyzeStartedEvent {
            total_files: units.len(),
        });

        let batch_size = self.config.scan.effective_batch_size();
        let mut analyzed: Vec<AnalyzedFile> = Vec::with_capacity(units.len());
        let mut parse_failures = 0usize;
        let mut processed = 0usize;

        for batch in units.chunks(batch_size) {
            if self.cancellation().is_cancelled() {
                return Err(EngineError::Cancelled);
            }

            let results: Vec<_> = batch
                .par_iter()
                .map(|unit| (unit, self.analyzer.analyze(unit)))
                .collect();

            for (unit, result) in results {
                match result {
                    Ok(analysis) => analyzed.push(identity::mint_file(analysis)),
                    Err(e) => {
                        // Per-file failure: skip, warn, continue.
                        parse_failures += 1;
                        tracing::warn!(
                            path = %unit.path.display(),
                            error = %e,
                            "parse error, file skipped"
                        );
                        events.on_file_skipped(&FileSkippedEvent {
                            path: unit.path.clone(),
                            reason: e.to_string(),
                        });
                    }
                }
            }

            processed += batch.len();
            events.on_analyze_progress(&AnalyzeProgressEvent {
                processed,
                total: units.len(),
                functions_so_far: analyzed.iter().map(|f| f.records.len()).sum(),
            });
        }

        // Phase 3: basic snapshot write (one transaction).
        let functions: Vec<FunctionRecord> = analyzed
            .iter()
            .flat_map(|f| f.records.iter().cloned())
            .collect();
        let source_files = source_file_records(&units, &analyzed);

        let snapshot_options = SnapshotOptions {
            label: options.label.clone(),
            comment: options.comment.clone(),
            config_hash: self.config.config_hash(),
            scope: options.scope.clone(),
            project_root: project_root.to_string_lossy().into_owned(),
            git_commit: git_info.commit,
            git_branch: git_info.branch,
            git_tag: git_info.tag,
        };
        let snapshot_id = store.save_snapshot(&functions, &source_files, snapshot_options)?;
        events.on_snapshot_saved(&SnapshotSavedEvent {
            snapshot_id: snapshot_id.to_string(),
            analysis_level: "basic".to_string(),
        });

        // Phase 4: call graph + edge write.
        let mut call_graph_stats = None;
        let mut edge_count = 0usize;
        if !options.skip_call_graph {
            if self.cancellation().is_cancelled() {
                return Err(EngineError::Cancelled);
            }
            let builder = CallGraphBuilder::new();
            let (_graph, edges, stats) = builder.build(&analyzed);
            edge_count = edges.len();
            store.store_call_edges(&snapshot_id, &edges)?;
            events.on_snapshot_saved(&SnapshotSavedEvent {
                snapshot_id: snapshot_id.to_string(),
                analysis_level: "call-graph".to_string(),
            });
            call_graph_stats = Some(stats);
        }

        let result = PipelineResult {
            snapshot_id,
            files_analyzed: analyzed.len(),
            functions_extracted: functions.len(),
            call_edges: edge_count,
            parse_failures,
            call_graph_stats,
            duration_ms: started.elapsed().as_millis() as u64,
        };

        tracing::info!(
            snapshot = %result.snapshot_id,
            files = result.files_analyzed,
            functions = result.functions_extracted,
            edges = result.call_edges,
            duration_ms = result.duration_ms,
            "analysis cycle complete"
        );

        Ok(result)
    }
}

/// Build source-file blobs from scanned units and their analyses.
fn source_file_records(units: &[SourceUnit], analyzed: &[AnalyzedFile]) -> Vec<SourceFileRecord> {
    analyzed
        .iter()
        .filter_map(|file| {
            let unit = units
                .iter()
                .find(|u| u.relative_path == file.analysis.relative_path)?;
            Some(SourceFileRecord {
                id: Uuid::new_v4().to_string(),
                file_path: unit.relative_path.clone(),
                content: unit.content.clone(),
                file_hash: unit.file_hash.clone(),
                encoding: "utf-8".to_string(),
                file_size_bytes: unit.file_size,
                line_count: unit.line_count(),
                language: unit.language.name().to_string(),
                function_count: file.records.len() as u32,
                export_count: file.analysis.export_count,
                import_count: file.analysis.imports.len() as u32,
                file_modified_time: unit.mtime_ms,
            })
        })
        .collect()
}
