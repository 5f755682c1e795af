//! CallGraphBuilder — resolves every call site into edges over an
//! export-table cache shared for the whole build.

use std::time::Instant;

use strata_core::types::collections::FxHashMap;
use strata_core::types::{CallEdge, CallEdgeMetadata, CallType, PhysicalId};
use uuid::Uuid;

use super::export_table::ExportTableCache;
use super::resolution::{self, FileContext};
use super::types::{CallGraph, CallGraphStats, GraphEdge, GraphNode};
use crate::identity::AnalyzedFile;

/// Builds the call graph and flat edge rows for one snapshot.
pub struct CallGraphBuilder;

impl CallGraphBuilder {
    pub fn new() -> Self {
        Self
    }

    /// Phase 1 adds every record as a node; phase 2 walks call sites and
    /// resolves them. The export table cache lives exactly as long as one
    /// build.
    pub fn build(&self, files: &[AnalyzedFile]) -> (CallGraph, Vec<CallEdge>, CallGraphStats) {
        let start = Instant::now();
        let mut graph = CallGraph::new();

        for file in files {
            for record in &file.records {
                graph.add_function(GraphNode {
                    physical_id: record.physical_id.clone(),
                    name: record.name.clone(),
                    file_path: record.file_path.clone(),
                });
            }
        }

        // Global name index for best-effort matching.
        let mut global_by_name: FxHashMap<&str, Vec<PhysicalId>> = FxHashMap::default();
        for file in files {
            for record in &file.records {
                global_by_name
                    .entry(record.name.as_str())
                    .or_default()
                    .push(record.physical_id.clone());
            }
        }

        let signature_by_id: FxHashMap<&PhysicalId, &str> = files
            .iter()
            .flat_map(|f| &f.records)
            .map(|r| (&r.physical_id, r.signature.as_str()))
            .collect();

        let mut export_tables = ExportTableCache::new(files);
        let mut edges: Vec<CallEdge> = Vec::new();
        let mut stats = CallGraphStats::default();

        for file in files {
            let ctx = FileContext::new(file);

            for call in &file.analysis.call_sites {
                stats.total_call_sites += 1;

                // A call site belongs to the innermost enclosing function;
                // top-level module calls have no caller record.
                let Some(caller_idx) = file.analysis.enclosing_function(call.byte_offset) else {
                    continue;
                };
                let caller = &file.records[caller_idx];
                let caller_extracted = &file.analysis.functions[caller_idx];

                let resolution = resolution::resolve_call(
                    call,
                    &ctx,
                    caller_extracted.class_name.as_deref(),
                    &global_by_name,
                    &mut export_tables,
                );

                *stats
                    .resolution_counts
                    .entry(resolution.strategy.to_string())
                    .or_default() += 1;
                match resolution.call_type {
                    CallType::External => stats.external_edges += 1,
                    CallType::Dynamic => stats.dynamic_edges += 1,
                    _ => {}
                }

                if let Some(callee_id) = &resolution.callee_id {
                    stats.resolved_edges += 1;
                    if let (Some(from), Some(to)) =
                        (graph.get_node(&caller.physical_id), graph.get_node(callee_id))
                    {
                        graph.add_edge(
                            from,
                            to,
                            GraphEdge {
                                call_type: resolution.call_type,
                                confidence: resolution.confidence,
                                line: call.line,
                            },
                        );
                    }
                }

                let callee_signature = resolution
                    .callee_id
                    .as_ref()
                    .and_then(|id| signature_by_id.get(id).map(|s| s.to_string()));

                edges.push(CallEdge {
                    id: Uuid::new_v4().to_string(),
                    caller_function_id: caller.physical_id.clone(),
                    callee_function_id: resolution.callee_id,
                    callee_name: if call.callee_name.is_empty() {
                        call.callee_text.clone()
                    } else {
                        call.callee_name.clone()
                    },
                    callee_signature,
                    caller_class_name: caller_extracted.class_name.clone(),
                    callee_class_name: resolution.callee_class_name,
                    call_type: resolution.call_type,
                    call_context: call.receiver.clone(),
                    line_number: call.line,
                    column_number: call.column,
                    is_async: call.is_await || call.in_then_chain,
                    is_chained: call.is_chained,
                    confidence_score: resolution.confidence,
                    metadata: CallEdgeMetadata {
                        resolution: Some(resolution.strategy.to_string()),
                        module_specifier: resolution.module_specifier,
                    },
                });
            }
        }

        stats.total_functions = graph.function_count();
        stats.total_edges = edges.len();
        stats.resolution_rate = if stats.total_call_sites > 0 {
            stats.resolved_edges as f64 / stats.total_call_sites as f64
        } else {
            0.0
        };
        stats.build_duration = start.elapsed();

        tracing::debug!(
            functions = stats.total_functions,
            edges = stats.total_edges,
            resolution_rate = stats.resolution_rate,
            "call graph built"
        );

        (graph, edges, stats)
    }
}

impl Default for CallGraphBuilder {
    fn default() -> Self {
        Self::new()
    }
}
