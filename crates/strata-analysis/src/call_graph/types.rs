//! In-memory call graph on petgraph plus build statistics.

use std::time::Duration;

use petgraph::stable_graph::{NodeIndex, StableDiGraph};
use strata_core::types::collections::FxHashMap;
use strata_core::types::{CallType, PhysicalId};

/// Node payload: one function in the snapshot.
#[derive(Debug, Clone)]
pub struct GraphNode {
    pub physical_id: PhysicalId,
    pub name: String,
    pub file_path: String,
}

/// Edge payload: one resolved call site.
#[derive(Debug, Clone)]
pub struct GraphEdge {
    pub call_type: CallType,
    pub confidence: f64,
    pub line: u32,
}

/// The caller→callee graph for one snapshot.
pub struct CallGraph {
    pub graph: StableDiGraph<GraphNode, GraphEdge>,
    index: FxHashMap<PhysicalId, NodeIndex>,
}

impl CallGraph {
    pub fn new() -> Self {
        Self {
            graph: StableDiGraph::new(),
            index: FxHashMap::default(),
        }
    }

    pub fn add_function(&mut self, node: GraphNode) -> NodeIndex {
        let id = node.physical_id.clone();
        let idx = self.graph.add_node(node);
        self.index.insert(id, idx);
        idx
    }

    pub fn get_node(&self, id: &PhysicalId) -> Option<NodeIndex> {
        self.index.get(id).copied()
    }

    pub fn add_edge(&mut self, caller: NodeIndex, callee: NodeIndex, edge: GraphEdge) {
        self.graph.add_edge(caller, callee, edge);
    }

    pub fn function_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Physical ids of direct callees of the given function.
    pub fn callees_of(&self, id: &PhysicalId) -> Vec<PhysicalId> {
        let Some(idx) = self.get_node(id) else {
            return Vec::new();
        };
        self.graph
            .neighbors_directed(idx, petgraph::Direction::Outgoing)
            .map(|n| self.graph[n].physical_id.clone())
            .collect()
    }
}

impl Default for CallGraph {
    fn default() -> Self {
        Self::new()
    }
}

/// Statistics from one call-graph build.
#[derive(Debug, Clone, Default)]
pub struct CallGraphStats {
    pub total_functions: usize,
    pub total_call_sites: usize,
    pub total_edges: usize,
    pub resolved_edges: usize,
    pub external_edges: usize,
    pub dynamic_edges: usize,
    /// Edge counts per resolution strategy name.
    pub resolution_counts: FxHashMap<String, usize>,
    pub resolution_rate: f64,
    pub build_duration: Duration,
}
