//! Directed caller→callee relations with call-type classification.

use serde::{Deserialize, Serialize};

use super::identifiers::PhysicalId;

/// How a call site was classified during call-graph construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CallType {
    /// Unconditional call to a locally visible function.
    Direct,
    /// Call inside a branch guarded by a dynamic predicate.
    Conditional,
    /// Call under `await` or inside a `.then`-style chain.
    Async,
    /// Callee is declared outside the analyzed set.
    External,
    /// Computed property access or unresolved identifier.
    Dynamic,
}

impl CallType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Direct => "direct",
            Self::Conditional => "conditional",
            Self::Async => "async",
            Self::External => "external",
            Self::Dynamic => "dynamic",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "direct" => Some(Self::Direct),
            "conditional" => Some(Self::Conditional),
            "async" => Some(Self::Async),
            "external" => Some(Self::External),
            "dynamic" => Some(Self::Dynamic),
            _ => None,
        }
    }
}

/// Typed metadata bag persisted as JSON alongside each edge.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CallEdgeMetadata {
    /// Resolution strategy that produced the edge, e.g. `local-exact`.
    pub resolution: Option<String>,
    /// Module specifier for cross-file and external callees.
    pub module_specifier: Option<String>,
}

/// One observed call site.
///
/// Invariants: the caller exists in the same snapshot; external edges have
/// an absent callee id; `confidence_score` is within [0, 1].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CallEdge {
    pub id: String,
    pub caller_function_id: PhysicalId,
    pub callee_function_id: Option<PhysicalId>,
    pub callee_name: String,
    pub callee_signature: Option<String>,
    pub caller_class_name: Option<String>,
    pub callee_class_name: Option<String>,
    pub call_type: CallType,
    pub call_context: Option<String>,
    pub line_number: u32,
    pub column_number: u32,
    pub is_async: bool,
    pub is_chained: bool,
    pub confidence_score: f64,
    pub metadata: CallEdgeMetadata,
}
