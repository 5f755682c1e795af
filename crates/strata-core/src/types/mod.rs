//! Data model: function records, metrics, call edges, snapshots, diffs,
//! lineages, and the three-tier identity scheme.

pub mod call_edge;
pub mod collections;
pub mod description;
pub mod diff;
pub mod function;
pub mod identifiers;
pub mod lineage;
pub mod metrics;
pub mod snapshot;
pub mod source_file;

pub use call_edge::{CallEdge, CallEdgeMetadata, CallType};
pub use description::{DescriptionSource, FunctionDescription};
pub use diff::{ChangeDetail, ChangeImpact, DiffStatistics, ModifiedFunction, SnapshotDiff};
pub use function::{AccessModifier, FunctionKind, FunctionRecord, Parameter};
pub use identifiers::{ContentId, PhysicalId, SemanticId, SnapshotId};
pub use lineage::{Lineage, LineageKind, LineageStatus};
pub use metrics::QualityMetrics;
pub use snapshot::{AnalysisLevel, ComplexityDistribution, Snapshot, SnapshotMetadata};
pub use source_file::SourceFileRecord;
