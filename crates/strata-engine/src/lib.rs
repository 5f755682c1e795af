//! # strata-engine
//!
//! Orchestration for the Strata function-quality tracker: the analysis
//! pipeline, the snapshot differ, the lineage detector, the snapshot
//! resolver, and Git integration.

pub mod diff;
pub mod git;
pub mod lineage;
pub mod pipeline;
pub mod resolver;

pub use diff::SnapshotDiffer;
pub use git::{GitContext, GitInfo};
pub use lineage::{LineageCandidate, LineageDetector};
pub use pipeline::{AnalysisPipeline, PipelineOptions, PipelineResult};
pub use resolver::SnapshotResolver;
