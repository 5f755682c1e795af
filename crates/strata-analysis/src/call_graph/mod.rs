//! Call-graph construction: call-site classification, local and
//! cross-file resolution, and the export-table cache.

pub mod builder;
pub mod export_table;
pub mod resolution;
pub mod types;

pub use builder::CallGraphBuilder;
pub use export_table::{ExportTableCache, ModuleTarget};
pub use types::{CallGraph, CallGraphStats};
