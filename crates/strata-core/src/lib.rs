//! # strata-core
//!
//! Foundation crate for the Strata function-quality engine.
//! Defines all types, errors, config, and events.
//! Every other crate in the workspace depends on this.

pub mod config;
pub mod errors;
pub mod events;
pub mod hash;
pub mod tracing;
pub mod types;

// Re-export the most commonly used types at the crate root.
pub use config::StrataConfig;
pub use errors::error_code::ErrorCode;
pub use events::handler::{NullEventHandler, StrataEventHandler};
pub use types::collections::{FxHashMap, FxHashSet};
pub use types::identifiers::{ContentId, PhysicalId, SemanticId, SnapshotId};
