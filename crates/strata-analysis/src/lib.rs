//! # strata-analysis
//!
//! Analysis engine for the Strata function-quality tracker.
//! Contains the scanner, TypeScript parsers, function extractor,
//! identity minter, metric calculator, and call-graph builder.

pub mod call_graph;
pub mod extract;
pub mod identity;
pub mod metrics;
pub mod parsers;
pub mod scanner;
