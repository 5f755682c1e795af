//! File enumeration, reading, and hashing.

pub mod cancellation;
pub mod hasher;
pub mod language_detect;
pub mod scanner;
pub mod types;
pub mod walker;

pub use cancellation::ScanCancellation;
pub use language_detect::Language;
pub use scanner::Scanner;
pub use types::{DiscoveredFile, SourceUnit};
