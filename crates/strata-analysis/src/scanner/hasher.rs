//! Content hashing.
//!
//! SHA-256 is the durable hash carried into snapshots and identities.
//! xxh3 is used only for in-memory parse-cache keys.

use xxhash_rust::xxh3::xxh3_64;

pub use strata_core::hash::sha256_hex;

/// Fast non-cryptographic hash for cache keys.
pub fn cache_key(content: &[u8]) -> u64 {
    xxh3_64(content)
}
