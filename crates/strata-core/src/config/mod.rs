//! Engine configuration: scan roots, thresholds, lineage tuning.
//!
//! All fields are defaulted so an empty TOML file is a valid config.
//! The config hash stored on each snapshot is SHA-256 over the canonical
//! JSON serialization, so reordered-but-equal configs hash identically.

pub mod scan_config;
pub mod thresholds;

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::errors::ConfigError;
use crate::hash::sha256_hex;

pub use scan_config::ScanConfig;
pub use thresholds::{LineageConfig, MetricsThresholds};

/// Top-level configuration for a Strata pipeline invocation.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct StrataConfig {
    pub scan: ScanConfig,
    pub thresholds: MetricsThresholds,
    pub lineage: LineageConfig,
}

impl StrataConfig {
    /// Load configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|_| ConfigError::FileNotFound {
            path: path.to_path_buf(),
        })?;
        let config: Self = toml::from_str(&text).map_err(|e| ConfigError::ParseFailed {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Validate cross-field constraints.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.scan.effective_batch_size() == 0 {
            return Err(ConfigError::InvalidValue {
                field: "scan.batch_size".to_string(),
                message: "batch size must be at least 1".to_string(),
            });
        }
        if !(0.0..=1.0).contains(&self.lineage.min_similarity) {
            return Err(ConfigError::InvalidValue {
                field: "lineage.min_similarity".to_string(),
                message: "must be within [0, 1]".to_string(),
            });
        }
        Ok(())
    }

    /// Stable hash of this configuration, hex-encoded SHA-256.
    ///
    /// Serialized through serde_json so field order is canonical
    /// (struct declaration order) regardless of the source TOML.
    pub fn config_hash(&self) -> String {
        let canonical = serde_json::to_string(self).unwrap_or_default();
        sha256_hex(canonical.as_bytes())
    }
}
