//! Proposed historical relations between functions across snapshots.

use serde::{Deserialize, Serialize};

use super::identifiers::PhysicalId;

/// What kind of historical relation a lineage proposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LineageKind {
    Rename,
    SignatureChange,
    Inline,
    Split,
}

impl LineageKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Rename => "rename",
            Self::SignatureChange => "signature-change",
            Self::Inline => "inline",
            Self::Split => "split",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "rename" => Some(Self::Rename),
            "signature-change" => Some(Self::SignatureChange),
            "inline" => Some(Self::Inline),
            "split" => Some(Self::Split),
            _ => None,
        }
    }
}

/// Review status of a lineage. The detector emits drafts; a human
/// promotes or demotes later.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LineageStatus {
    Draft,
    Confirmed,
    Rejected,
}

impl LineageStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Confirmed => "confirmed",
            Self::Rejected => "rejected",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "draft" => Some(Self::Draft),
            "confirmed" => Some(Self::Confirmed),
            "rejected" => Some(Self::Rejected),
            _ => None,
        }
    }
}

/// A proposed relation from one or more disappeared functions to one or
/// more appeared functions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Lineage {
    pub id: String,
    pub from_ids: Vec<PhysicalId>,
    pub to_ids: Vec<PhysicalId>,
    pub kind: LineageKind,
    pub status: LineageStatus,
    pub confidence: f64,
    pub note: Option<String>,
    pub git_commit: Option<String>,
    /// Unix milliseconds.
    pub created_at: i64,
}
