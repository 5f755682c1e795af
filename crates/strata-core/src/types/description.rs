//! Function descriptions, keyed by semantic id.
//!
//! Consumed by the description subsystem; the store owns persistence and
//! batch import.

use serde::{Deserialize, Serialize};

use super::identifiers::{ContentId, SemanticId};

/// Where a description came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DescriptionSource {
    Human,
    Ai,
    JsDoc,
}

impl DescriptionSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Human => "human",
            Self::Ai => "ai",
            Self::JsDoc => "jsdoc",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "human" => Some(Self::Human),
            "ai" => Some(Self::Ai),
            "jsdoc" => Some(Self::JsDoc),
            _ => None,
        }
    }
}

/// A free-text description attached to a function role.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FunctionDescription {
    pub semantic_id: SemanticId,
    pub description: String,
    pub source: DescriptionSource,
    pub created_by: Option<String>,
    pub ai_model: Option<String>,
    pub confidence_score: Option<f64>,
    /// Content id the description was last validated against.
    pub validated_for_content_id: Option<ContentId>,
    pub created_at: i64,
    pub updated_at: i64,
}
