//! Function records and parameters.

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use super::identifiers::{ContentId, PhysicalId, SemanticId};
use super::metrics::QualityMetrics;

/// Which kind of function-like construct a record represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FunctionKind {
    /// Named `function` declaration at module or namespace scope.
    Declaration,
    /// Class method, constructor, or accessor.
    Method,
    /// Arrow or function expression bound to a variable or property.
    Arrow,
    /// Function nested inside another function body.
    Local,
}

impl FunctionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Declaration => "declaration",
            Self::Method => "method",
            Self::Arrow => "arrow",
            Self::Local => "local",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "declaration" => Some(Self::Declaration),
            "method" => Some(Self::Method),
            "arrow" => Some(Self::Arrow),
            "local" => Some(Self::Local),
            _ => None,
        }
    }
}

/// TypeScript access modifier on class members.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccessModifier {
    Public,
    Private,
    Protected,
}

impl AccessModifier {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Public => "public",
            Self::Private => "private",
            Self::Protected => "protected",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "public" => Some(Self::Public),
            "private" => Some(Self::Private),
            "protected" => Some(Self::Protected),
            _ => None,
        }
    }
}

/// A declared parameter, ordered by position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Parameter {
    pub name: String,
    /// Declared type text, e.g. `Map<string, number>`.
    pub type_text: String,
    /// Simplified type, e.g. `Map`.
    pub type_simple: String,
    /// 0-based position.
    pub position: u32,
    pub is_optional: bool,
    pub is_rest: bool,
    pub default_value: Option<String>,
    pub description: Option<String>,
}

/// Canonical in-memory representation of one extracted function.
///
/// Owned by exactly one snapshot and immutable after persistence.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FunctionRecord {
    pub physical_id: PhysicalId,
    pub semantic_id: SemanticId,
    pub content_id: ContentId,

    pub name: String,
    /// Qualified name: `contextPath.join(".") + "." + name`, or the bare
    /// name when the context path is empty.
    pub display_name: String,
    pub signature: String,
    pub signature_hash: String,
    /// Declared return type text, when present.
    pub return_type: Option<String>,

    pub file_path: String,
    pub file_hash: String,
    pub start_line: u32,
    pub end_line: u32,
    pub start_column: u32,
    pub end_column: u32,

    /// Normalized implementation fingerprint (comments stripped,
    /// whitespace collapsed, SHA-256).
    pub ast_hash: String,

    /// Enclosing namespace/class/function names, outermost first.
    pub context_path: SmallVec<[String; 4]>,
    pub kind: FunctionKind,
    /// Length of the context path.
    pub nesting_level: u32,

    pub is_exported: bool,
    pub is_async: bool,
    pub is_generator: bool,
    pub is_arrow: bool,
    pub is_method: bool,
    pub is_constructor: bool,
    pub is_static: bool,
    pub is_accessor: bool,
    pub access_modifier: Option<AccessModifier>,

    pub js_doc: Option<String>,
    pub source_code: Option<String>,

    pub parameters: Vec<Parameter>,
    /// Computed once per record at persistence time. Interface method
    /// signatures are declaration-only and carry no metrics.
    pub metrics: Option<QualityMetrics>,
}

impl FunctionRecord {
    /// Modifier names in a stable order, for persistence and identity.
    pub fn modifiers(&self) -> Vec<&'static str> {
        let mut out = Vec::new();
        if self.is_exported {
            out.push("exported");
        }
        if self.is_async {
            out.push("async");
        }
        if self.is_generator {
            out.push("generator");
        }
        if self.is_static {
            out.push("static");
        }
        if self.is_constructor {
            out.push("constructor");
        }
        if self.is_accessor {
            out.push("accessor");
        }
        if let Some(access) = self.access_modifier {
            out.push(access.as_str());
        }
        out
    }

    /// Declared arity (parameter count).
    pub fn arity(&self) -> usize {
        self.parameters.len()
    }
}
