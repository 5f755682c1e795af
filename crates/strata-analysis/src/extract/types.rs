//! Extraction output types, prior to identity minting.

use smallvec::SmallVec;
use strata_core::types::{AccessModifier, FunctionKind, Parameter, QualityMetrics};

use crate::scanner::language_detect::Language;

/// One function-like construct pulled out of a file.
///
/// Carries everything deterministic about the function; physical ids are
/// minted later so cached extractions still get fresh ids per analysis.
#[derive(Debug, Clone)]
pub struct ExtractedFunction {
    pub name: String,
    pub display_name: String,
    pub signature: String,
    pub signature_hash: String,
    pub return_type: Option<String>,

    pub start_line: u32,
    pub end_line: u32,
    pub start_column: u32,
    pub end_column: u32,
    /// Byte range of the whole function node, for call-site assignment.
    pub byte_start: usize,
    pub byte_end: usize,

    pub ast_hash: String,
    pub context_path: SmallVec<[String; 4]>,
    pub kind: FunctionKind,
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

    /// Enclosing class name, when the function is a class member.
    pub class_name: Option<String>,
    /// Name or positional tag feeding the semantic id
    /// (`anon@<line>:<column>` for truly anonymous callbacks).
    pub semantic_tag: String,
    /// True for interface method signatures: declaration-only, no metrics.
    pub is_declaration_only: bool,

    pub js_doc: Option<String>,
    pub source_code: String,
    pub parameters: Vec<Parameter>,
    pub metrics: Option<QualityMetrics>,
}

/// One `import` binding visible in a file.
#[derive(Debug, Clone)]
pub struct ImportRecord {
    /// Name the binding is visible under locally.
    pub local_name: String,
    /// Name as exported by the source module (`default` for default imports).
    pub imported_name: String,
    /// Module specifier text, quotes stripped.
    pub specifier: String,
    pub is_default: bool,
    pub is_namespace: bool,
    pub line: u32,
}

/// One call site observed in a file.
#[derive(Debug, Clone)]
pub struct CallSiteRecord {
    /// Full callee expression text, e.g. `svc.users.find`.
    pub callee_text: String,
    /// Rightmost identifier of the callee, e.g. `find`.
    pub callee_name: String,
    /// Leftmost receiver identifier for member calls.
    pub receiver: Option<String>,
    pub is_method_call: bool,
    /// Computed property access, e.g. `handlers[name]()`.
    pub is_computed: bool,
    pub is_await: bool,
    /// Inside a `.then(...)` style continuation.
    pub in_then_chain: bool,
    /// Inside an `if`/ternary/loop guard whose predicate is dynamic.
    pub in_conditional: bool,
    /// Callee is itself the result of a call, e.g. `factory().run()`.
    pub is_chained: bool,
    pub line: u32,
    pub column: u32,
    pub byte_offset: usize,
}

/// A variable whose declared or constructed type names a class,
/// e.g. `const repo = new UserRepo()` or `let svc: UserService`.
#[derive(Debug, Clone)]
pub struct VarTypeBinding {
    pub name: String,
    /// Printed type text the class name is extracted from.
    pub type_text: String,
    pub byte_offset: usize,
}

/// Everything extracted from a single file.
#[derive(Debug, Clone)]
pub struct FileAnalysis {
    pub relative_path: String,
    pub language: Language,
    pub file_hash: String,
    pub line_count: u32,
    pub functions: Vec<ExtractedFunction>,
    pub imports: Vec<ImportRecord>,
    pub export_count: u32,
    pub call_sites: Vec<CallSiteRecord>,
    pub var_types: Vec<VarTypeBinding>,
}

impl FileAnalysis {
    /// Index of the innermost function containing the given byte offset.
    pub fn enclosing_function(&self, byte_offset: usize) -> Option<usize> {
        let mut best: Option<usize> = None;
        for (idx, f) in self.functions.iter().enumerate() {
            if byte_offset >= f.byte_start && byte_offset < f.byte_end {
                best = match best {
                    Some(prev) => {
                        let prev_span =
                            self.functions[prev].byte_end - self.functions[prev].byte_start;
                        let span = f.byte_end - f.byte_start;
                        if span < prev_span {
                            Some(idx)
                        } else {
                            Some(prev)
                        }
                    }
                    None => Some(idx),
                };
            }
        }
        best
    }
}
