//! Identity minting: physical, semantic, and content ids.
//!
//! Physical ids are fresh UUIDs per analysis. Semantic and content ids are
//! SHA-256 digests over canonical tuples, so they are reproducible across
//! snapshots and machines.

use strata_core::hash::sha256_hex;
use strata_core::types::{ContentId, FunctionRecord, Parameter, PhysicalId, SemanticId};

use crate::extract::types::{ExtractedFunction, FileAnalysis};

/// Field separator for canonical tuples. A unit separator cannot appear in
/// paths, names, or type text, so joined tuples cannot collide.
const SEP: char = '\u{1f}';

/// A file's extraction output paired with its minted records.
///
/// `records[i]` corresponds to `analysis.functions[i]`.
#[derive(Debug, Clone)]
pub struct AnalyzedFile {
    pub analysis: FileAnalysis,
    pub records: Vec<FunctionRecord>,
}

/// Mint identities for every extracted function and pair them with the
/// extraction output.
pub fn mint_file(analysis: FileAnalysis) -> AnalyzedFile {
    let records = mint_records(&analysis);
    AnalyzedFile { analysis, records }
}

/// Mint all three identities for every extracted function in a file.
pub fn mint_records(analysis: &FileAnalysis) -> Vec<FunctionRecord> {
    analysis
        .functions
        .iter()
        .map(|f| mint_record(&analysis.relative_path, &analysis.file_hash, f))
        .collect()
}

/// Build one full record with fresh physical identity.
pub fn mint_record(
    relative_path: &str,
    file_hash: &str,
    func: &ExtractedFunction,
) -> FunctionRecord {
    FunctionRecord {
        physical_id: PhysicalId::mint(),
        semantic_id: semantic_id(relative_path, func),
        content_id: content_id(func),
        name: func.name.clone(),
        display_name: func.display_name.clone(),
        signature: func.signature.clone(),
        signature_hash: func.signature_hash.clone(),
        return_type: func.return_type.clone(),
        file_path: relative_path.to_string(),
        file_hash: file_hash.to_string(),
        start_line: func.start_line,
        end_line: func.end_line,
        start_column: func.start_column,
        end_column: func.end_column,
        ast_hash: func.ast_hash.clone(),
        context_path: func.context_path.clone(),
        kind: func.kind,
        nesting_level: func.nesting_level,
        is_exported: func.is_exported,
        is_async: func.is_async,
        is_generator: func.is_generator,
        is_arrow: func.is_arrow,
        is_method: func.is_method,
        is_constructor: func.is_constructor,
        is_static: func.is_static,
        is_accessor: func.is_accessor,
        access_modifier: func.access_modifier,
        js_doc: func.js_doc.clone(),
        source_code: Some(func.source_code.clone()),
        parameters: func.parameters.clone(),
        metrics: func.metrics.clone(),
    }
}

/// SHA-256 over the canonical role tuple:
/// `(normalized path, context path, kind, name-or-tag, modifiers, arity,
/// signature shape)`.
///
/// Two functions occupying the same role in two snapshots share this id
/// even when their bodies differ.
pub fn semantic_id(relative_path: &str, func: &ExtractedFunction) -> SemanticId {
    let mut modifiers: Vec<&str> = Vec::new();
    if func.is_exported {
        modifiers.push("exported");
    }
    if func.is_async {
        modifiers.push("async");
    }
    if func.is_generator {
        modifiers.push("generator");
    }
    if func.is_static {
        modifiers.push("static");
    }
    if func.is_constructor {
        modifiers.push("constructor");
    }
    if func.is_accessor {
        modifiers.push("accessor");
    }
    if let Some(access) = func.access_modifier {
        modifiers.push(access.as_str());
    }
    modifiers.sort_unstable();

    let tuple = [
        normalize_path(relative_path),
        func.context_path.join("."),
        func.kind.as_str().to_string(),
        func.semantic_tag.clone(),
        modifiers.join(","),
        func.parameters.len().to_string(),
        signature_shape(&func.parameters, func.return_type.as_deref()),
    ]
    .join(&SEP.to_string());

    SemanticId::new(sha256_hex(tuple.as_bytes()))
}

/// SHA-256 over the AST hash plus parameter shapes. Two functions with
/// identical normalized implementations and parameter shapes share this
/// id regardless of location.
pub fn content_id(func: &ExtractedFunction) -> ContentId {
    let tuple = format!(
        "{}{}{}",
        func.ast_hash,
        SEP,
        signature_shape(&func.parameters, func.return_type.as_deref()),
    );
    ContentId::new(sha256_hex(tuple.as_bytes()))
}

/// Canonical shape of a parameter list and return type: simplified types
/// with optional/rest markers, positions implied by order.
fn signature_shape(parameters: &[Parameter], return_type: Option<&str>) -> String {
    let params: Vec<String> = parameters
        .iter()
        .map(|p| {
            let mut shape = p.type_simple.clone();
            if p.is_optional {
                shape.push('?');
            }
            if p.is_rest {
                shape.insert_str(0, "...");
            }
            shape
        })
        .collect();
    format!(
        "({})=>{}",
        params.join(","),
        return_type.map(crate::extract::simplify_type).unwrap_or_else(|| "any".to_string())
    )
}

/// Forward slashes, no leading `./`.
fn normalize_path(path: &str) -> String {
    path.replace('\\', "/")
        .trim_start_matches("./")
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use smallvec::SmallVec;
    use strata_core::types::FunctionKind;

    fn sample(name: &str, ast: &str) -> ExtractedFunction {
        ExtractedFunction {
            name: name.to_string(),
            display_name: name.to_string(),
            signature: format!("function {name}()"),
            signature_hash: "sig".to_string(),
            return_type: None,
            start_line: 1,
            end_line: 3,
            start_column: 0,
            end_column: 1,
            byte_start: 0,
            byte_end: 10,
            ast_hash: ast.to_string(),
            context_path: SmallVec::new(),
            kind: FunctionKind::Declaration,
            nesting_level: 0,
            is_exported: false,
            is_async: false,
            is_generator: false,
            is_arrow: false,
            is_method: false,
            is_constructor: false,
            is_static: false,
            is_accessor: false,
            access_modifier: None,
            class_name: None,
            semantic_tag: name.to_string(),
            is_declaration_only: false,
            js_doc: None,
            source_code: String::new(),
            parameters: Vec::new(),
            metrics: None,
        }
    }

    #[test]
    fn semantic_id_ignores_body() {
        let a = sample("validate", "hash-a");
        let b = sample("validate", "hash-b");
        assert_eq!(semantic_id("src/a.ts", &a), semantic_id("src/a.ts", &b));
    }

    #[test]
    fn semantic_id_depends_on_name_and_path() {
        let a = sample("validate", "h");
        let b = sample("isPositive", "h");
        assert_ne!(semantic_id("src/a.ts", &a), semantic_id("src/a.ts", &b));
        assert_ne!(semantic_id("src/a.ts", &a), semantic_id("src/b.ts", &a));
    }

    #[test]
    fn content_id_survives_moves() {
        let f = sample("validate", "same-hash");
        let here = content_id(&f);
        // Same implementation at another location: content id is equal,
        // semantic id is not.
        assert_eq!(here, content_id(&f));
        assert_ne!(
            semantic_id("src/a.ts", &f),
            semantic_id("src/moved.ts", &f)
        );
    }

    #[test]
    fn physical_ids_are_fresh_per_mint() {
        let f = sample("f", "h");
        let r1 = mint_record("a.ts", "fh", &f);
        let r2 = mint_record("a.ts", "fh", &f);
        assert_ne!(r1.physical_id, r2.physical_id);
        assert_eq!(r1.semantic_id, r2.semantic_id);
        assert_eq!(r1.content_id, r2.content_id);
    }
}
