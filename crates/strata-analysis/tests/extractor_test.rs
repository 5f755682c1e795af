//! Function extractor tests: captured constructs, context paths,
//! identity properties.

use std::path::{Path, PathBuf};

use strata_analysis::extract::{self, FileAnalysis};
use strata_analysis::identity;
use strata_analysis::scanner::{Language, SourceUnit};
use strata_core::hash::sha256_hex;
use strata_core::types::{AccessModifier, FunctionKind};

fn unit(file: &str, source: &str) -> SourceUnit {
    let language = Language::from_extension(
        Path::new(file).extension().and_then(|e| e.to_str()),
    )
    .expect("test file extension");
    SourceUnit {
        path: PathBuf::from(file),
        relative_path: file.to_string(),
        language,
        content: source.to_string(),
        file_hash: sha256_hex(source.as_bytes()),
        file_size: source.len() as u64,
        mtime_ms: None,
    }
}

fn analyze(file: &str, source: &str) -> FileAnalysis {
    extract::extract_file(&unit(file, source)).expect("extraction should succeed")
}

#[test]
fn captures_named_function_declarations() {
    let analysis = analyze(
        "a.ts",
        "export async function fetchUser(id: string): Promise<User> { return load(id); }",
    );
    assert_eq!(analysis.functions.len(), 1);
    let f = &analysis.functions[0];
    assert_eq!(f.name, "fetchUser");
    assert_eq!(f.display_name, "fetchUser");
    assert_eq!(f.kind, FunctionKind::Declaration);
    assert!(f.is_exported);
    assert!(f.is_async);
    assert!(!f.is_arrow);
    assert_eq!(f.parameters.len(), 1);
    assert_eq!(f.parameters[0].name, "id");
    assert_eq!(f.parameters[0].type_text, "string");
    assert_eq!(f.return_type.as_deref(), Some("Promise<User>"));
    assert!(f.signature.contains("fetchUser"));
}

#[test]
fn captures_class_members_with_flags() {
    let source = r#"
export class UserService {
    constructor(private repo: Repo) {}

    static create(): UserService { return new UserService(null); }

    private async findUser(id: string): Promise<User> { return this.repo.get(id); }

    get count(): number { return 0; }
}
"#;
    let analysis = analyze("service.ts", source);
    let names: Vec<&str> = analysis.functions.iter().map(|f| f.name.as_str()).collect();
    assert_eq!(names, vec!["constructor", "create", "findUser", "count"]);

    let ctor = &analysis.functions[0];
    assert!(ctor.is_constructor);
    assert!(ctor.is_method);
    assert_eq!(ctor.class_name.as_deref(), Some("UserService"));
    assert_eq!(ctor.display_name, "UserService.constructor");
    assert_eq!(ctor.context_path.as_slice(), ["UserService"]);
    assert_eq!(ctor.nesting_level, 1);
    // Methods of an exported class are reachable from outside.
    assert!(ctor.is_exported);

    let create = &analysis.functions[1];
    assert!(create.is_static);

    let find = &analysis.functions[2];
    assert!(find.is_async);
    assert_eq!(find.access_modifier, Some(AccessModifier::Private));
}

#[test]
fn interface_method_signatures_are_declaration_only() {
    let source = r#"
interface Repository {
    get(id: string): Promise<User>;
    save(user: User): void;
}
"#;
    let analysis = analyze("repo.ts", source);
    assert_eq!(analysis.functions.len(), 2);
    for f in &analysis.functions {
        assert!(f.is_declaration_only);
        assert!(f.metrics.is_none(), "interface signatures carry no metrics");
        assert_eq!(f.kind, FunctionKind::Method);
        assert_eq!(f.context_path.as_slice(), ["Repository"]);
    }
}

#[test]
fn captures_variable_bound_arrows() {
    let analysis = analyze(
        "arrows.ts",
        r#"const greet = (name: string): string => `hi ${name}`;"#,
    );
    assert_eq!(analysis.functions.len(), 1);
    let f = &analysis.functions[0];
    assert_eq!(f.name, "greet");
    assert_eq!(f.kind, FunctionKind::Arrow);
    assert!(f.is_arrow);
    assert_eq!(f.semantic_tag, "greet");
}

#[test]
fn captures_nested_locals_with_context() {
    let source = r#"
function outer() {
    function inner() { return 1; }
    return inner();
}
"#;
    let analysis = analyze("nested.ts", source);
    assert_eq!(analysis.functions.len(), 2);
    let inner = analysis
        .functions
        .iter()
        .find(|f| f.name == "inner")
        .unwrap();
    assert_eq!(inner.kind, FunctionKind::Local);
    assert_eq!(inner.context_path.as_slice(), ["outer"]);
    assert_eq!(inner.display_name, "outer.inner");
    assert_eq!(inner.nesting_level, 1);
}

#[test]
fn namespace_members_get_context_path() {
    let source = r#"
namespace Validation {
    export function isEmail(value: string): boolean { return value.includes("@"); }
}
"#;
    let analysis = analyze("ns.ts", source);
    let f = analysis
        .functions
        .iter()
        .find(|f| f.name == "isEmail")
        .unwrap();
    assert_eq!(f.context_path.as_slice(), ["Validation"]);
    assert_eq!(f.display_name, "Validation.isEmail");
}

#[test]
fn default_export_anonymous_is_named_default() {
    let analysis = analyze("handler.ts", "export default async () => { return 1; };");
    assert_eq!(analysis.functions.len(), 1);
    let f = &analysis.functions[0];
    assert_eq!(f.name, "default");
    assert!(f.is_exported);
    assert!(f.is_async);
}

#[test]
fn anonymous_callbacks_get_positional_tags() {
    let source = r#"
const xs = [1, 2, 3];
xs.map((x) => x + 1);
xs.filter((x) => x > 1);
"#;
    let analysis = analyze("cb.ts", source);
    let anons: Vec<_> = analysis
        .functions
        .iter()
        .filter(|f| f.name == "anonymous")
        .collect();
    assert_eq!(anons.len(), 2);
    assert_ne!(anons[0].semantic_tag, anons[1].semantic_tag);
    assert!(anons[0].semantic_tag.starts_with("anon@"));
}

#[test]
fn jsdoc_is_attached_through_wrappers() {
    let source = r#"
/** Formats a user for display. */
export function format(user: User): string { return user.name; }

/** Bound handler. */
const onClick = () => {};
"#;
    let analysis = analyze("doc.ts", source);
    let format = analysis.functions.iter().find(|f| f.name == "format").unwrap();
    assert_eq!(
        format.js_doc.as_deref(),
        Some("/** Formats a user for display. */")
    );
    let on_click = analysis.functions.iter().find(|f| f.name == "onClick").unwrap();
    assert_eq!(on_click.js_doc.as_deref(), Some("/** Bound handler. */"));
}

#[test]
fn parameter_shapes_are_extracted() {
    let source =
        "function f(a: number, b?: string, c: boolean = true, ...rest: number[]) { return a; }";
    let analysis = analyze("params.ts", source);
    let params = &analysis.functions[0].parameters;
    assert_eq!(params.len(), 4);
    assert_eq!(params[0].name, "a");
    assert!(!params[0].is_optional);
    assert!(params[1].is_optional);
    assert_eq!(params[2].default_value.as_deref(), Some("true"));
    assert!(params[3].is_rest);
    assert_eq!(params[3].name, "rest");
    for (position, p) in params.iter().enumerate() {
        assert_eq!(p.position as usize, position);
    }
}

#[test]
fn imports_are_collected() {
    let source = r#"
import { parse, validate as check } from './parser';
import * as utils from './utils';
import Runner from './runner';
"#;
    let analysis = analyze("imports.ts", source);
    assert_eq!(analysis.imports.len(), 4);

    let parse = analysis.imports.iter().find(|i| i.local_name == "parse").unwrap();
    assert_eq!(parse.imported_name, "parse");
    assert_eq!(parse.specifier, "./parser");

    let check = analysis.imports.iter().find(|i| i.local_name == "check").unwrap();
    assert_eq!(check.imported_name, "validate");

    let utils = analysis.imports.iter().find(|i| i.local_name == "utils").unwrap();
    assert!(utils.is_namespace);

    let runner = analysis.imports.iter().find(|i| i.local_name == "Runner").unwrap();
    assert!(runner.is_default);
}

// ── identity properties ─────────────────────────────────────────────────

/// Twenty near-identical arrows: every identity tier behaves.
#[test]
fn twenty_lookalikes_have_distinct_roles() {
    let mut source = String::new();
    for i in 0..20 {
        source.push_str(&format!(
            "export const func{i} = (param: string): string => param + \"i\";\n"
        ));
    }
    let analysis = analyze("lookalikes.ts", &source);
    assert_eq!(analysis.functions.len(), 20);

    let file = identity::mint_file(analysis);
    let mut physical: Vec<_> = file.records.iter().map(|r| r.physical_id.clone()).collect();
    let mut semantic: Vec<_> = file.records.iter().map(|r| r.semantic_id.clone()).collect();
    physical.sort();
    physical.dedup();
    semantic.sort();
    semantic.dedup();
    assert_eq!(physical.len(), 20, "physical ids must be unique");
    assert_eq!(semantic.len(), 20, "semantic ids must be distinct per name");

    // Identical implementations share one content id.
    let mut content: Vec<_> = file.records.iter().map(|r| r.content_id.clone()).collect();
    content.sort();
    content.dedup();
    assert_eq!(content.len(), 1, "identical bodies share a content id");
}

/// Body changes keep the semantic id.
#[test]
fn semantic_id_stable_under_body_change() {
    let before = analyze("v.ts", "function validate(x: number): boolean { return x > 0; }");
    let after = analyze("v.ts", "function validate(x: number): boolean { return x >= 1; }");
    let before_records = identity::mint_records(&before);
    let after_records = identity::mint_records(&after);
    assert_eq!(before_records[0].semantic_id, after_records[0].semantic_id);
    assert_ne!(before_records[0].content_id, after_records[0].content_id);
}

/// Verbatim moves keep the content id.
#[test]
fn content_id_stable_under_move() {
    let source = "export function sum(a: number, b: number): number { return a + b; }";
    let here = analyze("src/math.ts", source);
    let there = analyze("src/util/arith.ts", source);
    let here_records = identity::mint_records(&here);
    let there_records = identity::mint_records(&there);
    assert_eq!(here_records[0].content_id, there_records[0].content_id);
    assert_ne!(here_records[0].semantic_id, there_records[0].semantic_id);
}

/// A rename keeps the content id but changes the semantic id.
#[test]
fn rename_preserves_content_identity() {
    let a = analyze("r.ts", "function validate(x: number): boolean { return x > 0; }");
    let b = analyze("r.ts", "function isPositive(x: number): boolean { return x > 0; }");
    let a_records = identity::mint_records(&a);
    let b_records = identity::mint_records(&b);
    assert_eq!(a_records[0].content_id, b_records[0].content_id);
    assert_ne!(a_records[0].semantic_id, b_records[0].semantic_id);
}

#[test]
fn parse_failure_is_an_error_not_a_panic() {
    let result = extract::extract_file(&unit("broken.ts", "function ((((("));
    // tree-sitter is resilient; either a parse error or a best-effort
    // empty extraction is acceptable, a panic is not.
    if let Ok(analysis) = result {
        assert!(analysis.functions.len() <= 1);
    }
}

#[test]
fn export_counts_are_tracked() {
    let source = r#"
export function a() {}
export const b = () => {};
function internal() {}
"#;
    let analysis = analyze("exports.ts", source);
    assert_eq!(analysis.export_count, 2);
    let internal = analysis.functions.iter().find(|f| f.name == "internal").unwrap();
    assert!(!internal.is_exported);
}
