//! Metric calculator tests: complexity, structure, and bounds.

use std::path::{Path, PathBuf};

use strata_analysis::extract::{self, FileAnalysis};
use strata_analysis::scanner::{Language, SourceUnit};
use strata_core::hash::sha256_hex;
use strata_core::types::QualityMetrics;

fn analyze(source: &str) -> FileAnalysis {
    let file = "m.ts";
    let language = Language::from_extension(
        Path::new(file).extension().and_then(|e| e.to_str()),
    )
    .unwrap();
    extract::extract_file(&SourceUnit {
        path: PathBuf::from(file),
        relative_path: file.to_string(),
        language,
        content: source.to_string(),
        file_hash: sha256_hex(source.as_bytes()),
        file_size: source.len() as u64,
        mtime_ms: None,
    })
    .unwrap()
}

fn metrics_of(source: &str, name: &str) -> QualityMetrics {
    let analysis = analyze(source);
    analysis
        .functions
        .iter()
        .find(|f| f.name == name)
        .unwrap_or_else(|| panic!("function {name} not extracted"))
        .metrics
        .clone()
        .unwrap_or_else(|| panic!("function {name} has no metrics"))
}

#[test]
fn straight_line_function_has_base_complexity() {
    let m = metrics_of("function f(): number { return 1; }", "f");
    assert_eq!(m.cyclomatic_complexity, 1);
    assert_eq!(m.cognitive_complexity, 0);
    assert_eq!(m.max_nesting_level, 0);
    assert_eq!(m.return_statement_count, 1);
}

#[test]
fn decision_points_raise_cyclomatic_complexity() {
    let source = r#"
function grade(score: number): string {
    if (score > 90) { return "a"; }
    if (score > 80) { return "b"; }
    for (let i = 0; i < 3; i++) { score += 1; }
    return score > 70 && score < 90 ? "c" : "d";
}
"#;
    let m = metrics_of(source, "grade");
    // 1 base + 2 if + 1 for + 1 ternary + 1 `&&`
    assert_eq!(m.cyclomatic_complexity, 6);
    assert_eq!(m.branch_count, 3);
    assert_eq!(m.loop_count, 1);
    assert_eq!(m.return_statement_count, 4);
}

#[test]
fn switch_cases_count_but_default_does_not() {
    let source = r#"
function pick(kind: string): number {
    switch (kind) {
        case "a": return 1;
        case "b": return 2;
        default: return 0;
    }
}
"#;
    let m = metrics_of(source, "pick");
    // 1 base + 2 cases; default adds nothing.
    assert_eq!(m.cyclomatic_complexity, 3);
}

#[test]
fn cognitive_complexity_weights_nesting() {
    let flat = metrics_of(
        r#"
function flat(a: boolean, b: boolean) {
    if (a) { return 1; }
    if (b) { return 2; }
    return 0;
}
"#,
        "flat",
    );
    let nested = metrics_of(
        r#"
function nested(a: boolean, b: boolean) {
    if (a) {
        if (b) { return 2; }
    }
    return 0;
}
"#,
        "nested",
    );
    // Two flat ifs cost 1 each; a nested if costs 1 + 2 = 3.
    assert_eq!(flat.cognitive_complexity, 2);
    assert_eq!(nested.cognitive_complexity, 3);
    assert_eq!(nested.max_nesting_level, 2);
    assert_eq!(flat.max_nesting_level, 1);
}

#[test]
fn loc_excludes_blanks_and_comments() {
    let source = r#"
function body(): number {
    // a comment line
    const a = 1;

    /* block */
    const b = 2;
    return a + b;
}
"#;
    let m = metrics_of(source, "body");
    assert_eq!(m.lines_of_code, 3);
    assert!(m.lines_of_code <= m.total_lines);
    assert!(m.comment_lines >= 2);
}

#[test]
fn try_catch_and_await_are_counted() {
    let source = r#"
async function load(id: string) {
    try {
        const user = await fetchUser(id);
        const extra = await fetchExtra(id);
        return [user, extra];
    } catch (e) {
        return null;
    }
}
"#;
    let m = metrics_of(source, "load");
    assert_eq!(m.try_catch_count, 1);
    assert_eq!(m.async_await_count, 2);
    // catch adds a decision point.
    assert_eq!(m.cyclomatic_complexity, 2);
}

#[test]
fn callbacks_are_counted() {
    let source = r#"
function transform(xs: number[]): number[] {
    return xs.map((x) => x * 2).filter((x) => x > 0);
}
"#;
    let m = metrics_of(source, "transform");
    assert_eq!(m.callback_count, 2);
}

#[test]
fn recursion_adds_cognitive_increment() {
    let recursive = metrics_of(
        "function fact(n: number): number { return n <= 1 ? 1 : n * fact(n - 1); }",
        "fact",
    );
    let plain = metrics_of(
        "function half(n: number): number { return n <= 1 ? 1 : n / 2; }",
        "half",
    );
    assert_eq!(recursive.cognitive_complexity, plain.cognitive_complexity + 1);
}

#[test]
fn maintainability_index_is_bounded() {
    let tiny = metrics_of("function t() { return 1; }", "t");
    assert!(tiny.maintainability_index > 50.0);
    assert!(tiny.maintainability_index <= 100.0);

    let mut body = String::from("function big(a: number) {\n");
    for i in 0..60 {
        body.push_str(&format!("    if (a > {i}) {{ a = a + {i}; }}\n"));
    }
    body.push_str("    return a;\n}\n");
    let big = metrics_of(&body, "big");
    assert!(big.maintainability_index >= 0.0);
    assert!(big.maintainability_index < tiny.maintainability_index);
    assert!(big.halstead_volume > tiny.halstead_volume);
    assert!(big.halstead_difficulty > 0.0);
}

#[test]
fn parameter_count_matches_arity() {
    let m = metrics_of("function f(a: number, b: string, c?: boolean) { return a; }", "f");
    assert_eq!(m.parameter_count, 3);
}
