//! Per-function quality metrics computed in a single subtree walk.

pub mod halstead;

use strata_core::types::QualityMetrics;
use tree_sitter::Node;

use crate::extract::normalize::strip_comments;

/// Node kinds that open a nesting level for both cyclomatic and
/// cognitive accounting.
fn is_control_structure(kind: &str) -> bool {
    matches!(
        kind,
        "if_statement"
            | "for_statement"
            | "for_in_statement"
            | "while_statement"
            | "do_statement"
            | "switch_statement"
            | "try_statement"
            | "catch_clause"
            | "ternary_expression"
    )
}

/// Walk accumulator.
#[derive(Default)]
struct Walk {
    cyclomatic: u32,
    cognitive: u32,
    max_nesting: u32,
    returns: u32,
    branches: u32,
    loops: u32,
    try_catch: u32,
    await_count: u32,
    callbacks: u32,
}

/// Compute the full metric tuple for one function node.
///
/// `name` feeds recursion detection for cognitive complexity.
pub fn compute(node: Node<'_>, source: &str, name: &str, parameter_count: u32) -> QualityMetrics {
    let mut walk = Walk::default();
    let body = node.child_by_field_name("body");

    if let Some(body) = body {
        visit(body, source, name, 0, &mut walk);
    }

    let (lines_of_code, total_lines, comment_lines) = line_counts(node, body, source);

    let halstead = halstead::count(body.unwrap_or(node), source);
    let volume = halstead.volume();
    let difficulty = halstead.difficulty();

    let cyclomatic = walk.cyclomatic + 1;
    let maintainability = maintainability_index(volume, cyclomatic, lines_of_code);

    let code_to_comment_ratio = if comment_lines > 0 {
        lines_of_code as f64 / comment_lines as f64
    } else {
        0.0
    };

    QualityMetrics {
        lines_of_code,
        total_lines,
        comment_lines,
        code_to_comment_ratio,
        cyclomatic_complexity: cyclomatic,
        cognitive_complexity: walk.cognitive,
        max_nesting_level: walk.max_nesting,
        parameter_count,
        return_statement_count: walk.returns,
        branch_count: walk.branches,
        loop_count: walk.loops,
        try_catch_count: walk.try_catch,
        async_await_count: walk.await_count,
        callback_count: walk.callbacks,
        halstead_volume: volume,
        halstead_difficulty: difficulty,
        maintainability_index: maintainability,
    }
}

/// `171 − 5.2·ln(V) − 0.23·CC − 16.2·ln(LOC)`, clamped to [0, 171],
/// scaled to [0, 100].
fn maintainability_index(volume: f64, cyclomatic: u32, loc: u32) -> f64 {
    let ln_volume = if volume > 0.0 { volume.ln() } else { 0.0 };
    let ln_loc = if loc > 0 { (loc as f64).ln() } else { 0.0 };
    let raw = 171.0 - 5.2 * ln_volume - 0.23 * cyclomatic as f64 - 16.2 * ln_loc;
    raw.clamp(0.0, 171.0) * 100.0 / 171.0
}

fn visit(node: Node<'_>, source: &str, fn_name: &str, nesting: u32, walk: &mut Walk) {
    let kind = node.kind();

    let mut child_nesting = nesting;

    match kind {
        "if_statement" => {
            walk.cyclomatic += 1;
            walk.cognitive += 1 + nesting;
            walk.branches += 1;
            child_nesting = nesting + 1;
        }
        "ternary_expression" => {
            walk.cyclomatic += 1;
            walk.cognitive += 1 + nesting;
            walk.branches += 1;
            child_nesting = nesting + 1;
        }
        "switch_case" => {
            // `default:` is a separate node kind and does not count.
            walk.cyclomatic += 1;
            walk.branches += 1;
        }
        "switch_statement" => {
            walk.cognitive += 1 + nesting;
            child_nesting = nesting + 1;
        }
        "for_statement" | "for_in_statement" | "while_statement" | "do_statement" => {
            walk.cyclomatic += 1;
            walk.cognitive += 1 + nesting;
            walk.loops += 1;
            child_nesting = nesting + 1;
        }
        "try_statement" => {
            walk.try_catch += 1;
            child_nesting = nesting + 1;
        }
        "catch_clause" => {
            walk.cyclomatic += 1;
            walk.cognitive += 1 + nesting;
            child_nesting = nesting + 1;
        }
        "binary_expression" => {
            if let Some(op) = node.child_by_field_name("operator") {
                let op_kind = op.kind();
                if matches!(op_kind, "&&" | "||" | "??") {
                    walk.cyclomatic += 1;
                    // A run of identical operators counts once.
                    if !parent_is_same_logical(node, op_kind) {
                        walk.cognitive += 1;
                    }
                }
            }
        }
        "return_statement" => walk.returns += 1,
        "await_expression" => walk.await_count += 1,
        "call_expression" => {
            if fn_name != "anonymous" && callee_matches(node, source, fn_name) {
                // Direct recursion.
                walk.cognitive += 1;
            }
        }
        "arrow_function" | "function_expression" | "function" => {
            if node
                .parent()
                .is_some_and(|p| p.kind() == "arguments")
            {
                walk.callbacks += 1;
            }
        }
        _ => {}
    }

    if is_control_structure(kind) {
        walk.max_nesting = walk.max_nesting.max(child_nesting);
    }

    // Nested function bodies still belong to this function's source span;
    // their structure counts toward the enclosing metrics.
    for i in 0..node.child_count() {
        if let Some(child) = node.child(i) {
            visit(child, source, fn_name, child_nesting, walk);
        }
    }
}

/// True when the parent expression is the same logical operator — the
/// continuation of a boolean sequence.
fn parent_is_same_logical(node: Node<'_>, op_kind: &str) -> bool {
    node.parent().is_some_and(|p| {
        p.kind() == "binary_expression"
            && p.child_by_field_name("operator")
                .is_some_and(|o| o.kind() == op_kind)
    })
}

/// True when the call expression's callee is exactly `fn_name`.
fn callee_matches(node: Node<'_>, source: &str, fn_name: &str) -> bool {
    node.child_by_field_name("function")
        .and_then(|f| f.utf8_text(source.as_bytes()).ok())
        .is_some_and(|text| text == fn_name)
}

/// (lines_of_code, total_lines, comment_lines) for the function span.
fn line_counts(node: Node<'_>, body: Option<Node<'_>>, source: &str) -> (u32, u32, u32) {
    let total_lines = (node.end_position().row - node.start_position().row + 1) as u32;

    let body_text = body
        .and_then(|b| b.utf8_text(source.as_bytes()).ok())
        .unwrap_or("");

    let stripped = strip_comments(body_text);
    let mut loc = 0u32;
    for line in stripped.lines() {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed == "{" || trimmed == "}" {
            continue;
        }
        loc += 1;
    }
    // Expression-bodied arrows have no braces but still one line of code.
    if loc == 0 && !stripped.trim().is_empty() {
        loc = 1;
    }

    let mut comment_lines = 0u32;
    count_comment_lines(node, source, &mut comment_lines);

    (loc.min(total_lines), total_lines, comment_lines)
}

fn count_comment_lines(node: Node<'_>, source: &str, acc: &mut u32) {
    if node.kind() == "comment" {
        if let Ok(text) = node.utf8_text(source.as_bytes()) {
            *acc += text.lines().count() as u32;
        }
        return;
    }
    for i in 0..node.child_count() {
        if let Some(child) = node.child(i) {
            count_comment_lines(child, source, acc);
        }
    }
}
