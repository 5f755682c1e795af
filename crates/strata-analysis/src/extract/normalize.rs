//! Source normalization and implementation fingerprints.
//!
//! Comment patterns use single-token alternations only. Nested quantifiers
//! over the same character class (the `[\s\S]*?` shape) are forbidden: they
//! backtrack catastrophically on adversarial input.

use std::sync::OnceLock;

use regex::Regex;

use crate::scanner::hasher::sha256_hex;

/// Block comments: `/*` then any run of non-`*` or `*` not followed by `/`.
fn block_comment_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"/\*(?:[^*]|\*[^/])*\*+/").expect("valid block comment pattern"))
}

/// Line comments to end of line.
fn line_comment_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"//[^\n]*").expect("valid line comment pattern"))
}

fn whitespace_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\s+").expect("valid whitespace pattern"))
}

/// Remove block and line comments.
pub fn strip_comments(source: &str) -> String {
    let without_blocks = block_comment_re().replace_all(source, " ");
    line_comment_re().replace_all(&without_blocks, " ").into_owned()
}

/// Normalize a function body to a textual fingerprint input:
/// comments removed, whitespace collapsed, trimmed.
pub fn normalize_source(source: &str) -> String {
    let stripped = strip_comments(source);
    whitespace_re()
        .replace_all(&stripped, " ")
        .trim()
        .to_string()
}

/// Hex SHA-256 over the normalized source text.
pub fn ast_hash(source: &str) -> String {
    sha256_hex(normalize_source(source).as_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_block_and_line_comments() {
        let source = "a /* block */ b // line\nc";
        let normalized = normalize_source(source);
        assert_eq!(normalized, "a b c");
    }

    #[test]
    fn comment_changes_do_not_change_hash() {
        let a = "function f() { return 1; } // note";
        let b = "function f() {\n  /* different note */\n  return 1;\n}";
        assert_eq!(ast_hash(a), ast_hash(b));
    }

    #[test]
    fn body_changes_change_hash() {
        assert_ne!(
            ast_hash("function f() { return 1; }"),
            ast_hash("function f() { return 2; }")
        );
    }

    #[test]
    fn unterminated_block_comment_does_not_hang() {
        // A pathological prefix of many asterisks must complete quickly.
        let source = format!("/*{}", "*".repeat(10_000));
        let _ = normalize_source(&source);
    }

    #[test]
    fn stars_inside_block_comments() {
        let source = "x /* a ** b *** c */ y";
        assert_eq!(normalize_source(source), "x y");
    }
}
