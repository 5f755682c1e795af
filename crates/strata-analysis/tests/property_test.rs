//! Property tests over generated function shapes.

use std::path::PathBuf;

use proptest::prelude::*;
use strata_analysis::extract::{self, normalize};
use strata_analysis::identity;
use strata_analysis::scanner::{Language, SourceUnit};
use strata_core::hash::sha256_hex;

fn unit(source: &str) -> SourceUnit {
    SourceUnit {
        path: PathBuf::from("p.ts"),
        relative_path: "p.ts".to_string(),
        language: Language::TypeScript,
        content: source.to_string(),
        file_hash: sha256_hex(source.as_bytes()),
        file_size: source.len() as u64,
        mtime_ms: None,
    }
}

fn identifier() -> impl Strategy<Value = String> {
    "[a-z][a-zA-Z0-9]{0,10}"
}

proptest! {
    /// Metric invariants hold for arbitrary generated functions:
    /// cyclomatic >= 1, loc <= total lines, maintainability in [0, 100].
    #[test]
    fn metric_invariants(
        name in identifier(),
        branches in 0usize..6,
        statements in 0usize..6,
    ) {
        let mut body = String::new();
        for i in 0..statements {
            body.push_str(&format!("    const v{i} = {i};\n"));
        }
        for i in 0..branches {
            body.push_str(&format!("    if (x > {i}) {{ return {i}; }}\n"));
        }
        body.push_str("    return 0;\n");
        let source = format!("function {name}(x: number): number {{\n{body}}}\n");

        let analysis = extract::extract_file(&unit(&source)).unwrap();
        prop_assert_eq!(analysis.functions.len(), 1);
        let metrics = analysis.functions[0].metrics.clone().unwrap();

        prop_assert!(metrics.cyclomatic_complexity >= 1);
        prop_assert_eq!(metrics.cyclomatic_complexity as usize, branches + 1);
        prop_assert!(metrics.lines_of_code <= metrics.total_lines);
        prop_assert!(metrics.maintainability_index >= 0.0);
        prop_assert!(metrics.maintainability_index <= 100.0);
        prop_assert_eq!(metrics.return_statement_count as usize, branches + 1);
    }

    /// Normalization is idempotent and insensitive to comment noise.
    #[test]
    fn normalization_is_idempotent(code in "[a-z ;{}()]{0,80}", comment in "[a-zA-Z0-9 ]{0,30}") {
        let with_comment = format!("{code} // {comment}");
        let once = normalize::normalize_source(&with_comment);
        let twice = normalize::normalize_source(&once);
        prop_assert_eq!(&once, &twice);
        prop_assert_eq!(normalize::ast_hash(&with_comment), normalize::ast_hash(&once));
    }

    /// Minting twice always produces fresh physical ids and identical
    /// semantic/content ids.
    #[test]
    fn minting_is_deterministic_except_physical(name in identifier()) {
        let source = format!("export function {name}(a: number): number {{ return a; }}");
        let analysis = extract::extract_file(&unit(&source)).unwrap();
        let first = identity::mint_records(&analysis);
        let second = identity::mint_records(&analysis);

        prop_assert_eq!(first.len(), 1);
        prop_assert_ne!(&first[0].physical_id, &second[0].physical_id);
        prop_assert_eq!(&first[0].semantic_id, &second[0].semantic_id);
        prop_assert_eq!(&first[0].content_id, &second[0].content_id);
    }
}
