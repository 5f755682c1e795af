//! Halstead volume and difficulty from operator/operand multisets.
//!
//! Leaf tokens of the subtree are partitioned: anonymous nodes (keywords,
//! punctuation, operators) are operators; named leaves (identifiers,
//! literals) are operands keyed by text.

use strata_core::types::collections::FxHashMap;
use tree_sitter::Node;

/// Operator/operand counts for one subtree.
#[derive(Debug, Clone, Default)]
pub struct HalsteadCounts {
    pub distinct_operators: usize,
    pub distinct_operands: usize,
    pub total_operators: usize,
    pub total_operands: usize,
}

impl HalsteadCounts {
    /// `V = N * log2(n)` where `N = N1 + N2` and `n = n1 + n2`.
    pub fn volume(&self) -> f64 {
        let n = (self.distinct_operators + self.distinct_operands) as f64;
        let total = (self.total_operators + self.total_operands) as f64;
        if n <= 0.0 || total <= 0.0 {
            return 0.0;
        }
        total * n.log2()
    }

    /// `D = (n1 / 2) * (N2 / n2)`.
    pub fn difficulty(&self) -> f64 {
        if self.distinct_operands == 0 {
            return 0.0;
        }
        (self.distinct_operators as f64 / 2.0)
            * (self.total_operands as f64 / self.distinct_operands as f64)
    }
}

/// Collect operator/operand multisets over the subtree rooted at `node`.
pub fn count(node: Node<'_>, source: &str) -> HalsteadCounts {
    let mut operators: FxHashMap<&str, usize> = FxHashMap::default();
    let mut operands: FxHashMap<&str, usize> = FxHashMap::default();

    let mut stack = vec![node];
    while let Some(current) = stack.pop() {
        if current.child_count() == 0 {
            let kind = current.kind();
            if kind == "comment" {
                continue;
            }
            if current.is_named() {
                let text = current.utf8_text(source.as_bytes()).unwrap_or("");
                if !text.is_empty() {
                    *operands.entry(text).or_insert(0) += 1;
                }
            } else {
                *operators.entry(kind).or_insert(0) += 1;
            }
        } else {
            for i in 0..current.child_count() {
                if let Some(child) = current.child(i) {
                    stack.push(child);
                }
            }
        }
    }

    HalsteadCounts {
        distinct_operators: operators.len(),
        distinct_operands: operands.len(),
        total_operators: operators.values().sum(),
        total_operands: operands.values().sum(),
    }
}
