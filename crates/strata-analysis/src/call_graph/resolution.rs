//! Call-site resolution: `Seen → (LocalHit | CacheHit | ExternalKnown |
//! UnresolvedDynamic)`. Terminal in all cases; no retries.

use std::sync::OnceLock;

use regex::Regex;
use strata_core::types::collections::FxHashMap;
use strata_core::types::{CallType, PhysicalId};

use super::export_table::{ExportTableCache, ModuleTarget};
use crate::extract::types::CallSiteRecord;
use crate::identity::AnalyzedFile;

/// Confidence tiers per resolution strategy.
pub const CONFIDENCE_LOCAL_EXACT: f64 = 1.0;
pub const CONFIDENCE_IMPORT_EXACT: f64 = 0.9;
pub const CONFIDENCE_METHOD_VIA_TYPE: f64 = 0.7;
pub const CONFIDENCE_NAME_MATCH: f64 = 0.5;
pub const CONFIDENCE_TEXTUAL: f64 = 0.2;

/// The outcome of resolving one call site.
#[derive(Debug, Clone)]
pub struct Resolution {
    pub callee_id: Option<PhysicalId>,
    pub callee_class_name: Option<String>,
    pub call_type: CallType,
    pub confidence: f64,
    /// Strategy name recorded in edge metadata, e.g. `local-exact`.
    pub strategy: &'static str,
    /// Module specifier for cross-file and external callees.
    pub module_specifier: Option<String>,
}

/// Per-file lookup context shared across a file's call sites.
pub struct FileContext<'a> {
    pub file: &'a AnalyzedFile,
    /// Same-file function name → record position (innermost last wins are
    /// avoided by preferring the lowest nesting level).
    pub local_by_name: FxHashMap<&'a str, usize>,
    /// (class name, method name) → record position.
    pub methods: FxHashMap<(&'a str, &'a str), usize>,
    /// Variable name → declared/constructed type text.
    pub var_types: FxHashMap<&'a str, &'a str>,
}

impl<'a> FileContext<'a> {
    pub fn new(file: &'a AnalyzedFile) -> Self {
        let mut local_by_name: FxHashMap<&str, usize> = FxHashMap::default();
        let mut methods: FxHashMap<(&str, &str), usize> = FxHashMap::default();

        for (idx, record) in file.records.iter().enumerate() {
            let extracted = &file.analysis.functions[idx];
            if let Some(class) = extracted.class_name.as_deref() {
                methods.insert((class, record.name.as_str()), idx);
            } else {
                // Prefer the outermost binding for a given name.
                match local_by_name.get(record.name.as_str()) {
                    Some(&existing)
                        if file.records[existing].nesting_level <= record.nesting_level => {}
                    _ => {
                        local_by_name.insert(record.name.as_str(), idx);
                    }
                }
            }
        }

        let var_types = file
            .analysis
            .var_types
            .iter()
            .map(|v| (v.name.as_str(), v.type_text.as_str()))
            .collect();

        Self {
            file,
            local_by_name,
            methods,
            var_types,
        }
    }
}

/// Resolve one call site against local scope, receiver types, imports,
/// and the export table.
#[allow(clippy::too_many_arguments)]
pub fn resolve_call(
    call: &CallSiteRecord,
    ctx: &FileContext<'_>,
    caller_class: Option<&str>,
    global_by_name: &FxHashMap<&str, Vec<PhysicalId>>,
    export_tables: &mut ExportTableCache<'_>,
) -> Resolution {
    let base_type = classify_flow(call);

    // Computed access never resolves.
    if call.is_computed || call.callee_name.is_empty() {
        return Resolution {
            callee_id: None,
            callee_class_name: None,
            call_type: CallType::Dynamic,
            confidence: CONFIDENCE_TEXTUAL,
            strategy: "unresolved-dynamic",
            module_specifier: None,
        };
    }

    // `this.method()` and receiver-typed method calls.
    if call.is_method_call {
        if let Some(receiver) = call.receiver.as_deref() {
            let class = if receiver == "this" {
                caller_class.map(str::to_string)
            } else {
                ctx.var_types
                    .get(receiver)
                    .and_then(|t| extract_class_name(t))
            };
            if let Some(class) = class {
                if let Some(&idx) = ctx
                    .methods
                    .get(&(class.as_str(), call.callee_name.as_str()))
                {
                    let confidence = if receiver == "this" {
                        CONFIDENCE_LOCAL_EXACT
                    } else {
                        CONFIDENCE_METHOD_VIA_TYPE
                    };
                    return Resolution {
                        callee_id: Some(ctx.file.records[idx].physical_id.clone()),
                        callee_class_name: Some(class),
                        call_type: base_type,
                        confidence,
                        strategy: if receiver == "this" {
                            "this-method"
                        } else {
                            "method-via-type"
                        },
                        module_specifier: None,
                    };
                }
            }

            // Namespace import receiver: `utils.format()`.
            if let Some(import) = ctx
                .file
                .analysis
                .imports
                .iter()
                .find(|i| i.is_namespace && i.local_name == receiver)
            {
                return resolve_through_import(
                    ctx,
                    &import.specifier,
                    &call.callee_name,
                    base_type,
                    export_tables,
                );
            }
        }
    } else {
        // Plain identifier call: same-file declarations and bindings first.
        if let Some(&idx) = ctx.local_by_name.get(call.callee_name.as_str()) {
            return Resolution {
                callee_id: Some(ctx.file.records[idx].physical_id.clone()),
                callee_class_name: None,
                call_type: base_type,
                confidence: CONFIDENCE_LOCAL_EXACT,
                strategy: "local-exact",
                module_specifier: None,
            };
        }

        // Imported symbol.
        if let Some(import) = ctx
            .file
            .analysis
            .imports
            .iter()
            .find(|i| !i.is_namespace && i.local_name == call.callee_name)
        {
            let exported_name = if import.is_default {
                "default"
            } else {
                import.imported_name.as_str()
            };
            return resolve_through_import(
                ctx,
                &import.specifier,
                exported_name,
                base_type,
                export_tables,
            );
        }
    }

    // Best-effort: a unique name match anywhere in the snapshot.
    if let Some(candidates) = global_by_name.get(call.callee_name.as_str()) {
        if candidates.len() == 1 {
            return Resolution {
                callee_id: Some(candidates[0].clone()),
                callee_class_name: None,
                call_type: base_type,
                confidence: CONFIDENCE_NAME_MATCH,
                strategy: "name-match",
                module_specifier: None,
            };
        }
    }

    // Unresolved identifier.
    Resolution {
        callee_id: None,
        callee_class_name: None,
        call_type: CallType::Dynamic,
        confidence: CONFIDENCE_TEXTUAL,
        strategy: "unresolved-dynamic",
        module_specifier: None,
    }
}

fn resolve_through_import(
    ctx: &FileContext<'_>,
    specifier: &str,
    exported_name: &str,
    base_type: CallType,
    export_tables: &mut ExportTableCache<'_>,
) -> Resolution {
    let caller_file = &ctx.file.analysis.relative_path;
    match export_tables.classify(caller_file, specifier) {
        ModuleTarget::Internal(_) => {
            match export_tables.lookup(caller_file, specifier, exported_name) {
                Some(id) => Resolution {
                    callee_id: Some(id),
                    callee_class_name: None,
                    call_type: base_type,
                    confidence: CONFIDENCE_IMPORT_EXACT,
                    strategy: "import-exact",
                    module_specifier: Some(specifier.to_string()),
                },
                None => Resolution {
                    // The module is analyzed but the name is not exported —
                    // treated as dynamic rather than guessed.
                    callee_id: None,
                    callee_class_name: None,
                    call_type: CallType::Dynamic,
                    confidence: CONFIDENCE_TEXTUAL,
                    strategy: "unresolved-dynamic",
                    module_specifier: Some(specifier.to_string()),
                },
            }
        }
        ModuleTarget::External(spec) => Resolution {
            callee_id: None,
            callee_class_name: None,
            call_type: CallType::External,
            confidence: CONFIDENCE_NAME_MATCH,
            strategy: "external-known",
            module_specifier: Some(spec),
        },
    }
}

/// Flow classification before resolution outcome is known.
fn classify_flow(call: &CallSiteRecord) -> CallType {
    if call.is_await || call.in_then_chain {
        CallType::Async
    } else if call.in_conditional {
        CallType::Conditional
    } else {
        CallType::Direct
    }
}

/// Extract a class name from printed type text. Matches a trailing
/// capitalized identifier; plain variable names never qualify.
pub fn extract_class_name(type_text: &str) -> Option<String> {
    static RE: OnceLock<Regex> = OnceLock::new();
    let re = RE.get_or_init(|| {
        Regex::new(r"(?:^|\.|\s)([A-Z][A-Za-z0-9_]*)\s*$").expect("valid class name pattern")
    });
    re.captures(type_text.trim())
        .map(|c| c[1].to_string())
}
