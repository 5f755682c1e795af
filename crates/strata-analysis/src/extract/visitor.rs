//! Recursive AST walk emitting one record per function-like construct.
//!
//! The walk carries a context path (enclosing namespace/class/function
//! names, outermost first) and a function-depth counter that decides
//! `declaration` vs `local` for named functions.

use smallvec::SmallVec;
use strata_core::types::{AccessModifier, FunctionKind, Parameter};
use tree_sitter::Node;

use super::normalize::{ast_hash, normalize_source};
use super::types::{
    CallSiteRecord, ExtractedFunction, FileAnalysis, ImportRecord, VarTypeBinding,
};
use crate::metrics;
use crate::scanner::hasher::sha256_hex;
use crate::scanner::types::SourceUnit;

pub(crate) struct Walker<'a> {
    source: &'a str,
    context: Vec<String>,
    class_stack: Vec<ClassScope>,
    fn_depth: usize,
    functions: Vec<ExtractedFunction>,
    imports: Vec<ImportRecord>,
    call_sites: Vec<CallSiteRecord>,
    var_types: Vec<VarTypeBinding>,
    export_count: u32,
}

struct ClassScope {
    name: String,
    exported: bool,
}

/// Collected flags for one function-like node.
#[derive(Default)]
struct Flags {
    exported: bool,
    is_async: bool,
    is_generator: bool,
    is_arrow: bool,
    is_method: bool,
    is_constructor: bool,
    is_static: bool,
    is_accessor: bool,
    access_modifier: Option<AccessModifier>,
}

impl<'a> Walker<'a> {
    pub(crate) fn new(source: &'a str) -> Self {
        Self {
            source,
            context: Vec::new(),
            class_stack: Vec::new(),
            fn_depth: 0,
            functions: Vec::new(),
            imports: Vec::new(),
            call_sites: Vec::new(),
            var_types: Vec::new(),
            export_count: 0,
        }
    }

    pub(crate) fn walk(&mut self, root: Node<'a>) {
        self.visit(root, false);
    }

    pub(crate) fn finish(mut self, unit: &SourceUnit) -> FileAnalysis {
        // Persisted in (file, start line) order; extraction order is
        // document order already, but nested records interleave.
        self.functions
            .sort_by_key(|f| (f.start_line, f.start_column));
        FileAnalysis {
            relative_path: unit.relative_path.clone(),
            language: unit.language,
            file_hash: unit.file_hash.clone(),
            line_count: unit.line_count(),
            functions: self.functions,
            imports: self.imports,
            export_count: self.export_count,
            call_sites: self.call_sites,
            var_types: self.var_types,
        }
    }

    fn text(&self, node: Node<'_>) -> &'a str {
        node.utf8_text(self.source.as_bytes()).unwrap_or("")
    }

    fn visit_children(&mut self, node: Node<'a>, exported: bool) {
        for i in 0..node.child_count() {
            if let Some(child) = node.child(i) {
                self.visit(child, exported);
            }
        }
    }

    fn visit(&mut self, node: Node<'a>, exported: bool) {
        match node.kind() {
            "import_statement" => self.collect_import(node),
            "export_statement" => self.handle_export(node),
            "function_declaration" | "generator_function_declaration" => {
                self.handle_named_function(node, exported)
            }
            "class_declaration" | "abstract_class_declaration" => {
                self.handle_class(node, exported)
            }
            "interface_declaration" => self.handle_interface(node, exported),
            "internal_module" | "module" => self.handle_namespace(node, exported),
            "method_definition" => self.handle_method(node),
            "method_signature" | "abstract_method_signature" => {
                self.handle_method_signature(node)
            }
            "public_field_definition" | "field_definition" => self.handle_field(node),
            "lexical_declaration" | "variable_declaration" => {
                self.visit_children(node, exported)
            }
            "variable_declarator" => self.handle_declarator(node, exported),
            "pair" => self.handle_pair(node),
            "call_expression" => {
                self.collect_call(node);
                self.visit_children(node, false);
            }
            "arrow_function" | "function_expression" | "function" => {
                self.handle_anonymous(node)
            }
            _ => self.visit_children(node, exported),
        }
    }

    // ── construct handlers ──────────────────────────────────────────────

    fn handle_export(&mut self, node: Node<'a>) {
        self.export_count += 1;
        let is_default = has_token(node, "default");

        if let Some(decl) = node.child_by_field_name("declaration") {
            if is_default
                && matches!(
                    decl.kind(),
                    "function_declaration" | "generator_function_declaration"
                )
                && decl.child_by_field_name("name").is_none()
            {
                // `export default function () {}` — name synthesized.
                let flags = Flags {
                    exported: true,
                    is_async: has_token(decl, "async"),
                    is_generator: decl.kind() == "generator_function_declaration"
                        || has_token(decl, "*"),
                    ..Flags::default()
                };
                self.record_function(decl, "default".to_string(), None, FunctionKind::Declaration, flags, false);
                self.descend_into("default", decl);
                return;
            }
            self.visit(decl, true);
            return;
        }
        if let Some(value) = node.child_by_field_name("value") {
            if is_function_like(value.kind()) && is_default {
                // `export default () => …` — name synthesized as `default`.
                let flags = Flags {
                    exported: true,
                    is_async: has_token(value, "async"),
                    is_arrow: value.kind() == "arrow_function",
                    is_generator: has_token(value, "*"),
                    ..Flags::default()
                };
                self.record_function(value, "default".to_string(), None, FunctionKind::Declaration, flags, false);
                self.descend_into("default", value);
                return;
            }
            self.visit(value, false);
            return;
        }
        // Bare re-exports (`export { a } from './x'`) declare nothing here.
        self.visit_children(node, false);
    }

    fn handle_named_function(&mut self, node: Node<'a>, exported: bool) {
        let name = node
            .child_by_field_name("name")
            .map(|n| self.text(n).to_string())
            .unwrap_or_else(|| "anonymous".to_string());
        let kind = if self.fn_depth > 0 {
            FunctionKind::Local
        } else {
            FunctionKind::Declaration
        };
        let flags = Flags {
            exported,
            is_async: has_token(node, "async"),
            is_generator: node.kind() == "generator_function_declaration" || has_token(node, "*"),
            ..Flags::default()
        };
        self.record_function(node, name.clone(), None, kind, flags, false);
        self.descend_into(&name, node);
    }

    fn handle_class(&mut self, node: Node<'a>, exported: bool) {
        let name = node
            .child_by_field_name("name")
            .map(|n| self.text(n).to_string())
            .unwrap_or_else(|| "anonymous".to_string());
        self.class_stack.push(ClassScope {
            name: name.clone(),
            exported,
        });
        self.context.push(name);
        if let Some(body) = node.child_by_field_name("body") {
            self.visit_children(body, false);
        }
        self.context.pop();
        self.class_stack.pop();
    }

    fn handle_interface(&mut self, node: Node<'a>, exported: bool) {
        let name = node
            .child_by_field_name("name")
            .map(|n| self.text(n).to_string())
            .unwrap_or_else(|| "anonymous".to_string());
        self.class_stack.push(ClassScope {
            name: name.clone(),
            exported,
        });
        self.context.push(name);
        if let Some(body) = node.child_by_field_name("body") {
            self.visit_children(body, false);
        }
        self.context.pop();
        self.class_stack.pop();
    }

    /// Namespace members carry their own `export` keyword; the namespace's
    /// export status does not cascade.
    fn handle_namespace(&mut self, node: Node<'a>, _exported: bool) {
        let name = node
            .child_by_field_name("name")
            .map(|n| self.text(n).to_string())
            .unwrap_or_else(|| "anonymous".to_string());
        self.context.push(name);
        if let Some(body) = node.child_by_field_name("body") {
            self.visit_children(body, false);
        }
        self.context.pop();
    }

    fn handle_method(&mut self, node: Node<'a>) {
        let name = node
            .child_by_field_name("name")
            .map(|n| strip_quotes(self.text(n)).to_string())
            .unwrap_or_else(|| "anonymous".to_string());
        let class = self.class_stack.last();
        let flags = Flags {
            exported: class.map(|c| c.exported).unwrap_or(false),
            is_async: has_token(node, "async"),
            is_generator: has_token(node, "*"),
            is_method: true,
            is_constructor: name == "constructor",
            is_static: has_token(node, "static"),
            is_accessor: has_token(node, "get") || has_token(node, "set"),
            access_modifier: access_modifier_of(node, self.source),
            ..Flags::default()
        };
        let class_name = class.map(|c| c.name.clone());
        self.record_function(node, name.clone(), class_name, FunctionKind::Method, flags, false);
        self.descend_into(&name, node);
    }

    fn handle_method_signature(&mut self, node: Node<'a>) {
        let name = node
            .child_by_field_name("name")
            .map(|n| strip_quotes(self.text(n)).to_string())
            .unwrap_or_else(|| "anonymous".to_string());
        let class = self.class_stack.last();
        let flags = Flags {
            exported: class.map(|c| c.exported).unwrap_or(false),
            is_method: true,
            ..Flags::default()
        };
        let class_name = class.map(|c| c.name.clone());
        // Declaration-only: no body, no metrics.
        self.record_function(node, name, class_name, FunctionKind::Method, flags, true);
    }

    fn handle_field(&mut self, node: Node<'a>) {
        let value = node.child_by_field_name("value");
        match value {
            Some(v) if is_function_like(v.kind()) => {
                let name = node
                    .child_by_field_name("name")
                    .map(|n| strip_quotes(self.text(n)).to_string())
                    .unwrap_or_else(|| "anonymous".to_string());
                let class = self.class_stack.last();
                let flags = Flags {
                    exported: class.map(|c| c.exported).unwrap_or(false),
                    is_async: has_token(v, "async"),
                    is_arrow: v.kind() == "arrow_function",
                    is_generator: has_token(v, "*"),
                    is_method: true,
                    is_static: has_token(node, "static"),
                    access_modifier: access_modifier_of(node, self.source),
                    ..Flags::default()
                };
                let class_name = class.map(|c| c.name.clone());
                self.record_function(v, name.clone(), class_name, FunctionKind::Method, flags, false);
                self.descend_into(&name, v);
            }
            _ => self.visit_children(node, false),
        }
    }

    fn handle_declarator(&mut self, node: Node<'a>, exported: bool) {
        let name = node
            .child_by_field_name("name")
            .map(|n| self.text(n).to_string())
            .unwrap_or_default();
        let value = node.child_by_field_name("value");

        // `let svc: UserService` — declared type feeds method resolution.
        if let Some(type_node) = node.child_by_field_name("type") {
            self.var_types.push(VarTypeBinding {
                name: name.clone(),
                type_text: type_annotation_text(type_node, self.source),
                byte_offset: node.start_byte(),
            });
        }

        match value {
            Some(v) if is_function_like(v.kind()) => {
                let flags = Flags {
                    exported,
                    is_async: has_token(v, "async"),
                    is_arrow: v.kind() == "arrow_function",
                    is_generator: has_token(v, "*"),
                    ..Flags::default()
                };
                self.record_function(v, name.clone(), None, FunctionKind::Arrow, flags, false);
                self.descend_into(&name, v);
            }
            Some(v) if v.kind() == "new_expression" => {
                // `const repo = new UserRepo()` — constructed type binding.
                if let Some(ctor) = v.child_by_field_name("constructor") {
                    self.var_types.push(VarTypeBinding {
                        name,
                        type_text: self.text(ctor).to_string(),
                        byte_offset: node.start_byte(),
                    });
                }
                self.visit_children(v, false);
            }
            Some(v) => self.visit(v, false),
            None => {}
        }
    }

    fn handle_pair(&mut self, node: Node<'a>) {
        let value = node.child_by_field_name("value");
        match value {
            Some(v) if is_function_like(v.kind()) => {
                let name = node
                    .child_by_field_name("key")
                    .map(|n| strip_quotes(self.text(n)).to_string())
                    .unwrap_or_else(|| "anonymous".to_string());
                let flags = Flags {
                    is_async: has_token(v, "async"),
                    is_arrow: v.kind() == "arrow_function",
                    is_generator: has_token(v, "*"),
                    ..Flags::default()
                };
                self.record_function(v, name.clone(), None, FunctionKind::Arrow, flags, false);
                self.descend_into(&name, v);
            }
            _ => self.visit_children(node, false),
        }
    }

    /// Truly anonymous callbacks: captured as locals with a positional tag.
    fn handle_anonymous(&mut self, node: Node<'a>) {
        let flags = Flags {
            is_async: has_token(node, "async"),
            is_arrow: node.kind() == "arrow_function",
            is_generator: has_token(node, "*"),
            ..Flags::default()
        };
        self.record_function(node, "anonymous".to_string(), None, FunctionKind::Local, flags, false);
        self.descend_into("anonymous", node);
    }

    /// Push the name onto the context path and walk the function body.
    fn descend_into(&mut self, name: &str, node: Node<'a>) {
        self.context.push(name.to_string());
        self.fn_depth += 1;
        if let Some(body) = node.child_by_field_name("body") {
            self.visit(body, false);
        }
        self.fn_depth -= 1;
        self.context.pop();
    }

    // ── record construction ─────────────────────────────────────────────

    fn record_function(
        &mut self,
        node: Node<'a>,
        name: String,
        class_name: Option<String>,
        kind: FunctionKind,
        flags: Flags,
        declaration_only: bool,
    ) {
        let start = node.start_position();
        let end = node.end_position();
        let start_line = start.row as u32 + 1;
        let start_column = start.column as u32;

        let (parameters, return_type) = self.extract_parameters(node);
        let signature = self.signature_of(node);
        let signature_hash = sha256_hex(normalize_source(&signature).as_bytes());
        let source_code = self.text(node).to_string();

        // The fingerprint covers parameters and body, not the name, so a
        // verbatim rename or move keeps its content identity.
        let params_text = node
            .child_by_field_name("parameters")
            .or_else(|| node.child_by_field_name("parameter"))
            .map(|p| self.text(p))
            .unwrap_or("");
        let fingerprint = match node.child_by_field_name("body") {
            Some(body) => ast_hash(&format!("{params_text}=>{}", self.text(body))),
            None => ast_hash(&source_code),
        };

        let semantic_tag = if name == "anonymous" {
            format!("anon@{start_line}:{start_column}")
        } else {
            name.clone()
        };

        let display_name = if self.context.is_empty() {
            name.clone()
        } else {
            format!("{}.{}", self.context.join("."), name)
        };

        let metrics = if declaration_only {
            None
        } else {
            Some(metrics::compute(
                node,
                self.source,
                &name,
                parameters.len() as u32,
            ))
        };

        let js_doc = self.find_jsdoc(node);

        self.functions.push(ExtractedFunction {
            name,
            display_name,
            signature,
            signature_hash,
            start_line,
            end_line: end.row as u32 + 1,
            start_column,
            end_column: end.column as u32,
            byte_start: node.start_byte(),
            byte_end: node.end_byte(),
            ast_hash: fingerprint,
            context_path: SmallVec::from_vec(self.context.clone()),
            kind,
            nesting_level: self.context.len() as u32,
            is_exported: flags.exported,
            is_async: flags.is_async,
            is_generator: flags.is_generator,
            is_arrow: flags.is_arrow,
            is_method: flags.is_method,
            is_constructor: flags.is_constructor,
            is_static: flags.is_static,
            is_accessor: flags.is_accessor,
            access_modifier: flags.access_modifier,
            class_name,
            semantic_tag,
            is_declaration_only: declaration_only,
            js_doc,
            source_code,
            parameters,
            metrics,
            return_type,
        });
    }

    /// Signature text: the function header up to (excluding) the body,
    /// whitespace-collapsed.
    fn signature_of(&self, node: Node<'a>) -> String {
        let text = match node.child_by_field_name("body") {
            Some(body) => &self.source[node.start_byte()..body.start_byte()],
            None => self.text(node),
        };
        let collapsed = normalize_source(text);
        collapsed
            .trim_end_matches("=>")
            .trim()
            .trim_end_matches(';')
            .trim()
            .to_string()
    }

    fn extract_parameters(&self, node: Node<'a>) -> (Vec<Parameter>, Option<String>) {
        let mut parameters = Vec::new();

        if let Some(params_node) = node.child_by_field_name("parameters") {
            for i in 0..params_node.named_child_count() {
                let Some(child) = params_node.named_child(i) else {
                    continue;
                };
                if let Some(param) = self.extract_one_parameter(child, parameters.len() as u32) {
                    parameters.push(param);
                }
            }
        } else if let Some(single) = node.child_by_field_name("parameter") {
            // `x => x + 1` — a bare identifier parameter.
            parameters.push(Parameter {
                name: self.text(single).to_string(),
                type_text: String::new(),
                type_simple: "any".to_string(),
                position: 0,
                is_optional: false,
                is_rest: false,
                default_value: None,
                description: None,
            });
        }

        let return_type = node
            .child_by_field_name("return_type")
            .map(|t| type_annotation_text(t, self.source));

        (parameters, return_type)
    }

    fn extract_one_parameter(&self, node: Node<'a>, position: u32) -> Option<Parameter> {
        match node.kind() {
            "required_parameter" | "optional_parameter" => {
                let pattern = node.child_by_field_name("pattern")?;
                if pattern.kind() == "this" {
                    return None;
                }
                let is_rest = pattern.kind() == "rest_pattern";
                let name = if is_rest {
                    self.text(pattern).trim_start_matches("...").to_string()
                } else {
                    self.text(pattern).to_string()
                };
                let type_text = node
                    .child_by_field_name("type")
                    .map(|t| type_annotation_text(t, self.source))
                    .unwrap_or_default();
                let default_value = node
                    .child_by_field_name("value")
                    .map(|v| self.text(v).to_string());
                Some(Parameter {
                    type_simple: simplify_type(&type_text),
                    name,
                    type_text,
                    position,
                    is_optional: node.kind() == "optional_parameter",
                    is_rest,
                    default_value,
                    description: None,
                })
            }
            // Plain JavaScript parameter shapes.
            "identifier" | "object_pattern" | "array_pattern" => Some(Parameter {
                name: self.text(node).to_string(),
                type_text: String::new(),
                type_simple: "any".to_string(),
                position,
                is_optional: false,
                is_rest: false,
                default_value: None,
                description: None,
            }),
            "assignment_pattern" => {
                let name = node
                    .child_by_field_name("left")
                    .map(|n| self.text(n).to_string())
                    .unwrap_or_default();
                let default_value = node
                    .child_by_field_name("right")
                    .map(|n| self.text(n).to_string());
                Some(Parameter {
                    name,
                    type_text: String::new(),
                    type_simple: "any".to_string(),
                    position,
                    is_optional: true,
                    is_rest: false,
                    default_value,
                    description: None,
                })
            }
            "rest_pattern" => Some(Parameter {
                name: self.text(node).trim_start_matches("...").to_string(),
                type_text: String::new(),
                type_simple: "any".to_string(),
                position,
                is_optional: false,
                is_rest: true,
                default_value: None,
                description: None,
            }),
            _ => None,
        }
    }

    /// A `/** … */` comment immediately preceding the function (or its
    /// outermost wrapper — export statement, variable declaration, field).
    fn find_jsdoc(&self, node: Node<'a>) -> Option<String> {
        let mut outer = node;
        while let Some(parent) = outer.parent() {
            if matches!(
                parent.kind(),
                "export_statement"
                    | "lexical_declaration"
                    | "variable_declaration"
                    | "variable_declarator"
                    | "public_field_definition"
                    | "field_definition"
                    | "pair"
            ) {
                outer = parent;
            } else {
                break;
            }
        }
        let prev = outer.prev_named_sibling()?;
        if prev.kind() == "comment" {
            let text = self.text(prev);
            if text.starts_with("/**") {
                return Some(text.to_string());
            }
        }
        None
    }

    // ── imports and call sites ──────────────────────────────────────────

    fn collect_import(&mut self, node: Node<'a>) {
        let Some(source_node) = node.child_by_field_name("source") else {
            return;
        };
        let specifier = strip_quotes(self.text(source_node)).to_string();
        let line = node.start_position().row as u32 + 1;

        for i in 0..node.child_count() {
            let Some(clause) = node.child(i) else { continue };
            if clause.kind() != "import_clause" {
                continue;
            }
            for j in 0..clause.child_count() {
                let Some(part) = clause.child(j) else { continue };
                match part.kind() {
                    "identifier" => self.imports.push(ImportRecord {
                        local_name: self.text(part).to_string(),
                        imported_name: "default".to_string(),
                        specifier: specifier.clone(),
                        is_default: true,
                        is_namespace: false,
                        line,
                    }),
                    "namespace_import" => {
                        if let Some(alias) = last_identifier(part) {
                            self.imports.push(ImportRecord {
                                local_name: self.text(alias).to_string(),
                                imported_name: "*".to_string(),
                                specifier: specifier.clone(),
                                is_default: false,
                                is_namespace: true,
                                line,
                            });
                        }
                    }
                    "named_imports" => {
                        for k in 0..part.named_child_count() {
                            let Some(spec) = part.named_child(k) else { continue };
                            if spec.kind() != "import_specifier" {
                                continue;
                            }
                            let imported = spec
                                .child_by_field_name("name")
                                .map(|n| self.text(n).to_string())
                                .unwrap_or_default();
                            let local = spec
                                .child_by_field_name("alias")
                                .map(|n| self.text(n).to_string())
                                .unwrap_or_else(|| imported.clone());
                            self.imports.push(ImportRecord {
                                local_name: local,
                                imported_name: imported,
                                specifier: specifier.clone(),
                                is_default: false,
                                is_namespace: false,
                                line,
                            });
                        }
                    }
                    _ => {}
                }
            }
        }
    }

    fn collect_call(&mut self, node: Node<'a>) {
        let Some(function_node) = node.child_by_field_name("function") else {
            return;
        };

        let mut callee_name = String::new();
        let mut receiver = None;
        let mut is_method_call = false;
        let mut is_computed = false;
        let mut is_chained = false;

        match function_node.kind() {
            "identifier" => callee_name = self.text(function_node).to_string(),
            "member_expression" => {
                is_method_call = true;
                if let Some(prop) = function_node.child_by_field_name("property") {
                    callee_name = self.text(prop).to_string();
                }
                let mut object = function_node.child_by_field_name("object");
                while let Some(obj) = object {
                    match obj.kind() {
                        "identifier" => {
                            receiver = Some(self.text(obj).to_string());
                            break;
                        }
                        "this" => {
                            receiver = Some("this".to_string());
                            break;
                        }
                        "member_expression" => {
                            object = obj.child_by_field_name("object");
                        }
                        "call_expression" => {
                            is_chained = true;
                            break;
                        }
                        _ => break,
                    }
                }
            }
            "subscript_expression" => {
                is_computed = true;
                if let Some(index) = function_node.child_by_field_name("index") {
                    if index.kind() == "string" {
                        callee_name = strip_quotes(self.text(index)).to_string();
                    }
                }
            }
            "call_expression" => is_chained = true,
            _ => {}
        }

        let start = node.start_position();
        self.call_sites.push(CallSiteRecord {
            callee_text: self.text(function_node).to_string(),
            callee_name,
            receiver,
            is_method_call,
            is_computed,
            is_await: node.parent().is_some_and(|p| p.kind() == "await_expression"),
            in_then_chain: inside_then_chain(node, self.source),
            in_conditional: inside_conditional(node),
            is_chained,
            line: start.row as u32 + 1,
            column: start.column as u32,
            byte_offset: node.start_byte(),
        });
    }
}

// ── free helpers ────────────────────────────────────────────────────────

pub(crate) fn is_function_like(kind: &str) -> bool {
    matches!(kind, "arrow_function" | "function_expression" | "function")
}

fn has_token(node: Node<'_>, token: &str) -> bool {
    for i in 0..node.child_count() {
        if let Some(child) = node.child(i) {
            if !child.is_named() && child.kind() == token {
                return true;
            }
        }
    }
    false
}

fn access_modifier_of(node: Node<'_>, source: &str) -> Option<AccessModifier> {
    for i in 0..node.child_count() {
        if let Some(child) = node.child(i) {
            if child.kind() == "accessibility_modifier" {
                let text = child.utf8_text(source.as_bytes()).unwrap_or("");
                return AccessModifier::parse(text);
            }
        }
    }
    None
}

fn strip_quotes(text: &str) -> &str {
    text.trim_matches(|c| c == '"' || c == '\'' || c == '`')
}

/// `type_annotation` nodes print as `: T`; return the bare `T`.
fn type_annotation_text(node: Node<'_>, source: &str) -> String {
    let text = node.utf8_text(source.as_bytes()).unwrap_or("");
    text.trim_start_matches(':').trim().to_string()
}

fn last_identifier(node: Node<'_>) -> Option<Node<'_>> {
    let mut found = None;
    for i in 0..node.child_count() {
        if let Some(child) = node.child(i) {
            if child.kind() == "identifier" {
                found = Some(child);
            }
        }
    }
    found
}

/// Simplified type: strip generics, unions, and object shapes down to a
/// head name usable for grouping.
pub(crate) fn simplify_type(type_text: &str) -> String {
    let trimmed = type_text.trim();
    if trimmed.is_empty() {
        return "any".to_string();
    }
    if trimmed.starts_with('{') {
        return "object".to_string();
    }
    if trimmed.starts_with('(') && trimmed.contains("=>") {
        return "function".to_string();
    }
    let head = trimmed
        .split(['|', '&'])
        .next()
        .unwrap_or(trimmed)
        .trim();
    let head = head.split('<').next().unwrap_or(head).trim();
    head.trim_end_matches("[]").trim().to_string()
}

/// True when the call is inside a callback passed to a `.then`/`.catch`/
/// `.finally` continuation.
fn inside_then_chain(node: Node<'_>, source: &str) -> bool {
    let mut current = node.parent();
    while let Some(n) = current {
        if n.kind() == "arguments" {
            if let Some(call) = n.parent() {
                if call.kind() == "call_expression" {
                    if let Some(f) = call.child_by_field_name("function") {
                        if f.kind() == "member_expression" {
                            if let Some(prop) = f.child_by_field_name("property") {
                                let text = prop.utf8_text(source.as_bytes()).unwrap_or("");
                                if matches!(text, "then" | "catch" | "finally") {
                                    return true;
                                }
                            }
                        }
                    }
                }
            }
        }
        current = n.parent();
    }
    false
}

/// True when the call sits under a dynamically guarded branch or loop,
/// up to the nearest enclosing function.
fn inside_conditional(node: Node<'_>) -> bool {
    let mut current = node.parent();
    while let Some(n) = current {
        match n.kind() {
            "arrow_function" | "function_expression" | "function" | "method_definition"
            | "function_declaration" | "generator_function_declaration" => return false,
            "if_statement" | "ternary_expression" | "switch_case" | "while_statement"
            | "do_statement" | "for_statement" | "for_in_statement" | "catch_clause" => {
                return true
            }
            _ => current = n.parent(),
        }
    }
    false
}
