//! Module documents. A module is a TOML file declaring axioms, propositions
//! and definitions of predicate and function constants:
//!
//! ```toml
//! [module]
//! name = "sets"
//! imports = ["logic"]
//!
//! [[node]]
//! kind = "predicate"
//! label = "defIsSet"
//! name = "isSet"
//! parameters = ["x"]
//! formula = "(EXISTS (VAR y) (PREDCON in (VAR x) (VAR y)))"
//! ```
//!
//! Nodes are checked in declaration order, each against the definitions made
//! before it in the module and in its imports.

use crate::{
    context::{CheckOptions, Ctx},
    diagnostics::Diagnostic,
    expr::{ExprArena, ParsedExpr, read_expr},
    semant::{
        check_error::{CheckDiagnostic, FormulaError},
        check_formula::FormulaChecker,
        existence::{
            AssumeAllExist, ConstantKind, DefinitionError, DefinitionTable, ExistenceOracle,
            ModuleScope,
        },
        module_context::ModuleContext,
        variables::free_variables,
    },
    span::{SourceId, Span},
    strings,
};
use itertools::Itertools;
use rustc_hash::FxHashMap;
use serde::Deserialize;
use std::{
    fmt::{self, Display},
    fs,
    ops::Range,
    path::{Path, PathBuf},
};
use toml::Spanned;
use ustr::Ustr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeKind {
    Axiom,
    Proposition,
    Predicate,
    Function,
}

impl Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NodeKind::Axiom => write!(f, "axiom"),
            NodeKind::Proposition => write!(f, "proposition"),
            NodeKind::Predicate => write!(f, "predicate"),
            NodeKind::Function => write!(f, "function"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeStatus {
    pub label: String,
    pub kind: NodeKind,
    pub errors: usize,
}

impl NodeStatus {
    pub fn is_ok(&self) -> bool {
        self.errors == 0
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleReport {
    pub name: String,
    pub source: SourceId,
    pub nodes: Vec<NodeStatus>,
    /// Problems with the document itself rather than one of its nodes.
    pub module_errors: usize,
}

impl ModuleReport {
    fn failed(source: SourceId) -> Self {
        let name = Path::new(source.name().as_str())
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_default();

        Self {
            name,
            source,
            nodes: Vec::new(),
            module_errors: 1,
        }
    }

    pub fn error_count(&self) -> usize {
        self.module_errors + self.nodes.iter().map(|n| n.errors).sum::<usize>()
    }

    pub fn is_ok(&self) -> bool {
        self.error_count() == 0
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ModuleFile {
    module: ModuleHeader,
    #[serde(default)]
    node: Vec<NodeDecl>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ModuleHeader {
    name: Spanned<String>,
    #[serde(default)]
    imports: Vec<Spanned<String>>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct NodeDecl {
    kind: NodeKind,
    label: Spanned<String>,
    name: Option<Spanned<String>>,
    #[serde(default)]
    parameters: Vec<String>,
    formula: Option<Spanned<String>>,
    term: Option<Spanned<String>>,
    #[serde(default)]
    identity: bool,
    #[serde(default)]
    class_operator: bool,
}

impl NodeDecl {
    /// Which fields each kind of node requires and allows.
    fn shape_error(&self) -> Option<String> {
        let present = [
            ("name", self.name.is_some()),
            ("parameters", !self.parameters.is_empty()),
            ("formula", self.formula.is_some()),
            ("term", self.term.is_some()),
            ("identity", self.identity),
            ("class_operator", self.class_operator),
        ];
        let (required, allowed): (&[&str], &[&str]) = match self.kind {
            NodeKind::Axiom | NodeKind::Proposition => (&["formula"], &["formula"]),
            NodeKind::Predicate => (&["name"], &["name", "parameters", "formula", "identity"]),
            NodeKind::Function => (&["name"], &["name", "parameters", "term", "class_operator"]),
        };

        if let Some(field) = required
            .iter()
            .find(|field| present.iter().any(|(f, set)| f == *field && !set))
        {
            return Some(format!("{} node needs a `{field}`", self.kind));
        }
        present
            .iter()
            .find(|(field, set)| *set && !allowed.contains(field))
            .map(|(field, _)| format!("`{field}` is not allowed on a {} node", self.kind))
    }
}

/// Reads and checks the module file at `path`.
pub fn check_module_file(path: &Path, ctx: &mut Ctx) -> ModuleReport {
    let source = ctx.sources.id_for_path(path);
    match fs::read_to_string(path) {
        Ok(text) => check_module(source, text, ctx),
        Err(err) => {
            ctx.diags.add_diag(Diagnostic::err_unreadable_file(path, &err));
            ModuleReport::failed(source)
        }
    }
}

/// Checks module files in order, so each may import the ones before it.
pub fn check_module_files(paths: &[PathBuf], ctx: &mut Ctx) -> Vec<ModuleReport> {
    paths
        .iter()
        .map(|path| check_module_file(path, ctx))
        .collect()
}

/// Checks a module document. Its definitions become available to modules
/// checked later that import it.
pub fn check_module(source: SourceId, text: String, ctx: &mut Ctx) -> ModuleReport {
    ctx.sources.add(source, text.clone());

    let file: ModuleFile = match toml::from_str(&text) {
        Ok(file) => file,
        Err(err) => {
            ctx.diags.add_diag(Diagnostic::err_module_format(source, &err));
            return ModuleReport::failed(source);
        }
    };

    let name = file.module.name.get_ref().clone();
    tracing::debug!(module = %name, nodes = file.node.len(), "checking module");

    let mut checker = ModuleChecker {
        name: Ustr::from(name.as_str()),
        source,
        text: &text,
        exprs: ctx.exprs,
        options: ctx.options,
        imports: Vec::new(),
        local: DefinitionTable::new(),
        labels: FxHashMap::default(),
        diags: Vec::new(),
        snippets: Vec::new(),
    };

    let mut module_errors = 0;
    for import in &file.module.imports {
        match ctx.modules.get(&Ustr::from(import.get_ref().as_str())) {
            Some(table) => checker.imports.push(table),
            None => {
                let span = checker.span(import.span());
                checker
                    .diags
                    .push(Diagnostic::err_unknown_import(import.get_ref(), span));
                module_errors += 1;
            }
        }
    }

    let nodes = file.node.iter().map(|node| checker.node(node)).collect_vec();

    let ModuleChecker {
        local,
        diags,
        snippets,
        imports,
        ..
    } = checker;
    drop(imports);

    for (id, snippet) in snippets {
        ctx.sources.add(id, snippet);
    }
    ctx.diags.add_diags(diags);

    let name_key = Ustr::from(name.as_str());
    if ctx.modules.contains_key(&name_key) {
        let span = Span::from_range(source, file.module.name.span());
        ctx.diags
            .add_diag(Diagnostic::err_module_redeclaration(&name, span));
        module_errors += 1;
    } else {
        ctx.modules.insert(name_key, local);
    }

    ModuleReport {
        name,
        source,
        nodes,
        module_errors,
    }
}

struct ModuleChecker<'a, 'ctx> {
    name: Ustr,
    source: SourceId,
    text: &'a str,
    exprs: &'ctx ExprArena<'ctx>,
    options: CheckOptions,
    imports: Vec<&'a DefinitionTable>,
    local: DefinitionTable,
    /// The span of every label seen so far.
    labels: FxHashMap<String, Span>,
    diags: Vec<Diagnostic>,
    /// Expressions that could not be located in the document text.
    snippets: Vec<(SourceId, String)>,
}

impl<'a, 'ctx> ModuleChecker<'a, 'ctx> {
    fn span(&self, range: Range<usize>) -> Span {
        Span::from_range(self.source, range)
    }

    fn report(&mut self, status: &mut NodeStatus, diag: Diagnostic) {
        status.errors += 1;
        self.diags.push(diag);
    }

    fn node(&mut self, node: &NodeDecl) -> NodeStatus {
        let label = node.label.get_ref();
        let label_span = self.span(node.label.span());
        let mut status = NodeStatus {
            label: label.clone(),
            kind: node.kind,
            errors: 0,
        };

        if let Some(&previous) = self.labels.get(label) {
            let diag = Diagnostic::err_duplicate_label(label, label_span, previous);
            self.report(&mut status, diag);
            return status;
        }
        self.labels.insert(label.clone(), label_span);

        if let Some(msg) = node.shape_error() {
            self.report(&mut status, Diagnostic::err_invalid_node(&msg, label_span));
            return status;
        }

        let context = ModuleContext::new(&self.name).with_field(label);
        match node.kind {
            NodeKind::Axiom | NodeKind::Proposition => {
                if let Some(formula) = &node.formula {
                    self.expression(formula, &context, true, None, &mut status);
                }
            }
            NodeKind::Predicate => {
                if let Some(formula) = &node.formula {
                    self.expression(formula, &context, true, Some(node.parameters.as_slice()), &mut status);
                }
                self.define(node, ConstantKind::Predicate, &mut status);
            }
            NodeKind::Function => {
                if let Some(term) = &node.term {
                    self.expression(term, &context, false, Some(node.parameters.as_slice()), &mut status);
                }
                self.define(node, ConstantKind::Function, &mut status);
            }
        }

        tracing::debug!(module = %self.name, label = %label, errors = status.errors, "checked node");
        status
    }

    /// Reads and checks one expression of a node. Definientia additionally
    /// may not have free variables beyond their parameters.
    fn expression(
        &mut self,
        field: &Spanned<String>,
        context: &ModuleContext,
        is_formula: bool,
        parameters: Option<&[String]>,
        status: &mut NodeStatus,
    ) {
        let field_name = if is_formula {
            strings::FORMULA.as_str()
        } else {
            strings::TERM.as_str()
        };
        let context = context.clone().with_field(field_name);
        let start = self.locate(field, &context);

        let parsed = match read_expr(field.get_ref(), self.exprs) {
            Ok(parsed) => parsed,
            Err(err) => {
                self.report(status, Diagnostic::err_expr_syntax(&err, start));
                return;
            }
        };

        let found = {
            let scope = ModuleScope::new(&self.local, &self.imports);
            let oracle: &dyn ExistenceOracle = if self.options.syntax_only {
                &AssumeAllExist
            } else {
                &scope
            };
            let checker = FormulaChecker::with_policy(oracle, self.options.policy);
            if is_formula {
                checker.check_formula(parsed.root, &context)
            } else {
                checker.check_term(parsed.root, &context)
            }
        };
        for diag in &found {
            self.report_check(diag, &parsed, start, status);
        }

        if let Some(parameters) = parameters {
            let stray = free_variables(parsed.root)
                .names()
                .into_iter()
                .filter(|name| !parameters.iter().any(|p| p == name.as_str()))
                .map(|name| format!("`{name}`"))
                .join(", ");
            if !stray.is_empty() {
                let diag = CheckDiagnostic::new(
                    FormulaError::FreeVariableNotAParameter(stray),
                    parsed.root,
                    context,
                );
                self.report_check(&diag, &parsed, start, status);
            }
        }
    }

    fn report_check(
        &mut self,
        diag: &CheckDiagnostic,
        parsed: &ParsedExpr,
        start: Span,
        status: &mut NodeStatus,
    ) {
        let span = parsed
            .spans
            .get(&diag.context().expr_path())
            .map(|range| Span::from_range(start.source(), range).shifted(start.start()));
        self.report(status, Diagnostic::from_check(diag, span));
    }

    /// Where the text of an expression field starts. Plain strings are
    /// located inside the document. Anything with escapes gets a source of
    /// its own.
    fn locate(&mut self, field: &Spanned<String>, context: &ModuleContext) -> Span {
        let range = field.span();
        let value = field.get_ref();

        if let Some(raw) = self.text.get(range.clone()) {
            for quote in ["\"\"\"", "'''", "\"", "'"] {
                let Some(inner) = raw
                    .strip_prefix(quote)
                    .and_then(|r| r.strip_suffix(quote))
                else {
                    continue;
                };
                let offset = if inner == value {
                    quote.len()
                } else if inner.strip_prefix('\n') == Some(value.as_str()) {
                    quote.len() + 1
                } else {
                    continue;
                };
                let at = range.start + offset;
                return Span::new(self.source, at, at);
            }
        }

        let id = SourceId::new(&format!("{}#{context}", self.source.name()));
        self.snippets.push((id, value.clone()));
        Span::new(id, 0, 0)
    }

    fn define(&mut self, node: &NodeDecl, kind: ConstantKind, status: &mut NodeStatus) {
        let Some(name_field) = &node.name else {
            return;
        };
        let name = Ustr::from(name_field.get_ref().as_str());
        let name_span = self.span(name_field.span());
        let label = Ustr::from(node.label.get_ref().as_str());
        let arity = node.parameters.len();

        let imported = self.imports.iter().find_map(|table| match kind {
            ConstantKind::Predicate => table.predicate_definition(name, arity),
            ConstantKind::Function => table.function_definition(name, arity),
        });
        let defined = match imported {
            Some(previous) => Err(DefinitionError::AlreadyDefined {
                kind,
                name,
                arity,
                previous,
            }),
            None => match kind {
                ConstantKind::Predicate => self.local.define_predicate(name, arity, label),
                ConstantKind::Function => self.local.define_function(name, arity, label),
            },
        };
        if let Err(err) = defined {
            self.report(status, Diagnostic::err_definition(&err, name_span));
            return;
        }

        if node.identity
            && let Err(err) = self.local.set_identity_operator(name)
        {
            self.report(status, Diagnostic::err_definition(&err, name_span));
        }
        if node.class_operator {
            self.local.set_class_operator(label);
        }
    }
}
