//! Static description of an observed function.
//!
//! A [`FunctionMeta`] is what the call descriptor builder needs to know
//! about a function besides its runtime arguments: parameter names and
//! order, declared annotations, the docstring, the variable-name table and
//! the file the function is declared in. It is built once, when the
//! function is wrapped, either by hand or by parsing the Python source.

use crate::errors::{function_not_found, introspection_error, AutodocError, ErrorLocation};
use crate::parser;
use rustpython_parser::ast::{
    Arguments, Constant, ExceptHandler, Expr, Operator, Stmt, StmtAsyncFunctionDef,
    StmtFunctionDef, Suite,
};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

/// How a parameter can be bound at a call site
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamKind {
    PositionalOnly,
    PositionalOrKeyword,
    /// `*args`
    VarPositional,
    KeywordOnly,
    /// `**kwargs`
    VarKeyword,
}

impl ParamKind {
    pub fn accepts_positional(&self) -> bool {
        matches!(self, ParamKind::PositionalOnly | ParamKind::PositionalOrKeyword)
    }

    pub fn accepts_keyword(&self) -> bool {
        matches!(self, ParamKind::PositionalOrKeyword | ParamKind::KeywordOnly)
    }
}

/// A declared parameter
#[derive(Debug, Clone, PartialEq)]
pub struct Param {
    pub name: String,
    pub annotation: Option<String>,
    pub kind: ParamKind,
}

/// Everything known about a function before it is called
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionMeta {
    pub name: String,
    pub params: Vec<Param>,
    pub return_annotation: Option<String>,
    pub docstring: Option<String>,
    /// Parameters first, then locals in order of first binding
    pub varnames: Vec<String>,
    pub source_file: PathBuf,
}

impl FunctionMeta {
    /// Start describing a function by hand
    pub fn builder(name: impl Into<String>, source_file: impl Into<PathBuf>) -> FunctionMetaBuilder {
        FunctionMetaBuilder {
            name: name.into(),
            source_file: source_file.into(),
            params: Vec::new(),
            return_annotation: None,
            docstring: None,
            locals: Vec::new(),
        }
    }

    /// Read `path` and describe the function called `name`.
    ///
    /// `name` is either a top-level function or `Class.method`.
    pub fn from_file(path: impl AsRef<Path>, name: &str) -> Result<Self, AutodocError> {
        let path = path.as_ref();
        let source = fs::read_to_string(path)?;
        Self::from_source(&source, path, name)
    }

    /// Describe the function called `name` in already loaded source
    pub fn from_source(
        source: &str,
        path: impl AsRef<Path>,
        name: &str,
    ) -> Result<Self, AutodocError> {
        let path = path.as_ref();
        let label = path.display().to_string();
        let suite = parser::parse_python(source, &label)?;

        let def = find_function(&suite, name).ok_or_else(|| function_not_found(name, &label))?;
        let (params, varnames) = collect_params(def.args);
        let mut builder = FunctionMeta::builder(def.name, path);
        builder.params = params;
        builder.return_annotation = def.returns.map(annotation_text);
        builder.docstring = docstring_of(def.body);
        builder.locals = local_names(def.body, &varnames);
        builder.build().map_err(|e| {
            let (line, column) = parser::line_column(source, def.offset);
            e.at(ErrorLocation {
                file: Some(label.clone()).filter(|l| !l.is_empty()),
                line,
                column,
                function: def.name.to_string(),
            })
        })
    }

    /// Last entry of the variable-name table, used to label return values
    pub fn last_varname(&self) -> Option<&str> {
        self.varnames.last().map(String::as_str)
    }

    pub fn param(&self, name: &str) -> Option<&Param> {
        self.params.iter().find(|p| p.name == name)
    }

    /// File name of the declaring source file, e.g. `shapes.py`
    pub fn source_name(&self) -> Option<String> {
        self.source_file
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
    }
}

/// Hand-written [`FunctionMeta`] for functions without Python source
#[derive(Debug, Clone)]
pub struct FunctionMetaBuilder {
    name: String,
    source_file: PathBuf,
    params: Vec<Param>,
    return_annotation: Option<String>,
    docstring: Option<String>,
    locals: Vec<String>,
}

impl FunctionMetaBuilder {
    fn push(mut self, name: impl Into<String>, annotation: Option<String>, kind: ParamKind) -> Self {
        self.params.push(Param {
            name: name.into(),
            annotation,
            kind,
        });
        self
    }

    /// Unannotated positional-or-keyword parameter
    pub fn param(self, name: impl Into<String>) -> Self {
        self.push(name, None, ParamKind::PositionalOrKeyword)
    }

    pub fn annotated(self, name: impl Into<String>, annotation: impl Into<String>) -> Self {
        self.push(name, Some(annotation.into()), ParamKind::PositionalOrKeyword)
    }

    pub fn positional_only(self, name: impl Into<String>) -> Self {
        self.push(name, None, ParamKind::PositionalOnly)
    }

    pub fn var_positional(self, name: impl Into<String>) -> Self {
        self.push(name, None, ParamKind::VarPositional)
    }

    pub fn keyword_only(self, name: impl Into<String>) -> Self {
        self.push(name, None, ParamKind::KeywordOnly)
    }

    pub fn var_keyword(self, name: impl Into<String>) -> Self {
        self.push(name, None, ParamKind::VarKeyword)
    }

    pub fn returns(mut self, annotation: impl Into<String>) -> Self {
        self.return_annotation = Some(annotation.into());
        self
    }

    pub fn doc(mut self, docstring: impl Into<String>) -> Self {
        self.docstring = Some(docstring.into());
        self
    }

    /// Local variable, in order of first binding
    pub fn local(mut self, name: impl Into<String>) -> Self {
        self.locals.push(name.into());
        self
    }

    /// Validate and freeze the description
    pub fn build(self) -> Result<FunctionMeta, AutodocError> {
        if self.name.is_empty() {
            return Err(introspection_error("function name is empty", None));
        }
        if self.source_file.file_name().is_none() {
            return Err(introspection_error(
                format!(
                    "cannot derive a source identity for '{}' from {:?}",
                    self.name, self.source_file
                ),
                None,
            ));
        }

        let mut seen = HashSet::new();
        for param in &self.params {
            if param.name.is_empty() || !seen.insert(param.name.as_str()) {
                return Err(introspection_error(
                    format!("invalid or duplicate parameter '{}' in '{}'", param.name, self.name),
                    None,
                ));
            }
        }

        let mut varnames = code_order(&self.params);
        for local in self.locals {
            if !varnames.contains(&local) {
                varnames.push(local);
            }
        }

        Ok(FunctionMeta {
            name: self.name,
            params: self.params,
            return_annotation: self.return_annotation,
            docstring: self.docstring.map(|d| clean_doc(&d)).filter(|d| !d.is_empty()),
            varnames,
            source_file: self.source_file,
        })
    }
}

/// Parameter names in the order Python's code objects list them:
/// positional, keyword-only, then `*args` and `**kwargs`
fn code_order(params: &[Param]) -> Vec<String> {
    let rank = |kind: ParamKind| match kind {
        ParamKind::PositionalOnly | ParamKind::PositionalOrKeyword => 0,
        ParamKind::KeywordOnly => 1,
        ParamKind::VarPositional => 2,
        ParamKind::VarKeyword => 3,
    };
    let mut ordered: Vec<&Param> = params.iter().collect();
    ordered.sort_by_key(|p| rank(p.kind));
    ordered.into_iter().map(|p| p.name.clone()).collect()
}

/// Borrowed view over sync and async definitions
struct FunctionDefView<'a> {
    name: &'a str,
    args: &'a Arguments,
    returns: Option<&'a Expr>,
    body: &'a [Stmt],
    /// Byte offset of the `def`
    offset: usize,
}

impl<'a> From<&'a StmtFunctionDef> for FunctionDefView<'a> {
    fn from(def: &'a StmtFunctionDef) -> Self {
        FunctionDefView {
            name: def.name.as_str(),
            args: &def.args,
            returns: def.returns.as_deref(),
            body: &def.body,
            offset: u32::from(def.range.start()) as usize,
        }
    }
}

impl<'a> From<&'a StmtAsyncFunctionDef> for FunctionDefView<'a> {
    fn from(def: &'a StmtAsyncFunctionDef) -> Self {
        FunctionDefView {
            name: def.name.as_str(),
            args: &def.args,
            returns: def.returns.as_deref(),
            body: &def.body,
            offset: u32::from(def.range.start()) as usize,
        }
    }
}

fn find_function<'a>(suite: &'a Suite, qualname: &str) -> Option<FunctionDefView<'a>> {
    let (class, name) = match qualname.split_once('.') {
        Some((class, name)) => (Some(class), name),
        None => (None, qualname),
    };

    let scope: &[Stmt] = match class {
        Some(class) => suite.iter().find_map(|stmt| match stmt {
            Stmt::ClassDef(classdef) if classdef.name.as_str() == class => {
                Some(classdef.body.as_slice())
            }
            _ => None,
        })?,
        None => suite.as_slice(),
    };

    scope.iter().find_map(|stmt| match stmt {
        Stmt::FunctionDef(def) if def.name.as_str() == name => Some(FunctionDefView::from(def)),
        Stmt::AsyncFunctionDef(def) if def.name.as_str() == name => {
            Some(FunctionDefView::from(def))
        }
        _ => None,
    })
}

fn collect_params(args: &Arguments) -> (Vec<Param>, Vec<String>) {
    let mut params = Vec::new();

    for arg in &args.posonlyargs {
        params.push(Param {
            name: arg.def.arg.to_string(),
            annotation: arg.def.annotation.as_deref().map(annotation_text),
            kind: ParamKind::PositionalOnly,
        });
    }
    for arg in &args.args {
        params.push(Param {
            name: arg.def.arg.to_string(),
            annotation: arg.def.annotation.as_deref().map(annotation_text),
            kind: ParamKind::PositionalOrKeyword,
        });
    }
    if let Some(vararg) = &args.vararg {
        params.push(Param {
            name: vararg.arg.to_string(),
            annotation: vararg.annotation.as_deref().map(annotation_text),
            kind: ParamKind::VarPositional,
        });
    }
    for arg in &args.kwonlyargs {
        params.push(Param {
            name: arg.def.arg.to_string(),
            annotation: arg.def.annotation.as_deref().map(annotation_text),
            kind: ParamKind::KeywordOnly,
        });
    }
    if let Some(kwarg) = &args.kwarg {
        params.push(Param {
            name: kwarg.arg.to_string(),
            annotation: kwarg.annotation.as_deref().map(annotation_text),
            kind: ParamKind::VarKeyword,
        });
    }

    let varnames = code_order(&params);
    (params, varnames)
}

/// Render an annotation expression back to source form
fn annotation_text(expr: &Expr) -> String {
    match expr {
        Expr::Name(name) => name.id.to_string(),
        Expr::Attribute(attr) => format!("{}.{}", annotation_text(&attr.value), attr.attr),
        Expr::Subscript(subscript) => format!(
            "{}[{}]",
            annotation_text(&subscript.value),
            match &*subscript.slice {
                Expr::Tuple(tuple) => join_annotations(&tuple.elts),
                slice => annotation_text(slice),
            }
        ),
        Expr::Tuple(tuple) => join_annotations(&tuple.elts),
        Expr::List(list) => format!("[{}]", join_annotations(&list.elts)),
        Expr::BinOp(binop) if binop.op == Operator::BitOr => format!(
            "{} | {}",
            annotation_text(&binop.left),
            annotation_text(&binop.right)
        ),
        Expr::Constant(constant) => match &constant.value {
            Constant::None => "None".to_string(),
            // Forward reference: "Point"
            Constant::Str(s) => s.clone(),
            Constant::Ellipsis => "...".to_string(),
            _ => "Any".to_string(),
        },
        _ => "Any".to_string(),
    }
}

fn join_annotations(elts: &[Expr]) -> String {
    elts.iter()
        .map(annotation_text)
        .collect::<Vec<_>>()
        .join(", ")
}

fn docstring_of(body: &[Stmt]) -> Option<String> {
    match body.first()? {
        Stmt::Expr(expr) => match &*expr.value {
            Expr::Constant(constant) => match &constant.value {
                Constant::Str(s) => Some(s.clone()),
                _ => None,
            },
            _ => None,
        },
        _ => None,
    }
}

/// Names bound in a function body, in the order the compiler first meets
/// them: a value is visited before the target it is assigned to.
///
/// Nested function and class bodies are separate scopes; only their own
/// name is bound here. Names declared `global` or `nonlocal` are not locals.
fn local_names(body: &[Stmt], params: &[String]) -> Vec<String> {
    let mut names = Vec::new();
    let mut seen: HashSet<String> = params.iter().cloned().collect();
    declared_elsewhere(body, &mut seen);
    collect_stmts(body, &mut names, &mut seen);
    names
}

fn bind(name: &str, names: &mut Vec<String>, seen: &mut HashSet<String>) {
    if seen.insert(name.to_string()) {
        names.push(name.to_string());
    }
}

/// `global` and `nonlocal` names of this scope
fn declared_elsewhere(body: &[Stmt], out: &mut HashSet<String>) {
    for stmt in body {
        match stmt {
            Stmt::Global(stmt) => out.extend(stmt.names.iter().map(|n| n.to_string())),
            Stmt::Nonlocal(stmt) => out.extend(stmt.names.iter().map(|n| n.to_string())),
            Stmt::For(stmt) => {
                declared_elsewhere(&stmt.body, out);
                declared_elsewhere(&stmt.orelse, out);
            }
            Stmt::AsyncFor(stmt) => {
                declared_elsewhere(&stmt.body, out);
                declared_elsewhere(&stmt.orelse, out);
            }
            Stmt::While(stmt) => {
                declared_elsewhere(&stmt.body, out);
                declared_elsewhere(&stmt.orelse, out);
            }
            Stmt::If(stmt) => {
                declared_elsewhere(&stmt.body, out);
                declared_elsewhere(&stmt.orelse, out);
            }
            Stmt::With(stmt) => declared_elsewhere(&stmt.body, out),
            Stmt::AsyncWith(stmt) => declared_elsewhere(&stmt.body, out),
            Stmt::Try(stmt) => {
                declared_elsewhere(&stmt.body, out);
                for ExceptHandler::ExceptHandler(handler) in &stmt.handlers {
                    declared_elsewhere(&handler.body, out);
                }
                declared_elsewhere(&stmt.orelse, out);
                declared_elsewhere(&stmt.finalbody, out);
            }
            _ => {}
        }
    }
}

fn collect_stmts(body: &[Stmt], names: &mut Vec<String>, seen: &mut HashSet<String>) {
    for stmt in body {
        match stmt {
            Stmt::Expr(stmt) => collect_expr(&stmt.value, names, seen),
            Stmt::Return(stmt) => {
                if let Some(value) = &stmt.value {
                    collect_expr(value, names, seen);
                }
            }
            Stmt::Assign(assign) => {
                collect_expr(&assign.value, names, seen);
                for target in &assign.targets {
                    collect_target(target, names, seen);
                }
            }
            Stmt::AnnAssign(assign) => {
                if let Some(value) = &assign.value {
                    collect_expr(value, names, seen);
                }
                collect_target(&assign.target, names, seen);
            }
            Stmt::AugAssign(assign) => {
                collect_target(&assign.target, names, seen);
                collect_expr(&assign.value, names, seen);
            }
            Stmt::For(stmt) => {
                collect_expr(&stmt.iter, names, seen);
                collect_target(&stmt.target, names, seen);
                collect_stmts(&stmt.body, names, seen);
                collect_stmts(&stmt.orelse, names, seen);
            }
            Stmt::AsyncFor(stmt) => {
                collect_expr(&stmt.iter, names, seen);
                collect_target(&stmt.target, names, seen);
                collect_stmts(&stmt.body, names, seen);
                collect_stmts(&stmt.orelse, names, seen);
            }
            Stmt::While(stmt) => {
                collect_expr(&stmt.test, names, seen);
                collect_stmts(&stmt.body, names, seen);
                collect_stmts(&stmt.orelse, names, seen);
            }
            Stmt::If(stmt) => {
                collect_expr(&stmt.test, names, seen);
                collect_stmts(&stmt.body, names, seen);
                collect_stmts(&stmt.orelse, names, seen);
            }
            Stmt::With(stmt) => {
                for item in &stmt.items {
                    collect_expr(&item.context_expr, names, seen);
                    if let Some(vars) = &item.optional_vars {
                        collect_target(vars, names, seen);
                    }
                }
                collect_stmts(&stmt.body, names, seen);
            }
            Stmt::AsyncWith(stmt) => {
                for item in &stmt.items {
                    collect_expr(&item.context_expr, names, seen);
                    if let Some(vars) = &item.optional_vars {
                        collect_target(vars, names, seen);
                    }
                }
                collect_stmts(&stmt.body, names, seen);
            }
            Stmt::Try(stmt) => {
                collect_stmts(&stmt.body, names, seen);
                for ExceptHandler::ExceptHandler(handler) in &stmt.handlers {
                    if let Some(name) = &handler.name {
                        bind(name.as_str(), names, seen);
                    }
                    collect_stmts(&handler.body, names, seen);
                }
                collect_stmts(&stmt.orelse, names, seen);
                collect_stmts(&stmt.finalbody, names, seen);
            }
            Stmt::Assert(stmt) => collect_expr(&stmt.test, names, seen),
            Stmt::Import(import) => {
                for alias in &import.names {
                    let bound = match &alias.asname {
                        Some(asname) => asname.to_string(),
                        None => alias.name.as_str().split('.').next().unwrap_or_default().to_string(),
                    };
                    bind(&bound, names, seen);
                }
            }
            Stmt::ImportFrom(import) => {
                for alias in &import.names {
                    let bound = alias.asname.as_ref().unwrap_or(&alias.name);
                    if bound.as_str() != "*" {
                        bind(bound.as_str(), names, seen);
                    }
                }
            }
            Stmt::FunctionDef(def) => bind(def.name.as_str(), names, seen),
            Stmt::AsyncFunctionDef(def) => bind(def.name.as_str(), names, seen),
            Stmt::ClassDef(def) => bind(def.name.as_str(), names, seen),
            _ => {}
        }
    }
}

fn collect_target(target: &Expr, names: &mut Vec<String>, seen: &mut HashSet<String>) {
    match target {
        Expr::Name(name) => bind(name.id.as_str(), names, seen),
        Expr::Tuple(tuple) => {
            for elt in &tuple.elts {
                collect_target(elt, names, seen);
            }
        }
        Expr::List(list) => {
            for elt in &list.elts {
                collect_target(elt, names, seen);
            }
        }
        Expr::Starred(starred) => collect_target(&starred.value, names, seen),
        // attribute and subscript targets bind nothing locally
        _ => {}
    }
}

/// Walrus targets inside an expression. Lambdas and comprehensions are
/// their own scopes and are not entered.
fn collect_expr(expr: &Expr, names: &mut Vec<String>, seen: &mut HashSet<String>) {
    let children: Vec<&Expr> = match expr {
        Expr::NamedExpr(named) => {
            collect_expr(&named.value, names, seen);
            collect_target(&named.target, names, seen);
            return;
        }
        Expr::BoolOp(op) => op.values.iter().collect(),
        Expr::BinOp(op) => vec![&*op.left, &*op.right],
        Expr::UnaryOp(op) => vec![&*op.operand],
        Expr::IfExp(op) => vec![&*op.test, &*op.body, &*op.orelse],
        Expr::Compare(cmp) => std::iter::once(&*cmp.left).chain(&cmp.comparators).collect(),
        Expr::Call(call) => std::iter::once(&*call.func)
            .chain(&call.args)
            .chain(call.keywords.iter().map(|k| &k.value))
            .collect(),
        Expr::Await(e) => vec![&*e.value],
        Expr::Starred(e) => vec![&*e.value],
        Expr::Attribute(e) => vec![&*e.value],
        Expr::Subscript(e) => vec![&*e.value, &*e.slice],
        Expr::Tuple(e) => e.elts.iter().collect(),
        Expr::List(e) => e.elts.iter().collect(),
        Expr::Set(e) => e.elts.iter().collect(),
        Expr::Dict(e) => e.keys.iter().flatten().chain(&e.values).collect(),
        _ => Vec::new(),
    };
    for child in children {
        collect_expr(child, names, seen);
    }
}

/// Docstring cleanup in the manner of `inspect.cleandoc`
pub fn clean_doc(doc: &str) -> String {
    let expanded = doc.replace('\t', "        ");
    let lines: Vec<&str> = expanded.lines().collect();
    let Some((first, rest)) = lines.split_first() else {
        return String::new();
    };

    let margin = rest
        .iter()
        .filter(|line| !line.trim().is_empty())
        .map(|line| line.len() - line.trim_start().len())
        .min()
        .unwrap_or(0);

    let mut cleaned = vec![first.trim_start().to_string()];
    for line in rest {
        cleaned.push(line.get(margin..).unwrap_or("").trim_end().to_string());
    }

    while cleaned.first().is_some_and(|l| l.is_empty()) {
        cleaned.remove(0);
    }
    while cleaned.last().is_some_and(|l| l.is_empty()) {
        cleaned.pop();
    }
    cleaned.join("\n")
}
