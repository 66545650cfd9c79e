//! Rendering of call descriptors into interface-file blocks.

use crate::config::{AutodocConfig, DocStyle};
use crate::function::{ArgumentRecord, CallDescriptor};
use crate::runtime::Value;
use std::collections::BTreeSet;
use std::fmt::Write;

/// Turns a [`CallDescriptor`] into a typed `def` block with a docstring
#[derive(Debug, Clone)]
pub struct DocumentRenderer {
    indent: String,
    quote: String,
    style: DocStyle,
}

impl Default for DocumentRenderer {
    fn default() -> Self {
        Self::from_config(&AutodocConfig::default())
    }
}

impl DocumentRenderer {
    pub fn from_config(config: &AutodocConfig) -> Self {
        DocumentRenderer {
            indent: config.indent.clone(),
            quote: config.quote.clone(),
            style: config.style,
        }
    }

    /// Signature line, docstring and `...` body
    pub fn render(&self, descriptor: &CallDescriptor) -> String {
        let mut out = self.render_signature(descriptor);
        let i1 = &self.indent;

        let mut body = Vec::new();
        match &descriptor.docstring {
            Some(doc) => body.extend(doc.lines().map(str::to_string)),
            None => body.push(format!("Function {}.", descriptor.function_name)),
        }

        let sections = match self.style {
            DocStyle::Google => self.google_sections(descriptor),
            DocStyle::Numpy => self.numpy_sections(descriptor),
            DocStyle::Sphinx => self.sphinx_sections(descriptor),
        };
        for section in sections {
            body.push(String::new());
            body.extend(section);
        }

        let mut lines = body.into_iter();
        let first = lines.next().unwrap_or_default();
        let _ = writeln!(out, "{i1}{}{first}", self.quote);
        for line in lines {
            if line.is_empty() {
                out.push('\n');
            } else {
                let _ = writeln!(out, "{i1}{line}");
            }
        }
        let _ = writeln!(out, "{i1}{}", self.quote);
        let _ = writeln!(out, "{i1}...");
        out
    }

    /// `def name(a: int, b: str) -> float:`
    pub fn render_signature(&self, descriptor: &CallDescriptor) -> String {
        let params = descriptor
            .arguments
            .iter()
            .map(|arg| format!("{}: {}", arg.name, arg.type_descriptor))
            .collect::<Vec<_>>()
            .join(", ");
        format!(
            "def {}({}) -> {}:\n",
            descriptor.function_name, params, descriptor.ret.type_descriptor
        )
    }

    fn google_sections(&self, descriptor: &CallDescriptor) -> Vec<Vec<String>> {
        let i1 = &self.indent;
        let mut sections = Vec::new();

        if !descriptor.arguments.is_empty() {
            let mut args = vec!["Args:".to_string()];
            for arg in &descriptor.arguments {
                args.push(format!("{i1}{} ({})", arg.name, arg.type_descriptor));
            }
            sections.push(args);
        }

        if descriptor.has_return() {
            sections.push(vec![
                "Returns:".to_string(),
                format!("{i1}{}", labelled(&descriptor.ret, " (", ")")),
            ]);
        }

        let mut examples = vec!["Examples:".to_string()];
        examples.extend(self.example_lines(descriptor).into_iter().map(|l| format!("{i1}{l}")));
        sections.push(examples);
        sections
    }

    fn numpy_sections(&self, descriptor: &CallDescriptor) -> Vec<Vec<String>> {
        let mut sections = Vec::new();

        if !descriptor.arguments.is_empty() {
            let mut params = vec!["Parameters".to_string(), "----------".to_string()];
            for arg in &descriptor.arguments {
                params.push(format!("{} : {}", arg.name, arg.type_descriptor));
            }
            sections.push(params);
        }

        if descriptor.has_return() {
            sections.push(vec![
                "Returns".to_string(),
                "-------".to_string(),
                labelled(&descriptor.ret, " : ", ""),
            ]);
        }

        let mut examples = vec!["Examples".to_string(), "--------".to_string()];
        examples.extend(self.example_lines(descriptor));
        sections.push(examples);
        sections
    }

    fn sphinx_sections(&self, descriptor: &CallDescriptor) -> Vec<Vec<String>> {
        let i1 = &self.indent;
        let mut fields = Vec::new();

        for arg in &descriptor.arguments {
            fields.push(format!(":param {}:", arg.name));
            fields.push(format!(":type {}: {}", arg.name, arg.type_descriptor));
        }
        if descriptor.has_return() {
            if !descriptor.ret.name.is_empty() {
                fields.push(format!(":returns: {}", descriptor.ret.name));
            }
            fields.push(format!(":rtype: {}", descriptor.ret.type_descriptor));
        }

        let mut sections = Vec::new();
        if !fields.is_empty() {
            sections.push(fields);
        }
        sections.push(vec!["Examples::".to_string()]);
        sections.push(
            self.example_lines(descriptor)
                .into_iter()
                .map(|l| format!("{i1}{l}"))
                .collect(),
        );
        sections
    }

    /// `>>> arg` / example pairs, then the call placeholder and its result
    fn example_lines(&self, descriptor: &CallDescriptor) -> Vec<String> {
        let mut lines = Vec::new();
        for arg in &descriptor.arguments {
            lines.push(format!(">>> {}", arg.name));
            lines.push(arg.example.clone());
        }
        lines.push(format!(">>> {}(...)", descriptor.function_name));
        lines.push(descriptor.ret.example.clone());
        lines
    }

    /// Import lines and class stubs for non-builtin classes in the call.
    ///
    /// Each entry is a standalone snippet whose first line identifies it.
    pub fn render_imports(&self, descriptor: &CallDescriptor) -> Vec<String> {
        let module_name = descriptor.module_name();
        let mut seen = BTreeSet::new();
        let records = descriptor.arguments.iter().chain(std::iter::once(&descriptor.ret));
        for record in records {
            collect_classes(&record.raw_value, &mut seen);
        }

        seen.into_iter()
            .filter(|(module, _)| module != "builtins")
            .map(|(module, class)| {
                if module == "__main__" || module == module_name {
                    format!("class {class}:\n{}...\n", self.indent)
                } else {
                    format!("from {module} import {class}\n")
                }
            })
            .collect()
    }
}

/// `name<open>type<close>`, or the bare type when the name is unknown
fn labelled(record: &ArgumentRecord, open: &str, close: &str) -> String {
    if record.name.is_empty() {
        record.type_descriptor.clone()
    } else {
        format!("{}{open}{}{close}", record.name, record.type_descriptor)
    }
}

/// Classes of a value and of its direct elements
fn collect_classes(value: &Value, seen: &mut BTreeSet<(String, String)>) {
    let mut visit = |v: &Value| {
        if let Value::Object(object) = v {
            seen.insert((v.module().to_string(), object.class.clone()));
        }
    };

    visit(value);
    match value {
        Value::List(items) | Value::Tuple(items) | Value::Set(items) => items.iter().for_each(&mut visit),
        Value::Dict(entries) => {
            for (k, v) in entries {
                visit(k);
                visit(v);
            }
        }
        _ => {}
    }
}
