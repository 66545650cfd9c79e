//! Call descriptors: one normalized record per observed call.

use super::meta::{FunctionMeta, ParamKind};
use crate::runtime::{infer, Repr, ToValue, Value};
use log::debug;
use std::path::PathBuf;

/// Arguments of a single call, as the caller passed them
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CallArgs {
    pub positional: Vec<Value>,
    pub keyword: Vec<(String, Value)>,
}

impl CallArgs {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a positional argument
    pub fn arg(mut self, value: impl ToValue) -> Self {
        self.positional.push(value.to_value());
        self
    }

    /// Append a keyword argument
    pub fn kwarg(mut self, name: impl Into<String>, value: impl ToValue) -> Self {
        self.keyword.push((name.into(), value.to_value()));
        self
    }

    pub fn positional(&self, index: usize) -> Option<&Value> {
        self.positional.get(index)
    }

    pub fn keyword(&self, name: &str) -> Option<&Value> {
        self.keyword
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value)
    }
}

/// Build [`CallArgs`]: `call_args!(1, "a"; scale = 2.0)`
#[macro_export]
macro_rules! call_args {
    ($($arg:expr),* $(; $($key:ident = $val:expr),*)?) => {{
        let args = $crate::CallArgs::new();
        $( let args = args.arg(&$arg); )*
        $($( let args = args.kwarg(stringify!($key), &$val); )*)?
        args
    }};
}

/// One documented value: an argument or the return value
#[derive(Debug, Clone, PartialEq)]
pub struct ArgumentRecord {
    pub name: String,
    pub type_descriptor: String,
    pub example: String,
    /// Module declaring the value's class (`builtins` for builtins)
    pub module: String,
    pub raw_value: Value,
}

impl ArgumentRecord {
    fn new(name: impl Into<String>, annotation: Option<&str>, value: Value, repr: &Repr) -> Self {
        ArgumentRecord {
            name: name.into(),
            type_descriptor: describe_type(annotation, &value),
            example: repr.repr(&value),
            module: value.module().to_string(),
            raw_value: value,
        }
    }
}

/// Normalized record of one call
#[derive(Debug, Clone, PartialEq)]
pub struct CallDescriptor {
    pub function_name: String,
    /// Declared parameter order, extra keywords last
    pub arguments: Vec<ArgumentRecord>,
    pub ret: ArgumentRecord,
    /// Declaring source file, keys the interface file
    pub source_identity: PathBuf,
    pub docstring: Option<String>,
}

impl CallDescriptor {
    /// Bind `args` against `meta` and describe `result`
    pub fn build(meta: &FunctionMeta, args: &CallArgs, result: &Value, repr: &Repr) -> Self {
        let mut bound: Vec<Option<Value>> = vec![None; meta.params.len()];

        let mut positional = args.positional.iter();
        for (slot, param) in bound.iter_mut().zip(&meta.params) {
            if !param.kind.accepts_positional() {
                continue;
            }
            match positional.next() {
                Some(value) => *slot = Some(value.clone()),
                None => break,
            }
        }

        let extra: Vec<Value> = positional.cloned().collect();
        if !extra.is_empty() {
            match meta
                .params
                .iter()
                .position(|p| p.kind == ParamKind::VarPositional)
            {
                Some(index) => bound[index] = Some(Value::Tuple(extra)),
                None => debug!(
                    "{}: dropping {} positional argument(s) with no parameter",
                    meta.name,
                    extra.len()
                ),
            }
        }

        let mut unmatched = Vec::new();
        for (name, value) in &args.keyword {
            match meta
                .params
                .iter()
                .position(|p| &p.name == name && p.kind.accepts_keyword())
            {
                Some(index) => bound[index] = Some(value.clone()),
                None => unmatched.push((name, value)),
            }
        }

        let mut arguments: Vec<ArgumentRecord> = meta
            .params
            .iter()
            .zip(bound)
            .filter_map(|(param, value)| {
                value.map(|v| ArgumentRecord::new(&param.name, param.annotation.as_deref(), v, repr))
            })
            .collect();
        arguments.extend(
            unmatched
                .into_iter()
                .map(|(name, value)| ArgumentRecord::new(name, None, value.clone(), repr)),
        );

        let ret_name = if result.is_none() {
            ""
        } else {
            meta.last_varname().unwrap_or("")
        };
        let ret = ArgumentRecord::new(
            ret_name,
            meta.return_annotation.as_deref(),
            result.clone(),
            repr,
        );

        CallDescriptor {
            function_name: meta.name.clone(),
            arguments,
            ret,
            source_identity: meta.source_file.clone(),
            docstring: meta.docstring.clone(),
        }
    }

    /// Whether the call produced a value worth a return block
    pub fn has_return(&self) -> bool {
        !self.ret.raw_value.is_none()
    }

    /// Module name of the declaring file, e.g. `shapes` for `shapes.py`
    pub fn module_name(&self) -> String {
        self.source_identity
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_default()
    }
}

/// Declared annotations yield to the runtime class of a present value
fn describe_type(annotation: Option<&str>, value: &Value) -> String {
    match annotation {
        Some(_) if !value.is_none() => value.class_name().to_string(),
        _ => infer(value),
    }
}
