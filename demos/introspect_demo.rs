//! Introspect Demo
//!
//! Reads a Python file and prints what autodoc learns about one of its
//! functions: parameters, annotations, docstring and variable names.
//!
//! Usage: introspect_demo <file.py> <function | Class.method>

use autodoc::{FunctionMeta, ParamKind};
use std::env;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = env::args().collect();
    if args.len() < 3 {
        println!("Usage: {} <file.py> <function | Class.method>", args[0]);
        return Ok(());
    }

    let meta = FunctionMeta::from_file(&args[1], &args[2])?;

    println!("Function: {}", meta.name);
    println!("Source:   {}", meta.source_file.display());
    println!("Parameters:");
    for param in &meta.params {
        let prefix = match param.kind {
            ParamKind::VarPositional => "*",
            ParamKind::VarKeyword => "**",
            _ => "",
        };
        let annotation = param.annotation.as_deref().unwrap_or("-");
        println!("  {prefix}{} : {annotation} ({:?})", param.name, param.kind);
    }
    if let Some(ret) = &meta.return_annotation {
        println!("Returns:  {ret}");
    }
    if let Some(doc) = &meta.docstring {
        println!("Docstring:\n{doc}");
    }
    println!("Varnames: {}", meta.varnames.join(", "));
    if let Some(label) = meta.last_varname() {
        println!("Return label: {label}");
    }

    Ok(())
}
