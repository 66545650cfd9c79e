//! autodoc: function-level documentation from observed calls.
//!
//! A wrapped function runs normally; on return its bound arguments and
//! result are turned into a typed `def` block with a docstring and
//! examples, which is appended once to an interface file such as
//! `typings/shapes.pyi`.

pub mod config;
pub mod document;
pub mod errors;
pub mod function;
pub mod observe;
pub mod parser;
pub mod runtime;
pub mod store;
pub mod utils;

pub use config::{AutodocConfig, DocStyle, MarkerPolicy};
pub use document::DocumentRenderer;
pub use errors::AutodocError;
pub use function::{ArgumentRecord, CallArgs, CallDescriptor, FunctionMeta, Param, ParamKind};
pub use observe::{autodoc, Autodoc, Observed};
pub use runtime::{infer, repr, Object, Repr, ReprLimits, ToValue, Value};
pub use store::{InterfaceStore, SyncOutcome};

use std::path::Path;

/// Introspect `name` in a Python source file and wrap `func` with the
/// default configuration.
pub fn observe_python<F>(
    path: impl AsRef<Path>,
    name: &str,
    func: F,
) -> Result<Observed<F>, AutodocError> {
    let meta = FunctionMeta::from_file(path, name)?;
    Ok(autodoc(meta, func))
}

/// Same as [`observe_python`], configured from `[tool.autodoc]` in the
/// given `pyproject.toml`.
pub fn observe_python_with_project<F>(
    pyproject: impl AsRef<Path>,
    path: impl AsRef<Path>,
    name: &str,
    func: F,
) -> Result<Observed<F>, AutodocError> {
    let config = AutodocConfig::from_pyproject(pyproject)?;
    let meta = FunctionMeta::from_file(path, name)?;
    Ok(Autodoc::new(config).observe(meta, func))
}

/// Render the block a single call would produce, without touching disk
pub fn render_call(
    meta: &FunctionMeta,
    args: &CallArgs,
    result: &Value,
    config: &AutodocConfig,
) -> String {
    let descriptor = CallDescriptor::build(meta, args, result, &Repr::new(config.repr.clone()));
    DocumentRenderer::from_config(config).render(&descriptor)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::call_args;

    #[test]
    fn test_render_call() {
        let meta = FunctionMeta::builder("greet", "hello.py")
            .param("name")
            .local("message")
            .build()
            .unwrap();
        let text = render_call(
            &meta,
            &call_args!("ada"),
            &"hello ada".to_value(),
            &AutodocConfig::default(),
        );
        assert!(text.starts_with("def greet(name: str) -> str:\n"));
        assert!(text.contains("        >>> name\n        'ada'\n"));
        assert!(text.contains("        message (str)\n"));
    }

    #[test]
    fn test_observe_python_missing_function() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("hello.py");
        std::fs::write(&path, "def greet(name):\n    return name\n").unwrap();

        let err = observe_python(&path, "absent", |_: &CallArgs| 0i64).err().unwrap();
        assert!(matches!(err, AutodocError::FunctionNotFound { .. }));
    }
}
