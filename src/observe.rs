//! Observing wrappers: run a function, then document the call.

use crate::config::AutodocConfig;
use crate::document::DocumentRenderer;
use crate::function::{CallArgs, CallDescriptor, FunctionMeta};
use crate::runtime::{Repr, ToValue, Value};
use crate::store::{InterfaceStore, SyncOutcome};
use log::debug;
use std::sync::Arc;

/// Documentation pipeline shared by every wrapper it creates
#[derive(Debug, Clone)]
pub struct Autodoc {
    config: AutodocConfig,
    store: Arc<InterfaceStore>,
    renderer: DocumentRenderer,
    repr: Repr,
}

impl Default for Autodoc {
    fn default() -> Self {
        Autodoc::new(AutodocConfig::default())
    }
}

impl Autodoc {
    pub fn new(config: AutodocConfig) -> Self {
        Autodoc {
            store: Arc::new(InterfaceStore::new(&config)),
            renderer: DocumentRenderer::from_config(&config),
            repr: Repr::new(config.repr.clone()),
            config,
        }
    }

    pub fn config(&self) -> &AutodocConfig {
        &self.config
    }

    pub fn store(&self) -> &InterfaceStore {
        &self.store
    }

    /// Wrap `func`, documented as `meta`
    pub fn observe<F>(&self, meta: FunctionMeta, func: F) -> Observed<F> {
        Observed {
            meta: Arc::new(meta),
            func,
            autodoc: self.clone(),
        }
    }

    /// Describe one completed call and sync it into the interface file
    pub fn document(&self, meta: &FunctionMeta, args: &CallArgs, result: &Value) -> SyncOutcome {
        let descriptor = CallDescriptor::build(meta, args, result, &self.repr);

        let imports = if self.config.emit_imports {
            self.renderer.render_imports(&descriptor)
        } else {
            Vec::new()
        };
        let block = self.renderer.render(&descriptor);
        let key = self.config.marker.key_for(&descriptor.function_name);
        let outcome =
            self.store
                .update_with_imports(&descriptor.source_identity, &block, &key, &imports);
        debug!("{}: {outcome:?}", descriptor.function_name);
        outcome
    }
}

/// A function that documents itself each time it returns
pub struct Observed<F> {
    meta: Arc<FunctionMeta>,
    func: F,
    autodoc: Autodoc,
}

impl<F: Clone> Clone for Observed<F> {
    fn clone(&self) -> Self {
        Observed {
            meta: Arc::clone(&self.meta),
            func: self.func.clone(),
            autodoc: self.autodoc.clone(),
        }
    }
}

impl<F> Observed<F> {
    pub fn meta(&self) -> &FunctionMeta {
        &self.meta
    }

    /// Call the wrapped function and return its result unchanged.
    ///
    /// A panic in the function unwinds before anything is documented.
    pub fn call<T>(&self, args: &CallArgs) -> T
    where
        F: Fn(&CallArgs) -> T,
        T: ToValue,
    {
        let result = (self.func)(args);
        self.autodoc.document(&self.meta, args, &result.to_value());
        result
    }

    /// Like [`Observed::call`]; an `Err` is returned as is and documents nothing
    pub fn try_call<T, E>(&self, args: &CallArgs) -> Result<T, E>
    where
        F: Fn(&CallArgs) -> Result<T, E>,
        T: ToValue,
    {
        let result = (self.func)(args)?;
        self.autodoc.document(&self.meta, args, &result.to_value());
        Ok(result)
    }
}

/// Wrap `func` with the default configuration
pub fn autodoc<F>(meta: FunctionMeta, func: F) -> Observed<F> {
    Autodoc::default().observe(meta, func)
}
