//! Pluggable request extensions.
//!
//! An extension is a named function that reads an ordered list of context
//! keys (`requires`) and writes an ordered list of keys (`produces`). Extensions
//! are registered by name in an `ExtensionRegistry` and looked up when the
//! pipeline runs, so new ones can be added without touching the session.

mod builtin;
mod pipeline;

pub use builtin::popupcheck;
pub use pipeline::run;

use std::collections::{BTreeMap, HashMap};
use std::fmt;

/// Header name to value.
pub type Headers = BTreeMap<String, String>;

/// The mutable mapping threaded through the pipeline.
pub type Context = BTreeMap<String, ContextValue>;

/// A value stored under a context key or returned by an extension.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContextValue {
    Null,
    Text(String),
    Headers(Headers),
    /// Returned by extensions producing several keys, one element per key.
    List(Vec<ContextValue>),
}

impl ContextValue {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            ContextValue::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_headers(&self) -> Option<&Headers> {
        match self {
            ContextValue::Headers(h) => Some(h),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, ContextValue::Null)
    }
}

impl From<&str> for ContextValue {
    fn from(s: &str) -> Self {
        ContextValue::Text(s.to_string())
    }
}

impl From<String> for ContextValue {
    fn from(s: String) -> Self {
        ContextValue::Text(s)
    }
}

impl From<Option<String>> for ContextValue {
    fn from(s: Option<String>) -> Self {
        s.map_or(ContextValue::Null, ContextValue::Text)
    }
}

impl From<Headers> for ContextValue {
    fn from(h: Headers) -> Self {
        ContextValue::Headers(h)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ExtensionError {
    /// No extension registered under this name. Aborts the whole pipeline.
    #[error("unknown extension `{0}`")]
    Unknown(String),
    #[error("extension `{name}` requires `{key}`, which is not in the context")]
    MissingKey { name: String, key: String },
    #[error("extension `{name}` produced {got} value(s), expected {expected}")]
    Arity {
        name: String,
        expected: usize,
        got: usize,
    },
    #[error("extension `{name}` failed: {reason}")]
    Failed { name: String, reason: String },
}

type InvokeFn = dyn Fn(&[ContextValue]) -> anyhow::Result<ContextValue> + Send + Sync;

/// A registered extension: its bindings plus the function to call.
pub struct Extension {
    name: String,
    requires: Vec<String>,
    produces: Vec<String>,
    invoke: Box<InvokeFn>,
}

impl Extension {
    /// `invoke` receives the `requires` values in declared order.
    pub fn new<F>(name: &str, requires: &[&str], produces: &[&str], invoke: F) -> Self
    where
        F: Fn(&[ContextValue]) -> anyhow::Result<ContextValue> + Send + Sync + 'static,
    {
        Self {
            name: name.to_string(),
            requires: requires.iter().map(|s| s.to_string()).collect(),
            produces: produces.iter().map(|s| s.to_string()).collect(),
            invoke: Box::new(invoke),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn requires(&self) -> &[String] {
        &self.requires
    }

    pub fn produces(&self) -> &[String] {
        &self.produces
    }

    pub fn call(&self, args: &[ContextValue]) -> anyhow::Result<ContextValue> {
        (self.invoke)(args)
    }
}

impl fmt::Debug for Extension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Extension")
            .field("name", &self.name)
            .field("requires", &self.requires)
            .field("produces", &self.produces)
            .finish_non_exhaustive()
    }
}

/// Name to extension table.
#[derive(Debug, Default)]
pub struct ExtensionRegistry {
    extensions: HashMap<String, Extension>,
}

impl ExtensionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry preloaded with the extensions shipped in this crate.
    pub fn builtin() -> Self {
        let mut registry = Self::new();
        registry.register(popupcheck());
        registry
    }

    /// Adds an extension, returning any previous one with the same name.
    pub fn register(&mut self, extension: Extension) -> Option<Extension> {
        self.extensions
            .insert(extension.name().to_string(), extension)
    }

    pub fn get(&self, name: &str) -> Option<&Extension> {
        self.extensions.get(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.extensions.keys().map(String::as_str)
    }
}
