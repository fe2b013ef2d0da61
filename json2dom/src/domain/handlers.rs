//! Named callbacks that text descriptions can reference.

use std::collections::BTreeMap;

use tracing::info;

use crate::domain::value::Callback;

/// Maps handler names to callbacks.
///
/// Text formats cannot carry functions, so a description writes
/// `{"$handler": "name"}` and the parser resolves it here.
#[derive(Debug, Clone, Default)]
pub struct HandlerRegistry {
    handlers: BTreeMap<String, Callback>,
}

impl HandlerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry where every name maps to a callback that only logs its invocation.
    pub fn logging<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut registry = Self::new();
        for name in names {
            let name = name.into();
            let label = name.clone();
            registry.insert(Callback::new(name, move || {
                info!(handler = %label, "handler invoked");
            }));
        }
        registry
    }

    pub fn register(&mut self, name: impl Into<String>, func: impl Fn() + 'static) -> &mut Self {
        self.insert(Callback::new(name, func));
        self
    }

    /// Add a callback under its own name, replacing any previous one.
    pub fn insert(&mut self, callback: Callback) {
        self.handlers.insert(callback.name().to_string(), callback);
    }

    pub fn get(&self, name: &str) -> Option<&Callback> {
        self.handlers.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.handlers.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.handlers.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}
