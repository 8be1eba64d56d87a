//! Name → factory registry for parser adapters.
//!
//! Built once at startup, then shared read-only (usually behind an `Arc`).
//! Every lookup constructs a fresh adapter so no state leaks between
//! benchmarks or workers.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::adapter::{HttpAdapter, HttparseAdapter, ParserAdapter};
use crate::error::AdapterError;
use crate::types::Orientation;

/// Constructor producing an adapter bound to an orientation.
pub type AdapterFactory = Arc<dyn Fn(Orientation) -> Box<dyn ParserAdapter> + Send + Sync>;

/// Registry of parser backends keyed by library name.
#[derive(Clone)]
pub struct AdapterRegistry {
    factories: HashMap<String, AdapterFactory>,
    /// Names in registration order.
    order: Vec<String>,
    /// Alternate name → registered name.
    aliases: HashMap<String, String>,
}

impl AdapterRegistry {
    /// Create an empty registry.
    pub fn empty() -> Self {
        Self {
            factories: HashMap::new(),
            order: Vec::new(),
            aliases: HashMap::new(),
        }
    }

    /// Create a registry holding the built-in backends.
    pub fn new() -> Self {
        let mut registry = Self::empty();
        registry.register(HttpAdapter::NAME, |o| Box::new(HttpAdapter::new(o)));
        registry.register(HttparseAdapter::NAME, |o| Box::new(HttparseAdapter::new(o)));
        registry.alias("net/http", HttpAdapter::NAME);
        registry.alias("fasthttp", HttparseAdapter::NAME);
        registry
    }

    /// Create the default registry wrapped in an Arc for sharing across threads.
    pub fn new_shared() -> Arc<Self> {
        Arc::new(Self::new())
    }

    /// Register a factory under `name`, replacing any previous one.
    pub fn register<F>(&mut self, name: impl Into<String>, factory: F)
    where
        F: Fn(Orientation) -> Box<dyn ParserAdapter> + Send + Sync + 'static,
    {
        let name = name.into();
        if self.factories.insert(name.clone(), Arc::new(factory)).is_none() {
            self.order.push(name);
        } else {
            tracing::debug!(library = %name, "Replaced adapter factory");
        }
    }

    /// Make `alias` resolve to `target` on lookup.
    ///
    /// Aliases are not listed by [`available`](Self::available), and a
    /// registered name always wins over an alias of the same spelling.
    pub fn alias(&mut self, alias: impl Into<String>, target: impl Into<String>) {
        self.aliases.insert(alias.into(), target.into());
    }

    /// Map an alias to its registered name; other names pass through.
    pub fn resolve<'a>(&'a self, name: &'a str) -> &'a str {
        if self.factories.contains_key(name) {
            return name;
        }
        self.aliases.get(name).map(String::as_str).unwrap_or(name)
    }

    /// Alias → registered name pairs, sorted by alias.
    pub fn aliases(&self) -> Vec<(String, String)> {
        let mut pairs: Vec<_> = self
            .aliases
            .iter()
            .map(|(a, t)| (a.clone(), t.clone()))
            .collect();
        pairs.sort();
        pairs
    }

    /// Construct a fresh adapter for `name` or one of its aliases.
    pub fn get(&self, name: &str, orientation: Orientation) -> Result<Box<dyn ParserAdapter>, AdapterError> {
        self.factories
            .get(self.resolve(name))
            .map(|factory| factory(orientation))
            .ok_or_else(|| AdapterError::NotFound {
                name: name.to_string(),
            })
    }

    /// Check if a library is registered.
    pub fn contains(&self, name: &str) -> bool {
        self.factories.contains_key(self.resolve(name))
    }

    /// Registered library names, in registration order.
    pub fn available(&self) -> Vec<String> {
        self.order.clone()
    }

    /// Get the number of registered libraries.
    pub fn len(&self) -> usize {
        self.factories.len()
    }

    /// Check if the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.factories.is_empty()
    }
}

impl Default for AdapterRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for AdapterRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AdapterRegistry")
            .field("libraries", &self.order)
            .field("aliases", &self.aliases)
            .finish()
    }
}
