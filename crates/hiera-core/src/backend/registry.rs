//! Registry of available backends, keyed by name

use super::{Backend, JsonBackend, YamlBackend};
use std::sync::Arc;

/// Registry mapping backend names to implementations.
///
/// The base configuration names backends; construction resolves each name
/// here once. Registration order is preserved.
///
/// # Example
///
/// ```
/// use hiera_core::backend::BackendRegistry;
///
/// let registry = BackendRegistry::with_builtins();
/// assert!(registry.get("yaml").is_some());
/// assert!(registry.get("toml").is_none());
/// ```
#[derive(Debug, Clone, Default)]
pub struct BackendRegistry {
    backends: Vec<Arc<dyn Backend>>,
}

impl BackendRegistry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self {
            backends: Vec::new(),
        }
    }

    /// Create a registry with the built-in `yaml` and `json` backends.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        registry.register(Arc::new(YamlBackend::new()));
        registry.register(Arc::new(JsonBackend::new()));
        registry
    }

    /// Register a backend.
    ///
    /// A backend with the same name is replaced in place.
    pub fn register(&mut self, backend: Arc<dyn Backend>) {
        match self.backends.iter().position(|b| b.name() == backend.name()) {
            Some(idx) => self.backends[idx] = backend,
            None => self.backends.push(backend),
        }
    }

    /// Get the backend registered under `name`.
    pub fn get(&self, name: &str) -> Option<Arc<dyn Backend>> {
        self.backends.iter().find(|b| b.name() == name).cloned()
    }

    /// Names of all registered backends, in registration order.
    pub fn names(&self) -> Vec<String> {
        self.backends.iter().map(|b| b.name().to_string()).collect()
    }

    /// Check if a backend is registered under `name`.
    pub fn contains(&self, name: &str) -> bool {
        self.backends.iter().any(|b| b.name() == name)
    }

    pub fn len(&self) -> usize {
        self.backends.len()
    }

    pub fn is_empty(&self) -> bool {
        self.backends.is_empty()
    }
}
