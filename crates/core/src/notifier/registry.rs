//! Lookup of notification strategies by type tag.

use std::collections::HashMap;
use std::sync::Arc;

use super::config::NotifierConfig;
use super::error::NotifierError;
use super::http::HttpNotifier;
use super::traits::NotificationStrategy;

/// Strategies keyed by lowercased type tag.
#[derive(Default, Clone)]
pub struct NotifierRegistry {
    strategies: HashMap<String, Arc<dyn NotificationStrategy>>,
}

impl NotifierRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a registry with the built-in strategies.
    pub fn with_defaults(config: &NotifierConfig) -> Result<Self, NotifierError> {
        let mut registry = Self::new();
        registry.register(Arc::new(HttpNotifier::new(config)?));
        Ok(registry)
    }

    /// Adds a strategy, replacing any previous one for the same type.
    pub fn register(&mut self, strategy: Arc<dyn NotificationStrategy>) {
        self.strategies
            .insert(strategy.kind().to_lowercase(), strategy);
    }

    /// Resolves a strategy by type tag, ignoring case.
    pub fn get(&self, kind: &str) -> Option<Arc<dyn NotificationStrategy>> {
        self.strategies.get(&kind.to_lowercase()).cloned()
    }

    /// Registered type tags, sorted.
    pub fn kinds(&self) -> Vec<String> {
        let mut kinds: Vec<_> = self.strategies.keys().cloned().collect();
        kinds.sort();
        kinds
    }
}
