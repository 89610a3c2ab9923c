//! How a definition becomes a loaded module.

use std::collections::HashMap;

use async_trait::async_trait;

use crate::behavior::BehaviorModule;
use crate::definition::BehaviorDefinition;
use crate::error::LoadError;

/// Produces a [`BehaviorModule`] for a definition, on demand.
///
/// The runtime calls `load` at most once per behavior name at a time
/// (single-flight) and memoizes the result; implementations do not need
/// their own caching or deduplication. A returned error is not sticky —
/// the runtime clears its entry and a later resolve calls `load` again.
#[async_trait]
pub trait BehaviorLoader: Send + Sync {
    /// Load the code unit `definition.loader_ref` points at.
    ///
    /// # Errors
    ///
    /// [`LoadError::NotFound`] when the locator resolves to nothing,
    /// [`LoadError::Failed`] (or `Other`) when producing the module
    /// failed.
    async fn load(&self, definition: &BehaviorDefinition) -> Result<BehaviorModule, LoadError>;
}

/// Loader for behaviors compiled into the binary.
///
/// Maps `loader_ref` strings to pre-built modules. This is the common
/// embedding case (and the test loader): the behavior table is linked in,
/// and "loading" is a map lookup.
#[derive(Default)]
pub struct StaticLoader {
    modules: HashMap<String, BehaviorModule>,
}

impl StaticLoader {
    /// Create an empty loader.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a module under a locator key, replacing any previous one.
    #[must_use]
    pub fn with_module(mut self, loader_ref: impl Into<String>, module: BehaviorModule) -> Self {
        self.modules.insert(loader_ref.into(), module);
        self
    }

    /// Number of registered modules.
    #[must_use]
    pub fn len(&self) -> usize {
        self.modules.len()
    }

    /// Whether no modules are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }
}

#[async_trait]
impl BehaviorLoader for StaticLoader {
    async fn load(&self, definition: &BehaviorDefinition) -> Result<BehaviorModule, LoadError> {
        self.modules
            .get(&definition.loader_ref)
            .cloned()
            .ok_or_else(|| LoadError::NotFound(definition.loader_ref.clone()))
    }
}

impl std::fmt::Debug for StaticLoader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StaticLoader")
            .field("modules", &self.modules.len())
            .finish()
    }
}
