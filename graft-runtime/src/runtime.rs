//! The runtime value: registry, cache, element records, config, stats,
//! and the scan/remove/preload operations.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use futures::future::join_all;
use thiserror::Error;

use graft_core::{BehaviorDefinition, BehaviorLoader};
use graft_dom::{Document, Element, NodeId};

use crate::cache::ModuleCache;
use crate::config::Config;
use crate::marker;
use crate::registry::Registry;
use crate::state::StateMap;
use crate::stats::{Stats, StatsSnapshot};
use crate::watcher::ObserverHandle;

/// `Runtime::init` failed before any element was touched.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum InitError {
    /// A definition had an unusable name (empty, or containing
    /// whitespace — such a name could never round-trip through the
    /// marker attribute).
    #[error("invalid behavior name: {0:?}")]
    InvalidName(String),
}

/// Options for [`Runtime::init`].
///
/// Builder-style: start from [`RuntimeOptions::new`] with the loader,
/// then chain. Defaults: initial scan on, observation of the document
/// root on, nothing preloaded, no config overrides.
pub struct RuntimeOptions {
    pub(crate) definitions: Vec<BehaviorDefinition>,
    pub(crate) loader: Arc<dyn BehaviorLoader>,
    pub(crate) scan: bool,
    pub(crate) observe: bool,
    pub(crate) preload: Vec<String>,
    pub(crate) config: HashMap<String, serde_json::Value>,
}

impl RuntimeOptions {
    /// Options with the given loader and all defaults.
    #[must_use]
    pub fn new(loader: Arc<dyn BehaviorLoader>) -> Self {
        Self {
            definitions: Vec::new(),
            loader,
            scan: true,
            observe: true,
            preload: Vec::new(),
            config: HashMap::new(),
        }
    }

    /// Register one behavior definition.
    #[must_use]
    pub fn definition(mut self, definition: BehaviorDefinition) -> Self {
        self.definitions.push(definition);
        self
    }

    /// Register many behavior definitions.
    #[must_use]
    pub fn definitions(mut self, definitions: impl IntoIterator<Item = BehaviorDefinition>) -> Self {
        self.definitions.extend(definitions);
        self
    }

    /// Whether `init` performs the initial document scan.
    #[must_use]
    pub fn scan(mut self, scan: bool) -> Self {
        self.scan = scan;
        self
    }

    /// Whether `init` starts observing the document root.
    #[must_use]
    pub fn observe(mut self, observe: bool) -> Self {
        self.observe = observe;
        self
    }

    /// Behaviors to warm the cache with before the initial scan.
    #[must_use]
    pub fn preload(mut self, names: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.preload.extend(names.into_iter().map(Into::into));
        self
    }

    /// Override one configuration value (see [`crate::config::keys`]).
    #[must_use]
    pub fn config_value(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.config.insert(key.into(), value);
        self
    }
}

impl std::fmt::Debug for RuntimeOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RuntimeOptions")
            .field("definitions", &self.definitions.len())
            .field("scan", &self.scan)
            .field("observe", &self.observe)
            .field("preload", &self.preload)
            .finish_non_exhaustive()
    }
}

pub(crate) struct RuntimeInner {
    pub(crate) document: Document,
    pub(crate) registry: Registry,
    pub(crate) cache: ModuleCache,
    pub(crate) state: StateMap,
    pub(crate) config: Config,
    pub(crate) stats: Arc<Stats>,
    pub(crate) watchers: Mutex<HashMap<NodeId, ObserverHandle>>,
}

/// The behavior runtime for one document.
///
/// Constructed by [`Runtime::init`] and threaded explicitly through
/// every collaborator — there is no module-level global, so multiple
/// runtimes (one per test, one per embedded document) never interfere.
///
/// Cloning is cheap and clones share all state.
#[derive(Clone)]
pub struct Runtime {
    pub(crate) inner: Arc<RuntimeInner>,
}

impl Runtime {
    /// Build the registry and configuration, optionally warm the cache,
    /// and optionally perform the initial scan and start observing the
    /// document root.
    ///
    /// With `lazy_load` configured off, every registered behavior is
    /// loaded eagerly before the initial scan.
    ///
    /// # Errors
    ///
    /// [`InitError::InvalidName`] when a definition's name is empty or
    /// contains whitespace.
    pub async fn init(document: Document, options: RuntimeOptions) -> Result<Self, InitError> {
        for definition in &options.definitions {
            if definition.name.is_empty() || definition.name.contains(char::is_whitespace) {
                return Err(InitError::InvalidName(definition.name.clone()));
            }
        }

        let stats = Arc::new(Stats::default());
        let runtime = Self {
            inner: Arc::new(RuntimeInner {
                document,
                registry: Registry::build(options.definitions),
                cache: ModuleCache::new(options.loader, stats.clone()),
                state: StateMap::default(),
                config: Config::new(options.config),
                stats,
                watchers: Mutex::new(HashMap::new()),
            }),
        };

        if !runtime.inner.config.lazy_load() {
            let all = runtime.list();
            runtime.preload(&all).await;
        } else if !options.preload.is_empty() {
            runtime.preload(&options.preload).await;
        }

        if options.scan {
            runtime.scan(None).await;
        }
        if options.observe {
            let _ = runtime.observe(None);
        }

        tracing::debug!(
            behaviors = runtime.inner.registry.len(),
            scan = options.scan,
            observe = options.observe,
            "graft.init.ready"
        );
        Ok(runtime)
    }

    /// The document this runtime enhances.
    #[must_use]
    pub fn document(&self) -> &Document {
        &self.inner.document
    }

    /// The behavior registry.
    #[must_use]
    pub fn registry(&self) -> &Registry {
        &self.inner.registry
    }

    /// Whether a behavior with this name is registered.
    #[must_use]
    pub fn has(&self, name: &str) -> bool {
        self.inner.registry.has(name)
    }

    /// All registered behavior names, sorted.
    #[must_use]
    pub fn list(&self) -> Vec<String> {
        self.inner.registry.list()
    }

    /// Process-wide configuration.
    #[must_use]
    pub fn config(&self) -> &Config {
        &self.inner.config
    }

    /// A read-only snapshot of the runtime counters.
    #[must_use]
    pub fn stats(&self) -> StatsSnapshot {
        self.inner.stats.snapshot()
    }

    /// The behavior names currently applied to an element, sorted.
    #[must_use]
    pub fn applied(&self, element: &Element) -> Vec<String> {
        self.inner.state.applied(element.id())
    }

    /// Walk a subtree and apply every requested, not-yet-applied
    /// behavior under `root` (default: the document root), root
    /// included.
    ///
    /// With `auto_inject` configured on, elements without a marker
    /// attribute also get the behaviors registered for their tag; an
    /// explicit marker attribute overrides the implicit mapping.
    ///
    /// Best-effort fan-out: every (element, name) pair is injected
    /// concurrently and one failing pair never blocks the others.
    /// Re-scanning an already-enhanced subtree is a no-op for applied
    /// pairs, which is what makes overlapping scans safe.
    pub async fn scan(&self, root: Option<&Element>) {
        let root = root.unwrap_or_else(|| self.inner.document.root());
        self.inner.state.sweep();
        let auto = self.inner.config.auto_inject();

        let mut elements = 0usize;
        let mut pairs: Vec<(Element, String)> = Vec::new();
        for element in std::iter::once(root.clone()).chain(root.descendants()) {
            let names = if element.has_attribute(marker::MARKER_ATTR) {
                marker::requested(&element)
            } else if auto {
                self.inner.registry.auto_behaviors(&element)
            } else {
                Vec::new()
            };
            if names.is_empty() {
                continue;
            }
            elements += 1;
            for name in names {
                pairs.push((element.clone(), name));
            }
        }

        let count = pairs.len();
        join_all(
            pairs
                .iter()
                .map(|(element, name)| self.inject(element, name, None)),
        )
        .await;

        tracing::debug!(elements, pairs = count, "graft.scan.done");
    }

    /// Reverse one behavior (or all of them) on one element.
    ///
    /// Runs the cached teardown when the module has one, drops the name
    /// from the element's applied record, and rewrites the marker
    /// attribute to exclude it. A pair whose load is still in flight is
    /// revoked instead: the injection abandons when the load lands.
    /// Synchronous and best-effort: a behavior lacking teardown leaves
    /// its visual effect but counts as unapplied, so a later scan
    /// re-invokes its setup.
    pub fn remove(&self, element: &Element, name: Option<&str>) {
        let names = match name {
            Some(name) => vec![name.to_string()],
            None => self.inner.state.tracked(element.id()),
        };

        for name in &names {
            // `unapply` claims the teardown; a racing remove gets false.
            if self.inner.state.unapply(element.id(), name) {
                if let Some(module) = self.inner.cache.get_ready(name) {
                    module.teardown(element);
                }
            } else if !self.inner.state.revoke(element.id(), name) {
                continue;
            }
            marker::remove_name(element, name);
            tracing::debug!(behavior = %name, element = %element.id(), "graft.remove.done");
        }

        if !self.inner.state.is_ready(element.id()) {
            element.remove_attribute(marker::READY_ATTR);
        }
    }

    /// Warm the module cache for a list of names without touching any
    /// element.
    ///
    /// Resolves once all loads settle; a failed or unknown name counts
    /// in the stats and does not fail the others.
    pub async fn preload<S: AsRef<str>>(&self, names: &[S]) {
        let futures = names.iter().filter_map(|name| {
            let name = name.as_ref();
            match self.inner.registry.definition(name) {
                Some(definition) => Some(async move {
                    let _ = self.inner.cache.resolve(definition).await;
                }),
                None => {
                    self.inner.stats.record_missing();
                    tracing::debug!(behavior = %name, "graft.preload.missing");
                    None
                }
            }
        });
        join_all(futures).await;
        tracing::debug!(requested = names.len(), "graft.preload.done");
    }
}

impl std::fmt::Debug for Runtime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Runtime")
            .field("behaviors", &self.inner.registry.len())
            .field("stats", &self.stats())
            .finish_non_exhaustive()
    }
}
