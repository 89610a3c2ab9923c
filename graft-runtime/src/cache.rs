//! Memoized behavior loads with single-flight deduplication.
//!
//! Entry life cycle: `Vacant → InFlight → Ready`, or back to `Vacant`
//! when the load fails — failures never poison an entry, so a later
//! resolve retries. At most one loader invocation per name is running at
//! any time; concurrent resolves for the same name join the in-flight
//! load through a `watch` channel.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use tokio::sync::watch;

use graft_core::{BehaviorDefinition, BehaviorLoader, BehaviorModule, LoadError};

use crate::stats::Stats;

type LoadResult = Result<Arc<BehaviorModule>, Arc<LoadError>>;
type FlightReceiver = watch::Receiver<Option<LoadResult>>;

enum Slot {
    InFlight(FlightReceiver),
    Ready(Arc<BehaviorModule>),
}

enum Plan {
    Hit(Arc<BehaviorModule>),
    Join(FlightReceiver),
    Load(watch::Sender<Option<LoadResult>>),
}

pub(crate) struct ModuleCache {
    slots: Mutex<HashMap<String, Slot>>,
    loader: Arc<dyn BehaviorLoader>,
    stats: Arc<Stats>,
}

impl ModuleCache {
    pub(crate) fn new(loader: Arc<dyn BehaviorLoader>, stats: Arc<Stats>) -> Self {
        Self {
            slots: Mutex::new(HashMap::new()),
            loader,
            stats,
        }
    }

    /// Resolve a definition to its loaded module.
    ///
    /// Single-flight: the first caller per name runs the loader, later
    /// concurrent callers await the same outcome. Both see the identical
    /// module (or the identical error).
    pub(crate) async fn resolve(&self, definition: &BehaviorDefinition) -> LoadResult {
        loop {
            let plan = {
                let mut slots = self.slots.lock().expect("cache lock poisoned");
                match slots.get(&definition.name) {
                    Some(Slot::Ready(module)) => Plan::Hit(module.clone()),
                    Some(Slot::InFlight(rx)) => Plan::Join(rx.clone()),
                    None => {
                        let (tx, rx) = watch::channel(None);
                        slots.insert(definition.name.clone(), Slot::InFlight(rx));
                        Plan::Load(tx)
                    }
                }
            };

            match plan {
                Plan::Hit(module) => {
                    self.stats.record_cache_hit();
                    return Ok(module);
                }
                Plan::Join(rx) => {
                    self.stats.record_cache_hit();
                    match self.join_flight(rx).await {
                        Some(result) => return result,
                        // The loading task vanished without reporting;
                        // retake the slot and load again.
                        None => {
                            self.clear_dead_flight(&definition.name);
                            continue;
                        }
                    }
                }
                Plan::Load(tx) => return self.run_load(definition, tx).await,
            }
        }
    }

    /// The resolved module for a name, when it is already loaded.
    ///
    /// Synchronous; used by the remover to reach a teardown without ever
    /// triggering a load.
    pub(crate) fn get_ready(&self, name: &str) -> Option<Arc<BehaviorModule>> {
        let slots = self.slots.lock().expect("cache lock poisoned");
        match slots.get(name) {
            Some(Slot::Ready(module)) => Some(module.clone()),
            _ => None,
        }
    }

    async fn join_flight(&self, mut rx: FlightReceiver) -> Option<LoadResult> {
        loop {
            if let Some(result) = rx.borrow().clone() {
                return Some(result);
            }
            if rx.changed().await.is_err() {
                // Sender dropped without publishing a result.
                return rx.borrow().clone();
            }
        }
    }

    fn clear_dead_flight(&self, name: &str) {
        let mut slots = self.slots.lock().expect("cache lock poisoned");
        if let Some(Slot::InFlight(rx)) = slots.get(name)
            && rx.has_changed().is_err()
        {
            slots.remove(name);
        }
    }

    async fn run_load(
        &self,
        definition: &BehaviorDefinition,
        tx: watch::Sender<Option<LoadResult>>,
    ) -> LoadResult {
        self.stats.record_load_started();
        tracing::debug!(behavior = %definition.name, loader_ref = %definition.loader_ref, "graft.load.start");
        let loaded = self.loader.load(definition).await;
        self.stats.record_load_finished();

        let mut slots = self.slots.lock().expect("cache lock poisoned");
        match loaded {
            Ok(module) => {
                let module = Arc::new(module);
                slots.insert(definition.name.clone(), Slot::Ready(module.clone()));
                let _ = tx.send(Some(Ok(module.clone())));
                Ok(module)
            }
            Err(error) => {
                // Clear, never poison: the next resolve retries.
                slots.remove(&definition.name);
                self.stats.record_load_failure();
                tracing::warn!(behavior = %definition.name, %error, "graft.load.failed");
                let error = Arc::new(error);
                let _ = tx.send(Some(Err(error.clone())));
                Err(error)
            }
        }
    }
}

impl std::fmt::Debug for ModuleCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let slots = self.slots.lock().expect("cache lock poisoned");
        let ready = slots
            .values()
            .filter(|slot| matches!(slot, Slot::Ready(_)))
            .count();
        f.debug_struct("ModuleCache")
            .field("entries", &slots.len())
            .field("ready", &ready)
            .finish()
    }
}
