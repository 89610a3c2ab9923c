//! Watching a subtree for inserted content and re-scanning it.
//!
//! One background task per observed root. Insertions are buffered and
//! flushed after a quiet period (`debounce_ms`); a rapid burst of
//! insertions triggers one scan, not one per node. Removals prune the
//! runtime's element records immediately, without debounce.

use std::sync::{Arc, Weak};
use std::time::Duration;

use tokio::sync::broadcast;
use tokio::sync::broadcast::error::RecvError;
use tokio::time::{Instant, sleep_until};
use tokio_util::sync::CancellationToken;

use graft_dom::{Element, MutationRecord};

use crate::runtime::{Runtime, RuntimeInner};

/// A handle to one running observer.
///
/// Cloning is cheap; clones control the same observer. Dropping every
/// handle does not stop the task — call [`ObserverHandle::disconnect`]
/// (or [`Runtime::disconnect`]).
#[derive(Clone)]
pub struct ObserverHandle {
    pub(crate) root: Element,
    pub(crate) token: CancellationToken,
}

impl ObserverHandle {
    /// The root this observer watches.
    #[must_use]
    pub fn root(&self) -> &Element {
        &self.root
    }

    /// Stop the observer. Buffered insertions that have not flushed yet
    /// are dropped. Idempotent.
    pub fn disconnect(&self) {
        self.token.cancel();
    }

    /// Whether the observer is still running.
    #[must_use]
    pub fn is_active(&self) -> bool {
        !self.token.is_cancelled()
    }
}

impl std::fmt::Debug for ObserverHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ObserverHandle")
            .field("root", &self.root.id())
            .field("active", &self.is_active())
            .finish()
    }
}

impl Runtime {
    /// Start observing a subtree (default: the document root) for
    /// inserted content.
    ///
    /// At most one observer runs per root: observing a root that is
    /// already observed returns a handle to the existing observer
    /// instead of starting a second task.
    pub fn observe(&self, root: Option<&Element>) -> ObserverHandle {
        let root = root.unwrap_or_else(|| self.inner.document.root()).clone();
        let mut watchers = self.inner.watchers.lock().expect("watcher lock poisoned");

        if let Some(handle) = watchers.get(&root.id())
            && handle.is_active()
        {
            return handle.clone();
        }

        let token = CancellationToken::new();
        let handle = ObserverHandle {
            root: root.clone(),
            token: token.clone(),
        };
        tokio::spawn(watch_task(
            Arc::downgrade(&self.inner),
            root.clone(),
            self.inner.document.subscribe(),
            token,
            self.inner.config.debounce(),
        ));
        watchers.insert(root.id(), handle.clone());
        tracing::debug!(root = %root.id(), "graft.watch.started");
        handle
    }

    /// Stop the observer for one root, or every observer when `root` is
    /// `None`.
    pub fn disconnect(&self, root: Option<&Element>) {
        let mut watchers = self.inner.watchers.lock().expect("watcher lock poisoned");
        match root {
            Some(root) => {
                if let Some(handle) = watchers.remove(&root.id()) {
                    handle.disconnect();
                }
            }
            None => {
                for (_, handle) in watchers.drain() {
                    handle.disconnect();
                }
            }
        }
    }
}

/// The observer loop.
///
/// Holds only a weak reference to the runtime, so an observer never
/// keeps a dropped runtime alive; the task exits when the runtime is
/// gone, the channel closes, or the token is cancelled.
async fn watch_task(
    runtime: Weak<RuntimeInner>,
    root: Element,
    mut mutations: broadcast::Receiver<MutationRecord>,
    token: CancellationToken,
    debounce: Duration,
) {
    // Buffered insertion roots, deduplicated by node id. A new insertion
    // pushes the flush deadline back out; the burst flushes as one batch.
    let mut buffer: Vec<Element> = Vec::new();
    let mut rescan_root = false;
    let mut deadline: Option<Instant> = None;

    loop {
        tokio::select! {
            () = token.cancelled() => break,

            record = mutations.recv() => match record {
                Ok(MutationRecord::Added { nodes }) => {
                    for node in nodes {
                        if node.is_within(&root)
                            && !buffer.iter().any(|b| b.id() == node.id())
                        {
                            buffer.push(node);
                        }
                    }
                    if !buffer.is_empty() {
                        deadline = Some(Instant::now() + debounce);
                    }
                }
                Ok(MutationRecord::Removed { nodes }) => {
                    let Some(runtime) = runtime.upgrade() else { break };
                    let mut ids = Vec::new();
                    for node in &nodes {
                        ids.push(node.id());
                        ids.extend(node.descendants().iter().map(Element::id));
                    }
                    runtime.state.prune(ids);
                    buffer.retain(Element::is_connected);
                    if buffer.is_empty() && !rescan_root {
                        deadline = None;
                    }
                }
                Ok(_) => {}
                Err(RecvError::Lagged(skipped)) => {
                    // Records were dropped; give up on the buffer and
                    // resynchronize with a full rescan of the root.
                    tracing::warn!(skipped, root = %root.id(), "graft.watch.lagged");
                    buffer.clear();
                    rescan_root = true;
                    deadline = Some(Instant::now() + debounce);
                }
                Err(RecvError::Closed) => break,
            },

            // Disabled branches still evaluate their expression, hence
            // the fallback instant.
            () = sleep_until(deadline.unwrap_or_else(Instant::now)), if deadline.is_some() => {
                deadline = None;
                let Some(runtime) = runtime.upgrade() else { break };
                let runtime = Runtime { inner: runtime };
                if rescan_root {
                    rescan_root = false;
                    buffer.clear();
                    runtime.scan(Some(&root)).await;
                } else {
                    let batch: Vec<Element> = buffer.drain(..).collect();
                    for node in &batch {
                        if node.is_connected() {
                            runtime.scan(Some(node)).await;
                        }
                    }
                }
            }
        }
    }

    tracing::debug!(root = %root.id(), "graft.watch.stopped");
}
