//! The document: owns the root element and the mutation stream.

use std::sync::Arc;

use tokio::sync::broadcast;

use crate::element::{Element, NodeId};
use crate::mutation::MutationRecord;

/// Capacity of the mutation broadcast channel.
///
/// Bounded so a stalled subscriber cannot grow memory without limit; a
/// subscriber that lags past this many records observes a `Lagged` error
/// and must resynchronize (e.g. by rescanning its root).
const MUTATION_CHANNEL_CAPACITY: usize = 256;

pub(crate) struct DocumentShared {
    root_id: std::sync::OnceLock<NodeId>,
    mutations: broadcast::Sender<MutationRecord>,
}

impl DocumentShared {
    pub(crate) fn root_id(&self) -> NodeId {
        *self
            .root_id
            .get()
            .expect("document root is set during construction")
    }

    pub(crate) fn publish(&self, record: MutationRecord) {
        // Send only fails when there are no subscribers; that is fine.
        let _ = self.mutations.send(record);
    }
}

/// An element tree with a single root and a mutation broadcast stream.
///
/// Cloning is cheap; clones share the same tree. Elements are created
/// detached via [`Document::create_element`] and become *connected* once
/// appended under the root (directly or transitively). Only connected
/// insertions and removals are published on the stream.
#[derive(Clone)]
pub struct Document {
    shared: Arc<DocumentShared>,
    root: Element,
}

impl Document {
    /// Create an empty document whose root element has tag `body`.
    #[must_use]
    pub fn new() -> Self {
        let (mutations, _) = broadcast::channel(MUTATION_CHANNEL_CAPACITY);
        let shared = Arc::new(DocumentShared {
            root_id: std::sync::OnceLock::new(),
            mutations,
        });
        let root = Element::new("body", Arc::downgrade(&shared));
        shared
            .root_id
            .set(root.id())
            .expect("root id is set exactly once");
        Self { shared, root }
    }

    /// The root element.
    #[must_use]
    pub fn root(&self) -> &Element {
        &self.root
    }

    /// Create a new detached element belonging to this document.
    #[must_use]
    pub fn create_element(&self, tag: impl Into<String>) -> Element {
        Element::new(tag, Arc::downgrade(&self.shared))
    }

    /// Subscribe to structural mutations of the connected tree.
    ///
    /// The channel is bounded; see [`MutationRecord`] for what is
    /// reported. Each receiver sees records published after it
    /// subscribed.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<MutationRecord> {
        self.shared.mutations.subscribe()
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Document {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Document")
            .field("root", &self.root)
            .finish_non_exhaustive()
    }
}
