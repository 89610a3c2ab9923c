//! Element nodes: tag, attributes, parent/child links, connectivity.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock, Weak};

use crate::document::DocumentShared;
use crate::mutation::MutationRecord;

static NEXT_NODE_ID: AtomicU64 = AtomicU64::new(1);

/// Process-unique identifier of one element node.
///
/// Stable for the node's lifetime; never reused while the process runs.
/// Useful as a map key where holding an [`Element`] would keep the node
/// alive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(u64);

impl NodeId {
    fn next() -> Self {
        Self(NEXT_NODE_ID.fetch_add(1, Ordering::Relaxed))
    }
}

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

pub(crate) struct NodeInner {
    id: NodeId,
    tag: String,
    attributes: RwLock<HashMap<String, String>>,
    parent: RwLock<Weak<NodeInner>>,
    children: RwLock<Vec<Element>>,
    document: Weak<DocumentShared>,
}

/// A handle to one element node in a [`Document`](crate::Document) tree.
///
/// Cloning is cheap and clones refer to the same node. Attribute and
/// structure mutations go through short synchronous critical sections;
/// no lock is observable across calls.
#[derive(Clone)]
pub struct Element {
    inner: Arc<NodeInner>,
}

impl Element {
    pub(crate) fn new(tag: impl Into<String>, document: Weak<DocumentShared>) -> Self {
        Self {
            inner: Arc::new(NodeInner {
                id: NodeId::next(),
                tag: tag.into(),
                attributes: RwLock::new(HashMap::new()),
                parent: RwLock::new(Weak::new()),
                children: RwLock::new(Vec::new()),
                document,
            }),
        }
    }

    /// This node's process-unique identifier.
    #[must_use]
    pub fn id(&self) -> NodeId {
        self.inner.id
    }

    /// The tag this element was created with (e.g. `"div"`).
    #[must_use]
    pub fn tag(&self) -> &str {
        &self.inner.tag
    }

    /// Read one attribute value.
    #[must_use]
    pub fn attribute(&self, name: &str) -> Option<String> {
        self.inner
            .attributes
            .read()
            .expect("attribute lock poisoned")
            .get(name)
            .cloned()
    }

    /// Whether the attribute is present (even when empty).
    #[must_use]
    pub fn has_attribute(&self, name: &str) -> bool {
        self.inner
            .attributes
            .read()
            .expect("attribute lock poisoned")
            .contains_key(name)
    }

    /// Set one attribute, replacing any previous value.
    pub fn set_attribute(&self, name: impl Into<String>, value: impl Into<String>) {
        self.inner
            .attributes
            .write()
            .expect("attribute lock poisoned")
            .insert(name.into(), value.into());
    }

    /// Remove one attribute. Returns the previous value, if any.
    pub fn remove_attribute(&self, name: &str) -> Option<String> {
        self.inner
            .attributes
            .write()
            .expect("attribute lock poisoned")
            .remove(name)
    }

    /// The parent element, if attached to one.
    #[must_use]
    pub fn parent(&self) -> Option<Element> {
        self.inner
            .parent
            .read()
            .expect("parent lock poisoned")
            .upgrade()
            .map(|inner| Element { inner })
    }

    /// Snapshot of the direct children, in insertion order.
    #[must_use]
    pub fn children(&self) -> Vec<Element> {
        self.inner
            .children
            .read()
            .expect("children lock poisoned")
            .clone()
    }

    /// Append `child` as the last child of this element.
    ///
    /// A child that is already attached elsewhere is detached first. When
    /// the insertion lands in the connected tree, a
    /// [`MutationRecord::Added`] carrying the inserted node is published
    /// on the document stream.
    ///
    /// Appending an element under itself or one of its descendants would
    /// create a parent cycle; such an append is rejected as a no-op.
    pub fn append_child(&self, child: &Element) {
        if self.is_within(child) {
            return;
        }
        if child.parent().is_some() {
            child.detach();
        }

        self.inner
            .children
            .write()
            .expect("children lock poisoned")
            .push(child.clone());
        *child.inner.parent.write().expect("parent lock poisoned") = Arc::downgrade(&self.inner);

        if self.is_connected()
            && let Some(doc) = self.inner.document.upgrade()
        {
            doc.publish(MutationRecord::Added {
                nodes: vec![child.clone()],
            });
        }
    }

    /// Detach this element from its parent.
    ///
    /// No-op for an element without a parent (including the document
    /// root). When the element was part of the connected tree, a
    /// [`MutationRecord::Removed`] carrying it is published.
    pub fn detach(&self) {
        let Some(parent) = self.parent() else {
            return;
        };
        let was_connected = self.is_connected();

        parent
            .inner
            .children
            .write()
            .expect("children lock poisoned")
            .retain(|c| c.id() != self.id());
        *self.inner.parent.write().expect("parent lock poisoned") = Weak::new();

        if was_connected
            && let Some(doc) = self.inner.document.upgrade()
        {
            doc.publish(MutationRecord::Removed {
                nodes: vec![self.clone()],
            });
        }
    }

    /// Whether this element is reachable from its document's root.
    #[must_use]
    pub fn is_connected(&self) -> bool {
        let Some(doc) = self.inner.document.upgrade() else {
            return false;
        };
        let mut current = self.clone();
        loop {
            if current.id() == doc.root_id() {
                return true;
            }
            match current.parent() {
                Some(parent) => current = parent,
                None => return false,
            }
        }
    }

    /// Whether `ancestor` is this element or one of its ancestors.
    #[must_use]
    pub fn is_within(&self, ancestor: &Element) -> bool {
        let mut current = self.clone();
        loop {
            if current.id() == ancestor.id() {
                return true;
            }
            match current.parent() {
                Some(parent) => current = parent,
                None => return false,
            }
        }
    }

    /// Snapshot of all descendants in depth-first order, self excluded.
    #[must_use]
    pub fn descendants(&self) -> Vec<Element> {
        let mut out = Vec::new();
        let mut stack: Vec<Element> = self.children();
        stack.reverse();
        while let Some(el) = stack.pop() {
            out.push(el.clone());
            let mut children = el.children();
            children.reverse();
            stack.extend(children);
        }
        out
    }

    /// Downgrade to a handle that does not keep the node alive.
    #[must_use]
    pub fn downgrade(&self) -> WeakElement {
        WeakElement {
            inner: Arc::downgrade(&self.inner),
        }
    }
}

impl PartialEq for Element {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl Eq for Element {}

impl std::fmt::Debug for Element {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Element")
            .field("id", &self.inner.id)
            .field("tag", &self.inner.tag)
            .finish_non_exhaustive()
    }
}

/// A non-owning handle to an element node.
#[derive(Clone)]
pub struct WeakElement {
    inner: Weak<NodeInner>,
}

impl WeakElement {
    /// Upgrade to a strong handle while the node is still alive.
    #[must_use]
    pub fn upgrade(&self) -> Option<Element> {
        self.inner.upgrade().map(|inner| Element { inner })
    }
}

impl std::fmt::Debug for WeakElement {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("WeakElement")
    }
}
