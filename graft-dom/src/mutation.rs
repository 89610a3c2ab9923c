//! Structural change records published by a document.

use crate::element::Element;

/// One structural change to the connected tree.
///
/// Records carry only the top node of the affected subtree; subscribers
/// that care about descendants traverse from there. Attribute edits are
/// deliberately not reported — the marker attribute is a serialized view
/// of runtime state, and reacting to its edits invites double-application
/// races.
#[derive(Debug, Clone)]
#[non_exhaustive]
pub enum MutationRecord {
    /// Nodes inserted into the connected tree.
    Added {
        /// Top nodes of the inserted subtrees.
        nodes: Vec<Element>,
    },
    /// Nodes detached from the connected tree.
    Removed {
        /// Top nodes of the removed subtrees.
        nodes: Vec<Element>,
    },
}
