#![deny(missing_docs)]
//! # graft-dom — the document substrate
//!
//! A small owned element tree standing in for a host document: elements
//! carry a tag, a string attribute map, parent/child links, and a notion
//! of connectivity (reachable from the document root). Structural changes
//! to the connected tree are published on a bounded broadcast stream so
//! subscribers can react to insertions and removals without polling.
//!
//! The tree is deliberately minimal. It models exactly what a
//! behavior-attachment runtime needs — discovery by attribute, subtree
//! traversal, attachment checks, and mutation notifications — and nothing
//! a renderer would want (no text nodes, no styles, no events).
//!
//! ## Handles
//!
//! [`Element`] is a cheap clonable handle (`Arc` inner). Two handles are
//! equal when they point at the same node. [`WeakElement`] does not keep
//! the node alive and is used by long-lived bookkeeping that must not
//! leak detached subtrees.

pub mod document;
pub mod element;
pub mod mutation;

pub use document::Document;
pub use element::{Element, NodeId, WeakElement};
pub use mutation::MutationRecord;
