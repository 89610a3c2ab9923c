//! Per-element applied/pending records — the source of truth the marker
//! attribute mirrors.
//!
//! All checks and transitions happen inside one short synchronous
//! critical section, before or after the injector's await points. That
//! discipline, not a lock held across `.await`, is what keeps overlapping
//! scans from double-applying a pair.

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use graft_dom::{Element, NodeId, WeakElement};

/// Outcome of claiming a (element, behavior) pair for injection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Claim {
    /// The pair is unapplied and now pending; the caller owns it.
    Started,
    /// The behavior is already applied to this element.
    AlreadyApplied,
    /// Another injection for this pair is in flight.
    AlreadyPending,
}

#[derive(Debug)]
struct ElementRecord {
    applied: HashSet<String>,
    pending: HashSet<String>,
    // Pending names removed while their load was in flight; the
    // injector observes these after its await point and abandons.
    revoked: HashSet<String>,
    ready: bool,
    handle: WeakElement,
}

impl ElementRecord {
    fn new(handle: WeakElement) -> Self {
        Self {
            applied: HashSet::new(),
            pending: HashSet::new(),
            revoked: HashSet::new(),
            ready: false,
            handle,
        }
    }

    fn is_empty(&self) -> bool {
        self.applied.is_empty() && self.pending.is_empty() && self.revoked.is_empty()
    }
}

/// Applied/pending behavior names per element.
///
/// Keyed by [`NodeId`] so records never keep elements alive; entries are
/// pruned when a watcher reports the subtree removed, swept lazily when
/// their node has been dropped, and vacuously when they empty out.
#[derive(Debug, Default)]
pub(crate) struct StateMap {
    records: Mutex<HashMap<NodeId, ElementRecord>>,
}

impl StateMap {
    /// Claim a pair for injection. Checks applied and pending sets and
    /// marks the pair pending in one critical section.
    pub(crate) fn claim(&self, element: &Element, name: &str) -> Claim {
        let mut records = self.records.lock().expect("state lock poisoned");
        let record = records
            .entry(element.id())
            .or_insert_with(|| ElementRecord::new(element.downgrade()));
        if record.applied.contains(name) {
            return Claim::AlreadyApplied;
        }
        if !record.pending.insert(name.to_string()) {
            return Claim::AlreadyPending;
        }
        record.revoked.remove(name);
        Claim::Started
    }

    /// Commit a claimed pair: pending → applied, element marked ready.
    pub(crate) fn commit(&self, id: NodeId, name: &str) {
        let mut records = self.records.lock().expect("state lock poisoned");
        if let Some(record) = records.get_mut(&id) {
            record.pending.remove(name);
            record.applied.insert(name.to_string());
            record.ready = true;
        }
    }

    /// Abandon a claimed pair (stale element, revoked, failed load or
    /// setup).
    pub(crate) fn abandon(&self, id: NodeId, name: &str) {
        let mut records = self.records.lock().expect("state lock poisoned");
        if let Some(record) = records.get_mut(&id) {
            record.pending.remove(name);
            record.revoked.remove(name);
            if record.is_empty() {
                records.remove(&id);
            }
        }
    }

    /// Revoke a pending pair: the element was asked to drop a behavior
    /// whose load is still in flight. Returns whether the name was
    /// pending; `true` means the in-flight injection will abandon.
    pub(crate) fn revoke(&self, id: NodeId, name: &str) -> bool {
        let mut records = self.records.lock().expect("state lock poisoned");
        let Some(record) = records.get_mut(&id) else {
            return false;
        };
        if !record.pending.contains(name) {
            return false;
        }
        record.revoked.insert(name.to_string());
        true
    }

    /// Whether a pending pair has been revoked mid-flight.
    pub(crate) fn is_revoked(&self, id: NodeId, name: &str) -> bool {
        self.records
            .lock()
            .expect("state lock poisoned")
            .get(&id)
            .is_some_and(|record| record.revoked.contains(name))
    }

    /// Drop one applied name. Returns whether it was applied; `true`
    /// means the caller claimed the teardown.
    pub(crate) fn unapply(&self, id: NodeId, name: &str) -> bool {
        let mut records = self.records.lock().expect("state lock poisoned");
        let Some(record) = records.get_mut(&id) else {
            return false;
        };
        let was_applied = record.applied.remove(name);
        if record.applied.is_empty() {
            record.ready = false;
            if record.is_empty() {
                records.remove(&id);
            }
        }
        was_applied
    }

    /// Names currently applied to the element, sorted.
    pub(crate) fn applied(&self, id: NodeId) -> Vec<String> {
        let records = self.records.lock().expect("state lock poisoned");
        let mut names: Vec<String> = records
            .get(&id)
            .map(|record| record.applied.iter().cloned().collect())
            .unwrap_or_default();
        names.sort();
        names
    }

    /// Applied and pending names for the element, sorted and deduped.
    pub(crate) fn tracked(&self, id: NodeId) -> Vec<String> {
        let records = self.records.lock().expect("state lock poisoned");
        let mut names: Vec<String> = records
            .get(&id)
            .map(|record| record.applied.union(&record.pending).cloned().collect())
            .unwrap_or_default();
        names.sort();
        names
    }

    /// Whether any applied names remain for the element.
    pub(crate) fn is_ready(&self, id: NodeId) -> bool {
        self.records
            .lock()
            .expect("state lock poisoned")
            .get(&id)
            .is_some_and(|record| record.ready)
    }

    /// Drop all records for the given elements.
    pub(crate) fn prune(&self, ids: impl IntoIterator<Item = NodeId>) {
        let mut records = self.records.lock().expect("state lock poisoned");
        for id in ids {
            records.remove(&id);
        }
    }

    /// Drop records whose node has been dropped.
    ///
    /// The lazy counterpart to watcher pruning: a runtime used without an
    /// observer still sheds records for dead nodes on its next scan.
    pub(crate) fn sweep(&self) {
        let mut records = self.records.lock().expect("state lock poisoned");
        records.retain(|_, record| record.handle.upgrade().is_some());
    }

    /// Number of tracked elements.
    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.records.lock().expect("state lock poisoned").len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use graft_dom::Document;

    #[test]
    fn claim_commit_cycle() {
        let doc = Document::new();
        let el = doc.create_element("div");
        let state = StateMap::default();

        assert_eq!(state.claim(&el, "dialog"), Claim::Started);
        assert_eq!(state.claim(&el, "dialog"), Claim::AlreadyPending);
        state.commit(el.id(), "dialog");
        assert_eq!(state.claim(&el, "dialog"), Claim::AlreadyApplied);
        assert_eq!(state.applied(el.id()), vec!["dialog"]);
        assert!(state.is_ready(el.id()));
    }

    #[test]
    fn abandon_clears_empty_records() {
        let doc = Document::new();
        let el = doc.create_element("div");
        let state = StateMap::default();

        assert_eq!(state.claim(&el, "dialog"), Claim::Started);
        state.abandon(el.id(), "dialog");
        assert_eq!(state.len(), 0);
        assert_eq!(state.claim(&el, "dialog"), Claim::Started);
    }

    #[test]
    fn unapply_claims_teardown_once() {
        let doc = Document::new();
        let el = doc.create_element("div");
        let state = StateMap::default();

        state.claim(&el, "dialog");
        state.commit(el.id(), "dialog");
        assert!(state.unapply(el.id(), "dialog"));
        assert!(!state.unapply(el.id(), "dialog"));
        assert!(!state.is_ready(el.id()));
        assert_eq!(state.len(), 0);
    }

    #[test]
    fn revoke_marks_only_pending_pairs() {
        let doc = Document::new();
        let el = doc.create_element("div");
        let state = StateMap::default();

        // Nothing claimed: nothing to revoke.
        assert!(!state.revoke(el.id(), "dialog"));

        state.claim(&el, "dialog");
        assert!(state.revoke(el.id(), "dialog"));
        assert!(state.is_revoked(el.id(), "dialog"));
        assert_eq!(state.tracked(el.id()), vec!["dialog"]);

        state.abandon(el.id(), "dialog");
        assert!(!state.is_revoked(el.id(), "dialog"));
        assert_eq!(state.len(), 0);

        // A fresh claim starts unrevoked.
        state.claim(&el, "dialog");
        assert!(!state.is_revoked(el.id(), "dialog"));

        // Applied pairs are not revocable; they go through unapply.
        state.commit(el.id(), "dialog");
        assert!(!state.revoke(el.id(), "dialog"));
    }

    #[test]
    fn sweep_drops_records_for_dead_nodes() {
        let doc = Document::new();
        let state = StateMap::default();

        let kept = doc.create_element("div");
        state.claim(&kept, "dialog");
        state.commit(kept.id(), "dialog");
        {
            let dropped = doc.create_element("div");
            state.claim(&dropped, "tooltip");
            state.commit(dropped.id(), "tooltip");
        }
        assert_eq!(state.len(), 2);

        state.sweep();
        assert_eq!(state.len(), 1);
        assert_eq!(state.applied(kept.id()), vec!["dialog"]);
    }
}
