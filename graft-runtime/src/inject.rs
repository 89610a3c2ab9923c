//! Applying one behavior to one element, exactly once.

use serde_json::Value;

use graft_dom::Element;

use crate::marker;
use crate::runtime::Runtime;
use crate::state::Claim;

/// What happened to one (element, behavior) pair.
///
/// Injection never returns an error: every way a pair can fail to apply
/// is an expected outcome of a dynamic document, reported here and
/// counted in the stats, and must not abort the scan that requested it.
#[non_exhaustive]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InjectOutcome {
    /// Setup ran and the pair is now recorded as applied.
    Applied,
    /// The pair was already applied; nothing ran.
    AlreadyApplied,
    /// Another injection for the same pair is in flight; this call
    /// yielded to it.
    Pending,
    /// No behavior with this name is registered.
    Missing,
    /// The element left the document while the module was loading.
    Detached,
    /// The request was withdrawn while the module loaded: the pair was
    /// removed, or the marker attribute no longer listed the name.
    Stale,
    /// The loader failed; the cache entry was cleared for retry.
    LoadFailed,
    /// The module's setup returned an error; the pair stays unapplied.
    SetupFailed,
}

impl InjectOutcome {
    /// Whether this outcome means the behavior is applied now (freshly
    /// or from before).
    #[must_use]
    pub fn is_applied(self) -> bool {
        matches!(self, Self::Applied | Self::AlreadyApplied)
    }
}

impl Runtime {
    /// Apply one behavior to one element.
    ///
    /// The pair is claimed synchronously before the first await, which
    /// is what makes concurrent scans over the same element safe. After
    /// the module resolves, the claim is re-checked for a mid-load
    /// `remove` (revocation), then attachment, and — for
    /// marker-requested injections — the marker attribute: an element
    /// that was detached or edited mid-load is left alone.
    ///
    /// `options` is passed to the module's setup; `None` means the
    /// behavior's defaults.
    pub async fn inject(
        &self,
        element: &Element,
        name: &str,
        options: Option<Value>,
    ) -> InjectOutcome {
        let Some(definition) = self.inner.registry.definition(name) else {
            self.inner.stats.record_missing();
            tracing::warn!(behavior = %name, element = %element.id(), "graft.inject.missing");
            return InjectOutcome::Missing;
        };

        // Snapshots taken before any await; the post-load re-checks
        // compare against these, so a direct API injection of a
        // detached element is not mistaken for a mid-load detach.
        let was_connected = element.is_connected();
        let via_marker = marker::requests(element, name);

        match self.inner.state.claim(element, name) {
            Claim::Started => {}
            Claim::AlreadyApplied => return InjectOutcome::AlreadyApplied,
            Claim::AlreadyPending => return InjectOutcome::Pending,
        }

        let module = match self.inner.cache.resolve(definition).await {
            Ok(module) => module,
            Err(_) => {
                self.inner.state.abandon(element.id(), name);
                return InjectOutcome::LoadFailed;
            }
        };

        if self.inner.state.is_revoked(element.id(), name) {
            self.inner.state.abandon(element.id(), name);
            tracing::debug!(behavior = %name, element = %element.id(), "graft.inject.revoked");
            return InjectOutcome::Stale;
        }
        if was_connected && !element.is_connected() {
            self.inner.state.abandon(element.id(), name);
            tracing::debug!(behavior = %name, element = %element.id(), "graft.inject.detached");
            return InjectOutcome::Detached;
        }
        if via_marker && !marker::requests(element, name) {
            self.inner.state.abandon(element.id(), name);
            tracing::debug!(behavior = %name, element = %element.id(), "graft.inject.stale");
            return InjectOutcome::Stale;
        }

        let options = options.unwrap_or(Value::Null);
        if let Err(error) = module.setup(element, options).await {
            self.inner.state.abandon(element.id(), name);
            self.inner.stats.record_setup_failure();
            tracing::warn!(behavior = %name, element = %element.id(), %error, "graft.inject.setup_failed");
            return InjectOutcome::SetupFailed;
        }

        self.inner.state.commit(element.id(), name);
        element.set_attribute(marker::READY_ATTR, "");
        self.inner.stats.record_applied();
        tracing::debug!(behavior = %name, element = %element.id(), "graft.inject.applied");
        InjectOutcome::Applied
    }
}
