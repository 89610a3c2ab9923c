//! The loaded code unit: an async setup entry point plus an optional
//! synchronous teardown.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use graft_dom::Element;

use crate::error::BehaviorError;

/// Boxed future returned by a behavior's setup entry point.
///
/// Boxed for dyn-compatibility: modules of heterogeneous behaviors live
/// together in one cache.
pub type SetupFuture = Pin<Box<dyn Future<Output = Result<(), BehaviorError>> + Send>>;

type SetupFn = Arc<dyn Fn(Element, serde_json::Value) -> SetupFuture + Send + Sync>;
type TeardownFn = Arc<dyn Fn(&Element) + Send + Sync>;

/// A loaded behavior: the `(setup, teardown?)` pair the cache memoizes.
///
/// `setup` is async — behaviors may inject child markup, start timers, or
/// fetch assets. `teardown` is synchronous and best-effort: a module
/// without one can still be removed, it just leaves whatever visual
/// effect setup produced (behavior-defined residue).
///
/// Cloning is cheap; clones share the same entry points.
#[derive(Clone)]
pub struct BehaviorModule {
    setup: SetupFn,
    teardown: Option<TeardownFn>,
}

impl BehaviorModule {
    /// Create a module from an async setup function.
    ///
    /// # Example
    ///
    /// ```
    /// use graft_core::BehaviorModule;
    ///
    /// let module = BehaviorModule::new(|element, _options| async move {
    ///     element.set_attribute("role", "dialog");
    ///     Ok(())
    /// });
    /// assert!(!module.has_teardown());
    /// ```
    pub fn new<F, Fut>(setup: F) -> Self
    where
        F: Fn(Element, serde_json::Value) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<(), BehaviorError>> + Send + 'static,
    {
        Self {
            setup: Arc::new(move |element, options| Box::pin(setup(element, options))),
            teardown: None,
        }
    }

    /// Attach a teardown that reverses setup's effect on one element.
    #[must_use]
    pub fn with_teardown<F>(mut self, teardown: F) -> Self
    where
        F: Fn(&Element) + Send + Sync + 'static,
    {
        self.teardown = Some(Arc::new(teardown));
        self
    }

    /// Run the setup entry point against one element.
    ///
    /// # Errors
    ///
    /// Returns whatever [`BehaviorError`] the behavior author raised; the
    /// caller decides whether that is fatal (the runtime treats it as
    /// per-pair, never fatal).
    pub async fn setup(
        &self,
        element: &Element,
        options: serde_json::Value,
    ) -> Result<(), BehaviorError> {
        (self.setup)(element.clone(), options).await
    }

    /// Run the teardown entry point, if the module has one.
    ///
    /// Returns whether a teardown ran.
    pub fn teardown(&self, element: &Element) -> bool {
        match &self.teardown {
            Some(teardown) => {
                teardown(element);
                true
            }
            None => false,
        }
    }

    /// Whether this module carries a teardown path.
    #[must_use]
    pub fn has_teardown(&self) -> bool {
        self.teardown.is_some()
    }
}

impl std::fmt::Debug for BehaviorModule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BehaviorModule")
            .field("has_teardown", &self.has_teardown())
            .finish_non_exhaustive()
    }
}
