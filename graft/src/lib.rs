#![deny(missing_docs)]
//! # graft — umbrella crate
//!
//! Provides a single import surface for the graft workspace: the element
//! tree substrate, the behavior protocol, and the runtime, plus a
//! `prelude` for the happy path.
//!
//! ```
//! use std::sync::Arc;
//! use graft::prelude::*;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let loader = StaticLoader::new().with_module(
//!     "units/marquee",
//!     BehaviorModule::new(|element, _options| async move {
//!         element.set_attribute("data-scrolling", "true");
//!         Ok(())
//!     }),
//! );
//!
//! let document = Document::new();
//! let runtime = Runtime::init(
//!     document.clone(),
//!     RuntimeOptions::new(Arc::new(loader)).definition(BehaviorDefinition::new(
//!         "marquee",
//!         Category::Modifier,
//!         "units/marquee",
//!     )),
//! )
//! .await
//! .unwrap();
//! assert!(runtime.has("marquee"));
//! # }
//! ```

pub use graft_core;
pub use graft_dom;
pub use graft_runtime;

/// Happy-path imports for embedding the runtime.
pub mod prelude {
    pub use graft_core::{
        BehaviorDefinition, BehaviorError, BehaviorLoader, BehaviorModule, Category, LoadError,
        StaticLoader,
    };
    pub use graft_dom::{Document, Element, MutationRecord, NodeId};
    pub use graft_runtime::{
        InjectOutcome, ObserverHandle, Runtime, RuntimeOptions, StatsSnapshot,
    };
}
