#![deny(missing_docs)]
//! # graft-runtime — the behavior-attachment runtime
//!
//! Markup authors tag elements with a space-separated list of behavior
//! names in the `data-behavior` marker attribute. This crate discovers
//! tagged elements, resolves each name to a loadable code unit, loads it
//! on demand (single-flight), applies it exactly once per element, can
//! reverse the application, and watches a subtree so content inserted
//! later is enhanced automatically.
//!
//! ## Components
//!
//! | Component | Where | What it does |
//! |-----------|-------|--------------|
//! | Registry | [`registry`] | Name → definition table, built once at init |
//! | Module cache | internal | Memoized loads, one in-flight load per name |
//! | Injector | [`Runtime::inject`] | One behavior onto one element, once |
//! | Scanner | [`Runtime::scan`] | Best-effort fan-out over a subtree |
//! | Remover | [`Runtime::remove`] | Teardown + applied-record cleanup |
//! | Watcher | [`Runtime::observe`] | Debounced re-scan of inserted nodes |
//! | Preloader | [`Runtime::preload`] | Warm the cache without touching elements |
//! | Config | [`config::Config`] | Process-wide key/value knobs |
//! | Stats | [`stats::StatsSnapshot`] | Counters for diagnostics and tests |
//!
//! Nothing here is fatal to the host page: unknown names, failed loads,
//! and failed setups are counted, logged, and isolated to their
//! (element, behavior) pair.
//!
//! ## Example
//!
//! ```
//! use std::sync::Arc;
//! use graft_core::{BehaviorDefinition, BehaviorModule, Category, StaticLoader};
//! use graft_dom::Document;
//! use graft_runtime::{Runtime, RuntimeOptions};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let loader = StaticLoader::new().with_module(
//!     "units/dialog",
//!     BehaviorModule::new(|element, _options| async move {
//!         element.set_attribute("role", "dialog");
//!         Ok(())
//!     }),
//! );
//!
//! let document = Document::new();
//! let el = document.create_element("div");
//! el.set_attribute("data-behavior", "dialog");
//! document.root().append_child(&el);
//!
//! let runtime = Runtime::init(
//!     document,
//!     RuntimeOptions::new(Arc::new(loader))
//!         .definition(BehaviorDefinition::new("dialog", Category::Element, "units/dialog"))
//!         .observe(false),
//! )
//! .await
//! .unwrap();
//!
//! assert_eq!(el.attribute("role").as_deref(), Some("dialog"));
//! assert_eq!(runtime.stats().applied, 1);
//! # }
//! ```

pub mod config;
pub mod inject;
pub mod marker;
pub mod registry;
pub mod runtime;
pub mod stats;
pub mod watcher;

mod cache;
mod state;

pub use config::Config;
pub use inject::InjectOutcome;
pub use registry::Registry;
pub use runtime::{InitError, Runtime, RuntimeOptions};
pub use stats::StatsSnapshot;
pub use watcher::ObserverHandle;
