#![deny(missing_docs)]
//! # graft-core — protocol layer for the behavior runtime
//!
//! This crate defines the contracts every other graft crate composes:
//!
//! | Concept | Type | What it is |
//! |---------|------|------------|
//! | Definition | [`BehaviorDefinition`] | Static metadata: name, category, loader locator, flags |
//! | Code unit | [`BehaviorModule`] | A loaded behavior: async setup + optional sync teardown |
//! | Loading | [`BehaviorLoader`] | How a definition becomes a module, on demand |
//! | Errors | [`LoadError`], [`BehaviorError`] | Load vs. setup failures |
//!
//! The contracts are operation-defined, not mechanism-defined: a loader
//! may read embedded tables, fetch over the network, or compile plugins —
//! the runtime only sees `load` resolve or fail. [`StaticLoader`] is the
//! in-process implementation for behaviors compiled into the binary,
//! which is also what tests use.
//!
//! ## Dependency notes
//!
//! Setup options and extension data are `serde_json::Value`: behaviors
//! are authored independently of the runtime and JSON is the interchange
//! format the host page already speaks. Typed wrappers would complicate
//! trait-object safety without practical benefit.

pub mod behavior;
pub mod definition;
pub mod error;
pub mod loader;

pub use behavior::{BehaviorModule, SetupFuture};
pub use definition::{BehaviorDefinition, Category};
pub use error::{BehaviorError, LoadError};
pub use loader::{BehaviorLoader, StaticLoader};
