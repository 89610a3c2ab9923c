//! Error taxonomy: loading a code unit vs. running its setup.
//!
//! Neither error class is fatal to a host page. Load failures clear the
//! cache entry so a later resolve can retry; setup failures leave the
//! element unapplied so a later scan re-invokes setup. Both are counted
//! and logged at the runtime boundary instead of propagating into a
//! caller scanning many elements.

use thiserror::Error;

/// A behavior's code unit could not be loaded.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum LoadError {
    /// The loader has no code unit for the given locator.
    #[error("code unit not found: {0}")]
    NotFound(String),

    /// The loader found the unit but failed to produce it.
    #[error("load failed: {0}")]
    Failed(String),

    /// Catch-all. Include context.
    #[error(transparent)]
    Other(Box<dyn std::error::Error + Send + Sync>),
}

/// A behavior's own setup entry point failed.
///
/// Raised by behavior authors, caught at the injector boundary; the
/// (element, behavior) pair stays unapplied.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum BehaviorError {
    /// Setup could not enhance the element.
    #[error("setup failed: {0}")]
    Setup(String),

    /// The options payload was not what the behavior expects.
    #[error("invalid options: {0}")]
    InvalidOptions(String),

    /// Catch-all. Include context.
    #[error(transparent)]
    Other(Box<dyn std::error::Error + Send + Sync>),
}
