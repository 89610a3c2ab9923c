//! Process-wide key/value configuration, read by the other components.

use std::collections::HashMap;
use std::sync::RwLock;
use std::time::Duration;

/// Recognized configuration keys.
///
/// Unknown keys are stored verbatim — collaborators (the builder, a
/// diagnostics panel) may stash their own state here.
pub mod keys {
    /// Quiet period of the mutation watcher, in milliseconds.
    pub const DEBOUNCE_MS: &str = "debounce_ms";
    /// When `false`, `init` loads every registered behavior eagerly.
    pub const LAZY_LOAD: &str = "lazy_load";
    /// When `true`, scans also apply behaviors by element kind
    /// (definition preferred tag), not just by marker attribute.
    pub const AUTO_INJECT: &str = "auto_inject";
}

/// Default watcher quiet period.
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(50);

/// Flat key/value configuration with last-write-wins semantics.
///
/// Values are `serde_json::Value` so hosts can set knobs from parsed
/// page options without an intermediate schema.
#[derive(Debug)]
pub struct Config {
    values: RwLock<HashMap<String, serde_json::Value>>,
}

impl Config {
    pub(crate) fn new(overrides: HashMap<String, serde_json::Value>) -> Self {
        let mut values = HashMap::from([
            (
                keys::DEBOUNCE_MS.to_string(),
                serde_json::json!(DEFAULT_DEBOUNCE.as_millis() as u64),
            ),
            (keys::LAZY_LOAD.to_string(), serde_json::json!(true)),
            (keys::AUTO_INJECT.to_string(), serde_json::json!(false)),
        ]);
        values.extend(overrides);
        Self {
            values: RwLock::new(values),
        }
    }

    /// Read one value.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<serde_json::Value> {
        self.values
            .read()
            .expect("config lock poisoned")
            .get(key)
            .cloned()
    }

    /// Write one value, replacing any previous one.
    pub fn set(&self, key: impl Into<String>, value: serde_json::Value) {
        self.values
            .write()
            .expect("config lock poisoned")
            .insert(key.into(), value);
    }

    /// The watcher quiet period ([`keys::DEBOUNCE_MS`]).
    ///
    /// Non-numeric values fall back to the default.
    #[must_use]
    pub fn debounce(&self) -> Duration {
        self.get(keys::DEBOUNCE_MS)
            .and_then(|v| v.as_u64())
            .map_or(DEFAULT_DEBOUNCE, Duration::from_millis)
    }

    /// Whether behaviors load on first use ([`keys::LAZY_LOAD`]).
    #[must_use]
    pub fn lazy_load(&self) -> bool {
        self.get(keys::LAZY_LOAD)
            .and_then(|v| v.as_bool())
            .unwrap_or(true)
    }

    /// Whether scans apply behaviors by element kind
    /// ([`keys::AUTO_INJECT`]).
    #[must_use]
    pub fn auto_inject(&self) -> bool {
        self.get(keys::AUTO_INJECT)
            .and_then(|v| v.as_bool())
            .unwrap_or(false)
    }
}
