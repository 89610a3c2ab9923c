//! The behavior registry: name → definition, built once, read-only after.

use std::collections::HashMap;

use graft_core::BehaviorDefinition;
use graft_dom::Element;

/// Static table of every behavior the runtime knows.
///
/// Membership is the single source of truth for "does this behavior
/// exist": the injector rejects unregistered names per-pair without
/// aborting a scan. Built once during `Runtime::init`; never mutated
/// afterwards.
#[derive(Debug)]
pub struct Registry {
    definitions: HashMap<String, BehaviorDefinition>,
    // Names with a preferred tag, in name order; the auto-injection
    // lookup filters this by element tag (and input type).
    by_tag: Vec<String>,
}

impl Registry {
    /// Build from an ordered definition list. Duplicate names: the last
    /// definition wins and the collision is logged.
    pub(crate) fn build(definitions: Vec<BehaviorDefinition>) -> Self {
        let mut table = HashMap::with_capacity(definitions.len());
        for definition in definitions {
            if table.contains_key(&definition.name) {
                tracing::warn!(behavior = %definition.name, "graft.registry.duplicate");
            }
            table.insert(definition.name.clone(), definition);
        }
        let mut by_tag: Vec<String> = table
            .values()
            .filter(|definition| definition.preferred_tag.is_some())
            .map(|definition| definition.name.clone())
            .collect();
        by_tag.sort();
        Self {
            definitions: table,
            by_tag,
        }
    }

    /// Behaviors that attach to this element by kind rather than by
    /// marker: the definition's preferred tag matches the element's tag,
    /// and for `<input>` behaviors the `type` attribute matches too.
    /// In name order.
    pub fn auto_behaviors(&self, element: &Element) -> Vec<String> {
        self.by_tag
            .iter()
            .filter(|name| {
                let definition = &self.definitions[name.as_str()];
                if definition.preferred_tag.as_deref() != Some(element.tag()) {
                    return false;
                }
                match &definition.input_type {
                    Some(input_type) => {
                        element.attribute("type").as_deref() == Some(input_type.as_str())
                    }
                    None => true,
                }
            })
            .cloned()
            .collect()
    }

    /// Whether a behavior with this name is registered.
    #[must_use]
    pub fn has(&self, name: &str) -> bool {
        self.definitions.contains_key(name)
    }

    /// All registered names, sorted.
    #[must_use]
    pub fn list(&self) -> Vec<String> {
        let mut names: Vec<String> = self.definitions.keys().cloned().collect();
        names.sort();
        names
    }

    /// Look up one definition.
    #[must_use]
    pub fn definition(&self, name: &str) -> Option<&BehaviorDefinition> {
        self.definitions.get(name)
    }

    /// All definitions, in name order.
    #[must_use]
    pub fn definitions(&self) -> Vec<&BehaviorDefinition> {
        let mut definitions: Vec<&BehaviorDefinition> = self.definitions.values().collect();
        definitions.sort_by(|a, b| a.name.cmp(&b.name));
        definitions
    }

    /// Number of registered behaviors.
    #[must_use]
    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    /// Whether the registry is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }
}
