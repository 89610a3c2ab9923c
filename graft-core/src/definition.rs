//! Static behavior metadata, immutable once the registry is built.

use serde::{Deserialize, Serialize};

/// How a behavior participates in document composition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    /// A standalone component that renders its own structure (cards,
    /// media, form inputs).
    Element,
    /// An element that hosts children (grids, navbars, layouts).
    Container,
    /// Attaches to an existing element and alters it (animations,
    /// typewriter, marquee); several may stack on one element.
    Modifier,
    /// Wires an interaction to a target (open, dismiss, scroll-to).
    Action,
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Element => "element",
            Self::Container => "container",
            Self::Modifier => "modifier",
            Self::Action => "action",
        };
        f.write_str(s)
    }
}

/// Everything the runtime knows about a behavior before loading it.
///
/// Definitions are handed to the registry at startup and never mutated
/// afterwards. `loader_ref` is an opaque locator interpreted by the
/// configured [`BehaviorLoader`](crate::BehaviorLoader) — a module path,
/// a URL, a table key; the runtime does not look inside it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BehaviorDefinition {
    /// The name elements use in the marker attribute.
    pub name: String,
    /// Composition category.
    pub category: Category,
    /// Opaque locator of the behavior's code unit.
    pub loader_ref: String,
    /// The behavior injects a markup template when set up.
    #[serde(default)]
    pub has_template: bool,
    /// For form behaviors backed by `<input>`: the `type` attribute value.
    #[serde(default)]
    pub input_type: Option<String>,
    /// Only offered inside the visual builder, never in published pages.
    #[serde(default)]
    pub builder_only: bool,
    /// The element tag this behavior normally renders as.
    #[serde(default)]
    pub preferred_tag: Option<String>,
}

impl BehaviorDefinition {
    /// Create a definition with the given name, category, and loader
    /// locator; all flags default to off.
    pub fn new(
        name: impl Into<String>,
        category: Category,
        loader_ref: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            category,
            loader_ref: loader_ref.into(),
            has_template: false,
            input_type: None,
            builder_only: false,
            preferred_tag: None,
        }
    }

    /// Mark the behavior as template-injecting.
    #[must_use]
    pub fn with_template(mut self) -> Self {
        self.has_template = true;
        self
    }

    /// Set the `<input>` type this behavior configures.
    #[must_use]
    pub fn with_input_type(mut self, input_type: impl Into<String>) -> Self {
        self.input_type = Some(input_type.into());
        self
    }

    /// Restrict the behavior to the visual builder.
    #[must_use]
    pub fn builder_only(mut self) -> Self {
        self.builder_only = true;
        self
    }

    /// Set the tag this behavior normally renders as.
    #[must_use]
    pub fn with_preferred_tag(mut self, tag: impl Into<String>) -> Self {
        self.preferred_tag = Some(tag.into());
        self
    }
}
