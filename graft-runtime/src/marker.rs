//! The marker attribute: a serialized view of which behaviors an element
//! requests.
//!
//! The attribute value is a whitespace-separated, order-insensitive list
//! of behavior names. Applied state lives in the runtime's element
//! records — the attribute is parsed on the way in and rewritten as a
//! side effect of removal, never treated as the source of truth.

use graft_dom::Element;

/// The attribute elements use to request behaviors.
pub const MARKER_ATTR: &str = "data-behavior";

/// Set once at least one behavior is applied; cleared when the last one
/// is removed. Lets stylesheets and tests key off enhancement readiness.
pub const READY_ATTR: &str = "data-graft-ready";

/// Parse a marker attribute value into names, first occurrence wins.
#[must_use]
pub fn parse(value: &str) -> Vec<String> {
    let mut names: Vec<String> = Vec::new();
    for name in value.split_whitespace() {
        if !names.iter().any(|n| n == name) {
            names.push(name.to_string());
        }
    }
    names
}

/// The behavior names an element currently requests.
#[must_use]
pub fn requested(element: &Element) -> Vec<String> {
    element
        .attribute(MARKER_ATTR)
        .map(|value| parse(&value))
        .unwrap_or_default()
}

/// Whether the element's marker attribute currently lists `name`.
#[must_use]
pub fn requests(element: &Element, name: &str) -> bool {
    requested(element).iter().any(|n| n == name)
}

/// Rewrite the marker attribute without `name`; drop the attribute when
/// the list empties. No-op when the attribute is absent.
pub fn remove_name(element: &Element, name: &str) {
    let Some(value) = element.attribute(MARKER_ATTR) else {
        return;
    };
    let remaining: Vec<String> = parse(&value).into_iter().filter(|n| n != name).collect();
    if remaining.is_empty() {
        element.remove_attribute(MARKER_ATTR);
    } else {
        element.set_attribute(MARKER_ATTR, remaining.join(" "));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use graft_dom::Document;

    #[test]
    fn parse_splits_and_dedupes() {
        assert_eq!(parse("dialog tooltip"), vec!["dialog", "tooltip"]);
        assert_eq!(parse("  dialog \t dialog\ntooltip "), vec!["dialog", "tooltip"]);
        assert!(parse("   ").is_empty());
        assert!(parse("").is_empty());
    }

    #[test]
    fn requested_reads_the_marker() {
        let doc = Document::new();
        let el = doc.create_element("div");
        assert!(requested(&el).is_empty());

        el.set_attribute(MARKER_ATTR, "dialog tooltip");
        assert_eq!(requested(&el), vec!["dialog", "tooltip"]);
        assert!(requests(&el, "dialog"));
        assert!(!requests(&el, "modal"));
    }

    #[test]
    fn remove_name_rewrites_or_drops() {
        let doc = Document::new();
        let el = doc.create_element("div");
        el.set_attribute(MARKER_ATTR, "dialog tooltip");

        remove_name(&el, "dialog");
        assert_eq!(el.attribute(MARKER_ATTR).as_deref(), Some("tooltip"));

        remove_name(&el, "missing");
        assert_eq!(el.attribute(MARKER_ATTR).as_deref(), Some("tooltip"));

        remove_name(&el, "tooltip");
        assert!(!el.has_attribute(MARKER_ATTR));

        // Absent attribute stays absent.
        remove_name(&el, "tooltip");
        assert!(!el.has_attribute(MARKER_ATTR));
    }
}
