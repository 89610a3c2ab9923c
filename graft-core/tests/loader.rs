//! Tests for the static loader and module entry points.

use graft_core::{BehaviorDefinition, BehaviorLoader, BehaviorModule, Category, LoadError, StaticLoader};
use graft_dom::Document;

fn badge_module() -> BehaviorModule {
    BehaviorModule::new(|element, options| async move {
        let label = options
            .get("label")
            .and_then(|v| v.as_str())
            .unwrap_or("badge");
        element.set_attribute("data-label", label);
        Ok(())
    })
    .with_teardown(|element| {
        element.remove_attribute("data-label");
    })
}

#[tokio::test]
async fn static_loader_resolves_by_loader_ref() {
    let loader = StaticLoader::new().with_module("units/badge", badge_module());
    let def = BehaviorDefinition::new("badge", Category::Element, "units/badge");

    let module = loader.load(&def).await.unwrap();
    assert!(module.has_teardown());
}

#[tokio::test]
async fn static_loader_misses_unknown_refs() {
    let loader = StaticLoader::new().with_module("units/badge", badge_module());
    let def = BehaviorDefinition::new("badge", Category::Element, "units/missing");

    let err = loader.load(&def).await.unwrap_err();
    assert!(matches!(err, LoadError::NotFound(ref r) if r == "units/missing"));
}

#[tokio::test]
async fn module_setup_and_teardown_round_trip() {
    let doc = Document::new();
    let el = doc.create_element("span");
    let module = badge_module();

    module
        .setup(&el, serde_json::json!({ "label": "new" }))
        .await
        .unwrap();
    assert_eq!(el.attribute("data-label").as_deref(), Some("new"));

    assert!(module.teardown(&el));
    assert_eq!(el.attribute("data-label"), None);
}

#[tokio::test]
async fn module_without_teardown_reports_it() {
    let doc = Document::new();
    let el = doc.create_element("span");
    let module = BehaviorModule::new(|element, _| async move {
        element.set_attribute("data-enhanced", "true");
        Ok(())
    });

    module.setup(&el, serde_json::Value::Null).await.unwrap();
    assert!(!module.has_teardown());
    assert!(!module.teardown(&el));
    // Residue stays; removal semantics are the runtime's concern.
    assert_eq!(el.attribute("data-enhanced").as_deref(), Some("true"));
}
