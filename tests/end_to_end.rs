//! Full-flow scenario across the workspace crates: init with an observed
//! root, enhance markup present at startup and markup inserted later,
//! then reverse one element.

use std::sync::Arc;
use std::time::Duration;

use serde_json::json;

use graft::prelude::*;

fn behavior_table() -> StaticLoader {
    StaticLoader::new()
        .with_module(
            "units/dialog",
            BehaviorModule::new(|element, _options| async move {
                element.set_attribute("role", "dialog");
                Ok(())
            })
            .with_teardown(|element| {
                element.remove_attribute("role");
            }),
        )
        .with_module(
            "units/tooltip",
            BehaviorModule::new(|element, options| async move {
                let text = options
                    .get("text")
                    .and_then(|v| v.as_str())
                    .unwrap_or("hint")
                    .to_string();
                element.set_attribute("title", text);
                Ok(())
            })
            .with_teardown(|element| {
                element.remove_attribute("title");
            }),
        )
}

fn definitions() -> Vec<BehaviorDefinition> {
    vec![
        BehaviorDefinition::new("dialog", Category::Element, "units/dialog")
            .with_preferred_tag("dialog"),
        BehaviorDefinition::new("tooltip", Category::Modifier, "units/tooltip"),
    ]
}

#[tokio::test]
async fn page_lifecycle() {
    let document = Document::new();

    // Markup already present before the runtime starts.
    let early = document.create_element("div");
    early.set_attribute("data-behavior", "dialog");
    document.root().append_child(&early);

    let runtime = Runtime::init(
        document.clone(),
        RuntimeOptions::new(Arc::new(behavior_table()))
            .definitions(definitions())
            .config_value("debounce_ms", json!(10)),
    )
    .await
    .expect("init");

    // The initial scan enhanced it synchronously with init.
    assert_eq!(early.attribute("role").as_deref(), Some("dialog"));
    assert_eq!(runtime.stats().applied, 1);
    assert_eq!(runtime.list(), vec!["dialog", "tooltip"]);

    // Content inserted later is picked up by the observer.
    let late = document.create_element("div");
    late.set_attribute("data-behavior", "dialog tooltip");
    document.root().append_child(&late);
    assert!(late.attribute("role").is_none());

    tokio::time::sleep(Duration::from_millis(50)).await;
    assert_eq!(late.attribute("role").as_deref(), Some("dialog"));
    assert_eq!(late.attribute("title").as_deref(), Some("hint"));
    assert!(late.has_attribute("data-graft-ready"));
    assert_eq!(runtime.applied(&late), vec!["dialog", "tooltip"]);
    let stats = runtime.stats();
    assert_eq!(stats.applied, 3);
    assert_eq!(stats.loads, 2);
    assert_eq!(stats.failures(), 0);

    // Direct injection with options, no marker involved.
    let hinted = document.create_element("span");
    document.root().append_child(&hinted);
    let outcome = runtime
        .inject(&hinted, "tooltip", Some(json!({ "text": "saved" })))
        .await;
    assert!(outcome.is_applied());
    assert_eq!(hinted.attribute("title").as_deref(), Some("saved"));

    // Reverse one behavior; the element stays enhanced by the other.
    runtime.remove(&late, Some("dialog"));
    assert!(late.attribute("role").is_none());
    assert_eq!(late.attribute("data-behavior").as_deref(), Some("tooltip"));
    assert!(late.has_attribute("data-graft-ready"));
    assert_eq!(runtime.applied(&late), vec!["tooltip"]);

    // Reverse the rest; every trace of enhancement is gone.
    runtime.remove(&late, None);
    assert!(!late.has_attribute("data-behavior"));
    assert!(!late.has_attribute("data-graft-ready"));
    assert!(runtime.applied(&late).is_empty());

    runtime.disconnect(None);
}

#[tokio::test]
async fn eager_startup_loads_before_scanning() {
    let document = Document::new();
    let runtime = Runtime::init(
        document.clone(),
        RuntimeOptions::new(Arc::new(behavior_table()))
            .definitions(definitions())
            .config_value("lazy_load", json!(false))
            .observe(false),
    )
    .await
    .expect("init");

    // Both behaviors were loaded even though no element requested them.
    assert_eq!(runtime.stats().loads, 2);

    let el = document.create_element("div");
    el.set_attribute("data-behavior", "tooltip");
    document.root().append_child(&el);
    runtime.scan(None).await;

    let stats = runtime.stats();
    assert_eq!(stats.applied, 1);
    assert_eq!(stats.loads, 2);
    assert_eq!(stats.cache_hits, 1);
}
