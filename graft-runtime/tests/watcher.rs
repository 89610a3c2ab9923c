//! Observer behavior: debounced enhancement of inserted content,
//! record pruning on removal, disconnect semantics.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use serde_json::json;

use graft_core::{BehaviorDefinition, BehaviorModule, Category, StaticLoader};
use graft_dom::{Document, Element};
use graft_runtime::{Runtime, RuntimeOptions};

const DEBOUNCE_MS: u64 = 10;

async fn settle() {
    tokio::time::sleep(Duration::from_millis(DEBOUNCE_MS * 5)).await;
}

fn counting_loader(setups: Arc<AtomicU64>) -> StaticLoader {
    StaticLoader::new().with_module(
        "units/dialog",
        BehaviorModule::new(move |element, _| {
            let setups = setups.clone();
            async move {
                setups.fetch_add(1, Ordering::SeqCst);
                element.set_attribute("role", "dialog");
                Ok(())
            }
        }),
    )
}

async fn observed_runtime(document: &Document, setups: Arc<AtomicU64>) -> Runtime {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
    Runtime::init(
        document.clone(),
        RuntimeOptions::new(Arc::new(counting_loader(setups)))
            .definition(BehaviorDefinition::new(
                "dialog",
                Category::Element,
                "units/dialog",
            ))
            .config_value("debounce_ms", json!(DEBOUNCE_MS)),
    )
    .await
    .expect("init")
}

fn tagged(document: &Document) -> Element {
    let el = document.create_element("div");
    el.set_attribute("data-behavior", "dialog");
    el
}

#[tokio::test]
async fn inserted_nodes_are_enhanced_after_the_quiet_period() {
    let setups = Arc::new(AtomicU64::new(0));
    let document = Document::new();
    let runtime = observed_runtime(&document, setups.clone()).await;

    let el = tagged(&document);
    document.root().append_child(&el);
    assert!(el.attribute("role").is_none());

    settle().await;
    assert_eq!(el.attribute("role").as_deref(), Some("dialog"));
    assert_eq!(setups.load(Ordering::SeqCst), 1);
    assert_eq!(runtime.stats().applied, 1);
}

#[tokio::test]
async fn a_burst_of_insertions_flushes_as_one_batch() {
    let setups = Arc::new(AtomicU64::new(0));
    let document = Document::new();
    let runtime = observed_runtime(&document, setups.clone()).await;

    let elements: Vec<Element> = (0..20)
        .map(|_| {
            let el = tagged(&document);
            document.root().append_child(&el);
            el
        })
        .collect();

    settle().await;
    assert!(elements.iter().all(|el| el.attribute("role").is_some()));
    assert_eq!(setups.load(Ordering::SeqCst), 20);
    assert_eq!(runtime.stats().loads, 1);
}

#[tokio::test]
async fn nested_insertions_are_scanned_from_the_top_node() {
    let setups = Arc::new(AtomicU64::new(0));
    let document = Document::new();
    let runtime = observed_runtime(&document, setups.clone()).await;

    // Assemble a detached subtree, then attach its top node; only the
    // top node is reported, its descendants come from the scan.
    let wrapper = document.create_element("section");
    let inner = tagged(&document);
    wrapper.append_child(&inner);
    document.root().append_child(&wrapper);

    settle().await;
    assert_eq!(inner.attribute("role").as_deref(), Some("dialog"));
    assert_eq!(runtime.stats().applied, 1);
}

#[tokio::test]
async fn removal_prunes_records_so_reattachment_reapplies() {
    let setups = Arc::new(AtomicU64::new(0));
    let document = Document::new();
    let runtime = observed_runtime(&document, setups.clone()).await;

    let el = tagged(&document);
    document.root().append_child(&el);
    settle().await;
    assert_eq!(setups.load(Ordering::SeqCst), 1);

    el.detach();
    settle().await;
    assert!(runtime.applied(&el).is_empty());

    document.root().append_child(&el);
    settle().await;
    assert_eq!(setups.load(Ordering::SeqCst), 2);
    assert_eq!(runtime.applied(&el), vec!["dialog"]);
}

#[tokio::test]
async fn observe_is_one_task_per_root() {
    let setups = Arc::new(AtomicU64::new(0));
    let document = Document::new();
    let runtime = observed_runtime(&document, setups.clone()).await;

    // Init already observes the root; both handles control that observer.
    let first = runtime.observe(None);
    let second = runtime.observe(None);
    assert!(first.is_active());

    first.disconnect();
    assert!(!second.is_active());
}

#[tokio::test]
async fn disconnect_stops_enhancement_of_later_insertions() {
    let setups = Arc::new(AtomicU64::new(0));
    let document = Document::new();
    let runtime = observed_runtime(&document, setups.clone()).await;

    runtime.disconnect(None);
    // Let the observer task observe the cancellation.
    tokio::task::yield_now().await;

    let el = tagged(&document);
    document.root().append_child(&el);
    settle().await;

    assert!(el.attribute("role").is_none());
    assert_eq!(setups.load(Ordering::SeqCst), 0);

    // Observation can be resumed on the same root.
    let handle = runtime.observe(None);
    assert!(handle.is_active());
    let late = tagged(&document);
    document.root().append_child(&late);
    settle().await;
    assert_eq!(late.attribute("role").as_deref(), Some("dialog"));
}

#[tokio::test]
async fn a_lagged_stream_falls_back_to_a_full_rescan() {
    let setups = Arc::new(AtomicU64::new(0));
    let document = Document::new();
    let runtime = observed_runtime(&document, setups.clone()).await;

    // On a current-thread runtime the observer cannot run between these
    // appends, so the burst overflows the mutation channel.
    let elements: Vec<Element> = (0..300)
        .map(|_| {
            let el = tagged(&document);
            document.root().append_child(&el);
            el
        })
        .collect();

    settle().await;
    assert!(elements.iter().all(|el| el.attribute("role").is_some()));
    assert_eq!(runtime.stats().applied, 300);
}

#[tokio::test]
async fn scoped_observer_ignores_insertions_outside_its_root() {
    let setups = Arc::new(AtomicU64::new(0));
    let document = Document::new();
    let runtime = Runtime::init(
        document.clone(),
        RuntimeOptions::new(Arc::new(counting_loader(setups.clone())))
            .definition(BehaviorDefinition::new(
                "dialog",
                Category::Element,
                "units/dialog",
            ))
            .config_value("debounce_ms", json!(DEBOUNCE_MS))
            .observe(false),
    )
    .await
    .expect("init");

    let section = document.create_element("section");
    document.root().append_child(&section);
    let handle = runtime.observe(Some(&section));
    assert!(handle.is_active());

    let inside = tagged(&document);
    section.append_child(&inside);
    let outside = tagged(&document);
    document.root().append_child(&outside);

    settle().await;
    assert_eq!(inside.attribute("role").as_deref(), Some("dialog"));
    assert!(outside.attribute("role").is_none());
    assert_eq!(runtime.stats().applied, 1);
}
