use context_manager::page::{AdapterState, MenuView};
use context_manager::{ContextRepository, NewContext};

use crate::support::{FakePage, Harness};

#[tokio::test]
async fn unsupported_host_is_not_activated() {
    let harness = Harness::start();
    assert!(harness.activate(FakePage::on("example.com")).is_none());
}

#[tokio::test]
async fn trigger_is_mounted_exactly_once() {
    let harness = Harness::start();
    let mut adapter = harness.activate(FakePage::on("gemini.google.com")).unwrap();
    assert_eq!(adapter.state(), AdapterState::ButtonVisible);

    adapter.ensure_button();
    adapter.on_mutation();
    adapter.on_mutation();
    assert_eq!(adapter.page().mounts, 1);

    // The host page re-rendered and dropped our trigger.
    adapter.page_mut().trigger = false;
    adapter.on_mutation();
    adapter.on_mutation();
    assert_eq!(adapter.page().mounts, 2);
    assert_eq!(adapter.state(), AdapterState::ButtonVisible);
}

#[tokio::test]
async fn losing_the_trigger_closes_an_open_menu() {
    let harness = Harness::start();
    let mut adapter = harness.activate(FakePage::on("claude.ai")).unwrap();
    adapter.open_menu().await;
    assert_eq!(adapter.state(), AdapterState::MenuOpen);

    adapter.page_mut().trigger = false;
    adapter.page_mut().ready = false;
    assert!(!adapter.on_mutation());

    assert_eq!(adapter.page().closes, 1);
    assert_eq!(adapter.state(), AdapterState::NoButton);
    assert_eq!(adapter.view(), None);
}

#[tokio::test]
async fn trigger_waits_until_the_page_is_ready() {
    let harness = Harness::start();
    let mut page = FakePage::on("perplexity.ai");
    page.ready = false;
    let mut adapter = harness.activate(page).unwrap();
    assert_eq!(adapter.state(), AdapterState::NoButton);

    adapter.toggle_menu().await;
    assert_eq!(adapter.state(), AdapterState::NoButton);

    adapter.page_mut().ready = true;
    assert!(adapter.on_mutation());
    assert_eq!(adapter.state(), AdapterState::ButtonVisible);
}

#[tokio::test]
async fn toggle_opens_with_loading_then_items_and_closes() {
    let harness = Harness::start();
    ContextRepository::new(harness.background_adapter.clone())
        .add(NewContext::new("Title", "a".repeat(100)))
        .await
        .unwrap();
    let mut adapter = harness.activate(FakePage::on("claude.ai")).unwrap();

    adapter.toggle_menu().await;
    assert_eq!(adapter.state(), AdapterState::MenuOpen);
    let rendered = &adapter.page().rendered;
    assert_eq!(rendered[0], MenuView::Loading);
    match &rendered[1] {
        MenuView::Populated(items) => {
            assert_eq!(items.len(), 1);
            assert_eq!(items[0].preview.chars().count(), 61);
            assert!(items[0].preview.ends_with('…'));
            assert_eq!(items[0].tooltip.chars().count(), 100);
        }
        other => panic!("expected items, got {other:?}"),
    }

    adapter.toggle_menu().await;
    assert_eq!(adapter.state(), AdapterState::MenuClosed);
    adapter.toggle_menu().await;
    assert_eq!(adapter.state(), AdapterState::MenuOpen);
}

#[tokio::test]
async fn empty_collection_shows_empty_state() {
    let harness = Harness::start();
    let mut adapter = harness.activate(FakePage::on("claude.ai")).unwrap();
    adapter.open_menu().await;
    assert_eq!(adapter.view(), Some(&MenuView::Empty));
}

#[tokio::test]
async fn error_state_offers_retry() {
    let harness = Harness::start();
    ContextRepository::new(harness.background_adapter.clone())
        .add(NewContext::new("T", "B"))
        .await
        .unwrap();
    let mut adapter = harness.activate(FakePage::on("claude.ai")).unwrap();

    harness.store.set_available(false);
    adapter.open_menu().await;
    assert!(adapter.view().is_some_and(MenuView::can_retry));
    assert!(!adapter.cache().is_loaded());

    harness.store.set_available(true);
    adapter.retry().await;
    assert!(matches!(adapter.view(), Some(MenuView::Populated(items)) if items.len() == 1));
}

#[tokio::test]
async fn storage_change_refreshes_the_open_menu() {
    let harness = Harness::start();
    let mut adapter = harness.activate(FakePage::on("claude.ai")).unwrap();
    let mut changes = adapter.subscribe();
    adapter.open_menu().await;
    assert_eq!(adapter.view(), Some(&MenuView::Empty));

    // The popup adds a context while the menu is open.
    ContextRepository::new(harness.background_adapter.clone())
        .add(NewContext::new("Fresh", "new body"))
        .await
        .unwrap();
    let change = changes.recv().await.unwrap();
    adapter.on_storage_change(&change);

    assert!(matches!(adapter.view(), Some(MenuView::Populated(items)) if items[0].title == "Fresh"));
}

#[tokio::test]
async fn search_filters_the_cached_listing() {
    let harness = Harness::start();
    let repo = ContextRepository::new(harness.background_adapter.clone());
    repo.add(NewContext::new("Rust reviewer", "be strict")).await.unwrap();
    repo.add(NewContext::new("Translator", "to French")).await.unwrap();
    let mut adapter = harness.activate(FakePage::on("claude.ai")).unwrap();
    adapter.open_menu().await;

    adapter.search("french");
    assert!(matches!(adapter.view(), Some(MenuView::Populated(items)) if items.len() == 1 && items[0].title == "Translator"));

    adapter.search("nothing like this");
    assert_eq!(adapter.view(), Some(&MenuView::Empty));
}
