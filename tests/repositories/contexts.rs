use context_manager::{CategoryFilter, ContextPatch, NewContext};

use crate::support::{fixture, START};

#[tokio::test]
async fn add_then_list_returns_one_fresh_record() {
    let f = fixture();
    let added = f.contexts.add(NewContext::new("T", "B")).await.unwrap();

    let all = f.contexts.list().await.unwrap();
    assert_eq!(all.len(), 1);
    assert_eq!(all[0], added);
    assert_eq!(added.uses, 0);
    assert_eq!(added.created_at, added.updated_at);
    assert_eq!(added.category_id, None);
}

#[tokio::test]
async fn update_category_only_changes_category_and_updated_at() {
    let f = fixture();
    let before = f.contexts.add(NewContext::new("T", "B")).await.unwrap();
    f.clock.advance(50);

    let after = f
        .contexts
        .update(&before.id, ContextPatch::default().category(Some("cat-1".into())))
        .await
        .unwrap()
        .unwrap();

    assert_eq!(after.category_id.as_deref(), Some("cat-1"));
    assert_eq!(after.updated_at, START + 50);
    assert_eq!(after.id, before.id);
    assert_eq!(after.title, before.title);
    assert_eq!(after.body, before.body);
    assert_eq!(after.uses, before.uses);
    assert_eq!(after.created_at, before.created_at);
}

#[tokio::test]
async fn update_missing_id_is_none() {
    let f = fixture();
    let result = f
        .contexts
        .update("missing", ContextPatch::default().title("x"))
        .await
        .unwrap();
    assert_eq!(result, None);
    assert!(f.store.raw("contexts").is_none());
}

#[tokio::test]
async fn touch_increments_by_exactly_one() {
    let f = fixture();
    let c = f.contexts.add(NewContext::new("T", "B")).await.unwrap();
    f.clock.advance(10);

    let touched = f.contexts.touch(&c.id).await.unwrap().unwrap();
    assert_eq!(touched.uses, 1);
    assert_eq!(touched.updated_at, START + 10);
    assert_eq!(f.contexts.touch("missing").await.unwrap(), None);
}

#[tokio::test]
async fn touch_commutes_with_unrelated_update() {
    let first = fixture();
    let second = fixture();
    let a = first.contexts.add(NewContext::new("T", "B")).await.unwrap();
    let b = second.contexts.add(NewContext::new("T", "B")).await.unwrap();

    first.contexts.touch(&a.id).await.unwrap();
    first.contexts.update(&a.id, ContextPatch::default().title("New")).await.unwrap();

    second.contexts.update(&b.id, ContextPatch::default().title("New")).await.unwrap();
    second.contexts.touch(&b.id).await.unwrap();

    let a = first.contexts.get(&a.id).await.unwrap().unwrap();
    let b = second.contexts.get(&b.id).await.unwrap().unwrap();
    assert_eq!((a.uses, a.title.as_str()), (b.uses, b.title.as_str()));
    assert_eq!(a.uses, 1);
}

#[tokio::test]
async fn list_is_most_recently_updated_first() {
    let f = fixture();
    let old = f.contexts.add(NewContext::new("old", "b")).await.unwrap();
    f.clock.advance(1);
    let new = f.contexts.add(NewContext::new("new", "b")).await.unwrap();
    f.clock.advance(1);

    let ids: Vec<String> = f.contexts.list().await.unwrap().into_iter().map(|c| c.id).collect();
    assert_eq!(ids, vec![new.id.clone(), old.id.clone()]);

    f.contexts.touch(&old.id).await.unwrap();
    let ids: Vec<String> = f.contexts.list().await.unwrap().into_iter().map(|c| c.id).collect();
    assert_eq!(ids, vec![old.id, new.id]);
}

#[tokio::test]
async fn search_combines_term_and_category() {
    let f = fixture();
    f.contexts
        .add(NewContext::new("Rust review", "check lifetimes").in_category("work"))
        .await
        .unwrap();
    f.contexts.add(NewContext::new("Rust poem", "ferris")).await.unwrap();
    f.contexts.add(NewContext::new("Recipe", "pasta")).await.unwrap();

    let work = f
        .contexts
        .search("rust", &CategoryFilter::Category("work".into()))
        .await
        .unwrap();
    assert_eq!(work.len(), 1);

    let loose = f.contexts.search("rust", &CategoryFilter::Uncategorized).await.unwrap();
    assert_eq!(loose.len(), 1);
    assert_eq!(loose[0].title, "Rust poem");

    assert_eq!(f.contexts.list_by_category("work").await.unwrap().len(), 1);
}

#[tokio::test]
async fn delete_reports_whether_anything_was_removed() {
    let f = fixture();
    let c = f.contexts.add(NewContext::new("T", "B")).await.unwrap();
    assert!(f.contexts.delete(&c.id).await.unwrap());
    assert!(!f.contexts.delete(&c.id).await.unwrap());
    assert!(f.contexts.list().await.unwrap().is_empty());
}

#[tokio::test]
async fn store_failure_propagates() {
    let f = fixture();
    f.store.set_available(false);
    assert!(f.contexts.list().await.is_err());
    assert!(f.contexts.add(NewContext::new("T", "B")).await.is_err());
}
