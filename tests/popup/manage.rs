use context_manager::{CategoryFilter, ContextForm, RepositoryError};

use crate::support::{form, popup, popup_over};

#[tokio::test]
async fn popup_and_background_share_one_collection() {
    let (store, popup) = popup();
    let other = popup_over(store);

    let saved = popup.save(form("Shared", "text")).await.unwrap().unwrap();
    let seen = other.contexts("", &CategoryFilter::All).await.unwrap();
    assert_eq!(seen, vec![saved]);
}

#[tokio::test]
async fn category_lifecycle() {
    let (_, popup) = popup();
    let work = popup.add_category("  Work ").await.unwrap();
    assert_eq!(work.name, "Work");
    assert!(matches!(
        popup.add_category("WORK").await,
        Err(RepositoryError::DuplicateName(_))
    ));

    let renamed = popup.rename_category(&work.id, "Job").await.unwrap().unwrap();
    assert_eq!(renamed.name, "Job");
    assert_eq!(popup.rename_category("nope", "x").await.unwrap(), None);

    popup
        .save(ContextForm {
            category_id: Some(work.id.clone()),
            ..form("a", "b")
        })
        .await
        .unwrap();
    let filtered = popup
        .contexts("", &CategoryFilter::Category(work.id.clone()))
        .await
        .unwrap();
    assert_eq!(filtered.len(), 1);

    assert_eq!(popup.delete_category(&work.id).await.unwrap(), Some(1));
    assert!(popup.categories().await.unwrap().is_empty());
}

#[tokio::test]
async fn delete_and_touch() {
    let (_, popup) = popup();
    let c = popup.save(form("a", "b")).await.unwrap().unwrap();
    assert_eq!(popup.touch(&c.id).await.unwrap().unwrap().uses, 1);
    assert!(popup.delete_context(&c.id).await.unwrap());
    assert!(!popup.delete_context(&c.id).await.unwrap());
}
