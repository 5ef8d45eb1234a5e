use context_manager::{CategoryFilter, CategoryPatch, NewContext, RepositoryError};

use crate::support::{fixture, START};

#[tokio::test]
async fn duplicate_name_is_case_insensitive() {
    let f = fixture();
    f.categories.add("Work").await.unwrap();

    let err = f.categories.add("work").await.unwrap_err();
    assert!(matches!(err, RepositoryError::DuplicateName(_)));
    assert_eq!(f.categories.list().await.unwrap().len(), 1);
}

#[tokio::test]
async fn rename_into_an_existing_name_is_rejected() {
    let f = fixture();
    f.categories.add("Work").await.unwrap();
    let home = f.categories.add("Home").await.unwrap();

    let err = f
        .categories
        .update(&home.id, CategoryPatch::name("WORK"))
        .await
        .unwrap_err();
    assert!(matches!(err, RepositoryError::DuplicateName(_)));

    let renamed = f
        .categories
        .update(&home.id, CategoryPatch::name("home"))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(renamed.name, "home");
}

#[tokio::test]
async fn delete_then_strip_uncategorizes_both_contexts() {
    let f = fixture();
    let work = f.categories.add("Work").await.unwrap();
    let a = f
        .contexts
        .add(NewContext::new("a", "1").in_category(work.id.clone()))
        .await
        .unwrap();
    let b = f
        .contexts
        .add(NewContext::new("b", "2").in_category(work.id.clone()))
        .await
        .unwrap();
    f.clock.advance(100);

    assert!(f.categories.delete(&work.id).await.unwrap());
    assert_eq!(f.contexts.strip_category(&work.id).await.unwrap(), 2);

    for id in [&a.id, &b.id] {
        let c = f.contexts.get(id).await.unwrap().unwrap();
        assert_eq!(c.category_id, None);
        assert_eq!(c.updated_at, START + 100);
    }
    let loose = f.contexts.search("", &CategoryFilter::Uncategorized).await.unwrap();
    assert_eq!(loose.len(), 2);
}

#[tokio::test]
async fn names_sort_case_insensitively() {
    let f = fixture();
    for name in ["beta", "Alpha", "gamma"] {
        f.categories.add(name).await.unwrap();
    }
    let names: Vec<String> = f
        .categories
        .list()
        .await
        .unwrap()
        .into_iter()
        .map(|c| c.name)
        .collect();
    assert_eq!(names, vec!["Alpha", "beta", "gamma"]);
}
