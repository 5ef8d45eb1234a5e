use context_manager::transfer::{ExportFile, TransferError};
use context_manager::CategoryFilter;

use crate::support::{form, popup};

#[tokio::test]
async fn export_then_import_reproduces_the_collection() {
    let (_, source) = popup();
    for (title, body) in [("one", "1"), ("two", "2"), ("three", "3")] {
        source.save(form(title, body)).await.unwrap();
    }
    let file = source.export().await.unwrap();
    let json = file.to_json_pretty().unwrap();

    let (_, target) = popup();
    assert_eq!(target.import(&json).await.unwrap(), 3);

    let original = source.contexts("", &CategoryFilter::All).await.unwrap();
    let imported = target.contexts("", &CategoryFilter::All).await.unwrap();
    assert_eq!(imported, original);

    assert_eq!(target.import(&json).await.unwrap(), 0, "second import adds nothing");
    assert_eq!(target.contexts("", &CategoryFilter::All).await.unwrap().len(), 3);
}

#[tokio::test]
async fn export_file_shape() {
    let (_, popup) = popup();
    popup.save(form("t", "b")).await.unwrap();

    let file = popup.export().await.unwrap();
    let value: serde_json::Value = serde_json::from_str(&file.to_json_pretty().unwrap()).unwrap();
    assert_eq!(value["version"], 1);
    assert_eq!(value["exportedAt"], "2026-10-17T00:00:00.000Z");
    assert_eq!(value["contexts"][0]["title"], "t");

    let parsed: ExportFile = serde_json::from_value(value).unwrap();
    assert_eq!(parsed, file);
    assert_eq!(popup.export_file_name(), "ai-contexts-2026-10-17.json");
}

#[tokio::test]
async fn import_merges_by_id() {
    let (_, popup) = popup();
    let existing = popup.save(form("mine", "keep")).await.unwrap().unwrap();

    let json = serde_json::json!({
        "version": 1,
        "exportedAt": "2026-01-01T00:00:00.000Z",
        "contexts": [
            { "id": existing.id.as_str(), "title": "theirs", "body": "overwrite?",
              "categoryId": null, "uses": 9, "createdAt": 1, "updatedAt": 1 },
            { "id": "new-one", "title": "new", "body": "added",
              "categoryId": null, "uses": 0, "createdAt": 1, "updatedAt": 1 }
        ]
    })
    .to_string();

    assert_eq!(popup.import(&json).await.unwrap(), 1);
    let all = popup.contexts("", &CategoryFilter::All).await.unwrap();
    assert_eq!(all.len(), 2);
    let kept = all.iter().find(|c| c.id == existing.id).unwrap();
    assert_eq!(kept.title, "mine");
}

#[tokio::test]
async fn malformed_import_changes_nothing() {
    let (store, popup) = popup();
    assert!(matches!(
        popup.import(r#"{ "contexts": "nope" }"#).await,
        Err(TransferError::MissingContexts)
    ));
    assert!(store.raw("contexts").is_none());
}
