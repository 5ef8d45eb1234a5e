//! Export and import of the context collection as a JSON file.
//!
//! ```json
//! { "version": 1, "exportedAt": "2026-10-17T09:30:00.000Z", "contexts": [ ... ] }
//! ```

use chrono::{DateTime, SecondsFormat, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::contexts::{Context, ContextRepository};
use crate::error::RepositoryError;
use crate::store::{decode, KeyValueStore};

pub const EXPORT_VERSION: u32 = 1;

#[derive(Debug, thiserror::Error)]
pub enum TransferError {
    #[error("not a valid export file: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("unsupported export version {0}")]
    UnsupportedVersion(u64),
    #[error("export file has no contexts array")]
    MissingContexts,
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportFile {
    pub version: u32,
    pub exported_at: String,
    pub contexts: Vec<Context>,
}

impl ExportFile {
    pub fn to_json_pretty(&self) -> Result<String, TransferError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Snapshot every context into an export file stamped with the adapter's
/// clock.
pub async fn export<S: KeyValueStore>(
    repo: &ContextRepository<S>,
) -> Result<ExportFile, TransferError> {
    let contexts = repo.list().await?;
    let exported_at = iso8601(repo.adapter().now_millis());
    tracing::info!(count = contexts.len(), "exported contexts");
    Ok(ExportFile {
        version: EXPORT_VERSION,
        exported_at,
        contexts,
    })
}

/// Import an export file, appending contexts whose id is not stored yet.
///
/// Records without an id are skipped. Legacy record shapes are upgraded
/// first. Returns how many contexts were added.
pub async fn import<S: KeyValueStore>(
    repo: &ContextRepository<S>,
    json: &str,
) -> Result<usize, TransferError> {
    let mut file: Value = serde_json::from_str(json)?;

    if let Some(version) = file.get("version") {
        match version.as_u64() {
            Some(v) if v == u64::from(EXPORT_VERSION) => {}
            Some(v) => return Err(TransferError::UnsupportedVersion(v)),
            None => return Err(TransferError::UnsupportedVersion(0)),
        }
    }

    let raw = match file.get_mut("contexts").map(Value::take) {
        Some(Value::Array(items)) => items,
        _ => return Err(TransferError::MissingContexts),
    };

    let total = raw.len();
    let raw: Vec<Value> = raw.into_iter().filter(has_id).collect();
    let (records, _) =
        decode::<Context>(raw, repo.adapter().now_millis()).map_err(RepositoryError::from)?;

    let skipped = total - records.len();
    let added = repo.import(records).await?;
    tracing::info!(added, skipped, "imported contexts");
    Ok(added)
}

/// Suggested download name, e.g. `ai-contexts-2026-10-17.json`.
pub fn file_name(now_millis: i64) -> String {
    format!("ai-contexts-{}.json", timestamp(now_millis).format("%Y-%m-%d"))
}

fn has_id(record: &Value) -> bool {
    record
        .get("id")
        .and_then(Value::as_str)
        .is_some_and(|id| !id.trim().is_empty())
}

fn timestamp(millis: i64) -> DateTime<Utc> {
    Utc.timestamp_millis_opt(millis)
        .single()
        .unwrap_or(DateTime::<Utc>::UNIX_EPOCH)
}

fn iso8601(millis: i64) -> String {
    timestamp(millis).to_rfc3339_opts(SecondsFormat::Millis, true)
}
