//! Load-time schema migration for stored contexts.
//!
//! Raw records are upgraded to the current shape before they are
//! deserialized, so business logic only ever sees fully populated contexts.
//! Every step only fills in or repairs what is missing, which keeps the pass
//! idempotent: two environments migrating the same data converge.

use serde_json::{Map, Value};
use uuid::Uuid;

use super::context::{normalize_title, DEFAULT_TITLE};

/// Namespace for ids derived from the content of id-less legacy records.
const LEGACY_ID_NAMESPACE: Uuid = Uuid::from_u128(0x3b0e_5f2a_9c41_4d7e_a6b8_1f20_c5d9_e473);

/// Current shape of the persisted context collection.
///
/// 1: popup-era records (`content`, `created`, `lastUsed`).
/// 2: `body`, `categoryId`, `uses`, `createdAt`, `updatedAt`.
pub const SCHEMA_VERSION: u32 = 2;

/// Upgrade every raw record in place. Returns true if anything changed.
///
/// Entries that are not JSON objects cannot be upgraded and are dropped.
pub fn migrate_all(records: &mut Vec<Value>, now_millis: i64) -> bool {
    let before = records.len();
    records.retain(Value::is_object);
    let mut changed = records.len() != before;

    for (position, record) in records.iter_mut().enumerate() {
        changed |= migrate_at(record, position, now_millis);
    }
    changed
}

/// Upgrade one raw record in place. Returns true if anything changed.
pub fn migrate_record(record: &mut Value, now_millis: i64) -> bool {
    migrate_at(record, 0, now_millis)
}

/// `position` is the record's index in its collection; it only feeds the
/// derived id of a record that has none.
fn migrate_at(record: &mut Value, position: usize, now_millis: i64) -> bool {
    let Some(fields) = record.as_object_mut() else {
        return false;
    };

    let mut changed = false;
    if !fields.get("id").is_some_and(Value::is_string) {
        let id = derived_id(fields, position);
        fields.insert("id".into(), Value::String(id));
        changed = true;
    }

    changed |= rename(fields, "content", "body");
    changed |= rename(fields, "created", "createdAt");

    let title = match fields.get("title").and_then(Value::as_str) {
        Some(title) => normalize_title(title),
        None => DEFAULT_TITLE.to_string(),
    };
    if fields.get("title").and_then(Value::as_str) != Some(title.as_str()) {
        fields.insert("title".into(), Value::String(title));
        changed = true;
    }
    changed |= ensure_string(fields, "body", String::new);

    if !matches!(fields.get("categoryId"), Some(Value::Null | Value::String(_))) {
        fields.insert("categoryId".into(), Value::Null);
        changed = true;
    }

    if fields.get("uses").and_then(Value::as_u64).is_none() {
        fields.insert("uses".into(), Value::from(0u64));
        changed = true;
    }

    let created_at = fields.get("createdAt").and_then(Value::as_i64);
    let updated_at = match fields.get("updatedAt").and_then(Value::as_i64) {
        Some(updated_at) => updated_at,
        None => {
            let updated_at = created_at
                .or_else(|| fields.get("lastUsed").and_then(Value::as_i64))
                .unwrap_or(now_millis);
            fields.insert("updatedAt".into(), Value::from(updated_at));
            changed = true;
            updated_at
        }
    };

    let created_at = match created_at {
        Some(created_at) => created_at,
        None => {
            fields.insert("createdAt".into(), Value::from(updated_at));
            changed = true;
            updated_at
        }
    };

    if updated_at < created_at {
        fields.insert("updatedAt".into(), Value::from(created_at));
        changed = true;
    }

    changed
}

/// Same record content at the same position always yields the same id, so
/// every environment reading an id-less record agrees on it.
fn derived_id(fields: &Map<String, Value>, position: usize) -> String {
    let mut name = serde_json::to_vec(fields).unwrap_or_default();
    name.extend_from_slice(&(position as u64).to_be_bytes());
    Uuid::new_v5(&LEGACY_ID_NAMESPACE, &name).to_string()
}

fn rename(fields: &mut Map<String, Value>, from: &str, to: &str) -> bool {
    if fields.contains_key(to) {
        return false;
    }
    match fields.remove(from) {
        Some(value) => {
            fields.insert(to.to_string(), value);
            true
        }
        None => false,
    }
}

fn ensure_string(
    fields: &mut Map<String, Value>,
    key: &str,
    default: impl FnOnce() -> String,
) -> bool {
    if fields.get(key).is_some_and(Value::is_string) {
        return false;
    }
    fields.insert(key.to_string(), Value::String(default()));
    true
}
