//! Merge-by-key rules for externally sourced records.

use crate::error::SyncError;
use crate::session::TabRecord;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::collections::HashMap;

/// Key field of workspaces
pub const SPACE_KEY: &str = "uuid";
/// Key field of folders and groups
pub const CONTAINER_KEY: &str = "id";
/// Key field of tabs
pub const TAB_KEY: &str = "itemId";

fn key_of(value: &Value, key: &str) -> Option<String> {
    value
        .get(key)
        .and_then(Value::as_str)
        .filter(|k| !k.is_empty())
        .map(str::to_owned)
}

/// Fold `incoming` into `local`, matching records on the `key` field.
///
/// A matched local record becomes the shallow union of its fields and the
/// incoming ones (incoming wins). Unmatched incoming records are appended in
/// incoming order; incoming records without a key are ignored. Local records
/// are never removed and keep their order.
pub fn merge_by_key<T>(local: &[T], incoming: &[T], key: &str) -> Result<Vec<T>, SyncError>
where
    T: Serialize + DeserializeOwned,
{
    let mut merged: Vec<Value> = local
        .iter()
        .map(serde_json::to_value)
        .collect::<Result<_, _>>()?;
    let mut index: HashMap<String, usize> = merged
        .iter()
        .enumerate()
        .filter_map(|(i, v)| key_of(v, key).map(|k| (k, i)))
        .collect();

    for record in incoming {
        let value = serde_json::to_value(record)?;
        let Some(record_key) = key_of(&value, key) else {
            continue;
        };
        match index.get(&record_key) {
            Some(&slot) => shallow_union(&mut merged[slot], value),
            None => {
                index.insert(record_key, merged.len());
                merged.push(value);
            }
        }
    }

    merged
        .into_iter()
        .map(serde_json::from_value)
        .collect::<Result<_, _>>()
        .map_err(SyncError::from)
}

fn shallow_union(target: &mut Value, incoming: Value) {
    match (target, incoming) {
        (Value::Object(target), Value::Object(fields)) => {
            for (name, value) in fields {
                target.insert(name, value);
            }
        }
        (target, incoming) => *target = incoming,
    }
}

/// Fold externally pinned tabs into the local tab list.
///
/// A keyed incoming tab matching a locally pinned tab refreshes only the
/// fields that travel between devices; history and anything else local is
/// kept. Unknown keys are appended as new pinned tabs. Local unpinned tabs
/// and pinned tabs without a key are never touched.
pub fn merge_pinned_tabs(local: &[TabRecord], incoming: &[TabRecord]) -> Vec<TabRecord> {
    let mut merged = local.to_vec();
    let mut index: HashMap<_, usize> = merged
        .iter()
        .enumerate()
        .filter_map(|(i, t)| t.item_id.clone().map(|id| (id, i)))
        .collect();

    for remote in incoming {
        let Some(item_id) = remote.item_id.clone().filter(|id| !id.is_empty()) else {
            continue;
        };
        match index.get(&item_id) {
            Some(&slot) if merged[slot].pinned => refresh_portable(&mut merged[slot], remote),
            Some(_) => {
                crate::debug_trace!("SYNC", "Ignoring {}: unpinned locally", item_id);
            }
            None => {
                index.insert(item_id, merged.len());
                merged.push(TabRecord {
                    pinned: true,
                    ..remote.clone()
                });
            }
        }
    }
    merged
}

fn refresh_portable(local: &mut TabRecord, remote: &TabRecord) {
    local.pinned = remote.pinned;
    local.essential = remote.essential;
    local.workspace_id = remote.workspace_id.clone();
    local.parent_group_id = remote.parent_group_id.clone();
    local.label = remote.label.clone();
    local.icon = remote.icon.clone();
    local.container_id = remote.container_id;
    if remote.position.is_some() {
        local.position = remote.position;
    }
}
