//! Snapshot merge algorithm
//!
//! Folds a server-returned change set into the cached base list. Entries
//! carrying a `@removed` or `members@delta` marker are tombstones and
//! evict the matching base entry; the rest are upserts, deduplicated on
//! first occurrence, that either shallow-merge into an existing entry or
//! append as new. Base order is preserved, new entries follow in delta
//! order.

use std::collections::{HashMap, HashSet};

use serde_json::Value;
use tracing::debug;

use tenaz_core::domain::document::{shallow_merge, str_of};

/// Marker attributes identifying a tombstone entry.
const TOMBSTONE_MARKERS: [&str; 2] = ["@removed", "members@delta"];

fn is_tombstone(entry: &Value) -> bool {
    TOMBSTONE_MARKERS.iter().any(|m| entry.get(*m).is_some())
}

/// Merge a delta change set into a base list, keyed on `id_key`.
pub fn merge(base: Vec<Value>, delta: &[Value], id_key: &str) -> Vec<Value> {
    // Partition the delta into tombstones and first-occurrence upserts.
    let mut tombstone_ids: HashSet<String> = HashSet::new();
    let mut upserts: Vec<&Value> = Vec::new();
    let mut upsert_ids: HashSet<String> = HashSet::new();
    for entry in delta {
        let id = str_of(entry, id_key).to_string();
        if is_tombstone(entry) {
            tombstone_ids.insert(id);
        } else if upsert_ids.insert(id) {
            upserts.push(entry);
        }
    }

    // Drop tombstoned entries from the base.
    let mut merged: Vec<Value> = Vec::with_capacity(base.len() + upserts.len());
    let mut base_ids: HashSet<String> = HashSet::new();
    for entry in base {
        let id = str_of(&entry, id_key).to_string();
        if tombstone_ids.contains(&id) {
            continue;
        }
        base_ids.insert(id);
        merged.push(entry);
    }

    // Split upserts into updates of surviving entries and new entries.
    let mut updates: HashMap<&str, &Value> = HashMap::new();
    let mut new_entries: Vec<&Value> = Vec::new();
    for &entry in &upserts {
        let id = str_of(entry, id_key);
        if base_ids.contains(id) {
            updates.insert(id, entry);
        } else {
            new_entries.push(entry);
        }
    }

    // Apply updates in place, keeping keys the delta did not mention.
    for entry in &mut merged {
        let id = str_of(entry, id_key).to_string();
        if let Some(update) = updates.get(id.as_str()) {
            if let (Some(base_obj), Some(update_obj)) =
                (entry.as_object().cloned(), update.as_object())
            {
                let mut merged_obj = base_obj;
                shallow_merge(&mut merged_obj, update_obj);
                *entry = Value::Object(merged_obj);
            }
        }
    }

    merged.extend(new_entries.into_iter().cloned());

    debug!(
        tombstones = tombstone_ids.len(),
        updates = updates.len(),
        merged = merged.len(),
        "change set merged"
    );
    merged
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn ids(list: &[Value]) -> Vec<&str> {
        list.iter().map(|v| str_of(v, "id")).collect()
    }

    #[test]
    fn test_tombstone_removes_and_new_appends() {
        let base = vec![json!({"id": "1", "v": "a"}), json!({"id": "2", "v": "b"})];
        let delta = vec![
            json!({"id": "2", "@removed": {"reason": "deleted"}}),
            json!({"id": "3", "v": "c"}),
        ];
        let merged = merge(base, &delta, "id");
        assert_eq!(ids(&merged), vec!["1", "3"]);
        assert_eq!(merged[1]["v"], "c");
    }

    #[test]
    fn test_members_delta_marker_is_a_tombstone() {
        let base = vec![json!({"id": "g1"})];
        let delta = vec![json!({"id": "g1", "members@delta": []})];
        let merged = merge(base, &delta, "id");
        assert!(merged.is_empty());
    }

    #[test]
    fn test_update_shallow_merges() {
        let base = vec![json!({"id": "1", "v": "a", "k": "x"})];
        let delta = vec![json!({"id": "1", "v": "a2"})];
        let merged = merge(base, &delta, "id");
        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0]["v"], "a2");
        assert_eq!(merged[0]["k"], "x");
    }

    #[test]
    fn test_empty_delta_is_identity() {
        let base = vec![json!({"id": "1"}), json!({"id": "2"})];
        let once = merge(base.clone(), &[], "id");
        assert_eq!(once, base);
        let twice = merge(once.clone(), &[], "id");
        assert_eq!(twice, once);
    }

    #[test]
    fn test_disjoint_upserts_append_in_order() {
        let base = vec![json!({"id": "1"}), json!({"id": "2"})];
        let delta = vec![json!({"id": "9"}), json!({"id": "8"})];
        let merged = merge(base, &delta, "id");
        assert_eq!(ids(&merged), vec!["1", "2", "9", "8"]);
    }

    #[test]
    fn test_duplicate_upserts_keep_first_occurrence() {
        let base = vec![];
        let delta = vec![
            json!({"id": "1", "v": "first"}),
            json!({"id": "1", "v": "second"}),
        ];
        let merged = merge(base, &delta, "id");
        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0]["v"], "first");
    }

    #[test]
    fn test_merged_ids_are_unique() {
        let base = vec![json!({"id": "1"}), json!({"id": "2"})];
        let delta = vec![
            json!({"id": "2", "v": "updated"}),
            json!({"id": "3"}),
            json!({"id": "3"}),
        ];
        let merged = merge(base, &delta, "id");
        let mut seen = std::collections::HashSet::new();
        for entry in &merged {
            assert!(seen.insert(str_of(entry, "id")), "duplicate id in merge result");
        }
        assert_eq!(merged.len(), 3);
    }

    #[test]
    fn test_alternate_id_key() {
        let base = vec![json!({"name": "r1", "properties": {"roleName": "Old"}})];
        let delta = vec![json!({"name": "r1", "properties": {"roleName": "New"}})];
        let merged = merge(base, &delta, "name");
        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0]["properties"]["roleName"], "New");
    }

    #[test]
    fn test_unrelated_tombstone_is_a_no_op() {
        let base = vec![json!({"id": "1"})];
        let delta = vec![json!({"id": "99", "@removed": {}})];
        let merged = merge(base, &delta, "id");
        assert_eq!(ids(&merged), vec!["1"]);
    }
}
