//! In-memory substring filter matcher
//!
//! Each kind declares a fixed list of string-valued search keys. An
//! object is included when any key contains the filter as a raw,
//! case-sensitive substring; an object matched through several keys is
//! emitted once (dedup on the kind's primary id). The empty filter
//! returns every object verbatim.

use std::collections::HashSet;

use serde_json::Value;

use tenaz_core::domain::document::{path_str, text_matches};
use tenaz_core::ObjectKind;

/// True when `object` matches `filter` on any of the kind's search keys.
///
/// Role definitions additionally match on any string anywhere in the
/// document, so action patterns inside the permission lists are
/// searchable for the diff flows.
pub fn object_matches(kind: ObjectKind, object: &Value, filter: &str) -> bool {
    let key_hit = kind
        .search_keys()
        .iter()
        .any(|key| path_str(object, key).contains(filter));
    if key_hit {
        return true;
    }
    kind == ObjectKind::RoleDefinition && text_matches(object, filter)
}

/// Objects whose search keys match `filter`, deduplicated on primary id.
pub fn matching(kind: ObjectKind, objects: &[Value], filter: &str) -> Vec<Value> {
    if filter.is_empty() {
        return objects.to_vec();
    }
    let id_key = kind.id_key();
    let mut seen: HashSet<String> = HashSet::new();
    objects
        .iter()
        .filter(|obj| object_matches(kind, obj, filter))
        .filter(|obj| seen.insert(path_str(obj, id_key).to_string()))
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn users() -> Vec<Value> {
        vec![
            json!({"id": "u-1", "displayName": "Alice Adams", "userPrincipalName": "alice@x.com"}),
            json!({"id": "u-2", "displayName": "Bob Brown", "userPrincipalName": "bob@x.com"}),
            json!({"id": "u-3", "displayName": "alice-svc", "onPremisesSamAccountName": "ALICESVC"}),
        ]
    }

    #[test]
    fn test_empty_filter_returns_everything_verbatim() {
        let list = users();
        assert_eq!(matching(ObjectKind::User, &list, ""), list);
    }

    #[test]
    fn test_substring_match_is_case_sensitive() {
        let list = users();
        let hits = matching(ObjectKind::User, &list, "Alice");
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0]["id"], "u-1");

        let hits = matching(ObjectKind::User, &list, "alice");
        assert_eq!(hits.len(), 2);
    }

    #[test]
    fn test_multi_key_match_emits_once() {
        // "u-1" appears in id; "alice@x.com" contains nothing shared. Use a
        // filter hitting both displayName and userPrincipalName of one user.
        let list = vec![json!({
            "id": "u-9", "displayName": "same", "userPrincipalName": "same"
        })];
        let hits = matching(ObjectKind::User, &list, "same");
        assert_eq!(hits.len(), 1);
    }

    #[test]
    fn test_every_hit_contains_filter_in_some_key() {
        let list = users();
        let filter = "x.com";
        for hit in matching(ObjectKind::User, &list, filter) {
            let found = ObjectKind::User
                .search_keys()
                .iter()
                .any(|k| path_str(&hit, k).contains(filter));
            assert!(found);
        }
    }

    #[test]
    fn test_dotted_keys_reach_properties() {
        let groups = vec![json!({
            "name": "mg-1",
            "properties": {"displayName": "Platform Engineering"}
        })];
        let hits = matching(ObjectKind::ManagementGroup, &groups, "Platform");
        assert_eq!(hits.len(), 1);
    }

    #[test]
    fn test_role_definition_matches_inside_permissions() {
        let defs = vec![json!({
            "name": "rd-1",
            "properties": {
                "roleName": "Storage Reader",
                "permissions": [{"actions": ["Microsoft.Storage/storageAccounts/read"]}]
            }
        })];
        let hits = matching(ObjectKind::RoleDefinition, &defs, "storageAccounts/read");
        assert_eq!(hits.len(), 1);
    }

    #[test]
    fn test_non_matching_filter_returns_nothing() {
        let list = users();
        assert!(matching(ObjectKind::User, &list, "zzz").is_empty());
    }
}
