//! Helpers over untyped backend response documents
//!
//! The backends return JSON whose shape varies by kind and API version.
//! Rather than model every attribute, the tool keeps objects as
//! [`serde_json::Value`] documents and accesses fields through these
//! helpers, which mirror how the cache merge must preserve unknown keys
//! verbatim.

use serde_json::{Map, Value};

/// An untyped backend object document.
pub type RawDocument = Map<String, Value>;

/// String value of `obj[key]`, or `""` when absent or not a string.
pub fn str_of<'a>(obj: &'a Value, key: &str) -> &'a str {
    obj.get(key).and_then(Value::as_str).unwrap_or("")
}

/// Array value of `obj[key]`, or an empty slice when absent.
pub fn list_of<'a>(obj: &'a Value, key: &str) -> &'a [Value] {
    obj.get(key)
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or(&[])
}

/// The `properties` sub-object, if present.
pub fn properties(obj: &Value) -> Option<&Value> {
    obj.get("properties").filter(|v| v.is_object())
}

/// String value at a dotted path such as `properties.displayName`.
pub fn path_str<'a>(obj: &'a Value, path: &str) -> &'a str {
    let mut cur = obj;
    for seg in path.split('.') {
        match cur.get(seg) {
            Some(v) => cur = v,
            None => return "",
        }
    }
    cur.as_str().unwrap_or("")
}

/// Last `/`-separated segment of a path-like identifier.
///
/// Role assignment documents reference their definition by a fully
/// qualified id; the trailing segment is the definition UUID.
pub fn last_segment(s: &str) -> &str {
    s.rsplit('/').next().unwrap_or(s)
}

/// Shallow-merge `update` into `base` at the first level.
///
/// Updated values overwrite, keys only in the base are retained, keys
/// only in the update are added. Explicit nulls in the update are
/// ignored so a sparse delta entry cannot erase known attributes.
pub fn shallow_merge(base: &mut RawDocument, update: &RawDocument) {
    for (key, value) in update {
        if value.is_null() {
            continue;
        }
        base.insert(key.clone(), value.clone());
    }
}

/// True when any string anywhere in the document contains `filter`.
///
/// Used by role-definition filtering, where matches inside the nested
/// permission action lists are as relevant as the top-level attributes.
pub fn text_matches(obj: &Value, filter: &str) -> bool {
    match obj {
        Value::String(s) => s.contains(filter),
        Value::Array(items) => items.iter().any(|v| text_matches(v, filter)),
        Value::Object(map) => map.values().any(|v| text_matches(v, filter)),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_str_of() {
        let obj = json!({"id": "abc", "count": 3});
        assert_eq!(str_of(&obj, "id"), "abc");
        assert_eq!(str_of(&obj, "count"), "");
        assert_eq!(str_of(&obj, "missing"), "");
    }

    #[test]
    fn test_list_of() {
        let obj = json!({"value": [1, 2, 3], "name": "x"});
        assert_eq!(list_of(&obj, "value").len(), 3);
        assert!(list_of(&obj, "name").is_empty());
        assert!(list_of(&obj, "missing").is_empty());
    }

    #[test]
    fn test_path_str() {
        let obj = json!({"properties": {"displayName": "Prod", "nested": {"k": "v"}}});
        assert_eq!(path_str(&obj, "properties.displayName"), "Prod");
        assert_eq!(path_str(&obj, "properties.nested.k"), "v");
        assert_eq!(path_str(&obj, "properties.missing"), "");
        assert_eq!(path_str(&obj, "missing.displayName"), "");
    }

    #[test]
    fn test_last_segment() {
        assert_eq!(
            last_segment("/subscriptions/S1/providers/x/roleDefinitions/R1"),
            "R1"
        );
        assert_eq!(last_segment("plain"), "plain");
        assert_eq!(last_segment(""), "");
    }

    #[test]
    fn test_shallow_merge_overwrites_and_retains() {
        let mut base = json!({"id": "1", "v": "a", "k": "x"})
            .as_object()
            .unwrap()
            .clone();
        let update = json!({"id": "1", "v": "a2"}).as_object().unwrap().clone();
        shallow_merge(&mut base, &update);
        assert_eq!(base["v"], "a2");
        assert_eq!(base["k"], "x");
    }

    #[test]
    fn test_shallow_merge_adds_new_keys() {
        let mut base = json!({"id": "1"}).as_object().unwrap().clone();
        let update = json!({"extra": true}).as_object().unwrap().clone();
        shallow_merge(&mut base, &update);
        assert_eq!(base["extra"], true);
    }

    #[test]
    fn test_shallow_merge_ignores_nulls() {
        let mut base = json!({"id": "1", "v": "a"}).as_object().unwrap().clone();
        let update = json!({"v": null}).as_object().unwrap().clone();
        shallow_merge(&mut base, &update);
        assert_eq!(base["v"], "a");
    }

    #[test]
    fn test_text_matches_nested() {
        let obj = json!({
            "properties": {
                "permissions": [{"actions": ["Microsoft.Storage/read"]}]
            }
        });
        assert!(text_matches(&obj, "Storage/read"));
        assert!(!text_matches(&obj, "Compute"));
    }
}
