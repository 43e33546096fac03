//! Ordered-list diffing for reconciliation
//!
//! Given two lists of primitive strings, the diff reports which entries
//! exist only on each side and whether the lists are identical in order.
//! Membership is set-based; only the `same` flag considers order.

use std::collections::HashSet;

use serde_json::Value;

/// Result of comparing two string lists.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListDiff {
    /// Entries present only in the second list.
    pub added: Vec<String>,
    /// Entries present only in the first list.
    pub removed: Vec<String>,
    /// True when both lists are equal element by element, in order.
    pub same: bool,
}

fn as_str(v: &Value) -> &str {
    v.as_str().unwrap_or("")
}

/// Compare two lists of JSON strings.
///
/// `added = after \ before`, `removed = before \ after`; each preserves
/// the source list's order.
pub fn diff_lists(before: &[Value], after: &[Value]) -> ListDiff {
    let before_set: HashSet<&str> = before.iter().map(as_str).collect();
    let after_set: HashSet<&str> = after.iter().map(as_str).collect();

    let added = after
        .iter()
        .map(as_str)
        .filter(|s| !before_set.contains(s))
        .map(str::to_string)
        .collect();

    let removed = before
        .iter()
        .map(as_str)
        .filter(|s| !after_set.contains(s))
        .map(str::to_string)
        .collect();

    let same = before.len() == after.len()
        && before
            .iter()
            .zip(after.iter())
            .all(|(a, b)| as_str(a) == as_str(b));

    ListDiff {
        added,
        removed,
        same,
    }
}
