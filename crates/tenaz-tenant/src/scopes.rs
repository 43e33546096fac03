//! RBAC scope enumeration
//!
//! Role definitions and assignments must be gathered by walking every
//! management-group and subscription scope, because the backend's
//! `AtScopeAndBelow` filter does not behave as documented. The scope set
//! is the union of all management-group ids and all enabled,
//! non-legacy subscription ids, memoized for the invocation since both
//! RBAC traversals consume it.

use serde_json::Value;
use tracing::debug;

use tenaz_core::domain::document::str_of;
use tenaz_core::domain::scope::LEGACY_SUBSCRIPTION_NAME;
use tenaz_core::Result;

use crate::tenant::Tenant;
use crate::{management_groups, subscriptions};

/// Build the scope list from raw management-group and subscription objects.
///
/// Management groups contribute their full resource id. Subscriptions
/// contribute theirs only when enabled and not the legacy directory
/// subscription, which denies role-definition queries.
pub fn collect_scopes(management_groups: &[Value], subscriptions: &[Value]) -> Vec<String> {
    let mut scopes: Vec<String> = management_groups
        .iter()
        .map(|mg| str_of(mg, "id").to_string())
        .filter(|id| !id.is_empty())
        .collect();

    for sub in subscriptions {
        let state = str_of(sub, "state");
        let display_name = str_of(sub, "displayName");
        if state != "Enabled" || display_name == LEGACY_SUBSCRIPTION_NAME {
            continue;
        }
        let id = str_of(sub, "id");
        if !id.is_empty() {
            scopes.push(id.to_string());
        }
    }
    scopes
}

impl Tenant {
    /// Every RBAC scope in the tenant hierarchy, memoized per invocation.
    pub async fn rbac_scopes(&self) -> Result<Vec<String>> {
        let mut cache = self.scope_cache.lock().await;
        if let Some(scopes) = cache.as_ref() {
            return Ok(scopes.clone());
        }

        let mgs = management_groups::list(self, "", false).await?;
        let subs = subscriptions::list(self, "", false).await?;
        let scopes = collect_scopes(&mgs, &subs);
        debug!(count = scopes.len(), "RBAC scope list resolved");
        *cache = Some(scopes.clone());
        Ok(scopes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_collect_scopes_excludes_legacy_subscription() {
        let mgs = vec![
            json!({"id": "/providers/Microsoft.Management/managementGroups/A"}),
            json!({"id": "/providers/Microsoft.Management/managementGroups/B"}),
        ];
        let subs = vec![
            json!({"id": "/subscriptions/S1", "displayName": "P", "state": "Enabled"}),
            json!({
                "id": "/subscriptions/S2",
                "displayName": "Access to Azure Active Directory",
                "state": "Enabled"
            }),
        ];
        let scopes = collect_scopes(&mgs, &subs);
        assert_eq!(
            scopes,
            vec![
                "/providers/Microsoft.Management/managementGroups/A",
                "/providers/Microsoft.Management/managementGroups/B",
                "/subscriptions/S1",
            ]
        );
    }

    #[test]
    fn test_collect_scopes_excludes_disabled_subscription() {
        let subs = vec![
            json!({"id": "/subscriptions/S1", "displayName": "P", "state": "Disabled"}),
            json!({"id": "/subscriptions/S2", "displayName": "Q", "state": "Enabled"}),
        ];
        let scopes = collect_scopes(&[], &subs);
        assert_eq!(scopes, vec!["/subscriptions/S2"]);
    }

    #[test]
    fn test_collect_scopes_empty_inputs() {
        assert!(collect_scopes(&[], &[]).is_empty());
    }

    #[test]
    fn test_collect_scopes_skips_entries_without_id() {
        let mgs = vec![json!({"properties": {"displayName": "unnamed"}})];
        let subs = vec![json!({"displayName": "P", "state": "Enabled"})];
        assert!(collect_scopes(&mgs, &subs).is_empty());
    }
}
