//! Directory groups

use std::collections::HashMap;

use reqwest::Method;
use serde_json::Value;

use tenaz_api::client::report_error_if_any;
use tenaz_core::domain::document::str_of;
use tenaz_core::{ObjectKind, Result};

use crate::directory;
use crate::tenant::Tenant;
use crate::users::print_member_of;

const KIND: ObjectKind = ObjectKind::Group;

/// Extended attribute set requested for single-group lookups.
const BY_ID_SELECT: &str = "createdDateTime,description,displayName,expirationDateTime,\
groupTypes,id,isAssignableToRole,mail,mailEnabled,mailNickname,onPremisesLastSyncDateTime,\
onPremisesProvisioningErrors,onPremisesSamAccountName,onPremisesSecurityIdentifier,\
onPremisesSyncEnabled,renewedDateTime,securityEnabled,securityIdentifier,tags";

/// Groups matching `filter`; empty filter returns all.
pub async fn list(t: &Tenant, filter: &str, force: bool) -> Result<Vec<Value>> {
    directory::list_kind(t, KIND, filter, force).await
}

/// Number of groups the backend reports via the `$count` endpoint.
pub async fn count_remote(t: &Tenant) -> i64 {
    let url = t.api().graph_url("/v1.0/groups/$count");
    match t
        .api()
        .request(Method::GET, &url)
        .header("ConsistencyLevel", "eventual")
        .send()
        .await
    {
        Ok(response) => {
            report_error_if_any(&response);
            response.count()
        }
        Err(e) => {
            tracing::warn!(error = %e, "group count failed");
            0
        }
    }
}

/// Fetch one group with extended attributes.
pub async fn by_uuid(t: &Tenant, uuid: &str) -> Option<Value> {
    let url = t
        .api()
        .graph_url(&format!("/v1.0/groups/{uuid}?$select={BY_ID_SELECT}"));
    let response = t.api().request(Method::GET, &url).send().await.ok()?;
    let body = response.body?;
    (!str_of(&body, "id").is_empty()).then_some(body)
}

/// Cached group id to display-name map.
pub async fn id_map(t: &Tenant) -> HashMap<String, String> {
    let mut map = HashMap::new();
    if let Ok(groups) = list(t, "", false).await {
        for group in groups {
            let id = str_of(&group, "id");
            let name = str_of(&group, "displayName");
            if !id.is_empty() && !name.is_empty() {
                map.insert(id.to_string(), name.to_string());
            }
        }
    }
    map
}

/// Print a group with its own memberships.
pub async fn print(t: &Tenant, group: &Value) {
    for key in ["id", "displayName", "description", "isAssignableToRole"] {
        let value = match group.get(key) {
            Some(Value::Bool(b)) => b.to_string(),
            _ => str_of(group, key).to_string(),
        };
        if !value.is_empty() {
            println!("{key}: {value}");
        }
    }

    let id = str_of(group, "id");
    let url = t.api().graph_url(&format!("/v1.0/groups/{id}/memberOf"));
    if let Ok(response) = t.api().request(Method::GET, &url).send().await {
        if response.status.is_success() {
            print_member_of(response.value_list());
        }
    }
}

/// One-line rendering.
pub fn print_terse(group: &Value) {
    println!("{}  {}", str_of(group, "id"), str_of(group, "displayName"));
}

/// Print every cached group that can be assigned a directory role.
pub async fn print_privileged_access_groups(t: &Tenant) -> Result<()> {
    for group in list(t, "", false).await? {
        if group.get("isAssignableToRole").and_then(Value::as_bool) == Some(true) {
            print_terse(&group);
        }
    }
    Ok(())
}
