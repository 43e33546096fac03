//! Service principals
//!
//! Service principals carry both an object `id` and the `appId` of the
//! application they instantiate. Single-object lookups therefore fall
//! back to an `appId` filter query when the primary lookup returns an
//! error document.

use std::collections::HashMap;

use reqwest::Method;
use serde_json::Value;

use tenaz_api::client::report_error_if_any;
use tenaz_core::domain::document::str_of;
use tenaz_core::{ObjectKind, Result};

use crate::directory;
use crate::tenant::Tenant;

const KIND: ObjectKind = ObjectKind::ServicePrincipal;

/// Extended attribute set requested for single lookups.
const BY_ID_SELECT: &str = "id,displayName,appId,accountEnabled,servicePrincipalType,\
appOwnerOrganizationId,appRoleAssignmentRequired,appRoles,disabledByMicrosoftStatus,\
alternativeNames,appDisplayName,homepage,info,logoutUrl,notes,oauth2PermissionScopes,\
replyUrls,servicePrincipalNames,tags";

/// Service principals matching `filter`; empty filter returns all.
pub async fn list(t: &Tenant, filter: &str, force: bool) -> Result<Vec<Value>> {
    directory::list_kind(t, KIND, filter, force).await
}

/// Remote counts split into (native to this tenant, foreign).
pub async fn count_remote(t: &Tenant) -> (i64, i64) {
    let url = t.api().graph_url("/beta/servicePrincipals/$count");
    let all = match t
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
            tracing::warn!(error = %e, "service principal count failed");
            return (0, 0);
        }
    };

    let url = t.api().graph_url("/beta/servicePrincipals");
    let native = match t
        .api()
        .request(Method::GET, &url)
        .header("ConsistencyLevel", "eventual")
        .query(
            "$filter",
            &format!("appOwnerOrganizationId eq {}", t.tenant_id()),
        )
        .query("$count", "true")
        .send()
        .await
    {
        Ok(response) => response
            .body
            .as_ref()
            .and_then(|b| b.get("@odata.count"))
            .and_then(Value::as_i64)
            .unwrap_or(0),
        Err(e) => {
            tracing::warn!(error = %e, "native service principal count failed");
            0
        }
    };

    (native, all - native)
}

/// Local counts split into (native to this tenant, foreign).
pub fn count_local(t: &Tenant) -> (i64, i64) {
    let mut native = 0;
    let mut foreign = 0;
    for sp in t.store().cached(KIND) {
        if str_of(&sp, "appOwnerOrganizationId") == t.tenant_id() {
            native += 1;
        } else {
            foreign += 1;
        }
    }
    (native, foreign)
}

/// Fetch one service principal by object id, falling back to `appId`.
pub async fn by_uuid(t: &Tenant, uuid: &str) -> Option<Value> {
    let url = t
        .api()
        .graph_url(&format!("/beta/servicePrincipals/{uuid}?$select={BY_ID_SELECT}"));
    let response = t.api().request(Method::GET, &url).send().await.ok()?;
    let body = response.body?;
    if body.get("error").is_none() && !str_of(&body, "id").is_empty() {
        return Some(body);
    }

    // The given UUID may be the application client id of this principal.
    let url = t
        .api()
        .graph_url(&format!("/beta/servicePrincipals?$select={BY_ID_SELECT}"));
    let response = t
        .api()
        .request(Method::GET, &url)
        .query("$filter", &format!("appId eq '{uuid}'"))
        .send()
        .await
        .ok()?;
    let matches = response.value_list();
    (matches.len() == 1).then(|| matches[0].clone())
}

/// Cached service-principal id to display-name map.
pub async fn id_map(t: &Tenant) -> HashMap<String, String> {
    let mut map = HashMap::new();
    if let Ok(sps) = list(t, "", false).await {
        for sp in sps {
            let id = str_of(&sp, "id");
            let name = str_of(&sp, "displayName");
            if !id.is_empty() && !name.is_empty() {
                map.insert(id.to_string(), name.to_string());
            }
        }
    }
    map
}

/// Print the main service-principal attributes.
pub fn print(sp: &Value) {
    for key in [
        "id",
        "displayName",
        "appId",
        "servicePrincipalType",
        "appOwnerOrganizationId",
    ] {
        let value = str_of(sp, key);
        if !value.is_empty() {
            println!("{key}: {value}");
        }
    }
    if let Some(enabled) = sp.get("accountEnabled").and_then(Value::as_bool) {
        println!("accountEnabled: {enabled}");
    }
}

/// One-line rendering.
pub fn print_terse(sp: &Value) {
    println!(
        "{}  {:<60} {:<22} {}",
        str_of(sp, "id"),
        str_of(sp, "displayName"),
        str_of(sp, "servicePrincipalType"),
        str_of(sp, "appId"),
    );
}
