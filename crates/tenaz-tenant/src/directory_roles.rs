//! Directory roles
//!
//! Directory role definitions are a short list with no delta endpoint;
//! they are always fetched whole. The accurate tenant-wide count comes
//! from the role templates endpoint, which is cheaper than enumerating
//! activated roles.

use reqwest::Method;
use serde_json::Value;

use tenaz_api::client::report_error_if_any;
use tenaz_core::domain::document::str_of;
use tenaz_core::{ObjectKind, Result};
use tenaz_store::filter::matching;

use crate::tenant::Tenant;

const KIND: ObjectKind = ObjectKind::DirectoryRole;

/// Extended attribute set requested for single lookups.
const BY_ID_SELECT: &str = "id,displayName,description,isBuiltIn,isEnabled,resourceScopes,\
templateId,version,rolePermissions,inheritsPermissionsFrom";

/// Directory roles matching `filter`; empty filter returns all.
pub async fn list(t: &Tenant, filter: &str, force: bool) -> Result<Vec<Value>> {
    let objects = if t.store().needs_refresh(KIND, force, t.online()) {
        fetch_all(t).await?
    } else {
        t.store().cached(KIND)
    };
    Ok(matching(KIND, &objects, filter))
}

/// Fetch every directory role definition and update the snapshot.
pub async fn fetch_all(t: &Tenant) -> Result<Vec<Value>> {
    let url = t
        .api()
        .graph_url("/v1.0/roleManagement/directory/roleDefinitions");
    let response = t.api().request(Method::GET, &url).send().await?;
    report_error_if_any(&response);
    let list = response.value_list().to_vec();
    t.store().save(KIND, &list)?;
    Ok(list)
}

/// Count via the role templates endpoint, which covers non-activated roles.
pub async fn count_remote(t: &Tenant) -> i64 {
    let url = t.api().graph_url("/v1.0/directoryRoleTemplates");
    match t.api().request(Method::GET, &url).send().await {
        Ok(response) => {
            report_error_if_any(&response);
            response.value_list().len() as i64
        }
        Err(e) => {
            tracing::warn!(error = %e, "directory role count failed");
            0
        }
    }
}

/// Fetch one directory role definition with extended attributes.
pub async fn by_uuid(t: &Tenant, uuid: &str) -> Option<Value> {
    let url = t.api().graph_url(&format!(
        "/v1.0/roleManagement/directory/roleDefinitions/{uuid}?$select={BY_ID_SELECT}"
    ));
    let response = t.api().request(Method::GET, &url).send().await.ok()?;
    let body = response.body?;
    (!str_of(&body, "id").is_empty()).then_some(body)
}

/// Print a directory role with its current assignments.
pub async fn print(t: &Tenant, role: &Value) {
    for key in ["id", "displayName", "description", "templateId"] {
        let value = str_of(role, key);
        if !value.is_empty() {
            println!("{key}: {value}");
        }
    }

    let template_id = str_of(role, "templateId");
    let url = t
        .api()
        .graph_url("/v1.0/roleManagement/directory/roleAssignments");
    let response = t
        .api()
        .request(Method::GET, &url)
        .query("$filter", &format!("roleDefinitionId eq '{template_id}'"))
        .query("$expand", "principal")
        .send()
        .await;
    if let Ok(response) = response {
        let assignments = response.value_list();
        if response.status.is_success() && !assignments.is_empty() {
            println!("assignments:");
            for assignment in assignments {
                let principal = assignment.get("principal").cloned().unwrap_or_default();
                println!(
                    "  {:<50}  {:<10}  {}",
                    str_of(&principal, "displayName"),
                    tenaz_core::domain::document::last_segment(str_of(
                        &principal,
                        "@odata.type"
                    )),
                    str_of(assignment, "directoryScopeId"),
                );
            }
        }
    }
}

/// One-line rendering.
pub fn print_terse(role: &Value) {
    let built_in = if role.get("isBuiltIn").and_then(Value::as_bool) == Some(true) {
        "BuiltIn"
    } else {
        "Custom"
    };
    let enabled = if role.get("isEnabled").and_then(Value::as_bool) == Some(true) {
        "Enabled"
    } else {
        "NotEnabled"
    };
    println!(
        "{}  {:<60}  {built_in}  {enabled}",
        str_of(role, "id"),
        str_of(role, "displayName"),
    );
}
