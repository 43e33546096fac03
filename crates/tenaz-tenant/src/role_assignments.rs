//! RBAC role assignments
//!
//! Assignments are inherited downward, so the same assignment UUID
//! appears under every descendant scope; the traversal deduplicates on
//! the `name` UUID. An assignment's natural key is the
//! (roleDefinitionId, principalId, scope) triple.

use std::collections::{HashMap, HashSet};

use reqwest::Method;
use serde_json::{json, Value};
use uuid::Uuid;

use tenaz_api::client::report_error_if_any;
use tenaz_core::domain::document::{path_str, properties, str_of};
use tenaz_core::domain::scope;
use tenaz_core::{Error, ObjectKind, Result};
use tenaz_store::filter::object_matches;

use crate::role_definitions::{definition_uuid, API_VERSION};
use crate::tenant::Tenant;
use crate::{groups, role_definitions, service_principals, subscriptions, users};

const KIND: ObjectKind = ObjectKind::RoleAssignment;

/// The `scope` property, accepting the capitalized `Scope` synonym.
pub(crate) fn spec_scope(props: &Value) -> &str {
    let lower = str_of(props, "scope");
    if !lower.is_empty() {
        return lower;
    }
    str_of(props, "Scope")
}

/// Role assignments matching `filter`; empty filter returns all.
///
/// Besides the document's own attributes, the resolved role name of the
/// referenced definition participates in matching.
pub async fn list(t: &Tenant, filter: &str, force: bool) -> Result<Vec<Value>> {
    let objects = if t.store().needs_refresh(KIND, force, t.online()) {
        traverse_all(t, true).await?
    } else {
        t.store().cached(KIND)
    };
    if filter.is_empty() {
        return Ok(objects);
    }

    let role_names = role_definitions::id_map(t).await;
    let mut seen: HashSet<String> = HashSet::new();
    let mut hits = Vec::new();
    for assignment in &objects {
        let role_uuid = definition_uuid(path_str(assignment, "properties.roleDefinitionId"));
        let role_name_hit = role_names
            .get(role_uuid)
            .is_some_and(|name| name.contains(filter));
        if (object_matches(KIND, assignment, filter) || role_name_hit)
            && seen.insert(str_of(assignment, "name").to_string())
        {
            hits.push(assignment.clone());
        }
    }
    Ok(hits)
}

/// Walk the tenant root and every RBAC scope, deduplicate, update the snapshot.
pub async fn traverse_all(t: &Tenant, verbose: bool) -> Result<Vec<Value>> {
    let mut list: Vec<Value> = Vec::new();
    let mut seen: HashSet<String> = HashSet::new();
    let mut calls = 0u32;

    // Tenant root assignments need the atScope() filter; without it the
    // root endpoint refuses to enumerate.
    calls += 1;
    let url = t
        .api()
        .mgmt_url("/providers/Microsoft.Authorization/roleAssignments");
    match t
        .api()
        .request(Method::GET, &url)
        .query("api-version", API_VERSION)
        .query("$filter", "atScope()")
        .send()
        .await
    {
        Ok(response) => {
            report_error_if_any(&response);
            let mut count = 0usize;
            for entry in response.value_list() {
                if seen.insert(str_of(entry, "name").to_string()) {
                    list.push(entry.clone());
                    count += 1;
                }
            }
            if verbose && count > 0 {
                println!("API call {calls:4}: {count:5} objects under tenant root");
            }
        }
        Err(e) => tracing::warn!(error = %e, "tenant root query failed, continuing"),
    }

    let scopes = t.rbac_scopes().await?;
    let mg_names = if verbose {
        crate::management_groups::id_map(t).await
    } else {
        HashMap::new()
    };
    let sub_names = if verbose {
        subscriptions::id_map(t).await
    } else {
        HashMap::new()
    };

    for scope_path in &scopes {
        calls += 1;
        let url = t.api().mgmt_url(&format!(
            "{scope_path}/providers/Microsoft.Authorization/roleAssignments"
        ));
        let response = match t
            .api()
            .request(Method::GET, &url)
            .query("api-version", API_VERSION)
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => {
                tracing::warn!(scope = %scope_path, error = %e, "scope query failed, continuing");
                continue;
            }
        };
        report_error_if_any(&response);

        let mut count = 0usize;
        for entry in response.value_list() {
            if seen.insert(str_of(entry, "name").to_string()) {
                list.push(entry.clone());
                count += 1;
            }
        }
        if verbose && count > 0 {
            let scope_name =
                role_definitions::display_scope_name(scope_path, &mg_names, &sub_names);
            println!("API call {calls:4}: {count:5} objects under {scope_name}");
        }
    }

    t.store().save(KIND, &list)?;
    Ok(list)
}

/// Number of cached assignments.
pub fn count_local(t: &Tenant) -> i64 {
    t.store().count_local(KIND)
}

/// Number of assignments in the tenant, by full enumeration.
pub async fn count_remote(t: &Tenant) -> i64 {
    match traverse_all(t, false).await {
        Ok(list) => list.len() as i64,
        Err(e) => {
            tracing::warn!(error = %e, "role assignment count failed");
            0
        }
    }
}

/// Select the entry matching the (scope, definition UUID) pair.
pub(crate) fn match_assignment<'a>(
    results: &'a [Value],
    wanted_scope: &str,
    wanted_definition_uuid: &str,
) -> Option<&'a Value> {
    results.iter().find(|entry| {
        let scope_value = path_str(entry, "properties.scope");
        let rd_uuid = definition_uuid(path_str(entry, "properties.roleDefinitionId"));
        scope_value == wanted_scope && rd_uuid == wanted_definition_uuid
    })
}

/// Find the remote counterpart of a specfile assignment by natural key.
pub async fn by_object(t: &Tenant, spec: &Value) -> Result<Option<Value>> {
    let Some(props) = properties(spec) else {
        return Ok(None);
    };
    let rd_uuid = definition_uuid(str_of(props, "roleDefinitionId")).to_string();
    let principal_id = str_of(props, "principalId");
    let scope_path = spec_scope(props);
    if rd_uuid.is_empty() || principal_id.is_empty() || scope_path.is_empty() {
        return Ok(None);
    }

    let url = t.api().mgmt_url(&format!(
        "{scope_path}/providers/Microsoft.Authorization/roleAssignments"
    ));
    let response = t
        .api()
        .request(Method::GET, &url)
        .query("api-version", API_VERSION)
        .query("$filter", &format!("principalId eq '{principal_id}'"))
        .send()
        .await?;
    report_error_if_any(&response);
    Ok(match_assignment(response.value_list(), scope_path, &rd_uuid).cloned())
}

/// Find an assignment by its UUID, walking root and subscription scopes.
pub async fn by_uuid(t: &Tenant, uuid: &str) -> Option<Value> {
    let url = t
        .api()
        .mgmt_url("/providers/Microsoft.Authorization/roleAssignments");
    if let Ok(response) = t
        .api()
        .request(Method::GET, &url)
        .query("api-version", API_VERSION)
        .query("$filter", "atScope()")
        .send()
        .await
    {
        for entry in response.value_list() {
            if str_of(entry, "name") == uuid {
                return Some(entry.clone());
            }
        }
    }

    let scopes = t.rbac_scopes().await.ok()?;
    for scope_path in &scopes {
        let url = t.api().mgmt_url(&format!(
            "{scope_path}/providers/Microsoft.Authorization/roleAssignments"
        ));
        let response = t
            .api()
            .request(Method::GET, &url)
            .query("api-version", API_VERSION)
            .send()
            .await
            .ok()?;
        for entry in response.value_list() {
            if str_of(entry, "name") == uuid {
                return Some(entry.clone());
            }
        }
    }
    None
}

/// Validate the required fields of an assignment specfile.
pub fn validate_spec(spec: &Value) -> Result<()> {
    let props = properties(spec);
    let rd_id = props.map(|p| str_of(p, "roleDefinitionId")).unwrap_or("");
    let principal_id = props.map(|p| str_of(p, "principalId")).unwrap_or("");
    let scope_path = props.map(spec_scope).unwrap_or("");
    if rd_id.is_empty() || principal_id.is_empty() || scope_path.is_empty() {
        return Err(Error::Format(
            "specfile is missing required attributes; need at least:\n\n\
             properties:\n\
             \x20 roleDefinitionId: \"/providers/Microsoft.Authorization/roleDefinitions/UUID\"\n\
             \x20 principalId: \"UUID\"\n\
             \x20 scope: \"/subscriptions/UUID\"\n"
                .to_string(),
        ));
    }
    Ok(())
}

/// Create an assignment from a specfile object.
///
/// A fresh UUID is generated regardless of prior existence; the backend
/// rejects true duplicates and its message is surfaced verbatim.
pub async fn create(t: &Tenant, spec: &Value) -> Result<()> {
    validate_spec(spec)?;
    let props = properties(spec).expect("validated above");
    let scope_path = spec_scope(props).to_string();
    let payload = json!({
        "properties": {
            "roleDefinitionId": str_of(props, "roleDefinitionId"),
            "principalId": str_of(props, "principalId"),
        }
    });

    let assignment_id = Uuid::new_v4().to_string();
    let url = t.api().mgmt_url(&format!(
        "{scope_path}/providers/Microsoft.Authorization/roleAssignments/{assignment_id}"
    ));
    let response = t
        .api()
        .request(Method::PUT, &url)
        .query("api-version", API_VERSION)
        .json(payload)
        .send()
        .await?;

    if response.status.is_success() {
        if let Some(body) = &response.body {
            print(t, body).await;
        }
        Ok(())
    } else {
        let message = response
            .error_message()
            .unwrap_or("unexpected response")
            .to_string();
        Err(Error::remote("PUT", &url, message))
    }
}

/// Delete an assignment by its fully qualified id.
pub async fn delete_by_fqid(t: &Tenant, fqid: &str) -> Result<()> {
    let url = t.api().mgmt_url(fqid);
    let response = t
        .api()
        .request(Method::DELETE, &url)
        .query("api-version", API_VERSION)
        .send()
        .await?;
    match response.status.as_u16() {
        200 => Ok(()),
        204 => {
            println!("Role assignment already deleted or does not exist.");
            Ok(())
        }
        _ => {
            let message = response
                .error_message()
                .unwrap_or("unexpected response")
                .to_string();
            Err(Error::remote("DELETE", &url, message))
        }
    }
}

/// Print an assignment with role, principal, and scope annotations.
pub async fn print(t: &Tenant, assignment: &Value) {
    let uuid = str_of(assignment, "name");
    if !uuid.is_empty() {
        println!("id: {uuid}");
    }
    println!("properties:");
    let Some(props) = properties(assignment) else {
        println!("  <missing>");
        return;
    };

    let role_names = role_definitions::id_map(t).await;
    let rd_uuid = definition_uuid(str_of(props, "roleDefinitionId"));
    let role_name = role_names.get(rd_uuid).map(String::as_str).unwrap_or("???");
    println!("  {:<17} {rd_uuid}  # roleName = \"{role_name}\"", "roleDefinitionId:");

    let principal_type = str_of(props, "principalType");
    let principal_id = str_of(props, "principalId");
    let principal_names = match principal_type {
        "Group" => groups::id_map(t).await,
        "User" => users::id_map(t).await,
        "ServicePrincipal" => service_principals::id_map(t).await,
        _ => HashMap::new(),
    };
    let principal_name = principal_names
        .get(principal_id)
        .map(String::as_str)
        .unwrap_or("???");
    println!(
        "  {:<17} {principal_id}  # principalType = {}, displayName = \"{principal_name}\"",
        "principalId:",
        if principal_type.is_empty() {
            "not provided"
        } else {
            principal_type
        },
    );

    let scope_path = spec_scope(props);
    if scope_path == scope::TENANT_ROOT {
        println!("  {:<17} {scope_path}  # entire tenant", "scope:");
    } else {
        let sub_names = subscriptions::id_map(t).await;
        match scope::subscription_id(scope_path).and_then(|id| sub_names.get(id)) {
            Some(sub_name) => println!("  {:<17} {scope_path}  # sub = {sub_name}", "scope:"),
            None => println!("  {:<17} {scope_path}", "scope:"),
        }
    }
}

/// One-line rendering.
pub fn print_terse(assignment: &Value) {
    let rd_uuid = definition_uuid(path_str(assignment, "properties.roleDefinitionId"));
    println!(
        "{}  {}  {} {:<20} {}",
        str_of(assignment, "name"),
        rd_uuid,
        path_str(assignment, "properties.principalId"),
        format!("({})", path_str(assignment, "properties.principalType")),
        path_str(assignment, "properties.scope"),
    );
}

/// Print a report line per assignment: role, principal, type, scope.
pub async fn report(t: &Tenant) -> Result<()> {
    let role_names = role_definitions::id_map(t).await;
    let sub_names = subscriptions::id_map(t).await;
    let group_names = groups::id_map(t).await;
    let user_names = users::id_map(t).await;
    let sp_names = service_principals::id_map(t).await;

    for assignment in traverse_all(t, false).await? {
        let Some(props) = properties(&assignment) else {
            continue;
        };
        let rd_uuid = definition_uuid(str_of(props, "roleDefinitionId"));
        let role_name = role_names.get(rd_uuid).map(String::as_str).unwrap_or("");

        let principal_id = str_of(props, "principalId");
        let principal_type = str_of(props, "principalType");
        let principal_name = match principal_type {
            "Group" => group_names.get(principal_id),
            "User" => user_names.get(principal_id),
            "ServicePrincipal" => sp_names.get(principal_id),
            _ => None,
        }
        .map(String::as_str)
        .unwrap_or("ID-Not-Found");

        let mut scope_path = str_of(props, "scope").to_string();
        if let Some(sub_id) = scope::subscription_id(&scope_path) {
            if let Some(sub_name) = sub_names.get(sub_id) {
                let rest: Vec<&str> = scope_path.split('/').skip(3).collect();
                scope_path = format!("{sub_name} {}", rest.join("/")).trim().to_string();
            }
        }

        println!("\"{role_name}\",\"{principal_name}\",\"{principal_type}\",\"{scope_path}\"");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn assignment(scope_path: &str, rd: &str, principal: &str) -> Value {
        json!({
            "name": format!("a-{rd}-{principal}"),
            "properties": {
                "roleDefinitionId": format!(
                    "/subscriptions/S1/providers/Microsoft.Authorization/roleDefinitions/{rd}"
                ),
                "principalId": principal,
                "scope": scope_path
            }
        })
    }

    #[test]
    fn test_match_assignment_by_natural_key() {
        let results = vec![
            assignment("/subscriptions/S1", "R1", "P"),
            assignment("/subscriptions/S1", "R2", "P"),
        ];
        let hit = match_assignment(&results, "/subscriptions/S1", "R1").unwrap();
        assert_eq!(str_of(hit, "name"), "a-R1-P");
    }

    #[test]
    fn test_match_assignment_wrong_scope_is_none() {
        let results = vec![assignment("/subscriptions/S1", "R1", "P")];
        assert!(match_assignment(&results, "/subscriptions/S2", "R1").is_none());
    }

    #[test]
    fn test_match_assignment_wrong_definition_is_none() {
        let results = vec![assignment("/subscriptions/S1", "R1", "P")];
        assert!(match_assignment(&results, "/subscriptions/S1", "R9").is_none());
    }

    #[test]
    fn test_spec_scope_accepts_capitalized_synonym() {
        let props = json!({"Scope": "/subscriptions/S1"});
        assert_eq!(spec_scope(&props), "/subscriptions/S1");
        let props = json!({"scope": "/", "Scope": "/subscriptions/S1"});
        assert_eq!(spec_scope(&props), "/");
    }

    #[test]
    fn test_validate_requires_all_three_fields() {
        assert!(validate_spec(&json!({"properties": {
            "roleDefinitionId": "R1", "principalId": "P", "scope": "/subscriptions/S1"
        }}))
        .is_ok());
        assert!(validate_spec(&json!({"properties": {
            "roleDefinitionId": "R1", "principalId": "P"
        }}))
        .is_err());
        assert!(validate_spec(&json!({"properties": {
            "roleDefinitionId": "", "principalId": "P", "scope": "/s"
        }}))
        .is_err());
        assert!(validate_spec(&json!({})).is_err());
    }

    #[test]
    fn test_validate_accepts_scope_synonym() {
        assert!(validate_spec(&json!({"properties": {
            "roleDefinitionId": "R1", "principalId": "P", "Scope": "/subscriptions/S1"
        }}))
        .is_ok());
    }
}
