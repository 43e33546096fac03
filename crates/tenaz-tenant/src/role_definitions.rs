//! RBAC role definitions
//!
//! The resource backend's `AtScopeAndBelow()` filter is documented but
//! not honored, so the complete definition set can only be obtained by
//! querying every management-group and subscription scope and
//! deduplicating the inherited repeats.

use std::collections::{HashMap, HashSet};

use reqwest::Method;
use serde_json::Value;
use uuid::Uuid;

use tenaz_api::client::report_error_if_any;
use tenaz_core::domain::diff::diff_lists;
use tenaz_core::domain::document::{last_segment, list_of, path_str, properties, str_of};
use tenaz_core::domain::scope;
use tenaz_core::{Error, ObjectKind, Result};
use tenaz_store::filter::matching;

use crate::reconcile::confirm;
use crate::tenant::Tenant;
use crate::{management_groups, subscriptions};

const KIND: ObjectKind = ObjectKind::RoleDefinition;
pub(crate) const API_VERSION: &str = "2022-04-01";

/// The four permission action lists of a definition.
pub(crate) const ACTION_LISTS: [&str; 4] = ["actions", "notActions", "dataActions", "notDataActions"];

/// Role definitions matching `filter`; empty filter returns all.
pub async fn list(t: &Tenant, filter: &str, force: bool) -> Result<Vec<Value>> {
    let objects = if t.store().needs_refresh(KIND, force, t.online()) {
        traverse_all(t, true).await?
    } else {
        t.store().cached(KIND)
    };
    Ok(matching(KIND, &objects, filter))
}

/// Walk every RBAC scope, deduplicate, and update the snapshot.
pub async fn traverse_all(t: &Tenant, verbose: bool) -> Result<Vec<Value>> {
    let scopes = t.rbac_scopes().await?;
    let mg_names = if verbose {
        management_groups::id_map(t).await
    } else {
        HashMap::new()
    };
    let sub_names = if verbose {
        subscriptions::id_map(t).await
    } else {
        HashMap::new()
    };

    let mut list: Vec<Value> = Vec::new();
    let mut seen: HashSet<String> = HashSet::new();
    let mut calls = 0u32;

    for scope_path in &scopes {
        calls += 1;
        let url = t.api().mgmt_url(&format!(
            "{scope_path}/providers/Microsoft.Authorization/roleDefinitions"
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
            // 'name' is the definition UUID; inherited copies repeat under
            // every descendant scope.
            let uuid = str_of(entry, "name").to_string();
            if !seen.insert(uuid) {
                continue;
            }
            list.push(entry.clone());
            count += 1;
        }

        if verbose && count > 0 {
            let scope_name = display_scope_name(scope_path, &mg_names, &sub_names);
            println!("API call {calls:4}: {count:5} objects under {scope_name}");
        }
    }

    t.store().save(KIND, &list)?;
    Ok(list)
}

/// Human name for a scope path, for progress lines.
pub(crate) fn display_scope_name(
    scope_path: &str,
    mg_names: &HashMap<String, String>,
    sub_names: &HashMap<String, String>,
) -> String {
    if scope::is_management_group(scope_path) {
        if let Some(name) = mg_names.get(scope_path) {
            return name.clone();
        }
    } else if scope::is_subscription(scope_path) {
        if let Some(name) = scope::subscription_id(scope_path).and_then(|id| sub_names.get(id)) {
            return name.clone();
        }
    }
    scope_path.to_string()
}

/// (builtin, custom) split of the local snapshot.
pub fn count_local(t: &Tenant) -> (i64, i64) {
    split_counts(&t.store().cached(KIND))
}

/// (builtin, custom) split fetched from the backend.
pub async fn count_remote(t: &Tenant) -> (i64, i64) {
    match traverse_all(t, false).await {
        Ok(list) => split_counts(&list),
        Err(e) => {
            tracing::warn!(error = %e, "role definition count failed");
            (0, 0)
        }
    }
}

fn split_counts(definitions: &[Value]) -> (i64, i64) {
    let mut builtin = 0;
    let mut custom = 0;
    for def in definitions {
        if path_str(def, "properties.type") == "CustomRole" {
            custom += 1;
        } else {
            builtin += 1;
        }
    }
    (builtin, custom)
}

/// Find a definition by role name, searching scope by scope.
///
/// The first scope returning exactly one hit wins; more than one hit in
/// a single scope means the name is not unique there, which is an error.
pub async fn by_name(t: &Tenant, role_name: &str) -> Result<Option<Value>> {
    let scopes = t.rbac_scopes().await?;
    for scope_path in &scopes {
        let url = t.api().mgmt_url(&format!(
            "{scope_path}/providers/Microsoft.Authorization/roleDefinitions"
        ));
        let response = t
            .api()
            .request(Method::GET, &url)
            .query("api-version", API_VERSION)
            .query("$filter", &format!("roleName eq '{role_name}'"))
            .send()
            .await?;
        report_error_if_any(&response);
        let results = response.value_list();
        match results.len() {
            0 => continue,
            1 => return Ok(Some(results[0].clone())),
            n => {
                return Err(Error::Collision(format!(
                    "{n} role definitions named '{role_name}' under scope {scope_path}"
                )))
            }
        }
    }
    Ok(None)
}

/// Find the remote counterpart of a specfile definition.
///
/// Matches on role name under each of the specfile's assignable scopes.
pub async fn by_object(t: &Tenant, spec: &Value) -> Result<Option<Value>> {
    let Some(props) = properties(spec) else {
        return Ok(None);
    };
    let role_name = str_of(props, "roleName");
    let assignable_scopes = list_of(props, "assignableScopes");
    if role_name.is_empty() || assignable_scopes.is_empty() {
        return Ok(None);
    }

    for scope_value in assignable_scopes {
        let mut scope_path = scope_value.as_str().unwrap_or("");
        if scope_path == scope::TENANT_ROOT {
            scope_path = "";
        }
        let url = t.api().mgmt_url(&format!(
            "{scope_path}/providers/Microsoft.Authorization/roleDefinitions"
        ));
        let response = t
            .api()
            .request(Method::GET, &url)
            .query("api-version", API_VERSION)
            .query("$filter", &format!("roleName eq '{role_name}'"))
            .send()
            .await?;
        report_error_if_any(&response);
        let results = response.value_list();
        if results.len() == 1 {
            return Ok(Some(results[0].clone()));
        }
        if results.len() > 1 {
            return Err(Error::Collision(format!(
                "{} role definitions named '{role_name}' under scope {scope_value}",
                results.len()
            )));
        }
    }
    Ok(None)
}

/// Find a definition by its UUID, walking the scope hierarchy.
pub async fn by_uuid(t: &Tenant, uuid: &str) -> Option<Value> {
    let scopes = t.rbac_scopes().await.ok()?;
    for scope_path in &scopes {
        let url = t.api().mgmt_url(&format!(
            "{scope_path}/providers/Microsoft.Authorization/roleDefinitions/{uuid}"
        ));
        let response = t
            .api()
            .request(Method::GET, &url)
            .query("api-version", API_VERSION)
            .send()
            .await
            .ok()?;
        if let Some(body) = response.body {
            if !str_of(&body, "id").is_empty() {
                return Some(body);
            }
        }
    }
    None
}

/// Cached definition UUID to role-name map.
pub async fn id_map(t: &Tenant) -> HashMap<String, String> {
    let mut map = HashMap::new();
    if let Ok(defs) = list(t, "", false).await {
        for def in defs {
            let uuid = str_of(&def, "name");
            let role_name = path_str(&def, "properties.roleName");
            if !uuid.is_empty() && !role_name.is_empty() {
                map.insert(uuid.to_string(), role_name.to_string());
            }
        }
    }
    map
}

/// Validate the required fields of a definition specfile.
pub fn validate_spec(spec: &Value) -> Result<()> {
    let props = properties(spec);
    let role_name = props.map(|p| str_of(p, "roleName")).unwrap_or("");
    let description = props.map(|p| str_of(p, "description")).unwrap_or("");
    let type_value = props.map(|p| str_of(p, "type")).unwrap_or("");
    let scopes = props.map(|p| list_of(p, "assignableScopes")).unwrap_or(&[]);

    let first_scope = scopes.first().and_then(Value::as_str).unwrap_or("");
    if role_name.is_empty()
        || description.is_empty()
        || first_scope.is_empty()
        || !type_value.eq_ignore_ascii_case("customrole")
    {
        return Err(Error::Format(
            "specfile is missing required attributes; need at least:\n\n\
             properties:\n\
             \x20 type: CustomRole\n\
             \x20 roleName: \"My Role Name\"\n\
             \x20 description: \"My role's description\"\n\
             \x20 assignableScopes:\n\
             \x20   - \"/subscriptions/UUID\"  # at least one scope\n"
                .to_string(),
        ));
    }
    Ok(())
}

/// Create or update a definition from a specfile object.
pub async fn upsert(t: &Tenant, spec: &Value) -> Result<()> {
    validate_spec(spec)?;
    let props = properties(spec).expect("validated above");
    let role_name = str_of(props, "roleName");
    let scope1 = list_of(props, "assignableScopes")[0]
        .as_str()
        .unwrap_or("")
        .to_string();

    let role_id = match by_name(t, role_name).await? {
        None => {
            println!("Creating NEW role definition '{role_name}' as per specfile");
            Uuid::new_v4().to_string()
        }
        Some(existing) => {
            print_diff(spec, &existing);
            if !confirm("Role already exists! UPDATE it? y/n ") {
                return Err(Error::Format("aborted".to_string()));
            }
            println!("Updating role ...");
            str_of(&existing, "name").to_string()
        }
    };

    let url = t.api().mgmt_url(&format!(
        "{scope1}/providers/Microsoft.Authorization/roleDefinitions/{role_id}"
    ));
    let response = t
        .api()
        .request(Method::PUT, &url)
        .query("api-version", API_VERSION)
        .json(spec.clone())
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

/// Delete a definition by its fully qualified id.
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
            println!("Role definition already deleted or does not exist.");
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

/// Print a role definition in YAML-like form.
///
/// Subscription scopes are annotated with the subscription name.
pub async fn print(t: &Tenant, def: &Value) {
    let uuid = str_of(def, "name");
    if !uuid.is_empty() {
        println!("id: {uuid}");
    }
    println!("properties:");
    let Some(props) = properties(def) else {
        println!("  <missing>");
        return;
    };

    for key in ["roleName", "description"] {
        println!("  {key}: {}", str_of(props, key));
    }

    let scopes = list_of(props, "assignableScopes");
    if scopes.is_empty() {
        println!("  assignableScopes: []");
    } else {
        println!("  assignableScopes:");
        let sub_names = subscriptions::id_map(t).await;
        for scope_value in scopes {
            let scope_path = scope_value.as_str().unwrap_or("");
            match scope::subscription_id(scope_path).and_then(|id| sub_names.get(id)) {
                Some(name) => println!("    - {scope_path}  # {name}"),
                None => println!("    - {scope_path}"),
            }
        }
    }

    println!("  permissions:");
    let permissions = list_of(props, "permissions");
    if permissions.len() != 1 {
        println!("    <expected exactly one permission set>");
        return;
    }
    for (index, list_name) in ACTION_LISTS.iter().enumerate() {
        let lead = if index == 0 { "    - " } else { "      " };
        println!("{lead}{list_name}:");
        for action in list_of(&permissions[0], list_name) {
            println!("        - {}", action.as_str().unwrap_or(""));
        }
    }
}

/// One-line rendering.
pub fn print_terse(def: &Value) {
    println!(
        "{}  {:<60}  {}",
        str_of(def, "name"),
        path_str(def, "properties.roleName"),
        path_str(def, "properties.type"),
    );
}

/// Print the specfile and Azure variants of a definition side by side.
///
/// The specfile is authoritative for intent: entries only in Azure are
/// marked as removed by a deploy, entries only in the specfile as added.
pub fn print_diff(spec: &Value, azure: &Value) {
    let spec_props = properties(spec).cloned().unwrap_or_default();
    let azure_props = properties(azure).cloned().unwrap_or_default();

    println!("id: {}", str_of(azure, "name"));
    println!("properties:");

    for key in ["roleName", "description"] {
        let azure_value = str_of(&azure_props, key);
        let spec_value = str_of(&spec_props, key);
        println!("  {key}: {azure_value}");
        if spec_value != azure_value {
            println!("  {key}: {spec_value}  # specfile value");
        }
    }

    println!("  assignableScopes:");
    print_list_diff(
        8,
        list_of(&spec_props, "assignableScopes"),
        list_of(&azure_props, "assignableScopes"),
    );

    println!("  permissions:");
    let spec_perms = list_of(&spec_props, "permissions");
    let azure_perms = list_of(&azure_props, "permissions");
    for (index, list_name) in ACTION_LISTS.iter().enumerate() {
        let lead = if index == 0 { "    - " } else { "      " };
        let spec_list = spec_perms.first().map(|p| list_of(p, list_name)).unwrap_or(&[]);
        let azure_list = azure_perms.first().map(|p| list_of(p, list_name)).unwrap_or(&[]);
        if spec_list.is_empty() && azure_list.is_empty() {
            continue;
        }
        println!("{lead}{list_name}:");
        print_list_diff(8, spec_list, azure_list);
    }
}

/// Print an Azure list with deploy markers against the specfile list.
fn print_list_diff(indent: usize, spec_list: &[Value], azure_list: &[Value]) {
    let diff = diff_lists(spec_list, azure_list);
    for value in azure_list {
        let value = value.as_str().unwrap_or("");
        if diff.added.iter().any(|a| a == value) {
            println!("{:indent$}- {value}  # not in specfile, deploy will REMOVE", "");
        } else {
            println!("{:indent$}- {value}", "");
        }
    }
    for value in &diff.removed {
        println!("{:indent$}- {value}  # only in specfile, deploy will ADD", "");
    }
}

/// The definition UUID referenced by an assignment's roleDefinitionId.
pub(crate) fn definition_uuid(role_definition_id: &str) -> &str {
    last_segment(role_definition_id)
}
