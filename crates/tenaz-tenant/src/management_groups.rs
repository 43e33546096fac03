//! Management groups

use std::collections::HashMap;

use reqwest::Method;
use serde_json::Value;

use tenaz_api::client::report_error_if_any;
use tenaz_core::domain::document::{list_of, path_str, str_of};
use tenaz_core::domain::scope::LEGACY_SUBSCRIPTION_NAME;
use tenaz_core::{ObjectKind, Result};
use tenaz_store::filter::matching;

use crate::tenant::Tenant;

const KIND: ObjectKind = ObjectKind::ManagementGroup;
const API_VERSION: &str = "2020-05-01";

/// Human name of a management-group child's `type` discriminator.
pub fn child_type(type_value: &str) -> &'static str {
    match type_value {
        "Microsoft.Management/managementGroups" => "ManagementGroup",
        "Microsoft.Management/managementGroups/subscriptions" | "/subscriptions" => "Subscription",
        _ => "??",
    }
}

/// Management groups matching `filter`; empty filter returns all.
pub async fn list(t: &Tenant, filter: &str, force: bool) -> Result<Vec<Value>> {
    let objects = if t.store().needs_refresh(KIND, force, t.online()) {
        fetch_all(t).await?
    } else {
        t.store().cached(KIND)
    };
    Ok(matching(KIND, &objects, filter))
}

/// Fetch every management group and update the snapshot.
pub async fn fetch_all(t: &Tenant) -> Result<Vec<Value>> {
    let url = t
        .api()
        .mgmt_url("/providers/Microsoft.Management/managementGroups");
    let response = t
        .api()
        .request(Method::GET, &url)
        .query("api-version", API_VERSION)
        .send()
        .await?;
    report_error_if_any(&response);
    let list = response.value_list().to_vec();
    t.store().save(KIND, &list)?;
    Ok(list)
}

/// Number of management groups (no `$count` endpoint exists).
pub async fn count_remote(t: &Tenant) -> i64 {
    match fetch_all(t).await {
        Ok(list) => list.len() as i64,
        Err(e) => {
            tracing::warn!(error = %e, "management group count failed");
            0
        }
    }
}

/// Cached map of full management-group resource id to display name.
pub async fn id_map(t: &Tenant) -> HashMap<String, String> {
    let mut map = HashMap::new();
    if let Ok(groups) = list(t, "", false).await {
        for group in groups {
            let id = str_of(&group, "id");
            let name = path_str(&group, "properties.displayName");
            if !id.is_empty() && !name.is_empty() {
                map.insert(id.to_string(), name.to_string());
            }
        }
    }
    map
}

/// Print the main management-group attributes.
pub fn print(group: &Value) {
    println!(
        "{:<12} {}",
        "displayName:",
        path_str(group, "properties.displayName")
    );
    println!("{:<12} {}", "id:", str_of(group, "name"));
    println!("{:<12} {}", "type:", child_type(str_of(group, "type")));
}

/// One-line rendering.
pub fn print_terse(group: &Value) {
    println!(
        "{:<38}  {:<20}  {}",
        str_of(group, "name"),
        path_str(group, "properties.displayName"),
        child_type(str_of(group, "type")),
    );
}

/// Print the management-group / subscription hierarchy as a tree.
pub async fn print_tree(t: &Tenant) -> Result<()> {
    let url = t.api().mgmt_url(&format!(
        "/providers/Microsoft.Management/managementGroups/{}",
        t.tenant_id()
    ));
    let response = t
        .api()
        .request(Method::GET, &url)
        .query("api-version", API_VERSION)
        .query("$expand", "children")
        .query("$recurse", "true")
        .send()
        .await?
        .into_result()?;

    let Some(body) = response.body else {
        return Ok(());
    };
    let Some(properties) = body.get("properties") else {
        return Ok(());
    };
    println!(
        "{:<38}  {:<38}  TENANT",
        str_of(properties, "displayName"),
        str_of(properties, "tenantId"),
    );
    print_children(4, list_of(properties, "children"));
    Ok(())
}

/// Recursively print management-group children.
fn print_children(indent: usize, children: &[Value]) {
    for child in children {
        let name = str_of(child, "displayName");
        let kind = child_type(str_of(child, "type"));
        if name == LEGACY_SUBSCRIPTION_NAME && kind == "Subscription" {
            continue;
        }
        let padding = (38usize.saturating_sub(indent)).max(12);
        println!(
            "{:indent$}{:<padding$}  {:<38}  {kind}",
            "",
            name,
            str_of(child, "name"),
        );
        let descendants = list_of(child, "children");
        if !descendants.is_empty() {
            print_children(indent + 4, descendants);
        }
    }
}
