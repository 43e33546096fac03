//! Registered applications
//!
//! Applications carry both an object `id` and their global `appId`;
//! single-object lookups fall back to an `appId` filter query like the
//! service-principal resolver does.

use std::collections::HashMap;

use reqwest::Method;
use serde_json::Value;

use tenaz_api::client::report_error_if_any;
use tenaz_core::domain::document::str_of;
use tenaz_core::{ObjectKind, Result};

use crate::directory;
use crate::tenant::Tenant;

const KIND: ObjectKind = ObjectKind::Application;

/// Extended attribute set requested for single lookups.
const BY_ID_SELECT: &str = "id,api,appId,appRoles,createdDateTime,deletedDateTime,\
disabledByMicrosoftStatus,displayName,groupMembershipClaims,identifierUris,info,\
isDeviceOnlyAuthSupported,isFallbackPublicClient,keyCredentials,notes,\
passwordCredentials,publicClient,publisherDomain,requiredResourceAccess,\
signInAudience,spa,tags,web";

/// Applications matching `filter`; empty filter returns all.
pub async fn list(t: &Tenant, filter: &str, force: bool) -> Result<Vec<Value>> {
    directory::list_kind(t, KIND, filter, force).await
}

/// Number of applications the backend reports via the `$count` endpoint.
pub async fn count_remote(t: &Tenant) -> i64 {
    let url = t.api().graph_url("/beta/applications/$count");
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
            tracing::warn!(error = %e, "application count failed");
            0
        }
    }
}

/// Fetch one application by object id, falling back to `appId`.
pub async fn by_uuid(t: &Tenant, uuid: &str) -> Option<Value> {
    let url = t
        .api()
        .graph_url(&format!("/beta/applications/{uuid}?$select={BY_ID_SELECT}"));
    let response = t.api().request(Method::GET, &url).send().await.ok()?;
    let body = response.body?;
    if body.get("error").is_none() && !str_of(&body, "id").is_empty() {
        return Some(body);
    }

    let url = t
        .api()
        .graph_url(&format!("/beta/applications?$select={BY_ID_SELECT}"));
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

/// Cached application id to display-name map.
pub async fn id_map(t: &Tenant) -> HashMap<String, String> {
    let mut map = HashMap::new();
    if let Ok(apps) = list(t, "", false).await {
        for app in apps {
            let id = str_of(&app, "id");
            let name = str_of(&app, "displayName");
            if !id.is_empty() && !name.is_empty() {
                map.insert(id.to_string(), name.to_string());
            }
        }
    }
    map
}

/// Print the main application attributes plus credential inventories.
pub fn print(app: &Value) {
    for key in ["id", "displayName", "appId", "signInAudience"] {
        let value = str_of(app, key);
        if !value.is_empty() {
            println!("{key}: {value}");
        }
    }

    if let Some(certs) = app.get("keyCredentials").and_then(Value::as_array) {
        if !certs.is_empty() {
            println!("certificates:");
            for cert in certs {
                println!(
                    "  {:<36}  {:<30}  {}",
                    str_of(cert, "keyId"),
                    str_of(cert, "displayName"),
                    str_of(cert, "endDateTime"),
                );
            }
        }
    }

    // Secret inventory only; actual secret values are not retrievable.
    if let Some(secrets) = app.get("passwordCredentials").and_then(Value::as_array) {
        if !secrets.is_empty() {
            println!("secrets:");
            for secret in secrets {
                println!(
                    "  {:<36}  {:<30}  {}",
                    str_of(secret, "keyId"),
                    str_of(secret, "displayName"),
                    str_of(secret, "endDateTime"),
                );
            }
        }
    }
}

/// One-line rendering.
pub fn print_terse(app: &Value) {
    println!(
        "{}  {:<60} {}",
        str_of(app, "id"),
        str_of(app, "displayName"),
        str_of(app, "appId"),
    );
}
