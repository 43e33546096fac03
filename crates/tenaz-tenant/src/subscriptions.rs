//! Subscriptions

use std::collections::HashMap;

use reqwest::Method;
use serde_json::Value;

use tenaz_api::client::report_error_if_any;
use tenaz_core::domain::document::str_of;
use tenaz_core::{ObjectKind, Result};
use tenaz_store::filter::matching;

use crate::tenant::Tenant;

const KIND: ObjectKind = ObjectKind::Subscription;
const API_VERSION: &str = "2022-09-01";

/// Subscriptions matching `filter`; empty filter returns all.
pub async fn list(t: &Tenant, filter: &str, force: bool) -> Result<Vec<Value>> {
    let objects = if t.store().needs_refresh(KIND, force, t.online()) {
        fetch_all(t).await?
    } else {
        t.store().cached(KIND)
    };
    Ok(matching(KIND, &objects, filter))
}

/// Fetch every subscription and update the snapshot.
pub async fn fetch_all(t: &Tenant) -> Result<Vec<Value>> {
    let url = t.api().mgmt_url("/subscriptions");
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

/// Number of subscriptions in the tenant (no `$count` endpoint exists).
pub async fn count_remote(t: &Tenant) -> i64 {
    match fetch_all(t).await {
        Ok(list) => list.len() as i64,
        Err(e) => {
            tracing::warn!(error = %e, "subscription count failed");
            0
        }
    }
}

/// Fetch one subscription by UUID.
pub async fn by_uuid(t: &Tenant, uuid: &str) -> Option<Value> {
    let url = t.api().mgmt_url(&format!("/subscriptions/{uuid}"));
    let response = t
        .api()
        .request(Method::GET, &url)
        .query("api-version", API_VERSION)
        .send()
        .await
        .ok()?;
    let body = response.body?;
    (!str_of(&body, "subscriptionId").is_empty()).then_some(body)
}

/// Cached subscription id to display-name map.
pub async fn id_map(t: &Tenant) -> HashMap<String, String> {
    let mut map = HashMap::new();
    if let Ok(subs) = list(t, "", false).await {
        for sub in subs {
            let id = str_of(&sub, "subscriptionId");
            let name = str_of(&sub, "displayName");
            if !id.is_empty() && !name.is_empty() {
                map.insert(id.to_string(), name.to_string());
            }
        }
    }
    map
}

/// Print the main subscription attributes.
pub fn print(sub: &Value) {
    for key in ["subscriptionId", "displayName", "state", "tenantId"] {
        let value = str_of(sub, key);
        if !value.is_empty() {
            println!("{key}: {value}");
        }
    }
}

/// One-line rendering.
pub fn print_terse(sub: &Value) {
    println!(
        "{}  {:<10}  {}",
        str_of(sub, "subscriptionId"),
        str_of(sub, "state"),
        str_of(sub, "displayName"),
    );
}
