//! Directory users

use std::collections::HashMap;

use reqwest::Method;
use serde_json::Value;

use tenaz_api::client::report_error_if_any;
use tenaz_core::domain::document::{last_segment, str_of};
use tenaz_core::{ObjectKind, Result};

use crate::directory;
use crate::tenant::Tenant;

const KIND: ObjectKind = ObjectKind::User;

/// Extended attribute set requested for single-user lookups.
const BY_ID_SELECT: &str = "id,displayName,userPrincipalName,mailNickname,\
onPremisesSamAccountName,onPremisesDomainName,onPremisesUserPrincipalName,otherMails,\
identities,accountEnabled,createdDateTime,creationType,lastPasswordChangeDateTime,mail,\
onPremisesDistinguishedName,onPremisesExtensionAttributes,onPremisesImmutableId,\
onPremisesLastSyncDateTime,onPremisesProvisioningErrors,onPremisesSecurityIdentifier,\
onPremisesSyncEnabled,securityIdentifier,surname,tags";

/// Users matching `filter`; empty filter returns all.
pub async fn list(t: &Tenant, filter: &str, force: bool) -> Result<Vec<Value>> {
    directory::list_kind(t, KIND, filter, force).await
}

/// Number of users the backend reports via the `$count` endpoint.
pub async fn count_remote(t: &Tenant) -> i64 {
    let url = t.api().graph_url("/v1.0/users/$count");
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
            tracing::warn!(error = %e, "user count failed");
            0
        }
    }
}

/// Fetch one user with extended attributes.
pub async fn by_uuid(t: &Tenant, uuid: &str) -> Option<Value> {
    let url = t
        .api()
        .graph_url(&format!("/v1.0/users/{uuid}?$select={BY_ID_SELECT}"));
    let response = t.api().request(Method::GET, &url).send().await.ok()?;
    let body = response.body?;
    (!str_of(&body, "id").is_empty()).then_some(body)
}

/// Cached user id to display-name map.
pub async fn id_map(t: &Tenant) -> HashMap<String, String> {
    let mut map = HashMap::new();
    if let Ok(users) = list(t, "", false).await {
        for user in users {
            let id = str_of(&user, "id");
            let name = str_of(&user, "displayName");
            if !id.is_empty() && !name.is_empty() {
                map.insert(id.to_string(), name.to_string());
            }
        }
    }
    map
}

/// Print a user with its transitive group and role memberships.
pub async fn print(t: &Tenant, user: &Value) {
    for key in [
        "id",
        "displayName",
        "userPrincipalName",
        "onPremisesSamAccountName",
        "onPremisesDomainName",
    ] {
        let value = str_of(user, key);
        if !value.is_empty() {
            println!("{key}: {value}");
        }
    }

    let id = str_of(user, "id");
    let url = t
        .api()
        .graph_url(&format!("/v1.0/users/{id}/transitiveMemberOf"));
    if let Ok(response) = t.api().request(Method::GET, &url).send().await {
        if response.status.is_success() {
            print_member_of(response.value_list());
        }
    }
}

/// Print the memberOf entries of a principal.
pub(crate) fn print_member_of(member_of: &[Value]) {
    if member_of.is_empty() {
        println!("memberof: None");
        return;
    }
    println!("memberof:");
    for entry in member_of {
        let kind = last_segment(str_of(entry, "@odata.type"));
        println!(
            "  {:<50} {} ({kind})",
            str_of(entry, "displayName"),
            str_of(entry, "id"),
        );
    }
}

/// One-line rendering.
pub fn print_terse(user: &Value) {
    println!(
        "{}  {:<50} {:<18} {}",
        str_of(user, "id"),
        str_of(user, "userPrincipalName"),
        str_of(user, "onPremisesSamAccountName"),
        str_of(user, "displayName"),
    );
}
