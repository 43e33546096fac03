//! Directory kind synchronization flows
//!
//! Verifies the full-then-delta cache lifecycle for users and the
//! appId fallback lookup for service principals.

use tempfile::TempDir;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use tenaz_core::ObjectKind;

use crate::common;

#[tokio::test]
async fn test_initial_sync_fills_snapshot_and_serves_cache() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    Mock::given(method("GET"))
        .and(path("/v1.0/users/delta"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "value": [
                {"id": "u1", "displayName": "Alice"},
                {"id": "u2", "displayName": "Bob"}
            ],
            "@odata.deltaLink": format!("{}/v1.0/users/delta?$deltatoken=t1", server.uri())
        })))
        .expect(1)
        .mount(&server)
        .await;

    let tenant = common::tenant_for(&server, &dir);
    let users = tenant.list(ObjectKind::User, "", false).await.unwrap();
    assert_eq!(users.len(), 2);
    assert_eq!(tenant.count_local(ObjectKind::User), 2);

    // A second listing within the freshness window must not call the API.
    let users = tenant.list(ObjectKind::User, "Alice", false).await.unwrap();
    assert_eq!(users.len(), 1);
    assert_eq!(users[0]["id"], "u1");
}

#[tokio::test]
async fn test_forced_resync_resumes_from_delta_link_and_merges() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    // Initial full stream.
    Mock::given(method("GET"))
        .and(path("/v1.0/users/delta"))
        .and(query_param("$top", "999"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "value": [
                {"id": "u1", "displayName": "Alice"},
                {"id": "u2", "displayName": "Bob"}
            ],
            "@odata.deltaLink": format!("{}/v1.0/users/delta?$deltatoken=t1", server.uri())
        })))
        .mount(&server)
        .await;

    // Resumption from the stored link: a tombstone and a new entry.
    Mock::given(method("GET"))
        .and(path("/v1.0/users/delta"))
        .and(query_param("$deltatoken", "t1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "value": [
                {"id": "u1", "@removed": {"reason": "deleted"}},
                {"id": "u3", "displayName": "Carol"}
            ],
            "@odata.deltaLink": format!("{}/v1.0/users/delta?$deltatoken=t2", server.uri())
        })))
        .mount(&server)
        .await;

    let tenant = common::tenant_for(&server, &dir);
    tenant.list(ObjectKind::User, "", false).await.unwrap();

    let users = tenant.list(ObjectKind::User, "", true).await.unwrap();
    let ids: Vec<&str> = users.iter().map(|u| u["id"].as_str().unwrap()).collect();
    assert_eq!(ids, vec!["u2", "u3"]);
}

#[tokio::test]
async fn test_offline_listing_serves_stale_cache() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    Mock::given(method("GET"))
        .and(path("/v1.0/users/delta"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "value": [{"id": "u1", "displayName": "Alice"}],
            "@odata.deltaLink": format!("{}/v1.0/users/delta?$deltatoken=t1", server.uri())
        })))
        .expect(1)
        .mount(&server)
        .await;

    let tenant = common::tenant_for(&server, &dir);
    tenant.list(ObjectKind::User, "", false).await.unwrap();

    // Even a forced refresh stays local when the network is unreachable.
    let offline = common::offline_tenant_for(&server, &dir);
    let users = offline.list(ObjectKind::User, "", true).await.unwrap();
    assert_eq!(users.len(), 1);
}

#[tokio::test]
async fn test_service_principal_app_id_fallback() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let app_id = "aaaaaaaa-bbbb-cccc-dddd-eeeeeeeeeeee";

    // Primary lookup by object id answers with an error document.
    Mock::given(method("GET"))
        .and(path(format!("/beta/servicePrincipals/{app_id}")))
        .respond_with(ResponseTemplate::new(404).set_body_json(serde_json::json!({
            "error": {"code": "Request_ResourceNotFound", "message": "not found"}
        })))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/beta/servicePrincipals"))
        .and(query_param("$filter", format!("appId eq '{app_id}'")))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "value": [{"id": "sp-object-id", "appId": app_id, "displayName": "svc"}]
        })))
        .mount(&server)
        .await;

    let tenant = common::tenant_for(&server, &dir);
    let sp = tenant
        .by_uuid(ObjectKind::ServicePrincipal, app_id)
        .await
        .unwrap();
    assert_eq!(sp["id"], "sp-object-id");
}
