//! RBAC traversal and natural-key lookup flows

use tempfile::TempDir;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use tenaz_core::ObjectKind;
use tenaz_tenant::role_assignments;

use crate::common;

/// Mounts management groups and subscriptions so the scope enumerator
/// yields one MG scope and one subscription scope; the legacy directory
/// subscription must never be queried.
async fn mount_scopes(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/providers/Microsoft.Management/managementGroups"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "value": [{
                "id": "/providers/Microsoft.Management/managementGroups/mg-root",
                "name": "mg-root",
                "type": "Microsoft.Management/managementGroups",
                "properties": {"displayName": "Root"}
            }]
        })))
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path("/subscriptions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "value": [
                {
                    "id": "/subscriptions/S1",
                    "subscriptionId": "S1",
                    "displayName": "Production",
                    "state": "Enabled"
                },
                {
                    "id": "/subscriptions/S2",
                    "subscriptionId": "S2",
                    "displayName": "Access to Azure Active Directory",
                    "state": "Enabled"
                }
            ]
        })))
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_definition_traversal_dedups_inherited_copies() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    mount_scopes(&server).await;

    Mock::given(method("GET"))
        .and(path(
            "/providers/Microsoft.Management/managementGroups/mg-root/providers/Microsoft.Authorization/roleDefinitions",
        ))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "value": [
                {"name": "X", "properties": {"roleName": "Reader", "type": "BuiltInRole"}},
                {"name": "Y", "properties": {"roleName": "Writer", "type": "BuiltInRole"}}
            ]
        })))
        .mount(&server)
        .await;

    // The subscription inherits Y from the management group and adds Z.
    Mock::given(method("GET"))
        .and(path(
            "/subscriptions/S1/providers/Microsoft.Authorization/roleDefinitions",
        ))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "value": [
                {"name": "Y", "properties": {"roleName": "Writer", "type": "BuiltInRole"}},
                {"name": "Z", "properties": {"roleName": "Operator", "type": "CustomRole"}}
            ]
        })))
        .mount(&server)
        .await;

    // The legacy subscription denies definition queries; it must be skipped.
    Mock::given(method("GET"))
        .and(path(
            "/subscriptions/S2/providers/Microsoft.Authorization/roleDefinitions",
        ))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let tenant = common::tenant_for(&server, &dir);
    let defs = tenant
        .list(ObjectKind::RoleDefinition, "", false)
        .await
        .unwrap();

    let mut names: Vec<&str> = defs.iter().map(|d| d["name"].as_str().unwrap()).collect();
    names.sort_unstable();
    assert_eq!(names, vec!["X", "Y", "Z"]);
}

#[tokio::test]
async fn test_assignment_natural_key_lookup() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    Mock::given(method("GET"))
        .and(path(
            "/subscriptions/S1/providers/Microsoft.Authorization/roleAssignments",
        ))
        .and(query_param("$filter", "principalId eq 'P'"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "value": [
                {
                    "name": "a-1",
                    "id": "/subscriptions/S1/providers/Microsoft.Authorization/roleAssignments/a-1",
                    "properties": {
                        "roleDefinitionId": "/subscriptions/S1/providers/Microsoft.Authorization/roleDefinitions/R1",
                        "principalId": "P",
                        "scope": "/subscriptions/S1"
                    }
                },
                {
                    "name": "a-2",
                    "id": "/subscriptions/S1/providers/Microsoft.Authorization/roleAssignments/a-2",
                    "properties": {
                        "roleDefinitionId": "/subscriptions/S1/providers/Microsoft.Authorization/roleDefinitions/R2",
                        "principalId": "P",
                        "scope": "/subscriptions/S1"
                    }
                }
            ]
        })))
        .mount(&server)
        .await;

    let tenant = common::tenant_for(&server, &dir);
    let spec = serde_json::json!({
        "properties": {
            "roleDefinitionId": "R1",
            "principalId": "P",
            "scope": "/subscriptions/S1"
        }
    });
    let hit = role_assignments::by_object(&tenant, &spec)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(hit["name"], "a-1");

    // A different scope segment resolves to nothing.
    let spec = serde_json::json!({
        "properties": {
            "roleDefinitionId": "R1",
            "principalId": "P",
            "scope": "/subscriptions/S2"
        }
    });
    let miss = role_assignments::by_object(&tenant, &spec).await.unwrap();
    assert!(miss.is_none());
}

#[tokio::test]
async fn test_definition_by_name_single_hit_wins() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    mount_scopes(&server).await;

    Mock::given(method("GET"))
        .and(path(
            "/providers/Microsoft.Management/managementGroups/mg-root/providers/Microsoft.Authorization/roleDefinitions",
        ))
        .and(query_param("$filter", "roleName eq 'Operator'"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "value": [{"name": "Z", "properties": {"roleName": "Operator", "type": "CustomRole"}}]
        })))
        .mount(&server)
        .await;

    let tenant = common::tenant_for(&server, &dir);
    let def = tenaz_tenant::role_definitions::by_name(&tenant, "Operator")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(def["name"], "Z");
}
