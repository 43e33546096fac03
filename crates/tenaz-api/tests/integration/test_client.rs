//! Integration tests for the ApiClient
//!
//! Verifies bearer binding by URL prefix, body decoding of the three
//! response shapes, per-call header overrides, and the structured error
//! envelope.

use reqwest::Method;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, ResponseTemplate};

use crate::common;

#[tokio::test]
async fn test_graph_request_carries_graph_token() {
    let (server, client) = common::graph_client().await;

    Mock::given(method("GET"))
        .and(path("/v1.0/users"))
        .and(header("Authorization", "Bearer graph-test-token"))
        .and(header("Content-Type", "application/json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "value": [{"id": "u1"}]
        })))
        .mount(&server)
        .await;

    let url = client.graph_url("/v1.0/users");
    let response = client.request(Method::GET, &url).send().await.unwrap();
    assert_eq!(response.value_list().len(), 1);
}

#[tokio::test]
async fn test_mgmt_request_carries_mgmt_token() {
    let (server, client) = common::mgmt_client().await;

    Mock::given(method("GET"))
        .and(path("/subscriptions"))
        .and(header("Authorization", "Bearer mgmt-test-token"))
        .and(query_param("api-version", "2022-09-01"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "value": [{"subscriptionId": "s1"}]
        })))
        .mount(&server)
        .await;

    let url = client.mgmt_url("/subscriptions");
    let response = client
        .request(Method::GET, &url)
        .query("api-version", "2022-09-01")
        .send()
        .await
        .unwrap();
    assert_eq!(response.value_list().len(), 1);
}

#[tokio::test]
async fn test_bare_integer_body_is_wrapped_as_count() {
    let (server, client) = common::graph_client().await;

    Mock::given(method("GET"))
        .and(path("/v1.0/users/$count"))
        .respond_with(ResponseTemplate::new(200).set_body_string("1234"))
        .mount(&server)
        .await;

    let url = client.graph_url("/v1.0/users/$count");
    let response = client
        .request(Method::GET, &url)
        .header("ConsistencyLevel", "eventual")
        .send()
        .await
        .unwrap();
    assert_eq!(response.count(), 1234);
}

#[tokio::test]
async fn test_empty_body_yields_no_document() {
    let (server, client) = common::graph_client().await;

    Mock::given(method("DELETE"))
        .and(path("/v1.0/groups/g1"))
        .respond_with(ResponseTemplate::new(204))
        .mount(&server)
        .await;

    let url = client.graph_url("/v1.0/groups/g1");
    let response = client.request(Method::DELETE, &url).send().await.unwrap();
    assert!(response.body.is_none());
    assert_eq!(response.status.as_u16(), 204);
}

#[tokio::test]
async fn test_per_call_header_override() {
    let (server, client) = common::graph_client().await;

    Mock::given(method("GET"))
        .and(path("/v1.0/users/delta"))
        .and(header("Prefer", "return=minimal"))
        .and(header("deltaToken", "latest"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "value": [],
            "@odata.deltaLink": "https://example.invalid/delta?token=x"
        })))
        .mount(&server)
        .await;

    let url = client.graph_url("/v1.0/users/delta");
    let response = client
        .request(Method::GET, &url)
        .header("Prefer", "return=minimal")
        .header("deltaToken", "latest")
        .send()
        .await
        .unwrap();
    assert!(response.body.is_some());
}

#[tokio::test]
async fn test_error_envelope_surfaces_message() {
    let (server, client) = common::mgmt_client().await;

    Mock::given(method("PUT"))
        .respond_with(ResponseTemplate::new(409).set_body_json(serde_json::json!({
            "error": {
                "code": "RoleAssignmentExists",
                "message": "The role assignment already exists."
            }
        })))
        .mount(&server)
        .await;

    let url = client.mgmt_url("/subscriptions/s1/providers/Microsoft.Authorization/roleAssignments/a1");
    let response = client
        .request(Method::PUT, &url)
        .json(serde_json::json!({"properties": {}}))
        .send()
        .await
        .unwrap();
    assert_eq!(
        response.error_message(),
        Some("The role assignment already exists.")
    );
    let err = response.into_result().unwrap_err();
    assert!(err.to_string().contains("The role assignment already exists."));
}

#[tokio::test]
async fn test_put_sends_json_payload() {
    let (server, client) = common::mgmt_client().await;

    Mock::given(method("PUT"))
        .and(wiremock::matchers::body_json(serde_json::json!({
            "properties": {"roleName": "Reader Plus"}
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(serde_json::json!({
            "name": "new-id",
            "properties": {"roleName": "Reader Plus"}
        })))
        .mount(&server)
        .await;

    let url = client.mgmt_url("/subscriptions/s1/providers/Microsoft.Authorization/roleDefinitions/d1");
    let response = client
        .request(Method::PUT, &url)
        .json(serde_json::json!({"properties": {"roleName": "Reader Plus"}}))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status.as_u16(), 201);
}
