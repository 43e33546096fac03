//! Integration tests for the delta-query walker
//!
//! Verifies pagination across nextLink pages, deltaLink termination,
//! preservation of server page order, and the malformed-page error.

use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, ResponseTemplate};

use tenaz_api::fetch_delta;

use crate::common;

#[tokio::test]
async fn test_single_page_stream() {
    let (server, client) = common::graph_client().await;

    Mock::given(method("GET"))
        .and(path("/v1.0/users/delta"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "value": [{"id": "u1"}, {"id": "u2"}],
            "@odata.deltaLink": format!("{}/v1.0/users/delta?$deltatoken=final", server.uri())
        })))
        .mount(&server)
        .await;

    let url = client.graph_url("/v1.0/users/delta");
    let result = fetch_delta(&client, &url, &[], false).await.unwrap();

    assert_eq!(result.objects.len(), 2);
    assert!(result.delta_link.unwrap().contains("$deltatoken=final"));
}

#[tokio::test]
async fn test_paginated_stream_preserves_order() {
    let (server, client) = common::graph_client().await;

    Mock::given(method("GET"))
        .and(path("/v1.0/groups/delta"))
        .and(query_param("page", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "value": [{"id": "g3"}],
            "@odata.deltaLink": format!("{}/v1.0/groups/delta?$deltatoken=t2", server.uri())
        })))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/v1.0/groups/delta"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "value": [{"id": "g1"}, {"id": "g2"}],
            "@odata.nextLink": format!("{}/v1.0/groups/delta?page=2", server.uri())
        })))
        .mount(&server)
        .await;

    let url = client.graph_url("/v1.0/groups/delta");
    let result = fetch_delta(&client, &url, &[], false).await.unwrap();

    let ids: Vec<&str> = result
        .objects
        .iter()
        .map(|o| o["id"].as_str().unwrap())
        .collect();
    assert_eq!(ids, vec!["g1", "g2", "g3"]);
    assert!(result.delta_link.unwrap().ends_with("$deltatoken=t2"));
}

#[tokio::test]
async fn test_empty_stream() {
    let (server, client) = common::graph_client().await;

    Mock::given(method("GET"))
        .and(path("/v1.0/users/delta"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "value": [],
            "@odata.deltaLink": format!("{}/v1.0/users/delta?$deltatoken=empty", server.uri())
        })))
        .mount(&server)
        .await;

    let url = client.graph_url("/v1.0/users/delta");
    let result = fetch_delta(&client, &url, &[], false).await.unwrap();
    assert!(result.objects.is_empty());
    assert!(result.delta_link.is_some());
}

#[tokio::test]
async fn test_page_without_links_is_an_error() {
    let (server, client) = common::graph_client().await;

    Mock::given(method("GET"))
        .and(path("/v1.0/users/delta"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "value": [{"id": "u1"}]
        })))
        .mount(&server)
        .await;

    let url = client.graph_url("/v1.0/users/delta");
    let err = fetch_delta(&client, &url, &[], false).await.unwrap_err();
    assert!(err.to_string().contains("neither a nextLink nor a deltaLink"));
}

#[tokio::test]
async fn test_error_page_propagates() {
    let (server, client) = common::graph_client().await;

    Mock::given(method("GET"))
        .and(path("/v1.0/users/delta"))
        .respond_with(ResponseTemplate::new(403).set_body_json(serde_json::json!({
            "error": {"code": "Forbidden", "message": "Insufficient privileges"}
        })))
        .mount(&server)
        .await;

    let url = client.graph_url("/v1.0/users/delta");
    let err = fetch_delta(&client, &url, &[], false).await.unwrap_err();
    assert!(err.to_string().contains("Insufficient privileges"));
}
