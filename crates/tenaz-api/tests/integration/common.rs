//! Shared test helpers for the API integration tests
//!
//! Each helper starts a mock server standing in for one of the two
//! backends and returns an ApiClient whose graph or management base URL
//! points at it.

use wiremock::MockServer;

use tenaz_api::ApiClient;

/// Mock server acting as the directory/graph backend.
pub async fn graph_client() -> (MockServer, ApiClient) {
    let server = MockServer::start().await;
    let client = ApiClient::with_bases(
        "graph-test-token",
        "mgmt-test-token",
        server.uri(),
        "https://management.azure.invalid",
    );
    (server, client)
}

/// Mock server acting as the resource-management backend.
#[allow(dead_code)]
pub async fn mgmt_client() -> (MockServer, ApiClient) {
    let server = MockServer::start().await;
    let client = ApiClient::with_bases(
        "graph-test-token",
        "mgmt-test-token",
        "https://graph.microsoft.invalid",
        server.uri(),
    );
    (server, client)
}
