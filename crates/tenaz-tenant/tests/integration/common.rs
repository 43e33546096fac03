//! Shared helpers for the tenant integration tests

use tempfile::TempDir;
use wiremock::MockServer;

use tenaz_api::ApiClient;
use tenaz_tenant::Tenant;

pub const TENANT_ID: &str = "11111111-2222-3333-4444-555555555555";

/// A tenant whose graph and management bases both point at `server`,
/// with its cache files in a fresh temp directory.
pub fn tenant_for(server: &MockServer, dir: &TempDir) -> Tenant {
    let api = ApiClient::with_bases("graph-token", "mgmt-token", server.uri(), server.uri());
    Tenant::with_online(api, dir.path(), TENANT_ID, true)
}

/// Same tenant but treated as offline, so only the cache is served.
#[allow(dead_code)]
pub fn offline_tenant_for(server: &MockServer, dir: &TempDir) -> Tenant {
    let api = ApiClient::with_bases("graph-token", "mgmt-token", server.uri(), server.uri());
    Tenant::with_online(api, dir.path(), TENANT_ID, false)
}
