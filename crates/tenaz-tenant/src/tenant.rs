//! The tenant handle
//!
//! [`Tenant`] bundles the API client, the local object store, and the
//! per-invocation memoized state (network reachability, the RBAC scope
//! list). Every operation in this crate takes the handle; the CLI builds
//! exactly one per invocation.

use std::path::Path;

use serde_json::Value;
use tokio::sync::Mutex;

use tenaz_api::{net, ApiClient};
use tenaz_core::{ObjectKind, Result};
use tenaz_store::ObjectStore;

use crate::{
    applications, directory_roles, groups, management_groups, role_assignments, role_definitions,
    service_principals, subscriptions, users,
};

/// One authenticated view of a tenant.
pub struct Tenant {
    api: ApiClient,
    store: ObjectStore,
    tenant_id: String,
    online: bool,
    /// RBAC scope list, resolved at most once per invocation.
    pub(crate) scope_cache: Mutex<Option<Vec<String>>>,
}

impl Tenant {
    pub fn new(api: ApiClient, conf_dir: &Path, tenant_id: &str) -> Self {
        Self {
            api,
            store: ObjectStore::new(conf_dir, tenant_id),
            tenant_id: tenant_id.to_string(),
            online: net::is_online(),
            scope_cache: Mutex::new(None),
        }
    }

    /// Test constructor with explicit reachability.
    pub fn with_online(api: ApiClient, conf_dir: &Path, tenant_id: &str, online: bool) -> Self {
        Self {
            api,
            store: ObjectStore::new(conf_dir, tenant_id),
            tenant_id: tenant_id.to_string(),
            online,
            scope_cache: Mutex::new(None),
        }
    }

    pub fn api(&self) -> &ApiClient {
        &self.api
    }

    pub fn store(&self) -> &ObjectStore {
        &self.store
    }

    pub fn tenant_id(&self) -> &str {
        &self.tenant_id
    }

    pub fn online(&self) -> bool {
        self.online
    }

    /// Objects of `kind` matching `filter`; empty filter returns all.
    ///
    /// Serves the local snapshot unless the staleness policy (or `force`)
    /// demands a backend refresh first.
    pub async fn list(&self, kind: ObjectKind, filter: &str, force: bool) -> Result<Vec<Value>> {
        match kind {
            ObjectKind::RoleDefinition => role_definitions::list(self, filter, force).await,
            ObjectKind::RoleAssignment => role_assignments::list(self, filter, force).await,
            ObjectKind::Subscription => subscriptions::list(self, filter, force).await,
            ObjectKind::ManagementGroup => management_groups::list(self, filter, force).await,
            ObjectKind::User => users::list(self, filter, force).await,
            ObjectKind::Group => groups::list(self, filter, force).await,
            ObjectKind::ServicePrincipal => service_principals::list(self, filter, force).await,
            ObjectKind::Application => applications::list(self, filter, force).await,
            ObjectKind::DirectoryRole => directory_roles::list(self, filter, force).await,
        }
    }

    /// Number of cached entries for `kind`.
    pub fn count_local(&self, kind: ObjectKind) -> i64 {
        self.store.count_local(kind)
    }

    /// Number of objects the backend currently reports for `kind`.
    ///
    /// Uses the kind's `$count` endpoint where one exists, otherwise a
    /// full enumeration. Failures report and yield 0.
    pub async fn count_remote(&self, kind: ObjectKind) -> i64 {
        match kind {
            ObjectKind::RoleDefinition => {
                let (builtin, custom) = role_definitions::count_remote(self).await;
                builtin + custom
            }
            ObjectKind::RoleAssignment => role_assignments::count_remote(self).await,
            ObjectKind::Subscription => subscriptions::count_remote(self).await,
            ObjectKind::ManagementGroup => management_groups::count_remote(self).await,
            ObjectKind::User => users::count_remote(self).await,
            ObjectKind::Group => groups::count_remote(self).await,
            ObjectKind::ServicePrincipal => {
                let (native, foreign) = service_principals::count_remote(self).await;
                native + foreign
            }
            ObjectKind::Application => applications::count_remote(self).await,
            ObjectKind::DirectoryRole => directory_roles::count_remote(self).await,
        }
    }

    /// Fetch one object of `kind` from the backend by its identifier.
    pub async fn by_uuid(&self, kind: ObjectKind, uuid: &str) -> Option<Value> {
        match kind {
            ObjectKind::RoleDefinition => role_definitions::by_uuid(self, uuid).await,
            ObjectKind::RoleAssignment => role_assignments::by_uuid(self, uuid).await,
            ObjectKind::Subscription => subscriptions::by_uuid(self, uuid).await,
            ObjectKind::ManagementGroup => None,
            ObjectKind::User => users::by_uuid(self, uuid).await,
            ObjectKind::Group => groups::by_uuid(self, uuid).await,
            ObjectKind::ServicePrincipal => service_principals::by_uuid(self, uuid).await,
            ObjectKind::Application => applications::by_uuid(self, uuid).await,
            ObjectKind::DirectoryRole => directory_roles::by_uuid(self, uuid).await,
        }
    }

    /// Remove cached files for one kind.
    pub fn clear_cache(&self, kind: ObjectKind) -> Result<()> {
        self.store.clear(kind)
    }

    /// Remove every cache file for this tenant.
    pub fn clear_all_caches(&self) -> Result<()> {
        self.store.clear_all()
    }
}
