//! Delta synchronization shared by the directory kinds
//!
//! Users, groups, service principals, and applications all follow the
//! same pattern: a full change-stream fetch the first time (or when the
//! stored continuation is unusable), a delta resumption afterwards, and a
//! tombstone-aware merge into the snapshot. Each kind contributes only
//! its endpoint path and the `$select` attribute set whose modification
//! should produce a delta event.

use serde_json::Value;
use tracing::debug;

use tenaz_api::fetch_delta;
use tenaz_core::{ObjectKind, Result};
use tenaz_store::merge;

use crate::tenant::Tenant;

/// Endpoint path for a delta-capable directory kind.
pub(crate) fn delta_base_path(kind: ObjectKind) -> &'static str {
    match kind {
        ObjectKind::User => "/v1.0/users",
        ObjectKind::Group => "/v1.0/groups",
        ObjectKind::ServicePrincipal => "/beta/servicePrincipals",
        ObjectKind::Application => "/beta/applications",
        other => unreachable!("{other:?} has no delta endpoint"),
    }
}

/// Attributes whose modification should produce a delta event.
pub(crate) fn delta_select(kind: ObjectKind) -> &'static str {
    match kind {
        ObjectKind::User => "displayName,userPrincipalName,onPremisesSamAccountName",
        ObjectKind::Group => "displayName,description,mail,onPremisesLastSyncDateTime",
        ObjectKind::ServicePrincipal => {
            "displayName,appId,accountEnabled,servicePrincipalType,appOwnerOrganizationId"
        }
        ObjectKind::Application => "displayName,appId,requiredResourceAccess",
        other => unreachable!("{other:?} has no delta endpoint"),
    }
}

/// Synchronize one directory kind's snapshot from its change stream.
///
/// The stored continuation is used only when it is within its validity
/// margin and the snapshot is non-empty; otherwise a full stream is
/// started with `Prefer: return=minimal` and `deltaToken: latest` so the
/// backend begins at "now" instead of replaying history. Those two
/// headers are never sent on a continuation call.
pub(crate) async fn sync_kind(t: &Tenant, kind: ObjectKind, verbose: bool) -> Result<Vec<Value>> {
    let base = t.store().cached(kind);

    let continuation = if base.is_empty() {
        None
    } else {
        t.store().usable_delta_link(kind)
    };

    let (url, headers): (String, &[(&str, &str)]) = match &continuation {
        Some(link) => (link.clone(), &[]),
        None => (
            t.api().graph_url(&format!(
                "{}/delta?$select={}&$top=999",
                delta_base_path(kind),
                delta_select(kind)
            )),
            &[("Prefer", "return=minimal"), ("deltaToken", "latest")],
        ),
    };

    debug!(kind = %kind, resuming = continuation.is_some(), "synchronizing directory kind");
    let result = fetch_delta(t.api(), &url, headers, verbose).await?;

    if let Some(link) = &result.delta_link {
        t.store().save_delta_link(kind, link)?;
    }
    let merged = merge(base, &result.objects, "id");
    t.store().save(kind, &merged)?;
    Ok(merged)
}

/// Staleness-gated listing used by every directory kind.
pub(crate) async fn list_kind(
    t: &Tenant,
    kind: ObjectKind,
    filter: &str,
    force: bool,
) -> Result<Vec<Value>> {
    let objects = if t.store().needs_refresh(kind, force, t.online()) {
        sync_kind(t, kind, true).await?
    } else {
        t.store().cached(kind)
    };
    Ok(tenaz_store::filter::matching(kind, &objects, filter))
}
