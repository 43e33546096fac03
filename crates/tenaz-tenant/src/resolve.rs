//! Cross-kind UUID resolution
//!
//! A bare UUID can belong to almost any kind. The resolver queries every
//! kind in a fixed order and tags each hit. Two hits usually mean the
//! UUID is an application client id, which matches both the application
//! and its service principal; anything else is a genuine collision and
//! gets flagged.

use serde_json::Value;
use tracing::warn;

use tenaz_core::domain::kind::RESOLVE_ORDER;
use tenaz_core::ObjectKind;

use crate::tenant::Tenant;

/// An object found by UUID, tagged with the kind that resolved it.
#[derive(Debug, Clone)]
pub struct TaggedObject {
    pub kind: ObjectKind,
    pub object: Value,
}

/// Query every kind resolver for `uuid`, in fixed order.
pub async fn find_by_uuid(t: &Tenant, uuid: &str) -> Vec<TaggedObject> {
    let mut matches = Vec::new();
    for kind in RESOLVE_ORDER {
        if let Some(object) = t.by_uuid(kind, uuid).await {
            matches.push(TaggedObject { kind, object });
        }
    }
    if matches.len() > 1 && !is_expected_collision(&matches) {
        warn!(
            uuid,
            kinds = ?matches.iter().map(|m| m.kind.tag()).collect::<Vec<_>>(),
            "UUID resolves to multiple unrelated objects"
        );
    }
    matches
}

/// True for the benign collision of an application with its own service
/// principal, reached through the shared `appId`.
pub fn is_expected_collision(matches: &[TaggedObject]) -> bool {
    matches.len() == 2
        && matches
            .iter()
            .any(|m| m.kind == ObjectKind::Application)
        && matches
            .iter()
            .any(|m| m.kind == ObjectKind::ServicePrincipal)
}
