//! Scope path helpers
//!
//! A scope path denotes a point in the resource-management hierarchy.
//! Three shapes are meaningful: `/` (tenant root),
//! `/providers/Microsoft.Management/managementGroups/{id}`, and
//! `/subscriptions/{id}` optionally followed by resource-group and
//! resource segments.

/// The tenant root scope.
pub const TENANT_ROOT: &str = "/";

/// Display name of the legacy default-directory subscription.
///
/// These subscriptions reject role-definition queries and are excluded
/// from scope enumeration.
pub const LEGACY_SUBSCRIPTION_NAME: &str = "Access to Azure Active Directory";

/// True for management-group scope paths.
pub fn is_management_group(scope: &str) -> bool {
    scope.starts_with("/providers/Microsoft.Management/managementGroups/")
}

/// True for subscription scope paths (including resource sub-scopes).
pub fn is_subscription(scope: &str) -> bool {
    scope.starts_with("/subscriptions/")
}

/// The subscription UUID segment of a subscription scope path.
pub fn subscription_id(scope: &str) -> Option<&str> {
    scope
        .strip_prefix("/subscriptions/")
        .map(|rest| rest.split('/').next().unwrap_or(rest))
        .filter(|id| !id.is_empty())
}
