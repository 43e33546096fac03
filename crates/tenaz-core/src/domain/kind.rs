//! Object kinds and their per-kind tables
//!
//! Every tenant object the tool understands belongs to one of nine kinds,
//! each addressed on the command line by a short tag. The kind decides
//! which backend serves it, which attribute carries its stable identifier,
//! how its cache files are named, how long a snapshot stays fresh, and
//! which attributes participate in substring filtering.

use std::fmt::{self, Display, Formatter};
use std::str::FromStr;
use std::time::Duration;

use super::errors::Error;

/// Snapshot revalidation age for directory (graph) objects: 30 minutes.
pub const DIRECTORY_CACHE_MAX_AGE: Duration = Duration::from_secs(1800);

/// Snapshot revalidation age for resource-management objects: 24 hours.
pub const RESOURCE_CACHE_MAX_AGE: Duration = Duration::from_secs(86400);

/// Which backend API serves a kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiFamily {
    /// The directory/graph API (`graph.microsoft.com`).
    Graph,
    /// The resource-management API (`management.azure.com`).
    Management,
}

/// The nine tenant object kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ObjectKind {
    RoleDefinition,
    RoleAssignment,
    Subscription,
    ManagementGroup,
    User,
    Group,
    ServicePrincipal,
    Application,
    DirectoryRole,
}

/// All kinds, in cache-file / reporting order.
pub const ALL_KINDS: [ObjectKind; 9] = [
    ObjectKind::RoleDefinition,
    ObjectKind::RoleAssignment,
    ObjectKind::Subscription,
    ObjectKind::ManagementGroup,
    ObjectKind::User,
    ObjectKind::Group,
    ObjectKind::ServicePrincipal,
    ObjectKind::Application,
    ObjectKind::DirectoryRole,
];

/// Kinds queried by the cross-kind UUID resolver, in fixed order.
///
/// Management groups are not UUID-addressed and are excluded.
pub const RESOLVE_ORDER: [ObjectKind; 8] = [
    ObjectKind::RoleDefinition,
    ObjectKind::RoleAssignment,
    ObjectKind::Subscription,
    ObjectKind::User,
    ObjectKind::Group,
    ObjectKind::ServicePrincipal,
    ObjectKind::Application,
    ObjectKind::DirectoryRole,
];

impl ObjectKind {
    /// The short command-line tag for this kind.
    pub fn tag(&self) -> &'static str {
        match self {
            Self::RoleDefinition => "d",
            Self::RoleAssignment => "a",
            Self::Subscription => "s",
            Self::ManagementGroup => "m",
            Self::User => "u",
            Self::Group => "g",
            Self::ServicePrincipal => "sp",
            Self::Application => "ap",
            Self::DirectoryRole => "ad",
        }
    }

    /// Human-readable kind name used in reports and warnings.
    pub fn long_name(&self) -> &'static str {
        match self {
            Self::RoleDefinition => "RBAC Role Definition",
            Self::RoleAssignment => "RBAC Role Assignment",
            Self::Subscription => "Azure Subscription",
            Self::ManagementGroup => "Management Group",
            Self::User => "Directory User",
            Self::Group => "Directory Group",
            Self::ServicePrincipal => "Service Principal",
            Self::Application => "Registered Application",
            Self::DirectoryRole => "Directory Role",
        }
    }

    /// Base name for this kind's cache files: `{tenant}_{basename}.gz`.
    pub fn cache_basename(&self) -> &'static str {
        match self {
            Self::RoleDefinition => "roleDefinitions",
            Self::RoleAssignment => "roleAssignments",
            Self::Subscription => "subscriptions",
            Self::ManagementGroup => "managementGroups",
            Self::User => "users",
            Self::Group => "groups",
            Self::ServicePrincipal => "servicePrincipals",
            Self::Application => "applications",
            Self::DirectoryRole => "directoryRoles",
        }
    }

    /// The attribute holding this kind's stable identifier.
    ///
    /// Directory objects carry a UUID under `id`; the RBAC backend uses
    /// `name` as the definition/assignment UUID; subscriptions expose
    /// `subscriptionId` and management groups `name`.
    pub fn id_key(&self) -> &'static str {
        match self {
            Self::RoleDefinition | Self::RoleAssignment | Self::ManagementGroup => "name",
            Self::Subscription => "subscriptionId",
            Self::User
            | Self::Group
            | Self::ServicePrincipal
            | Self::Application
            | Self::DirectoryRole => "id",
        }
    }

    /// Which backend API serves this kind.
    pub fn api_family(&self) -> ApiFamily {
        match self {
            Self::RoleDefinition
            | Self::RoleAssignment
            | Self::Subscription
            | Self::ManagementGroup => ApiFamily::Management,
            Self::User
            | Self::Group
            | Self::ServicePrincipal
            | Self::Application
            | Self::DirectoryRole => ApiFamily::Graph,
        }
    }

    /// How old a snapshot of this kind may grow before revalidation.
    pub fn cache_max_age(&self) -> Duration {
        match self.api_family() {
            ApiFamily::Graph => DIRECTORY_CACHE_MAX_AGE,
            ApiFamily::Management => RESOURCE_CACHE_MAX_AGE,
        }
    }

    /// Whether the backend offers a server-side delta stream for this kind.
    ///
    /// Directory roles are a short, rarely changing list with no delta
    /// endpoint; they are always fetched whole.
    pub fn supports_delta(&self) -> bool {
        matches!(
            self,
            Self::User | Self::Group | Self::ServicePrincipal | Self::Application
        )
    }

    /// String-valued attributes scanned by the substring filter matcher.
    ///
    /// Dotted entries descend into the `properties` sub-object.
    pub fn search_keys(&self) -> &'static [&'static str] {
        match self {
            Self::RoleDefinition => &["name", "properties.roleName", "properties.description"],
            Self::RoleAssignment => &[
                "name",
                "properties.roleDefinitionId",
                "properties.principalId",
                "properties.description",
                "properties.principalType",
                "properties.scope",
            ],
            Self::Subscription => &["displayName", "subscriptionId", "state"],
            Self::ManagementGroup => &["name", "properties.displayName"],
            Self::User => &[
                "id",
                "displayName",
                "userPrincipalName",
                "onPremisesSamAccountName",
            ],
            Self::Group => &["id", "displayName", "description"],
            Self::ServicePrincipal | Self::Application => &["id", "displayName", "appId"],
            Self::DirectoryRole => &["id", "displayName", "description", "templateId"],
        }
    }
}

impl Display for ObjectKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

impl FromStr for ObjectKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "d" => Ok(Self::RoleDefinition),
            "a" => Ok(Self::RoleAssignment),
            "s" => Ok(Self::Subscription),
            "m" => Ok(Self::ManagementGroup),
            "u" => Ok(Self::User),
            "g" => Ok(Self::Group),
            "sp" => Ok(Self::ServicePrincipal),
            "ap" => Ok(Self::Application),
            "ad" => Ok(Self::DirectoryRole),
            other => Err(Error::Format(format!(
                "unknown object kind '{other}' (expected one of d, a, s, m, u, g, sp, ap, ad)"
            ))),
        }
    }
}
