//! Tenant object resolvers and declarative reconciliation
//!
//! This crate ties the transport and the local store together into the
//! operations the CLI dispatches to: per-kind listing with cache
//! synchronization, remote counts, by-identifier lookups, cross-kind UUID
//! resolution, RBAC scope traversal, and the specfile
//! upsert/compare/delete flows.
//!
//! Module layout follows the object kinds: one module per kind owning its
//! fetch, lookup, and printing logic, plus shared modules for the tenant
//! handle, scope enumeration, cross-kind resolution, and reconciliation.

pub mod applications;
pub mod directory;
pub mod directory_roles;
pub mod groups;
pub mod management_groups;
pub mod printing;
pub mod reconcile;
pub mod resolve;
pub mod role_assignments;
pub mod role_definitions;
pub mod scopes;
pub mod service_principals;
pub mod subscriptions;
pub mod tenant;
pub mod users;

pub use resolve::TaggedObject;
pub use tenant::Tenant;
