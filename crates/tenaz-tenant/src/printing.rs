//! Kind dispatch for the per-kind printers, plus the count report

use serde_json::Value;

use tenaz_core::{ObjectKind, Result};

use crate::tenant::Tenant;
use crate::{
    applications, directory_roles, groups, management_groups, role_assignments, role_definitions,
    service_principals, subscriptions, users,
};

/// Print one object in its kind's detailed form.
pub async fn print_object(t: &Tenant, kind: ObjectKind, object: &Value) {
    match kind {
        ObjectKind::RoleDefinition => role_definitions::print(t, object).await,
        ObjectKind::RoleAssignment => role_assignments::print(t, object).await,
        ObjectKind::Subscription => subscriptions::print(object),
        ObjectKind::ManagementGroup => management_groups::print(object),
        ObjectKind::User => users::print(t, object).await,
        ObjectKind::Group => groups::print(t, object).await,
        ObjectKind::ServicePrincipal => service_principals::print(object),
        ObjectKind::Application => applications::print(object),
        ObjectKind::DirectoryRole => directory_roles::print(t, object).await,
    }
}

/// Print one object in its kind's one-line form.
pub fn print_terse(kind: ObjectKind, object: &Value) {
    match kind {
        ObjectKind::RoleDefinition => role_definitions::print_terse(object),
        ObjectKind::RoleAssignment => role_assignments::print_terse(object),
        ObjectKind::Subscription => subscriptions::print_terse(object),
        ObjectKind::ManagementGroup => management_groups::print_terse(object),
        ObjectKind::User => users::print_terse(object),
        ObjectKind::Group => groups::print_terse(object),
        ObjectKind::ServicePrincipal => service_principals::print_terse(object),
        ObjectKind::Application => applications::print_terse(object),
        ObjectKind::DirectoryRole => directory_roles::print_terse(object),
    }
}

/// Print the local vs remote count table across every kind.
pub async fn count_report(t: &Tenant) -> Result<()> {
    println!("Note: counting some resource kinds requires a full scope traversal and can take a while.");
    println!("{:<36} {:>10} {:>10}", "OBJECTS", "LOCAL", "REMOTE");

    println!(
        "{:<36} {:>10} {:>10}",
        "Directory Users",
        t.count_local(ObjectKind::User),
        users::count_remote(t).await
    );
    println!(
        "{:<36} {:>10} {:>10}",
        "Directory Groups",
        t.count_local(ObjectKind::Group),
        groups::count_remote(t).await
    );
    println!(
        "{:<36} {:>10} {:>10}",
        "Registered Applications",
        t.count_local(ObjectKind::Application),
        applications::count_remote(t).await
    );

    let (native_local, foreign_local) = service_principals::count_local(t);
    let (native_remote, foreign_remote) = service_principals::count_remote(t).await;
    println!(
        "{:<36} {:>10} {:>10}",
        "Service Principals (native)", native_local, native_remote
    );
    println!(
        "{:<36} {:>10} {:>10}",
        "Service Principals (foreign)", foreign_local, foreign_remote
    );

    println!(
        "{:<36} {:>10} {:>10}",
        "Directory Roles",
        t.count_local(ObjectKind::DirectoryRole),
        directory_roles::count_remote(t).await
    );
    println!(
        "{:<36} {:>10} {:>10}",
        "Management Groups",
        t.count_local(ObjectKind::ManagementGroup),
        management_groups::count_remote(t).await
    );
    println!(
        "{:<36} {:>10} {:>10}",
        "Subscriptions",
        t.count_local(ObjectKind::Subscription),
        subscriptions::count_remote(t).await
    );

    let (builtin_local, custom_local) = role_definitions::count_local(t);
    let (builtin_remote, custom_remote) = role_definitions::count_remote(t).await;
    println!(
        "{:<36} {:>10} {:>10}",
        "Role Definitions (built-in)", builtin_local, builtin_remote
    );
    println!(
        "{:<36} {:>10} {:>10}",
        "Role Definitions (custom)", custom_local, custom_remote
    );
    println!(
        "{:<36} {:>10} {:>10}",
        "Role Assignments",
        role_assignments::count_local(t),
        role_assignments::count_remote(t).await
    );
    Ok(())
}
