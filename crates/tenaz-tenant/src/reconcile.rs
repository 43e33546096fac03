//! Declarative specfile reconciliation
//!
//! A specification file describes one role definition or role assignment.
//! It is parsed as JSON first and as YAML on failure, classified by which
//! natural-key attribute its `properties` carry, then reconciled against
//! the tenant: upsert (with a diff and confirmation when the object
//! exists), compare, or delete.

use std::io::Write;
use std::path::Path;

use serde_json::Value;
use uuid::Uuid;

use tenaz_core::domain::document::{properties, str_of};
use tenaz_core::{Error, ObjectKind, Result};

use crate::printing;
use crate::tenant::Tenant;
use crate::{role_assignments, role_definitions};

/// Serialization format a specfile was parsed from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpecFormat {
    Json,
    Yaml,
}

/// A parsed specfile with its classification.
#[derive(Debug)]
pub struct SpecFile {
    pub format: SpecFormat,
    pub kind: Option<ObjectKind>,
    pub document: Value,
}

/// Parse and classify a specification file.
pub fn load_spec_file(path: &Path) -> Result<SpecFile> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| Error::Format(format!("[{}] {e}", path.display())))?;
    if content.trim().is_empty() {
        return Err(Error::Format(format!(
            "[{}] file is empty",
            path.display()
        )));
    }

    // JSON is a subset of YAML, so JSON must be tried first.
    let (format, document) = match serde_json::from_str::<Value>(&content) {
        Ok(document) => (SpecFormat::Json, document),
        Err(_) => match serde_yaml::from_str::<Value>(&content) {
            Ok(document) => (SpecFormat::Yaml, document),
            Err(_) => {
                return Err(Error::Format(format!(
                    "[{}] file is neither JSON nor YAML",
                    path.display()
                )))
            }
        },
    };

    let kind = classify(&document);
    Ok(SpecFile {
        format,
        kind,
        document,
    })
}

/// Classify a spec document by its `properties` natural key.
pub fn classify(document: &Value) -> Option<ObjectKind> {
    let props = properties(document)?;
    if !str_of(props, "roleName").is_empty() {
        return Some(ObjectKind::RoleDefinition);
    }
    if !str_of(props, "roleDefinitionId").is_empty() {
        return Some(ObjectKind::RoleAssignment);
    }
    None
}

/// Create or update the tenant object a specfile describes.
pub async fn upsert_from_file(t: &Tenant, path: &Path) -> Result<()> {
    let spec = load_spec_file(path)?;
    match spec.kind {
        Some(ObjectKind::RoleDefinition) => role_definitions::upsert(t, &spec.document).await,
        Some(ObjectKind::RoleAssignment) => role_assignments::create(t, &spec.document).await,
        _ => Err(Error::Format(format!(
            "[{}] file is neither a role definition nor an assignment specfile",
            path.display()
        ))),
    }
}

/// Print a specfile and its tenant counterpart side by side.
pub async fn compare_file(t: &Tenant, path: &Path) -> Result<()> {
    let spec = load_spec_file(path)?;
    let Some(kind) = spec.kind else {
        return Err(Error::Format(format!(
            "[{}] file is neither a role definition nor an assignment specfile",
            path.display()
        )));
    };

    println!("==== SPECFILE ============================");
    printing::print_object(t, kind, &spec.document).await;
    println!("==== AZURE ===============================");
    match kind {
        ObjectKind::RoleDefinition => match role_definitions::by_object(t, &spec.document).await? {
            Some(remote) => role_definitions::print(t, &remote).await,
            None => println!("Role definition does not exist."),
        },
        ObjectKind::RoleAssignment => match role_assignments::by_object(t, &spec.document).await? {
            Some(remote) => role_assignments::print(t, &remote).await,
            None => println!("Role assignment does not exist."),
        },
        _ => unreachable!("classified above"),
    }
    Ok(())
}

/// Delete an object named by a UUID, a specfile path, or a role name.
pub async fn delete_by_specifier(t: &Tenant, specifier: &str) -> Result<()> {
    if Uuid::parse_str(specifier).is_ok() {
        return delete_by_uuid(t, specifier).await;
    }
    let path = Path::new(specifier);
    if path.exists() {
        return delete_by_file(t, path).await;
    }
    delete_by_role_name(t, specifier).await
}

async fn delete_by_uuid(t: &Tenant, uuid: &str) -> Result<()> {
    let matches = crate::resolve::find_by_uuid(t, uuid).await;
    if matches.len() > 1 {
        return Err(Error::Collision(format!(
            "UUID {uuid} matches more than one object; run the resolver to see the list"
        )));
    }
    let Some(hit) = matches.into_iter().next() else {
        return Err(Error::Format("object does not exist".to_string()));
    };

    let fqid = str_of(&hit.object, "id").to_string();
    printing::print_object(t, hit.kind, &hit.object).await;
    match hit.kind {
        ObjectKind::RoleDefinition => {
            if !confirm("DELETE above? y/n ") {
                return Err(Error::Format("aborted".to_string()));
            }
            role_definitions::delete_by_fqid(t, &fqid).await
        }
        ObjectKind::RoleAssignment => {
            if !confirm("DELETE above? y/n ") {
                return Err(Error::Format("aborted".to_string()));
            }
            role_assignments::delete_by_fqid(t, &fqid).await
        }
        other => Err(Error::Format(format!(
            "deleting objects of kind '{}' is not supported",
            other.long_name()
        ))),
    }
}

async fn delete_by_file(t: &Tenant, path: &Path) -> Result<()> {
    let spec = load_spec_file(path)?;
    match spec.kind {
        Some(ObjectKind::RoleDefinition) => {
            let Some(remote) = role_definitions::by_object(t, &spec.document).await? else {
                return Err(Error::Format("role definition does not exist".to_string()));
            };
            role_definitions::print(t, &remote).await;
            if !confirm("DELETE above? y/n ") {
                return Err(Error::Format("aborted".to_string()));
            }
            role_definitions::delete_by_fqid(t, str_of(&remote, "id")).await
        }
        Some(ObjectKind::RoleAssignment) => {
            let Some(remote) = role_assignments::by_object(t, &spec.document).await? else {
                return Err(Error::Format("role assignment does not exist".to_string()));
            };
            role_assignments::print(t, &remote).await;
            if !confirm("DELETE above? y/n ") {
                return Err(Error::Format("aborted".to_string()));
            }
            role_assignments::delete_by_fqid(t, str_of(&remote, "id")).await
        }
        _ => Err(Error::Format(format!(
            "[{}] file is neither a role definition nor an assignment specfile",
            path.display()
        ))),
    }
}

/// Deleting by display name only applies to role definitions; the other
/// kinds have no unique name attribute.
async fn delete_by_role_name(t: &Tenant, role_name: &str) -> Result<()> {
    let Some(remote) = role_definitions::by_name(t, role_name).await? else {
        return Err(Error::Format("role definition does not exist".to_string()));
    };
    role_definitions::print(t, &remote).await;
    if !confirm("DELETE above? y/n ") {
        return Err(Error::Format("aborted".to_string()));
    }
    role_definitions::delete_by_fqid(t, str_of(&remote, "id")).await
}

/// Ask the user a y/n question on the terminal.
pub fn confirm(prompt: &str) -> bool {
    print!("{prompt}");
    let _ = std::io::stdout().flush();
    let mut answer = String::new();
    if std::io::stdin().read_line(&mut answer).is_err() {
        return false;
    }
    answer.trim().eq_ignore_ascii_case("y")
}
