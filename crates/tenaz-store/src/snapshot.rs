//! Per-kind snapshot and delta-link files
//!
//! Files live under the config directory as `{tenant}_{kind}.gz` and
//! `{tenant}_{kind}_deltaLink.gz`, each a gzip-wrapped JSON document.
//! Writes are atomic (temp file, fsync-free rename) with mode 0600; a
//! crash between the snapshot and its delta-link leaves the pair
//! inconsistent, which only degrades the next run to a full fetch.

use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;
use serde_json::Value;
use tracing::{debug, warn};

use tenaz_core::config::write_private;
use tenaz_core::domain::document::str_of;
use tenaz_core::{ObjectKind, Result};

/// Locates and reads/writes one tenant's cache files.
pub struct SnapshotFiles {
    conf_dir: PathBuf,
    tenant_id: String,
}

impl SnapshotFiles {
    pub fn new(conf_dir: &Path, tenant_id: &str) -> Self {
        Self {
            conf_dir: conf_dir.to_path_buf(),
            tenant_id: tenant_id.to_string(),
        }
    }

    pub fn snapshot_path(&self, kind: ObjectKind) -> PathBuf {
        self.conf_dir
            .join(format!("{}_{}.gz", self.tenant_id, kind.cache_basename()))
    }

    pub fn delta_link_path(&self, kind: ObjectKind) -> PathBuf {
        self.conf_dir.join(format!(
            "{}_{}_deltaLink.gz",
            self.tenant_id,
            kind.cache_basename()
        ))
    }

    /// The snapshot object list; missing or unreadable files yield empty.
    pub fn load_snapshot(&self, kind: ObjectKind) -> Vec<Value> {
        match read_gzip_json(&self.snapshot_path(kind)) {
            Some(Value::Array(list)) => list,
            Some(_) => {
                warn!(kind = %kind, "snapshot file is not a list, ignoring");
                Vec::new()
            }
            None => Vec::new(),
        }
    }

    pub fn save_snapshot(&self, kind: ObjectKind, objects: &[Value]) -> Result<()> {
        write_gzip_json(&self.snapshot_path(kind), &Value::Array(objects.to_vec()))?;
        debug!(kind = %kind, count = objects.len(), "snapshot written");
        Ok(())
    }

    /// Wall-clock age of the snapshot file, `None` when absent.
    pub fn snapshot_age(&self, kind: ObjectKind) -> Option<Duration> {
        file_age(&self.snapshot_path(kind))
    }

    /// The stored continuation link, regardless of age.
    pub fn load_delta_link(&self, kind: ObjectKind) -> Option<String> {
        let doc = read_gzip_json(&self.delta_link_path(kind))?;
        let link = str_of(&doc, "@odata.deltaLink");
        (!link.is_empty()).then(|| link.to_string())
    }

    pub fn delta_link_age(&self, kind: ObjectKind) -> Option<Duration> {
        file_age(&self.delta_link_path(kind))
    }

    pub fn save_delta_link(&self, kind: ObjectKind, link: &str) -> Result<()> {
        let doc = serde_json::json!({ "@odata.deltaLink": link });
        write_gzip_json(&self.delta_link_path(kind), &doc)
    }

    /// Remove this kind's snapshot and delta-link files.
    pub fn clear_kind(&self, kind: ObjectKind) -> Result<()> {
        remove_if_present(&self.snapshot_path(kind))?;
        remove_if_present(&self.delta_link_path(kind))?;
        Ok(())
    }

    /// Remove every cache file belonging to this tenant.
    pub fn clear_all(&self) -> Result<()> {
        let prefix = format!("{}_", self.tenant_id);
        let entries = match std::fs::read_dir(&self.conf_dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(()),
            Err(e) => return Err(e.into()),
        };
        for entry in entries.flatten() {
            let name = entry.file_name();
            let name = name.to_string_lossy();
            if name.starts_with(&prefix) && name.ends_with(".gz") {
                remove_if_present(&entry.path())?;
            }
        }
        Ok(())
    }
}

fn file_age(path: &Path) -> Option<Duration> {
    let modified = std::fs::metadata(path).ok()?.modified().ok()?;
    SystemTime::now().duration_since(modified).ok()
}

fn remove_if_present(path: &Path) -> Result<()> {
    match std::fs::remove_file(path) {
        Ok(()) => {
            debug!(path = %path.display(), "cache file removed");
            Ok(())
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e.into()),
    }
}

fn read_gzip_json(path: &Path) -> Option<Value> {
    let file = std::fs::File::open(path).ok()?;
    let mut decoder = GzDecoder::new(file);
    let mut content = String::new();
    if let Err(e) = decoder.read_to_string(&mut content) {
        warn!(path = %path.display(), error = %e, "cache file not valid gzip, ignoring");
        return None;
    }
    match serde_json::from_str(&content) {
        Ok(value) => Some(value),
        Err(e) => {
            warn!(path = %path.display(), error = %e, "cache file not valid JSON, ignoring");
            None
        }
    }
}

fn write_gzip_json(path: &Path, value: &Value) -> Result<()> {
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    let bytes =
        serde_json::to_vec(value).map_err(|e| tenaz_core::Error::Format(e.to_string()))?;
    encoder.write_all(&bytes)?;
    let compressed = encoder.finish()?;

    // Atomic replace: a concurrent reader sees either the old or the new file.
    let tmp = path.with_extension("gz.tmp");
    write_private(&tmp, &compressed)?;
    std::fs::rename(&tmp, path)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    const TENANT: &str = "11111111-2222-3333-4444-555555555555";

    #[test]
    fn test_snapshot_round_trip() {
        let dir = TempDir::new().unwrap();
        let files = SnapshotFiles::new(dir.path(), TENANT);
        let objects = vec![json!({"id": "1", "displayName": "Alice"})];
        files.save_snapshot(ObjectKind::User, &objects).unwrap();

        let loaded = files.load_snapshot(ObjectKind::User);
        assert_eq!(loaded, objects);
    }

    #[test]
    fn test_snapshot_file_is_gzip() {
        let dir = TempDir::new().unwrap();
        let files = SnapshotFiles::new(dir.path(), TENANT);
        files.save_snapshot(ObjectKind::User, &[json!({"id": "1"})]).unwrap();

        let bytes = std::fs::read(files.snapshot_path(ObjectKind::User)).unwrap();
        assert_eq!(&bytes[..2], &[0x1f, 0x8b]);
    }

    #[test]
    fn test_missing_snapshot_is_empty() {
        let dir = TempDir::new().unwrap();
        let files = SnapshotFiles::new(dir.path(), TENANT);
        assert!(files.load_snapshot(ObjectKind::Group).is_empty());
        assert!(files.snapshot_age(ObjectKind::Group).is_none());
    }

    #[test]
    fn test_corrupt_snapshot_is_empty() {
        let dir = TempDir::new().unwrap();
        let files = SnapshotFiles::new(dir.path(), TENANT);
        std::fs::write(files.snapshot_path(ObjectKind::User), b"not gzip").unwrap();
        assert!(files.load_snapshot(ObjectKind::User).is_empty());
    }

    #[test]
    fn test_delta_link_round_trip() {
        let dir = TempDir::new().unwrap();
        let files = SnapshotFiles::new(dir.path(), TENANT);
        let link = "https://graph.microsoft.com/v1.0/users/delta?$deltatoken=abc";
        files.save_delta_link(ObjectKind::User, link).unwrap();
        assert_eq!(files.load_delta_link(ObjectKind::User).unwrap(), link);
    }

    #[test]
    fn test_file_naming_scheme() {
        let dir = TempDir::new().unwrap();
        let files = SnapshotFiles::new(dir.path(), TENANT);
        assert!(files
            .snapshot_path(ObjectKind::RoleDefinition)
            .ends_with(format!("{TENANT}_roleDefinitions.gz")));
        assert!(files
            .delta_link_path(ObjectKind::ServicePrincipal)
            .ends_with(format!("{TENANT}_servicePrincipals_deltaLink.gz")));
    }

    #[test]
    fn test_clear_kind_removes_both_files() {
        let dir = TempDir::new().unwrap();
        let files = SnapshotFiles::new(dir.path(), TENANT);
        files.save_snapshot(ObjectKind::User, &[json!({"id": "1"})]).unwrap();
        files.save_delta_link(ObjectKind::User, "link").unwrap();

        files.clear_kind(ObjectKind::User).unwrap();
        assert!(!files.snapshot_path(ObjectKind::User).exists());
        assert!(!files.delta_link_path(ObjectKind::User).exists());
    }

    #[test]
    fn test_clear_all_only_touches_own_tenant() {
        let dir = TempDir::new().unwrap();
        let mine = SnapshotFiles::new(dir.path(), TENANT);
        let other = SnapshotFiles::new(dir.path(), "other-tenant");
        mine.save_snapshot(ObjectKind::User, &[json!({"id": "1"})]).unwrap();
        other.save_snapshot(ObjectKind::User, &[json!({"id": "2"})]).unwrap();

        mine.clear_all().unwrap();
        assert!(!mine.snapshot_path(ObjectKind::User).exists());
        assert!(other.snapshot_path(ObjectKind::User).exists());
    }

    #[cfg(unix)]
    #[test]
    fn test_snapshot_mode() {
        use std::os::unix::fs::PermissionsExt;
        let dir = TempDir::new().unwrap();
        let files = SnapshotFiles::new(dir.path(), TENANT);
        files.save_snapshot(ObjectKind::User, &[]).unwrap();
        let mode = std::fs::metadata(files.snapshot_path(ObjectKind::User))
            .unwrap()
            .permissions()
            .mode();
        assert_eq!(mode & 0o777, 0o600);
    }
}
