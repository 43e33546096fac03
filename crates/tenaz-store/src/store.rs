//! Cached object store
//!
//! Combines the snapshot files with the staleness policy. A snapshot is
//! refreshed only when the network is reachable and it is missing, empty,
//! older than its kind's threshold, or a forced refresh was requested;
//! otherwise the cached copy is authoritative. `list()` is not reentrant
//! for a kind; callers serialize per kind.

use std::path::Path;
use std::time::Duration;

use serde_json::Value;
use tracing::debug;

use tenaz_core::{ObjectKind, Result};

use crate::snapshot::SnapshotFiles;

/// A stored continuation token expires server-side after 30 days; treat
/// it as usable for 27 to leave margin.
const DELTA_LINK_MAX_AGE: Duration = Duration::from_secs(3600 * 24 * 27);

/// One tenant's cached view of every object kind.
pub struct ObjectStore {
    files: SnapshotFiles,
}

impl ObjectStore {
    pub fn new(conf_dir: &Path, tenant_id: &str) -> Self {
        Self {
            files: SnapshotFiles::new(conf_dir, tenant_id),
        }
    }

    /// The cached snapshot for a kind; empty when absent.
    pub fn cached(&self, kind: ObjectKind) -> Vec<Value> {
        self.files.load_snapshot(kind)
    }

    /// Number of entries in the local snapshot.
    pub fn count_local(&self, kind: ObjectKind) -> i64 {
        self.files.load_snapshot(kind).len() as i64
    }

    /// Replace a kind's snapshot.
    pub fn save(&self, kind: ObjectKind, objects: &[Value]) -> Result<()> {
        self.files.save_snapshot(kind, objects)
    }

    /// Whether a kind must be refreshed from the backend.
    pub fn needs_refresh(&self, kind: ObjectKind, force: bool, online: bool) -> bool {
        if !online {
            return false;
        }
        if force {
            return true;
        }
        match self.files.snapshot_age(kind) {
            None => true,
            Some(age) => age > kind.cache_max_age() || self.files.load_snapshot(kind).is_empty(),
        }
    }

    /// The stored continuation link, if it is still within its margin.
    pub fn usable_delta_link(&self, kind: ObjectKind) -> Option<String> {
        let age = self.files.delta_link_age(kind)?;
        if age > DELTA_LINK_MAX_AGE {
            debug!(kind = %kind, age_secs = age.as_secs(), "delta link too old, full fetch");
            return None;
        }
        self.files.load_delta_link(kind)
    }

    /// Persist the continuation link for the next invocation.
    pub fn save_delta_link(&self, kind: ObjectKind, link: &str) -> Result<()> {
        self.files.save_delta_link(kind, link)
    }

    /// Remove one kind's cache files.
    pub fn clear(&self, kind: ObjectKind) -> Result<()> {
        self.files.clear_kind(kind)
    }

    /// Remove every cache file for this tenant.
    pub fn clear_all(&self) -> Result<()> {
        self.files.clear_all()
    }
}
