//! On-disk token cache
//!
//! Tokens persist across invocations in a single JSON file under the
//! config directory, written atomically with mode 0600. Records are
//! keyed by (resource, client id, account) so the two backend resources
//! never share a token and multiple accounts can coexist.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use tenaz_core::config::{write_private, TOKEN_CACHE_FILE};
use tenaz_core::Result;

/// One cached token with its refresh material.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenRecord {
    /// Resource base URL the token is valid for.
    pub resource: String,
    /// Client id the token was issued to.
    pub client_id: String,
    /// Preferred username, lowercase; `None` for confidential clients.
    pub account: Option<String>,
    pub access_token: String,
    pub refresh_token: Option<String>,
    pub expires_at: DateTime<Utc>,
}

impl TokenRecord {
    /// True when the token is still valid with `margin` to spare.
    pub fn is_fresh(&self, margin: chrono::Duration) -> bool {
        self.expires_at > Utc::now() + margin
    }
}

/// The token cache file.
pub struct TokenStore {
    path: PathBuf,
}

impl TokenStore {
    pub fn new(conf_dir: &Path) -> Self {
        Self {
            path: conf_dir.join(TOKEN_CACHE_FILE),
        }
    }

    /// Path of the cache file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load every record; a missing or corrupt file yields no records.
    pub fn load(&self) -> Vec<TokenRecord> {
        match std::fs::read(&self.path) {
            Ok(bytes) => match serde_json::from_slice(&bytes) {
                Ok(records) => records,
                Err(e) => {
                    warn!(path = %self.path.display(), error = %e, "token cache unreadable, ignoring");
                    Vec::new()
                }
            },
            Err(_) => Vec::new(),
        }
    }

    /// Find the record for a resource, client, and optional account.
    ///
    /// Account comparison is case-insensitive on the preferred username.
    pub fn find(
        &self,
        resource: &str,
        client_id: &str,
        account: Option<&str>,
    ) -> Option<TokenRecord> {
        let wanted = account.map(str::to_lowercase);
        self.load().into_iter().find(|r| {
            r.resource == resource
                && r.client_id == client_id
                && r.account.as_deref().map(str::to_lowercase) == wanted
        })
    }

    /// Insert or replace the record with the same (resource, client, account) key.
    pub fn upsert(&self, record: TokenRecord) -> Result<()> {
        let mut records = self.load();
        records.retain(|r| {
            !(r.resource == record.resource
                && r.client_id == record.client_id
                && r.account == record.account)
        });
        records.push(record);
        self.save(&records)
    }

    /// Persist all records atomically with owner-only permissions.
    pub fn save(&self, records: &[TokenRecord]) -> Result<()> {
        let bytes = serde_json::to_vec_pretty(records)
            .map_err(|e| tenaz_core::Error::Format(e.to_string()))?;
        let tmp = self.path.with_extension("json.tmp");
        write_private(&tmp, &bytes)?;
        std::fs::rename(&tmp, &self.path)?;
        debug!(path = %self.path.display(), count = records.len(), "token cache written");
        Ok(())
    }

    /// Delete the cache file.
    pub fn clear(&self) -> Result<()> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use tempfile::TempDir;

    fn record(resource: &str, account: Option<&str>) -> TokenRecord {
        TokenRecord {
            resource: resource.to_string(),
            client_id: "client-1".to_string(),
            account: account.map(str::to_string),
            access_token: format!("token-for-{resource}"),
            refresh_token: None,
            expires_at: Utc::now() + Duration::hours(1),
        }
    }

    #[test]
    fn test_missing_file_yields_empty() {
        let dir = TempDir::new().unwrap();
        let store = TokenStore::new(dir.path());
        assert!(store.load().is_empty());
    }

    #[test]
    fn test_tokens_not_shared_across_resources() {
        let dir = TempDir::new().unwrap();
        let store = TokenStore::new(dir.path());
        store
            .upsert(record("https://graph.microsoft.com", Some("admin@x.com")))
            .unwrap();
        store
            .upsert(record("https://management.azure.com", Some("admin@x.com")))
            .unwrap();

        let graph = store
            .find("https://graph.microsoft.com", "client-1", Some("admin@x.com"))
            .unwrap();
        let mgmt = store
            .find(
                "https://management.azure.com",
                "client-1",
                Some("admin@x.com"),
            )
            .unwrap();
        assert_ne!(graph.access_token, mgmt.access_token);
    }

    #[test]
    fn test_account_match_is_case_insensitive() {
        let dir = TempDir::new().unwrap();
        let store = TokenStore::new(dir.path());
        store
            .upsert(record("https://graph.microsoft.com", Some("admin@x.com")))
            .unwrap();
        assert!(store
            .find("https://graph.microsoft.com", "client-1", Some("Admin@X.Com"))
            .is_some());
        assert!(store
            .find("https://graph.microsoft.com", "client-1", Some("other@x.com"))
            .is_none());
    }

    #[test]
    fn test_upsert_replaces_same_key() {
        let dir = TempDir::new().unwrap();
        let store = TokenStore::new(dir.path());
        let mut rec = record("https://graph.microsoft.com", None);
        store.upsert(rec.clone()).unwrap();
        rec.access_token = "rotated".to_string();
        store.upsert(rec).unwrap();

        let records = store.load();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].access_token, "rotated");
    }

    #[cfg(unix)]
    #[test]
    fn test_cache_file_mode() {
        use std::os::unix::fs::PermissionsExt;
        let dir = TempDir::new().unwrap();
        let store = TokenStore::new(dir.path());
        store.upsert(record("https://graph.microsoft.com", None)).unwrap();
        let mode = std::fs::metadata(store.path()).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }

    #[test]
    fn test_freshness_margin() {
        let mut rec = record("r", None);
        rec.expires_at = Utc::now() + Duration::minutes(2);
        assert!(rec.is_fresh(Duration::minutes(1)));
        assert!(!rec.is_fresh(Duration::minutes(5)));
    }

    #[test]
    fn test_clear_is_idempotent() {
        let dir = TempDir::new().unwrap();
        let store = TokenStore::new(dir.path());
        store.clear().unwrap();
        store.upsert(record("r", None)).unwrap();
        store.clear().unwrap();
        assert!(store.load().is_empty());
    }
}
