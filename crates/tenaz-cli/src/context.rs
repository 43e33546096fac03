//! CLI invocation context
//!
//! Resolves the config directory, loads credentials, acquires the two
//! backend tokens, and builds the tenant handle commands operate on.

use std::path::PathBuf;

use anyhow::{Context as _, Result};

use tenaz_api::{ApiClient, GRAPH_BASE_URL, MGMT_BASE_URL};
use tenaz_auth::TokenAcquirer;
use tenaz_core::config::{self, Credentials};
use tenaz_tenant::Tenant;

/// Per-invocation configuration shared by every command.
pub struct Context {
    conf_dir: PathBuf,
}

impl Context {
    pub fn new(config_dir: Option<&str>) -> Result<Self> {
        let conf_dir = match config_dir {
            Some(dir) => PathBuf::from(dir),
            None => config::default_conf_dir(),
        };
        std::fs::create_dir_all(&conf_dir)
            .with_context(|| format!("cannot create config directory {}", conf_dir.display()))?;
        Ok(Self { conf_dir })
    }

    pub fn conf_dir(&self) -> &std::path::Path {
        &self.conf_dir
    }

    pub fn credentials(&self) -> Result<Credentials> {
        Credentials::load(&self.conf_dir).context("loading credentials")
    }

    /// Authenticate against both backends and build the tenant handle.
    ///
    /// The two resources need two separate tokens; the identity platform
    /// refuses a shared one.
    pub async fn connect(&self) -> Result<Tenant> {
        let creds = self.credentials()?;
        let acquirer = TokenAcquirer::new(&creds, &self.conf_dir);

        let mgmt = acquirer
            .acquire(MGMT_BASE_URL)
            .await
            .context("acquiring resource-management token")?;
        let graph = acquirer
            .acquire(GRAPH_BASE_URL)
            .await
            .context("acquiring directory token")?;

        let api = ApiClient::new(graph.token, mgmt.token);
        Ok(Tenant::new(
            api,
            &self.conf_dir,
            &creds.tenant_id.to_string(),
        ))
    }
}
