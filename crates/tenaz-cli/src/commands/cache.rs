//! Cache command - clear local snapshot and token caches

use anyhow::Result;
use clap::Subcommand;

use tenaz_auth::TokenStore;
use tenaz_store::ObjectStore;

use crate::commands::parse_kind;
use crate::context::Context;

#[derive(Debug, Subcommand)]
pub enum CacheCommand {
    /// Remove cached files for a kind, the token cache ('t'), or 'all'
    Clear {
        /// Kind tag (d, a, s, m, u, g, sp, ap, ad), 't', or 'all'
        target: String,
    },
}

impl CacheCommand {
    pub async fn execute(&self, ctx: &Context) -> Result<()> {
        let CacheCommand::Clear { target } = self;
        match target.as_str() {
            "t" => {
                TokenStore::new(ctx.conf_dir()).clear()?;
                println!("Token cache removed");
            }
            "all" => {
                let creds = ctx.credentials()?;
                let store = ObjectStore::new(ctx.conf_dir(), &creds.tenant_id.to_string());
                store.clear_all()?;
                println!("All cached snapshots removed");
            }
            tag => {
                let kind = parse_kind(tag)?;
                let creds = ctx.credentials()?;
                let store = ObjectStore::new(ctx.conf_dir(), &creds.tenant_id.to_string());
                store.clear(kind)?;
                println!("Cache removed for {}", kind.long_name());
            }
        }
        Ok(())
    }
}
