//! Count command - local vs remote object counts

use anyhow::Result;
use clap::Args;

use tenaz_tenant::printing;

use crate::commands::parse_kind;
use crate::context::Context;

#[derive(Debug, Args)]
pub struct CountCommand {
    /// Object kind tag; omit for the full report across every kind
    kind: Option<String>,
}

impl CountCommand {
    pub async fn execute(&self, ctx: &Context) -> Result<()> {
        let tenant = ctx.connect().await?;
        match &self.kind {
            None => printing::count_report(&tenant).await?,
            Some(tag) => {
                let kind = parse_kind(tag)?;
                let local = tenant.count_local(kind);
                let remote = tenant.count_remote(kind).await;
                println!("{:<36} {:>10} {:>10}", kind.long_name(), local, remote);
            }
        }
        Ok(())
    }
}
