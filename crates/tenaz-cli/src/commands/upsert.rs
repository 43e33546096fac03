//! Upsert command - apply a specification file

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;

use tenaz_tenant::reconcile;

use crate::context::Context;

#[derive(Debug, Args)]
pub struct UpsertCommand {
    /// Role definition or assignment specfile (JSON or YAML)
    specfile: PathBuf,
}

impl UpsertCommand {
    pub async fn execute(&self, ctx: &Context) -> Result<()> {
        let tenant = ctx.connect().await?;
        reconcile::upsert_from_file(&tenant, &self.specfile).await?;
        Ok(())
    }
}
