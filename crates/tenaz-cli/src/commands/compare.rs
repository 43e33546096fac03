//! Compare command - specfile vs remote counterpart

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;

use tenaz_tenant::reconcile;

use crate::context::Context;

#[derive(Debug, Args)]
pub struct CompareCommand {
    /// Role definition or assignment specfile (JSON or YAML)
    specfile: PathBuf,
}

impl CompareCommand {
    pub async fn execute(&self, ctx: &Context) -> Result<()> {
        let tenant = ctx.connect().await?;
        reconcile::compare_file(&tenant, &self.specfile).await?;
        Ok(())
    }
}
