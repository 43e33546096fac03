//! Delete command - remove a role definition or assignment

use anyhow::Result;
use clap::Args;

use tenaz_tenant::reconcile;

use crate::context::Context;

#[derive(Debug, Args)]
pub struct DeleteCommand {
    /// A UUID, a specfile path, or a role definition name
    specifier: String,
}

impl DeleteCommand {
    pub async fn execute(&self, ctx: &Context) -> Result<()> {
        let tenant = ctx.connect().await?;
        reconcile::delete_by_specifier(&tenant, &self.specifier).await?;
        Ok(())
    }
}
