//! Tree command - management-group hierarchy

use anyhow::Result;
use clap::Args;

use tenaz_tenant::management_groups;

use crate::context::Context;

#[derive(Debug, Args)]
pub struct TreeCommand {}

impl TreeCommand {
    pub async fn execute(&self, ctx: &Context) -> Result<()> {
        let tenant = ctx.connect().await?;
        management_groups::print_tree(&tenant).await?;
        Ok(())
    }
}
