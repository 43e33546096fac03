//! Report command - role-assignment report

use anyhow::Result;
use clap::Args;

use tenaz_tenant::{groups, role_assignments};

use crate::context::Context;

#[derive(Debug, Args)]
pub struct ReportCommand {
    /// Report privileged-access groups instead of role assignments
    #[arg(long)]
    pags: bool,
}

impl ReportCommand {
    pub async fn execute(&self, ctx: &Context) -> Result<()> {
        let tenant = ctx.connect().await?;
        if self.pags {
            groups::print_privileged_access_groups(&tenant).await?;
        } else {
            role_assignments::report(&tenant).await?;
        }
        Ok(())
    }
}
