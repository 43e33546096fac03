//! Resolve command - cross-kind UUID lookup

use anyhow::{bail, Result};
use clap::Args;
use uuid::Uuid;

use tenaz_tenant::{printing, resolve};

use crate::context::Context;

#[derive(Debug, Args)]
pub struct ResolveCommand {
    /// The UUID to look up across every object kind
    uuid: String,
}

impl ResolveCommand {
    pub async fn execute(&self, ctx: &Context) -> Result<()> {
        if Uuid::parse_str(&self.uuid).is_err() {
            bail!("'{}' is not a valid UUID", self.uuid);
        }
        let tenant = ctx.connect().await?;
        let matches = resolve::find_by_uuid(&tenant, &self.uuid).await;

        if matches.is_empty() {
            println!("No object with UUID {}", self.uuid);
            return Ok(());
        }
        if matches.len() > 1 && !resolve::is_expected_collision(&matches) {
            eprintln!(
                "WARNING: UUID {} matches {} unrelated objects",
                self.uuid,
                matches.len()
            );
        }
        for (index, hit) in matches.iter().enumerate() {
            if index > 0 {
                println!();
            }
            println!("# {} ({})", hit.kind.long_name(), hit.kind.tag());
            printing::print_object(&tenant, hit.kind, &hit.object).await;
        }
        Ok(())
    }
}
