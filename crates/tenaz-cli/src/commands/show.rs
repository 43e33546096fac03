//! Show command - single-object fetch by identifier

use anyhow::{bail, Result};
use clap::Args;

use tenaz_tenant::printing;

use crate::commands::parse_kind;
use crate::context::Context;

#[derive(Debug, Args)]
pub struct ShowCommand {
    /// Object kind tag: d, a, s, u, g, sp, ap, ad
    kind: String,

    /// Object identifier (UUID; appId also works for sp and ap)
    id: String,

    /// Print raw JSON instead of the detailed rendering
    #[arg(short, long)]
    json: bool,
}

impl ShowCommand {
    pub async fn execute(&self, ctx: &Context) -> Result<()> {
        let kind = parse_kind(&self.kind)?;
        let tenant = ctx.connect().await?;
        let Some(object) = tenant.by_uuid(kind, &self.id).await else {
            bail!("no {} with id {}", kind.long_name(), self.id);
        };

        if self.json {
            println!("{}", serde_json::to_string_pretty(&object)?);
        } else {
            printing::print_object(&tenant, kind, &object).await;
        }
        Ok(())
    }
}
