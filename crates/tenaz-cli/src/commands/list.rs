//! List command - filtered object listing

use anyhow::Result;
use clap::Args;

use tenaz_tenant::printing;

use crate::commands::parse_kind;
use crate::context::Context;

#[derive(Debug, Args)]
pub struct ListCommand {
    /// Object kind tag: d, a, s, m, u, g, sp, ap, ad
    kind: String,

    /// Substring filter over the kind's search keys
    filter: Option<String>,

    /// Bypass the cache-age check and refresh from the backend
    #[arg(short, long)]
    force: bool,

    /// Print raw JSON instead of the terse rendering
    #[arg(short, long)]
    json: bool,
}

impl ListCommand {
    pub async fn execute(&self, ctx: &Context) -> Result<()> {
        let kind = parse_kind(&self.kind)?;
        let tenant = ctx.connect().await?;
        let filter = self.filter.as_deref().unwrap_or("");
        let objects = tenant.list(kind, filter, self.force).await?;

        if self.json {
            println!("{}", serde_json::to_string_pretty(&objects)?);
            return Ok(());
        }

        // A single hit is worth the detailed view.
        if objects.len() == 1 {
            printing::print_object(&tenant, kind, &objects[0]).await;
            return Ok(());
        }
        for object in &objects {
            printing::print_terse(kind, object);
        }
        Ok(())
    }
}
