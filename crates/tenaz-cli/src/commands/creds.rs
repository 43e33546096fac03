//! Creds command - configure and inspect login credentials

use anyhow::Result;
use clap::Subcommand;

use tenaz_core::config;

use crate::context::Context;

#[derive(Debug, Subcommand)]
pub enum CredsCommand {
    /// Show configured login values from environment and file
    Show,
    /// Configure browser-driven interactive login
    SetInteractive {
        /// Tenant UUID
        tenant_id: String,
        /// Principal username (user@domain)
        username: String,
    },
    /// Configure confidential client-secret login
    SetClient {
        /// Tenant UUID
        tenant_id: String,
        /// Client (application) UUID
        client_id: String,
        /// Client secret
        client_secret: String,
    },
}

impl CredsCommand {
    pub fn execute(&self, ctx: &Context) -> Result<()> {
        match self {
            CredsCommand::Show => {
                config::dump_login_values(ctx.conf_dir());
            }
            CredsCommand::SetInteractive {
                tenant_id,
                username,
            } => {
                let path =
                    config::write_interactive_credentials(ctx.conf_dir(), tenant_id, username)?;
                println!("Updated {}", path.display());
            }
            CredsCommand::SetClient {
                tenant_id,
                client_id,
                client_secret,
            } => {
                let path = config::write_client_credentials(
                    ctx.conf_dir(),
                    tenant_id,
                    client_id,
                    client_secret,
                )?;
                println!("Updated {}", path.display());
            }
        }
        Ok(())
    }
}
