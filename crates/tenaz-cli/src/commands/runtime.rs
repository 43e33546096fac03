//! Runtime command - show the effective configuration

use anyhow::Result;
use clap::Args;

use tenaz_api::{GRAPH_BASE_URL, MGMT_BASE_URL};
use tenaz_core::LoginMethod;

use crate::context::Context;

#[derive(Debug, Args)]
pub struct RuntimeCommand {}

impl RuntimeCommand {
    pub fn execute(&self, ctx: &Context) -> Result<()> {
        println!(
            "config_dir: {}  # config and cache directory",
            ctx.conf_dir().display()
        );

        let creds = ctx.credentials()?;
        println!("runtime_credentials:");
        println!("  tenant_id: {}", creds.tenant_id);
        match &creds.method {
            LoginMethod::Interactive { username } => {
                println!("  username: {username}");
                println!("  interactive: true");
            }
            LoginMethod::ClientSecret {
                client_id,
                client_secret,
            } => {
                println!("  client_id: {client_id}");
                println!("  client_secret: {client_secret}");
            }
        }

        println!("api_variables:");
        println!("  authority_url: {}", creds.authority_url());
        println!("  graph_url: {GRAPH_BASE_URL}");
        println!("  management_url: {MGMT_BASE_URL}");
        Ok(())
    }
}
