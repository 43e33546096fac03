//! tenaz CLI - inspect and administer an Azure tenant's identity and
//! RBAC surface
//!
//! Provides commands for:
//! - Listing and showing directory principals, roles, and RBAC objects
//! - Counting objects locally and remotely
//! - Resolving a bare UUID across every object kind
//! - Upserting, comparing, and deleting role definitions and assignments
//!   from specification files
//! - Managing the local cache and login credentials

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;
mod context;

use commands::cache::CacheCommand;
use commands::compare::CompareCommand;
use commands::count::CountCommand;
use commands::creds::CredsCommand;
use commands::delete::DeleteCommand;
use commands::list::ListCommand;
use commands::report::ReportCommand;
use commands::resolve::ResolveCommand;
use commands::runtime::RuntimeCommand;
use commands::show::ShowCommand;
use commands::tree::TreeCommand;
use commands::upsert::UpsertCommand;
use context::Context;

#[derive(Debug, Parser)]
#[command(name = "tenaz", version, about = "Azure tenant identity and RBAC explorer")]
pub struct Cli {
    /// Verbose output (can be repeated: -v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Use an alternate config and cache directory
    #[arg(long, global = true)]
    config_dir: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// List objects of a kind, optionally filtered
    List(ListCommand),
    /// Show one object fetched by its identifier
    Show(ShowCommand),
    /// Count objects locally and remotely
    Count(CountCommand),
    /// Resolve a bare UUID across every object kind
    Resolve(ResolveCommand),
    /// Create or update a role definition or assignment from a specfile
    Upsert(UpsertCommand),
    /// Delete by UUID, specfile, or role name
    Delete(DeleteCommand),
    /// Compare a specfile against its remote counterpart
    Compare(CompareCommand),
    /// Print the management-group hierarchy
    Tree(TreeCommand),
    /// Print a role-assignment report
    Report(ReportCommand),
    /// Manage the local cache
    #[command(subcommand)]
    Cache(CacheCommand),
    /// Manage login credentials
    #[command(subcommand)]
    Creds(CredsCommand),
    /// Show the effective runtime configuration
    Runtime(RuntimeCommand),
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .init();

    let ctx = Context::new(cli.config_dir.as_deref())?;

    match cli.command {
        Commands::List(cmd) => cmd.execute(&ctx).await,
        Commands::Show(cmd) => cmd.execute(&ctx).await,
        Commands::Count(cmd) => cmd.execute(&ctx).await,
        Commands::Resolve(cmd) => cmd.execute(&ctx).await,
        Commands::Upsert(cmd) => cmd.execute(&ctx).await,
        Commands::Delete(cmd) => cmd.execute(&ctx).await,
        Commands::Compare(cmd) => cmd.execute(&ctx).await,
        Commands::Tree(cmd) => cmd.execute(&ctx).await,
        Commands::Report(cmd) => cmd.execute(&ctx).await,
        Commands::Cache(cmd) => cmd.execute(&ctx).await,
        Commands::Creds(cmd) => cmd.execute(&ctx),
        Commands::Runtime(cmd) => cmd.execute(&ctx),
    }
}
