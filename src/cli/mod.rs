pub mod commands;
pub mod jar;
pub mod utils;

use std::sync::Arc;

use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};

use crate::client::PortalClient;
use crate::config;

#[derive(Parser)]
#[command(name = "portal")]
#[command(about = "AccessWash Portal CLI - tenant-scoped portal access from the terminal")]
#[command(version)]
pub struct Cli {
    #[arg(long, global = true, help = "Output in human-readable text format")]
    pub text: bool,

    #[arg(long, global = true, help = "Output in JSON format")]
    pub json: bool,

    #[arg(long, global = true, help = "Tenant subdomain to operate on")]
    pub tenant: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Authentication and session management")]
    Auth {
        #[command(subcommand)]
        cmd: commands::auth::AuthCommands,
    },

    #[command(about = "Account dashboard overview")]
    Dashboard,

    #[command(about = "Customer profile operations")]
    Profile {
        #[command(subcommand)]
        cmd: commands::profile::ProfileCommands,
    },

    #[command(about = "Service request operations")]
    Requests {
        #[command(subcommand)]
        cmd: commands::requests::RequestCommands,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum OutputFormat {
    Text,
    Json,
}

impl OutputFormat {
    pub fn from_cli(cli: &Cli) -> Self {
        if cli.json {
            OutputFormat::Json
        } else {
            OutputFormat::Text
        }
    }
}

/// Tenant-bound client over the file-backed cookie jar. Sessions persist
/// across CLI invocations under the user config directory, one per tenant.
pub fn build_client(tenant: &str) -> anyhow::Result<PortalClient> {
    let jar = Arc::new(jar::FileJar::open()?);
    let client = PortalClient::builder(tenant).storage(jar).build()?;
    Ok(client)
}

pub async fn run(cli: Cli) -> anyhow::Result<()> {
    let output_format = OutputFormat::from_cli(&cli);
    let tenant = cli
        .tenant
        .clone()
        .unwrap_or_else(|| config::config().platform.default_tenant.clone());

    match cli.command {
        Commands::Auth { cmd } => commands::auth::handle(cmd, &tenant, output_format).await,
        Commands::Dashboard => commands::dashboard::handle(&tenant, output_format).await,
        Commands::Profile { cmd } => commands::profile::handle(cmd, &tenant, output_format).await,
        Commands::Requests { cmd } => commands::requests::handle(cmd, &tenant, output_format).await,
    }
}
