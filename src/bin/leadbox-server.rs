// ABOUTME: Server binary for the Leadbox marketing-site backend
// ABOUTME: Loads configuration, migrates the database, seeds the admin user, and serves

//! # Leadbox Server Binary
//!
//! Starts the HTTP API with database migration and admin bootstrap.

use anyhow::Result;
use clap::Parser;
use leadbox::{
    config::environment::ServerConfig,
    database_plugins::{factory::Database, DatabaseProvider},
    logging,
    server::{ensure_admin_user, run_server, ServerResources},
};
use std::sync::Arc;
use tracing::info;

#[derive(Parser)]
#[command(name = "leadbox-server")]
#[command(about = "Leadbox - lead intake and triage backend")]
pub struct Args {
    /// Override HTTP port
    #[arg(long)]
    http_port: Option<u16>,

    /// Override database URL
    #[arg(long)]
    database_url: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let mut config = ServerConfig::from_env()?;
    if let Some(http_port) = args.http_port {
        config.http_port = http_port;
    }
    if let Some(database_url) = &args.database_url {
        config.database_url =
            leadbox::config::environment::DatabaseUrl::parse_url(database_url);
    }

    logging::init_from_env()?;

    info!("Starting Leadbox server");
    info!("{}", config.summary());

    let database = Database::new(&config.database_url.to_connection_string()).await?;
    database.migrate().await?;
    info!("database ready ({})", database.backend_info());

    ensure_admin_user(&database, &config).await?;

    let side_effects = ServerResources::build_side_effects(&config)?;

    let config = Arc::new(config);
    let resources = Arc::new(ServerResources::new(database, config, side_effects));

    run_server(resources).await
}
