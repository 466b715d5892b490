//! tictac_rooms - room server binary.

use anyhow::Result;
use clap::Parser;
use tictac_rooms::{Cli, Command, RoomServer, ServerConfig};
use tracing::info;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    initialize_tracing();

    let config = ServerConfig::load(cli.config.as_deref())?;

    match cli.command {
        Command::Serve { host, port } => {
            let config = match host {
                Some(host) => config.with_host(host),
                None => config,
            };
            let config = match port {
                Some(port) => config.with_port(port),
                None => config,
            };
            info!(?config, "Starting tictac_rooms");
            RoomServer::new(config).serve().await
        }
        Command::Config => {
            print!("{}", config.to_toml()?);
            Ok(())
        }
    }
}

fn initialize_tracing() {
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,tictac_rooms=debug,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}
