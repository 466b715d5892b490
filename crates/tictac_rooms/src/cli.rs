//! Command-line interface for tictac_rooms.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Tic-tac-toe room server
#[derive(Parser, Debug)]
#[command(name = "tictac_rooms")]
#[command(about = "Real-time tic-tac-toe rooms over WebSockets", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Path to a TOML configuration file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Subcommand to run
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run the room server
    Serve {
        /// Host to bind to (overrides config)
        #[arg(long)]
        host: Option<String>,

        /// Port to bind to (overrides config and PORT)
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Print the effective configuration as TOML
    Config,
}
