//! CLI command definitions for the `chatvault` binary.
//!
//! Uses clap derive macros for argument parsing.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Persist chat sessions and their messages behind a small REST API.
#[derive(Debug, Parser)]
#[command(name = "chatvault", version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to a TOML configuration file (defaults to ./chatvault.toml when present).
    #[arg(long, short, global = true, env = "CHATVAULT_CONFIG")]
    pub config: Option<PathBuf>,

    /// Emit logs as newline-delimited JSON.
    #[arg(long, global = true)]
    pub json_logs: bool,

    /// Detailed output (-v for debug, -vv for trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Start the REST API server.
    Serve {
        /// Address to bind (overrides config and CHATVAULT_HOST).
        #[arg(long)]
        host: Option<String>,

        /// Port to listen on (overrides config and CHATVAULT_PORT).
        #[arg(long, short)]
        port: Option<u16>,
    },

    /// Apply pending database migrations and exit.
    Migrate,
}
