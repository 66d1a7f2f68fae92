// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! # Quarterdeck Console CLI
//!
//! The `quarterdeck` binary serves the cluster admin console and drives
//! a running console over its HTTP API.
//!
//! ## Architecture
//!
//! - **Serve mode**: `quarterdeck serve` loads the YAML manifest, builds
//!   the proxy pipeline and listens for console requests
//! - **Client mode**: `quarterdeck apps ...` talks to a running console
//!   through the SDK, acting as the named console user
//!
//! ## Commands
//!
//! - `quarterdeck serve` - Run the console server
//! - `quarterdeck config show|validate|generate` - Configuration management
//! - `quarterdeck apps list|start|stop|restart|reload|delete|publish|clean-exit-record` - App operations

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use std::path::PathBuf;

mod commands;
mod server;

use commands::{AppsCommand, ConfigCommand};

/// Quarterdeck Console - cluster app administration
#[derive(Parser)]
#[command(name = "quarterdeck")]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Path to configuration file (overrides discovery)
    #[arg(
        short,
        long,
        global = true,
        env = "QUARTERDECK_CONFIG_PATH",
        value_name = "FILE"
    )]
    config: Option<PathBuf>,

    /// HTTP API port (default: 8000)
    #[arg(long, global = true, env = "QUARTERDECK_PORT", default_value = "8000")]
    port: u16,

    /// HTTP API host (default: 127.0.0.1)
    #[arg(long, global = true, env = "QUARTERDECK_HOST", default_value = "127.0.0.1")]
    host: String,

    /// Console user to act as for `apps` commands
    #[arg(short, long, global = true, env = "QUARTERDECK_USER", value_name = "NAME")]
    user: Option<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, global = true, env = "QUARTERDECK_LOG_LEVEL", default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the console server
    #[command(name = "serve")]
    Serve,

    /// Configuration management
    #[command(name = "config")]
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },

    /// App operations against a running console
    #[command(name = "apps")]
    Apps {
        #[command(subcommand)]
        command: AppsCommand,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    init_logging(&cli.log_level)?;

    match cli.command {
        Some(Commands::Serve) => server::start_server(cli.config, &cli.host, cli.port).await,
        Some(Commands::Config { command }) => {
            commands::config::handle_command(command, cli.config).await
        }
        Some(Commands::Apps { command }) => {
            commands::apps::handle_command(command, &cli.host, cli.port, cli.user).await
        }
        None => {
            // No command provided - show help
            eprintln!("{}", "No command specified. Use --help for usage.".yellow());
            std::process::exit(1);
        }
    }
}

/// Initialize tracing subscriber for logging
fn init_logging(level: &str) -> Result<()> {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .or_else(|_| tracing_subscriber::EnvFilter::try_new(level))
        .context("Failed to create log filter")?;

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .init();

    Ok(())
}
