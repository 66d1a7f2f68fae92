// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! App operations against a running console
//!
//! Commands: list, start, stop, restart, reload, delete, publish,
//! clean-exit-record. Every command talks to the console HTTP API through
//! the SDK, acting as the user named by `--user` / `QUARTERDECK_USER`.

use anyhow::{Context, Result};
use clap::Subcommand;
use colored::Colorize;
use serde_json::Value;
use std::path::PathBuf;

use quarterdeck_sdk::ConsoleClient;

#[derive(Subcommand)]
pub enum AppsCommand {
    /// List apps across the cluster's hosts
    List {
        /// Cluster code to query
        #[arg(short, long, value_name = "CODE")]
        cluster: String,
    },

    /// Start an app
    Start {
        /// Cluster code
        #[arg(short, long, value_name = "CODE")]
        cluster: String,

        /// App identifier
        #[arg(value_name = "APPID")]
        appid: String,
    },

    /// Stop an app
    Stop {
        /// Cluster code
        #[arg(short, long, value_name = "CODE")]
        cluster: String,

        /// App identifier
        #[arg(value_name = "APPID")]
        appid: String,
    },

    /// Restart an app
    Restart {
        /// Cluster code
        #[arg(short, long, value_name = "CODE")]
        cluster: String,

        /// App identifier
        #[arg(value_name = "APPID")]
        appid: String,
    },

    /// Reload an app's workers
    Reload {
        /// Cluster code
        #[arg(short, long, value_name = "CODE")]
        cluster: String,

        /// App identifier
        #[arg(value_name = "APPID")]
        appid: String,
    },

    /// Delete an app
    Delete {
        /// Cluster code
        #[arg(short, long, value_name = "CODE")]
        cluster: String,

        /// App identifier
        #[arg(value_name = "APPID")]
        appid: String,
    },

    /// Upload an app package to a cluster
    Publish {
        /// Cluster code
        #[arg(short, long, value_name = "CODE")]
        cluster: String,

        /// Path to the package archive
        #[arg(value_name = "PACKAGE")]
        package: PathBuf,
    },

    /// Clear an app's recorded worker exits
    CleanExitRecord {
        /// Cluster code
        #[arg(short, long, value_name = "CODE")]
        cluster: String,

        /// App identifier
        #[arg(value_name = "APPID")]
        appid: String,
    },
}

pub async fn handle_command(
    command: AppsCommand,
    host: &str,
    port: u16,
    user: Option<String>,
) -> Result<()> {
    let principal = user.context("No console user set (use --user or QUARTERDECK_USER)")?;
    let client = ConsoleClient::new(base_url(host, port)).with_principal(principal);

    match command {
        AppsCommand::List { cluster } => list(&client, &cluster).await,
        AppsCommand::Start { cluster, appid } => {
            let data = client.start_app(&cluster, &appid).await?;
            print_outcome(&format!("✓ start requested for {}", appid), data)
        }
        AppsCommand::Stop { cluster, appid } => {
            let data = client.stop_app(&cluster, &appid).await?;
            print_outcome(&format!("✓ stop requested for {}", appid), data)
        }
        AppsCommand::Restart { cluster, appid } => {
            let data = client.restart_app(&cluster, &appid).await?;
            print_outcome(&format!("✓ restart requested for {}", appid), data)
        }
        AppsCommand::Reload { cluster, appid } => {
            let data = client.reload_app(&cluster, &appid).await?;
            print_outcome(&format!("✓ reload requested for {}", appid), data)
        }
        AppsCommand::Delete { cluster, appid } => {
            let data = client.delete_app(&cluster, &appid).await?;
            print_outcome(&format!("✓ delete requested for {}", appid), data)
        }
        AppsCommand::Publish { cluster, package } => publish(&client, &cluster, package).await,
        AppsCommand::CleanExitRecord { cluster, appid } => {
            let data = client.clean_exit_record(&cluster, &appid).await?;
            print_outcome(&format!("✓ exit records cleared for {}", appid), data)
        }
    }
}

async fn list(client: &ConsoleClient, cluster: &str) -> Result<()> {
    let listing = client.list_apps(cluster).await?;

    if listing.success.is_empty() {
        println!("{}", "No apps found".yellow());
    } else {
        println!("{} apps:", listing.success.len());
        for app in &listing.success {
            println!(
                "  {} {} - workers {}/{} on [{}]",
                app.name.bold(),
                format_status(app.status.as_deref()),
                app.worker_num,
                app.expect_worker_num,
                app.ips.join(", ")
            );
        }
    }

    if !listing.error.is_empty() {
        println!(
            "{}",
            format!("{} hosts did not answer:", listing.error.len()).yellow()
        );
        for host_error in &listing.error {
            println!("  {}", host_error);
        }
    }

    Ok(())
}

async fn publish(client: &ConsoleClient, cluster: &str, package: PathBuf) -> Result<()> {
    let file_name = package
        .file_name()
        .and_then(|name| name.to_str())
        .context("Package path has no file name")?
        .to_string();

    let bytes = std::fs::read(&package)
        .with_context(|| format!("Failed to read package: {:?}", package))?;

    println!("Publishing {} ({} bytes)...", file_name.bold(), bytes.len());

    let data = client.publish(cluster, &file_name, bytes).await?;

    print_outcome(&format!("✓ {} published to {}", file_name, cluster), data)
}

// Helpers
fn base_url(host: &str, port: u16) -> String {
    if host.starts_with("http://") || host.starts_with("https://") {
        format!("{}:{}", host, port)
    } else {
        format!("http://{}:{}", host, port)
    }
}

fn print_outcome(message: &str, data: Value) -> Result<()> {
    println!("{}", message.green());
    if !data.is_null() {
        println!("{}", serde_json::to_string_pretty(&data)?);
    }
    Ok(())
}

fn format_status(status: Option<&str>) -> colored::ColoredString {
    match status {
        Some("online") | Some("running") => "running".green(),
        Some("stopped") | Some("exited") | Some("offline") => "stopped".red(),
        Some(other) => other.normal(),
        None => "(no status)".dimmed(),
    }
}
