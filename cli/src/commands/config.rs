// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Configuration management commands
//!
//! Commands: show, validate, generate

use anyhow::{Context, Result};
use clap::Subcommand;
use colored::Colorize;
use std::path::PathBuf;

use quarterdeck_core::domain::console_config::ConsoleConfig;

#[derive(Subcommand)]
pub enum ConfigCommand {
    /// Show current configuration
    Show {
        /// Show config file paths checked
        #[arg(long)]
        paths: bool,
    },

    /// Validate configuration file
    Validate {
        /// Path to config file (default: discover)
        #[arg(value_name = "FILE")]
        file: Option<PathBuf>,
    },

    /// Generate sample configuration
    Generate {
        /// Output path (default: ./quarterdeck-config.yaml)
        #[arg(short, long, default_value = "./quarterdeck-config.yaml")]
        output: PathBuf,
    },
}

pub async fn handle_command(
    command: ConfigCommand,
    config_override: Option<PathBuf>,
) -> Result<()> {
    match command {
        ConfigCommand::Show { paths } => show(config_override, paths).await,
        ConfigCommand::Validate { file } => validate(file.or(config_override)).await,
        ConfigCommand::Generate { output } => generate(output).await,
    }
}

async fn show(config_override: Option<PathBuf>, show_paths: bool) -> Result<()> {
    let config = ConsoleConfig::load_or_default(config_override.clone())
        .context("Failed to load configuration")?;

    if show_paths {
        println!("{}", "Configuration discovery paths:".bold());
        if let Some(path) = &config_override {
            println!("  1. --config flag: {}", path.display());
        } else {
            println!("  1. --config flag: {}", "(not set)".dimmed());
        }
        println!(
            "  2. QUARTERDECK_CONFIG_PATH: {}",
            std::env::var("QUARTERDECK_CONFIG_PATH")
                .unwrap_or_else(|_| "(not set)".to_string())
                .dimmed()
        );
        println!("  3. ./quarterdeck-config.yaml");
        println!("  4. ~/.quarterdeck/config.yaml");
        println!("  5. /etc/quarterdeck/config.yaml");
        println!();
    }

    println!("{}", "Current configuration:".bold());
    println!();

    println!("{}", "Console:".bold());
    println!("  Name: {}", config.metadata.name);
    println!("  Default remote timeout: {} ms", config.spec.defaults.timeout_ms);
    println!();

    println!("{}", "Clusters:".bold());
    if config.spec.clusters.is_empty() {
        println!("  {}", "(none)".dimmed());
    }
    for cluster in &config.spec.clusters {
        println!("  {}", cluster.code.bold());
        println!("    Endpoint: {}", cluster.endpoint);
        println!(
            "    Token: {}",
            if cluster.token.is_some() { "configured" } else { "(none)" }
        );
        if let Some(timeout) = cluster.timeout_ms {
            println!("    Timeout: {} ms", timeout);
        }
    }
    println!();

    println!("{}", "Users:".bold());
    if config.spec.users.is_empty() {
        println!("  {}", "(none)".dimmed());
    }
    for user in &config.spec.users {
        if user.superuser {
            println!("  {} {}", user.name.bold(), "(superuser)".green());
        } else {
            println!("  {}", user.name.bold());
        }
        for (code, acl) in &user.cluster_acl {
            let apps = if acl.apps.is_empty() {
                "(no apps)".to_string()
            } else {
                acl.apps.join(", ")
            };
            if acl.is_admin {
                println!("    {}: admin", code);
            } else {
                println!("    {}: {}", code, apps);
            }
        }
    }
    println!();

    Ok(())
}

async fn validate(config_path: Option<PathBuf>) -> Result<()> {
    println!("Validating configuration...");

    let config = ConsoleConfig::load_or_default(config_path)
        .context("Failed to load configuration")?;

    config
        .validate()
        .context("Configuration validation failed")?;

    println!("{}", "✓ Configuration is valid".green());

    Ok(())
}

async fn generate(output: PathBuf) -> Result<()> {
    ConsoleConfig::sample()
        .to_yaml_file(&output)
        .with_context(|| format!("Failed to write config to {:?}", output))?;

    println!(
        "{}",
        format!("✓ Configuration generated: {}", output.display()).green()
    );

    Ok(())
}
