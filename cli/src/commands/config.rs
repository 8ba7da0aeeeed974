// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Configuration management commands
//!
//! Commands: show, validate, generate

use anyhow::{Context, Result};
use clap::Subcommand;
use colored::Colorize;
use std::path::{Path, PathBuf};

use berth_gateway_core::domain::gateway_config::{GatewayConfig, CONFIG_ENV_VAR, CONFIG_FILE_NAME};

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

    /// Generate a configuration file with default values
    Generate {
        /// Output path
        #[arg(short, long, default_value = CONFIG_FILE_NAME)]
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
        ConfigCommand::Generate { output } => generate(&output).await,
    }
}

async fn show(config_override: Option<PathBuf>, show_paths: bool) -> Result<()> {
    let (config, path) = GatewayConfig::load_or_default(config_override.clone())
        .context("Failed to load configuration")?;

    if show_paths {
        println!("{}", "Configuration discovery paths:".bold());
        if let Some(path) = &config_override {
            println!("  1. --config flag: {}", path.display());
        } else {
            println!("  1. --config flag: {}", "(not set)".dimmed());
        }
        println!(
            "  2. {}: {}",
            CONFIG_ENV_VAR,
            std::env::var(CONFIG_ENV_VAR)
                .unwrap_or_else(|_| "(not set)".to_string())
                .dimmed()
        );
        println!("  3. ./{}", CONFIG_FILE_NAME);
        println!("  4. ~/.berth/config.json");
        println!("  5. /etc/berth/config.json");
        println!();
    }

    println!("{} {}", "Current configuration:".bold(), path.display().to_string().dimmed());
    println!();

    println!("{}", "Server:".bold());
    println!("  Listen port: {}", config.listen_port);
    println!("  Static directory: {}", config.static_directory.display());
    println!(
        "  Engine socket: {} {}",
        config.engine_socket.display(),
        presence(&config.engine_socket)
    );
    println!();

    println!("{}", "Projects:".bold());
    println!(
        "  Directory: {} {}",
        config.projects_directory.display(),
        presence(&config.projects_directory)
    );
    println!(
        "  Compose binary: {} {}",
        config.compose_binary_path.display(),
        presence(&config.compose_binary_path)
    );
    println!();

    println!("{}", "Repository:".bold());
    match config.repository_url() {
        Some(url) => println!("  URL: {}", url),
        None => println!("  URL: {}", "(not configured)".dimmed()),
    }
    println!("  Skip TLS verification: {}", config.git_skip_tls_verify);
    match which::which("git") {
        Ok(git) => println!("  git: {}", git.display()),
        Err(_) => println!("  git: {}", "not found on PATH".yellow()),
    }
    println!();

    Ok(())
}

fn presence(path: &Path) -> colored::ColoredString {
    if path.exists() {
        "✓".green()
    } else {
        "(missing)".yellow()
    }
}

async fn validate(config_path: Option<PathBuf>) -> Result<()> {
    println!("Validating configuration...");

    let (config, _) = GatewayConfig::load_or_default(config_path)
        .context("Failed to load configuration")?;

    config
        .validate()
        .context("Configuration validation failed")?;

    println!("{}", "✓ Configuration is valid".green());

    Ok(())
}

async fn generate(output: &Path) -> Result<()> {
    let sample = serde_json::to_string_pretty(&GatewayConfig::default())
        .context("Failed to serialize default configuration")?;

    std::fs::write(output, sample + "\n")
        .with_context(|| format!("Failed to write config to {:?}", output))?;

    println!(
        "{}",
        format!("✓ Configuration generated: {}", output.display()).green()
    );

    Ok(())
}
