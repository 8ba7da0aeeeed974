// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! # Berth
//!
//! The `berth` binary runs the container control gateway: a small HTTP
//! server in front of the local container engine socket and the compose
//! tool.
//!
//! ## Commands
//!
//! - `berth serve` - Run the gateway HTTP server
//! - `berth config show|validate|generate` - Configuration management

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use std::path::PathBuf;

use berth_cli::commands::{self, ConfigCommand, ServeOptions};

/// Berth - HTTP control surface for a single container host
#[derive(Parser)]
#[command(name = "berth")]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Path to configuration file (overrides discovery)
    #[arg(
        short,
        long,
        global = true,
        env = "BERTH_CONFIG_PATH",
        value_name = "FILE"
    )]
    config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, global = true, env = "BERTH_LOG_LEVEL", default_value = "info")]
    log_level: String,

    /// Container engine socket (overrides engineSocket from the config file)
    #[arg(long, global = true, env = "BERTH_ENGINE_SOCKET", value_name = "PATH")]
    engine_socket: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the gateway HTTP server
    #[command(name = "serve")]
    Serve {
        /// Quick command definitions (JSON array)
        #[arg(long, default_value = "./quick-commands.json", value_name = "FILE")]
        quick_commands: PathBuf,

        /// Expose Prometheus metrics on this port
        #[arg(long, env = "BERTH_METRICS_PORT")]
        metrics_port: Option<u16>,
    },

    /// Configuration management
    #[command(name = "config")]
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(&cli.log_level)?;

    match cli.command {
        Some(Commands::Serve {
            quick_commands,
            metrics_port,
        }) => {
            commands::serve::run(ServeOptions {
                config_path: cli.config,
                engine_socket: cli.engine_socket,
                quick_commands,
                metrics_port,
            })
            .await
        }
        Some(Commands::Config { command }) => {
            commands::config::handle_command(command, cli.config).await
        }
        None => {
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
