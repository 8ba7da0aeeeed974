// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Gateway HTTP server
//!
//! Loads configuration and quick commands, wires the gateway around the
//! engine socket and the local process runner, and serves the HTTP API until
//! Ctrl+C or SIGTERM.

use anyhow::{Context, Result};
use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::signal;
use tracing::{error, info, warn};

use berth_gateway_core::{
    application::Gateway,
    domain::{gateway_config::GatewayConfig, quick_command::QuickCommandCatalog},
    infrastructure::{ConfigStore, TokioCommandRunner, UnixSocketTransport},
    presentation::api,
};

pub struct ServeOptions {
    pub config_path: Option<PathBuf>,
    pub engine_socket: Option<PathBuf>,
    pub quick_commands: PathBuf,
    pub metrics_port: Option<u16>,
}

pub async fn run(options: ServeOptions) -> Result<()> {
    let (mut config, persist_path) = GatewayConfig::load_or_default(options.config_path)
        .context("Failed to load configuration")?;

    if let Some(socket) = options.engine_socket {
        info!("Engine socket overridden on command line: {:?}", socket);
        config.engine_socket = socket;
    }

    config
        .validate()
        .context("Configuration validation failed")?;

    if config.repository_url().is_none() {
        warn!("No gitRepositoryURL configured; project sync is disabled");
    }

    let quick_commands = QuickCommandCatalog::load(&options.quick_commands)
        .context("Failed to load quick commands")?;

    if let Some(port) = options.metrics_port {
        let addr = SocketAddr::from(([0, 0, 0, 0], port));
        PrometheusBuilder::new()
            .with_http_listener(addr)
            .install()
            .context("Failed to start Prometheus exporter")?;
        info!("Metrics exporter listening on {}", addr);
    }

    let listen_port = config.listen_port;
    let static_dir = config.static_directory.clone();
    let transport = Arc::new(UnixSocketTransport::new(&config.engine_socket));
    let projects_dir = config.projects_directory.clone();
    let store = Arc::new(ConfigStore::new(config, Some(persist_path)));
    info!(
        engine_socket = ?transport.socket_path(),
        projects_dir = ?projects_dir,
        "Configuration loaded from {:?}",
        store.persist_path()
    );

    let gateway = Arc::new(Gateway::new(
        store,
        transport,
        Arc::new(TokioCommandRunner::new()),
        quick_commands,
    ));

    let static_dir = if static_dir.is_dir() {
        Some(static_dir)
    } else {
        warn!("Static directory {:?} not found; browser client is not served", static_dir);
        None
    };
    let app = api::app(gateway, static_dir);

    let addr = SocketAddr::from(([0, 0, 0, 0], listen_port));
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    info!("Gateway listening on {}", addr);

    axum::serve(listener, app.into_make_service_with_connect_info::<SocketAddr>())
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server failed")?;

    info!("Gateway shutting down");

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C signal");
        },
        _ = terminate => {
            info!("Received SIGTERM signal");
        },
    }
}
