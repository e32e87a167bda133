// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! `vigil serve`: runs the interaction and dashboard API.

use anyhow::{Context, Result};
use clap::Args;
use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;
use std::path::PathBuf;
use tokio::net::TcpListener;
use tokio::signal;
use tracing::{info, warn};

use phish_vigil_core::domain::repository::StorageBackend;
use phish_vigil_core::presentation::api::app;

use crate::banner::print_banner;
use crate::runtime::VigilRuntime;

#[derive(Args)]
pub struct ServeCommand {
    /// Override spec.server.bind_address
    #[arg(long, env = "VIGIL_HOST")]
    host: Option<String>,

    /// Override spec.server.port
    #[arg(long, env = "VIGIL_PORT")]
    port: Option<u16>,
}

pub async fn execute(cmd: ServeCommand, config_path: Option<PathBuf>) -> Result<()> {
    let runtime = VigilRuntime::load(config_path).await?;

    let server = &runtime.config.spec.server;
    let addr = format!(
        "{}:{}",
        cmd.host.as_deref().unwrap_or(&server.bind_address),
        cmd.port.unwrap_or(server.port)
    );
    let backend = match &runtime.backend {
        StorageBackend::InMemory => "in-memory",
        StorageBackend::PostgreSQL(_) => "postgres",
    };
    print_banner(&addr, backend);

    if runtime
        .provisioning_service()
        .ensure_bootstrap_admin()
        .await
        .context("Failed to seed bootstrap administrator")?
    {
        println!("[+] Database Initialized.\n");
    }

    if let Some(metrics) = runtime.config.metrics() {
        let metrics_addr: SocketAddr = ([0, 0, 0, 0], metrics.port).into();
        match PrometheusBuilder::new().with_http_listener(metrics_addr).install() {
            Ok(()) => info!("Prometheus exporter listening on {}", metrics_addr),
            Err(e) => warn!("Failed to install Prometheus exporter: {}", e),
        }
    }

    let router = app(runtime.interaction_service(), runtime.dashboard_service());

    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    info!("Phish-Vigil API listening on {}", addr);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server failed")?;

    info!("Phish-Vigil API shutting down");

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!("Failed to install Ctrl+C handler: {}", e);
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
                warn!("Failed to install SIGTERM handler: {}", e);
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
