// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! `parsebench serve` command - Start the HTTP API.

use std::net::SocketAddr;
use std::sync::Arc;

use parsebench_core::{BenchmarkRunner, Config};

use crate::{metrics, server};

pub async fn execute(
    config: &Config,
    runner: Arc<BenchmarkRunner>,
    port: Option<u16>,
) -> Result<(), Box<dyn std::error::Error>> {
    let port = port.unwrap_or(config.server.port);
    let addr = SocketAddr::new(config.server.bind_address, port);

    tracing::info!(
        addr = %addr,
        default_libraries = ?runner.validator().default_libraries(),
        "Starting benchmark API"
    );

    if let Some(metrics_port) = config.server.metrics_port {
        if metrics_port == port {
            tracing::warn!(port, "Metrics port collides with API port, metrics disabled");
        } else {
            metrics::start_metrics_server(config.server.bind_address, metrics_port);
        }
    }

    println!("parsebench API listening on http://{}", addr);
    println!("  POST /api/benchmark");
    println!("  GET  /api/libraries");
    println!("  GET  /health");
    println!();
    println!("Press Ctrl+C to stop");

    tokio::select! {
        result = server::serve(addr, runner) => {
            result.map_err(|e| e as Box<dyn std::error::Error>)?;
        }
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("Received Ctrl+C, shutting down");
        }
    }

    Ok(())
}
