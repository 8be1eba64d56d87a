// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! Prometheus metrics for benchmark runs, served on a separate port.

use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

use axum::{routing::get, Router};
use lazy_static::lazy_static;
use parsebench_core::{AdapterRegistry, RunOutcome};
use prometheus::{register_histogram, register_int_counter_vec, Histogram, IntCounterVec};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

lazy_static! {
    pub static ref RUNS_TOTAL: IntCounterVec = register_int_counter_vec!(
        "parsebench_runs_total",
        "Benchmark runs by outcome",
        &["outcome"]
    )
    .expect("runs_total metric registers once");
    pub static ref RUN_DURATION: Histogram = register_histogram!(
        "parsebench_run_duration_seconds",
        "Wall time of completed benchmark runs",
        vec![0.001, 0.005, 0.010, 0.050, 0.100, 0.500, 1.0, 5.0, 30.0]
    )
    .expect("run_duration metric registers once");
    pub static ref LIBRARY_RESULTS: IntCounterVec = register_int_counter_vec!(
        "parsebench_library_results_total",
        "Per-library benchmark results by status",
        &["library", "status"]
    )
    .expect("library_results metric registers once");
    pub static ref LIBRARY_WINS: IntCounterVec = register_int_counter_vec!(
        "parsebench_library_wins_total",
        "Runs won by each library",
        &["library"]
    )
    .expect("library_wins metric registers once");
}

/// Label value for unregistered library names.
pub const UNKNOWN_LIBRARY: &str = "unknown";

/// Library names are caller input; only registered ones become label values.
fn library_label<'a>(name: &'a str, registry: &AdapterRegistry) -> &'a str {
    if registry.contains(name) {
        name
    } else {
        UNKNOWN_LIBRARY
    }
}

/// Record a completed run.
pub fn record_outcome(outcome: &RunOutcome, elapsed: Duration, registry: &AdapterRegistry) {
    RUNS_TOTAL.with_label_values(&["completed"]).inc();
    RUN_DURATION.observe(elapsed.as_secs_f64());

    for result in &outcome.results {
        let library = library_label(&result.library, registry);
        let status = if result.success { "success" } else { "failure" };
        LIBRARY_RESULTS.with_label_values(&[library, status]).inc();
        if result.winner {
            LIBRARY_WINS.with_label_values(&[library]).inc();
        }
    }
}

/// Record a run rejected at validation.
pub fn record_rejection() {
    RUNS_TOTAL.with_label_values(&["rejected"]).inc();
}

/// Start the metrics server in a background task.
pub fn start_metrics_server(bind_address: IpAddr, port: u16) -> JoinHandle<()> {
    // Force initialization of metrics
    lazy_static::initialize(&RUNS_TOTAL);
    lazy_static::initialize(&RUN_DURATION);
    lazy_static::initialize(&LIBRARY_RESULTS);
    lazy_static::initialize(&LIBRARY_WINS);

    tokio::spawn(async move {
        let addr = SocketAddr::new(bind_address, port);
        let app = Router::new().route("/metrics", get(|| async { metrics_handler() }));

        match TcpListener::bind(addr).await {
            Ok(listener) => {
                tracing::info!("Metrics server starting on http://{}/metrics", addr);
                if let Err(e) = axum::serve(listener, app).await {
                    tracing::error!("Metrics server stopped: {}", e);
                }
            }
            Err(e) => {
                tracing::error!("Failed to bind metrics server: {}", e);
            }
        }
    })
}

fn metrics_handler() -> String {
    use prometheus::Encoder;
    let encoder = prometheus::TextEncoder::new();

    let mut buffer = Vec::new();
    if let Err(e) = encoder.encode(&prometheus::gather(), &mut buffer) {
        tracing::error!("Failed to encode metrics: {}", e);
    }

    String::from_utf8(buffer).unwrap_or_else(|_| String::from("Encoding error"))
}
