// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! `parsebench run` command - Benchmark a message file once.

use std::fmt::Write as _;
use std::path::PathBuf;
use std::sync::Arc;

use parsebench_benchmark::{format_bytes, format_latency, format_ops};
use parsebench_core::{BenchmarkRunner, EngineError, HttpMessage, RunOutcome, TestConfig};

/// Options of a one-shot run.
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    pub file: PathBuf,
    pub message_type: Option<String>,
    pub iterations: i64,
    pub concurrency: i64,
    pub libraries: Vec<String>,
    pub no_memory: bool,
    pub json: bool,
}

pub async fn execute(
    runner: Arc<BenchmarkRunner>,
    opts: RunOptions,
) -> Result<(), Box<dyn std::error::Error>> {
    let raw = std::fs::read_to_string(&opts.file).map_err(|e| EngineError::Io {
        context: "reading message file",
        source: e,
    })?;

    let mut config = TestConfig {
        iterations: opts.iterations,
        concurrency: opts.concurrency,
        libraries: opts.libraries,
        duration: None,
        measure_memory: opts.no_memory.then_some(false),
    };
    // Resolve defaults up front so the log line shows what actually runs.
    runner
        .validator()
        .validate_config(&mut config)
        .map_err(EngineError::InvalidConfig)?;

    tracing::info!(
        file = %opts.file.display(),
        iterations = config.iterations,
        concurrency = config.concurrency,
        "Running benchmark"
    );

    let msg = HttpMessage::new(raw)
        .with_type(opts.message_type.unwrap_or_default())
        .with_config(config);
    let outcome = tokio::task::spawn_blocking(move || runner.run(msg)).await??;

    if opts.json {
        println!("{}", serde_json::to_string_pretty(&outcome)?);
    } else {
        print!("{}", render_table(&outcome));
    }

    Ok(())
}

/// Render results as a fixed-width table followed by the recommendation.
pub fn render_table(outcome: &RunOutcome) -> String {
    let mut out = String::new();

    let _ = writeln!(out, "Message type: {}", outcome.message_type);
    let _ = writeln!(out);
    let _ = writeln!(
        out,
        "  {:<12} {:>16} {:>12} {:>12} {:>10}  {}",
        "LIBRARY", "THROUGHPUT", "AVG/PARSE", "MEMORY", "ALLOCS/OP", "STATUS"
    );

    for result in &outcome.results {
        let marker = if result.winner { "★" } else { " " };
        if result.success {
            let _ = writeln!(
                out,
                "{} {:<12} {:>16} {:>12} {:>12} {:>10}  ok",
                marker,
                result.library,
                format_ops(result.ops_per_second),
                format_latency(result.avg_time_per_parse_ns),
                format_bytes(result.memory_allocated),
                result.allocs_per_op
            );
        } else {
            let _ = writeln!(
                out,
                "{} {:<12} {:>16} {:>12} {:>12} {:>10}  failed: {}",
                marker,
                result.library,
                "-",
                "-",
                "-",
                "-",
                result.error.as_deref().unwrap_or("unknown error")
            );
        }
    }

    let _ = writeln!(out);
    let _ = writeln!(out, "{}", outcome.recommendation);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use parsebench_core::{AdapterRegistry, BenchmarkResult, Orientation};
    use tempfile::TempDir;

    #[test]
    fn test_render_table() {
        let outcome = RunOutcome {
            results: vec![
                BenchmarkResult {
                    library: "httparse".to_string(),
                    ops_per_second: 2_500_000.0,
                    avg_time_per_parse_ns: 400,
                    success: true,
                    winner: true,
                    ..BenchmarkResult::default()
                },
                BenchmarkResult::failure("nope", "adapter 'nope' not found"),
            ],
            recommendation: "httparse completed successfully with 2500000 ops/sec".to_string(),
            message_type: Orientation::Request,
        };

        let table = render_table(&outcome);
        assert!(table.starts_with("Message type: request"));
        assert!(table.contains("★ httparse"));
        assert!(table.contains("2.50M ops/s"));
        assert!(table.contains("failed: adapter 'nope' not found"));
        assert!(table.trim_end().ends_with("2500000 ops/sec"));
    }

    #[tokio::test]
    async fn test_run_leaves_no_files_behind() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("request.http");
        std::fs::write(&file, "GET /x HTTP/1.1\r\nHost: a\r\n\r\n").unwrap();

        let runner = Arc::new(BenchmarkRunner::new(AdapterRegistry::new_shared()));
        let opts = RunOptions {
            file,
            iterations: 100,
            libraries: vec!["httparse".to_string()],
            json: true,
            ..RunOptions::default()
        };
        execute(runner, opts).await.unwrap();

        let entries = std::fs::read_dir(dir.path()).unwrap().count();
        assert_eq!(entries, 1);
    }

    #[tokio::test]
    async fn test_run_rejects_bad_config() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("request.http");
        std::fs::write(&file, "GET / HTTP/1.1\r\n\r\n").unwrap();

        let runner = Arc::new(BenchmarkRunner::new(AdapterRegistry::new_shared()));
        let opts = RunOptions {
            file,
            concurrency: 101,
            ..RunOptions::default()
        };
        let err = execute(runner, opts).await.unwrap_err();
        assert!(err.to_string().starts_with("config error"));
    }
}
