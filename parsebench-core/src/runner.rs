// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! Benchmark runner.
//!
//! Validates a message, benchmarks every requested library in request
//! order (directly, or fanned out over scoped worker threads), aggregates
//! worker results, marks the winner and writes the recommendation.

use std::sync::Arc;
use std::thread;

use crate::adapter::ParserAdapter;
use crate::error::{EngineError, EngineResult};
use crate::model::{BenchmarkResult, HttpMessage, RunOutcome, TestConfig};
use crate::registry::AdapterRegistry;
use crate::state::{RunPhase, RunStateMachine};
use crate::types::Orientation;
use crate::validator::Validator;

/// Executes benchmarks across multiple parser backends.
#[derive(Debug, Clone)]
pub struct BenchmarkRunner {
    registry: Arc<AdapterRegistry>,
    validator: Validator,
}

impl BenchmarkRunner {
    /// Create a runner whose default library set is every registered backend.
    pub fn new(registry: Arc<AdapterRegistry>) -> Self {
        let defaults = registry.available();
        Self::with_default_libraries(registry, defaults)
    }

    /// Create a runner with an explicit default library set.
    pub fn with_default_libraries(registry: Arc<AdapterRegistry>, defaults: Vec<String>) -> Self {
        Self {
            registry,
            validator: Validator::new(defaults),
        }
    }

    /// The registry adapters are resolved from.
    pub fn registry(&self) -> &AdapterRegistry {
        &self.registry
    }

    /// The validator applied to every run.
    pub fn validator(&self) -> &Validator {
        &self.validator
    }

    /// Run a full benchmark for `msg`.
    ///
    /// Input errors reject the whole run. Unknown libraries and parse
    /// failures are reported inside the affected library's result.
    pub fn run(&self, mut msg: HttpMessage) -> EngineResult<RunOutcome> {
        let mut sm = RunStateMachine::new();

        let orientation = match self.validator.validate_message(&mut msg) {
            Ok(orientation) => orientation,
            Err(e) => {
                sm.transition_to(RunPhase::Failed)?;
                tracing::warn!(error = %e, "Rejected benchmark message");
                return Err(EngineError::InvalidMessage(e));
            }
        };

        if let Err(e) = self.validator.validate_config(&mut msg.test_config) {
            sm.transition_to(RunPhase::Failed)?;
            tracing::warn!(error = %e, "Rejected benchmark config");
            return Err(EngineError::InvalidConfig(e));
        }
        sm.transition_to(RunPhase::Validated)?;

        let config = &msg.test_config;
        if let Some(duration) = config.duration {
            tracing::debug!(?duration, "Duration cap is validated but not enforced");
        }

        sm.transition_to(RunPhase::Executing)?;
        let raw = msg.raw.as_bytes();
        let mut results = Vec::with_capacity(config.libraries.len());
        for name in &config.libraries {
            let result = self.run_library(name, orientation, raw, config);
            if !result.success {
                tracing::warn!(
                    library = %name,
                    error = result.error.as_deref().unwrap_or_default(),
                    "Library benchmark failed"
                );
            }
            results.push(if config.measures_memory() {
                result
            } else {
                result.without_memory()
            });
        }
        sm.transition_to(RunPhase::Aggregated)?;

        mark_winner(&mut results);
        sm.transition_to(RunPhase::Ranked)?;

        let recommendation = recommendation(&results);
        sm.transition_to(RunPhase::Done)?;

        tracing::info!(
            message_type = %orientation,
            libraries = results.len(),
            iterations = config.iterations,
            concurrency = config.concurrency,
            elapsed_ms = sm.elapsed().as_millis() as u64,
            recommendation = %recommendation,
            "Benchmark run complete"
        );

        Ok(RunOutcome {
            results,
            recommendation,
            message_type: orientation,
        })
    }

    fn run_library(
        &self,
        name: &str,
        orientation: Orientation,
        raw: &[u8],
        config: &TestConfig,
    ) -> BenchmarkResult {
        // Bounds were checked by the validator.
        let iterations = config.iterations as u64;
        let workers = config.concurrency as usize;

        tracing::debug!(library = %name, iterations, workers, "Benchmarking library");

        if workers > 1 {
            return self.run_concurrent(name, orientation, raw, iterations, workers);
        }

        match self.registry.get(name, orientation) {
            Ok(mut adapter) => adapter.benchmark(raw, iterations),
            Err(e) => BenchmarkResult::failure(name, e.to_string()),
        }
    }

    /// Fan out over `workers` threads, each with its own adapter instance and
    /// `iterations / workers` parses. The remainder is not executed.
    fn run_concurrent(
        &self,
        name: &str,
        orientation: Orientation,
        raw: &[u8],
        iterations: u64,
        workers: usize,
    ) -> BenchmarkResult {
        let adapters = match (0..workers)
            .map(|_| self.registry.get(name, orientation))
            .collect::<Result<Vec<Box<dyn ParserAdapter>>, _>>()
        {
            Ok(adapters) => adapters,
            Err(e) => return BenchmarkResult::failure(name, e.to_string()),
        };
        let library = adapters
            .first()
            .map(|a| a.name().to_string())
            .unwrap_or_else(|| name.to_string());
        let per_worker = iterations / workers as u64;

        let worker_results: Vec<BenchmarkResult> = thread::scope(|scope| {
            let handles: Vec<_> = adapters
                .into_iter()
                .map(|mut adapter| scope.spawn(move || adapter.benchmark(raw, per_worker)))
                .collect();

            handles
                .into_iter()
                .map(|handle| {
                    handle
                        .join()
                        .unwrap_or_else(|_| BenchmarkResult::failure(&library, "worker panicked"))
                })
                .collect()
        });

        aggregate_results(&library, &worker_results)
    }
}

/// Combine per-worker results for one library.
///
/// Any failed worker fails the aggregate with the first failure's error.
/// Throughput, memory and allocations are per-worker means; total time is
/// the sum of worker times and average time is that sum over the worker count.
pub fn aggregate_results(library: &str, results: &[BenchmarkResult]) -> BenchmarkResult {
    if let Some(failed) = results.iter().find(|r| !r.success) {
        return BenchmarkResult::failure(library, failed.error.clone().unwrap_or_default());
    }

    let mut aggregate = BenchmarkResult {
        library: library.to_string(),
        success: true,
        ..BenchmarkResult::default()
    };

    let count = results.len() as u64;
    if count == 0 {
        return aggregate;
    }

    let mut total_ops = 0.0;
    let mut total_memory = 0u64;
    let mut total_allocs = 0u64;
    for result in results {
        aggregate.iterations += result.iterations;
        aggregate.total_time_ns += result.total_time_ns;
        total_ops += result.ops_per_second;
        total_memory += result.memory_allocated;
        total_allocs += result.allocs_per_op;
    }

    aggregate.ops_per_second = total_ops / count as f64;
    aggregate.memory_allocated = total_memory / count;
    aggregate.allocs_per_op = total_allocs / count;
    aggregate.avg_time_per_parse_ns = aggregate.total_time_ns / count;
    aggregate
}

/// Mark the successful result with strictly the highest throughput.
///
/// Ties go to the earliest result. A zero throughput never wins.
pub fn mark_winner(results: &mut [BenchmarkResult]) -> Option<usize> {
    let mut max_ops = 0.0;
    let mut winner = None;

    for (i, result) in results.iter().enumerate() {
        if result.success && result.ops_per_second > max_ops {
            max_ops = result.ops_per_second;
            winner = Some(i);
        }
    }

    if let Some(i) = winner {
        results[i].winner = true;
    }
    winner
}

/// Human-readable comparison of ranked results.
pub fn recommendation(results: &[BenchmarkResult]) -> String {
    if results.is_empty() {
        return "No results available".to_string();
    }

    let mut winner: Option<&BenchmarkResult> = None;
    let mut runner_up: Option<&BenchmarkResult> = None;
    for result in results.iter().filter(|r| r.success) {
        if result.winner {
            winner = Some(result);
        } else if runner_up.map_or(true, |best| result.ops_per_second > best.ops_per_second) {
            runner_up = Some(result);
        }
    }

    let Some(winner) = winner else {
        if runner_up.is_some() {
            return "No parser recorded measurable throughput".to_string();
        }
        return "All parsers failed".to_string();
    };

    match runner_up.filter(|r| r.ops_per_second > 0.0) {
        Some(runner_up) if results.len() > 1 => format!(
            "{} is {:.2}x faster than {} ({:.0} vs {:.0} ops/sec)",
            winner.library,
            winner.ops_per_second / runner_up.ops_per_second,
            runner_up.library,
            winner.ops_per_second,
            runner_up.ops_per_second
        ),
        _ => format!(
            "{} completed successfully with {:.0} ops/sec",
            winner.library, winner.ops_per_second
        ),
    }
}
