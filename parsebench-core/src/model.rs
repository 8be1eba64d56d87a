// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! Data contracts threaded between the validator, adapters and runner.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::alloc::AllocDelta;
use crate::types::Orientation;

/// Run parameters. Zero / empty fields are filled in by validation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TestConfig {
    /// Parse iterations per library (0 = default).
    pub iterations: i64,
    /// Worker count per library (0 = default).
    pub concurrency: i64,
    /// Libraries to benchmark, in result order (empty = default set).
    pub libraries: Vec<String>,
    /// Wall-clock cap. Bounded at validation, not enforced while running.
    pub duration: Option<Duration>,
    /// Report allocator metrics. `None` means yes.
    pub measure_memory: Option<bool>,
}

impl TestConfig {
    /// Whether memory metrics should be reported.
    pub fn measures_memory(&self) -> bool {
        self.measure_memory.unwrap_or(true)
    }
}

/// The benchmark subject: one raw HTTP request or response.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HttpMessage {
    /// Text form of the message.
    pub raw: String,
    /// "request", "response", or empty for auto-detection.
    #[serde(default)]
    pub message_type: String,
    #[serde(default)]
    pub test_config: TestConfig,
}

impl HttpMessage {
    /// Build a message with an unset orientation and default config.
    pub fn new(raw: impl Into<String>) -> Self {
        Self {
            raw: raw.into(),
            ..Self::default()
        }
    }

    /// Set the orientation tag.
    pub fn with_type(mut self, message_type: impl Into<String>) -> Self {
        self.message_type = message_type.into();
        self
    }

    /// Replace the run configuration.
    pub fn with_config(mut self, config: TestConfig) -> Self {
        self.test_config = config;
        self
    }
}

/// Outcome of benchmarking one library against one message.
///
/// When `success` is false every metric is zero and `error` is set.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BenchmarkResult {
    pub library: String,
    /// Parse iterations actually executed.
    pub iterations: u64,
    pub total_time_ns: u64,
    pub avg_time_per_parse_ns: u64,
    pub ops_per_second: f64,
    /// Bytes allocated across the timed loop.
    pub memory_allocated: u64,
    pub allocs_per_op: u64,
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default)]
    pub winner: bool,
}

impl BenchmarkResult {
    /// A failed result carrying only the library name and the error text.
    pub fn failure(library: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            library: library.into(),
            success: false,
            error: Some(error.into()),
            ..Self::default()
        }
    }

    /// A successful result computed from one timed loop.
    pub fn measured(
        library: impl Into<String>,
        iterations: u64,
        elapsed: Duration,
        allocs: AllocDelta,
    ) -> Self {
        let total_time_ns = elapsed.as_nanos() as u64;
        let (avg_time_per_parse_ns, ops_per_second, allocs_per_op) = if iterations == 0 {
            (0, 0.0, 0)
        } else {
            // A loop faster than the clock resolution still counts as 1ns.
            let secs = elapsed.as_secs_f64().max(1e-9);
            (
                total_time_ns / iterations,
                iterations as f64 / secs,
                allocs.count / iterations,
            )
        };

        Self {
            library: library.into(),
            iterations,
            total_time_ns,
            avg_time_per_parse_ns,
            ops_per_second,
            memory_allocated: allocs.bytes,
            allocs_per_op,
            success: true,
            error: None,
            winner: false,
        }
    }

    /// Total elapsed time.
    pub fn total_time(&self) -> Duration {
        Duration::from_nanos(self.total_time_ns)
    }

    /// Average time per parse.
    pub fn avg_time_per_parse(&self) -> Duration {
        Duration::from_nanos(self.avg_time_per_parse_ns)
    }

    /// Drop allocator metrics from the result.
    pub fn without_memory(mut self) -> Self {
        self.memory_allocated = 0;
        self.allocs_per_op = 0;
        self
    }
}

/// Engine output for one run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunOutcome {
    /// One entry per requested library, in request order.
    pub results: Vec<BenchmarkResult>,
    pub recommendation: String,
    pub message_type: Orientation,
}

impl RunOutcome {
    /// The result marked as winner, if any.
    pub fn winner(&self) -> Option<&BenchmarkResult> {
        self.results.iter().find(|r| r.winner)
    }
}
