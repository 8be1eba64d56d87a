// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! Parser adapters.
//!
//! An adapter wraps one HTTP parsing backend behind a uniform capability:
//! identity, a single parse, and a self-contained timed benchmark. Each
//! adapter is bound to an orientation at construction.

mod fast;
mod reference;

use std::hint::black_box;
use std::time::Instant;

pub use fast::HttparseAdapter;
pub use reference::HttpAdapter;

use crate::alloc::AllocSnapshot;
use crate::error::AdapterError;
use crate::model::BenchmarkResult;
use crate::types::Orientation;

/// Most headers any built-in backend accepts in one message head.
pub const MAX_HEADERS: usize = 64;

/// Capability interface implemented by every parser backend.
///
/// `parse` takes `&mut self` so a backend may keep scratch state between
/// calls; instances are therefore never shared between workers.
pub trait ParserAdapter: Send {
    /// Stable library name, used as result key and registry lookup key.
    fn name(&self) -> &str;

    /// Orientation this instance was constructed for.
    fn orientation(&self) -> Orientation;

    /// Parse `raw` once. The parsed value is discarded.
    fn parse(&mut self, raw: &[u8]) -> Result<(), AdapterError>;

    /// Run `parse` `iterations` times on the calling thread.
    ///
    /// Stops at the first parse failure and reports it without metrics.
    fn benchmark(&mut self, raw: &[u8], iterations: u64) -> BenchmarkResult {
        timed_parse_loop(self, raw, iterations)
    }
}

/// Timed tight loop shared by all adapters.
///
/// Allocator counters are sampled immediately around the loop. Rust has no
/// collector, so there is no baseline collection pass before sampling.
pub fn timed_parse_loop<A>(adapter: &mut A, raw: &[u8], iterations: u64) -> BenchmarkResult
where
    A: ParserAdapter + ?Sized,
{
    let before = AllocSnapshot::take();
    let start = Instant::now();

    for _ in 0..iterations {
        if let Err(e) = adapter.parse(black_box(raw)) {
            tracing::debug!(library = adapter.name(), error = %e, "Parse failed, aborting loop");
            return BenchmarkResult::failure(adapter.name(), e.to_string());
        }
    }

    let elapsed = start.elapsed();
    let allocs = AllocSnapshot::take().since(before);

    BenchmarkResult::measured(adapter.name(), iterations, elapsed, allocs)
}

fn version_from(minor: Option<u8>) -> Result<http::Version, AdapterError> {
    match minor {
        Some(0) => Ok(http::Version::HTTP_10),
        Some(1) => Ok(http::Version::HTTP_11),
        Some(v) => Err(AdapterError::parse(format!("unsupported HTTP/1.{}", v))),
        None => Err(AdapterError::parse("missing HTTP version")),
    }
}

fn head_error(e: httparse::Error) -> AdapterError {
    AdapterError::parse(format!("malformed message head: {}", e))
}
