// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! Parsebench benchmark support
//!
//! Formatting helpers shared by the CLI output. Criterion micro-benchmarks
//! for the built-in parsers live in `benches/`.

pub mod format;

pub use format::{format_bytes, format_latency, format_ops};
