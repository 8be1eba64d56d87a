//! Parsebench Core Library
//!
//! Benchmark engine for HTTP message parsers: message and config validation,
//! a registry of pluggable parser adapters, single- and multi-worker timed
//! parse loops, cross-worker aggregation and winner selection.

pub mod adapter;
pub mod alloc;
pub mod config;
pub mod error;
pub mod model;
pub mod registry;
pub mod runner;
pub mod state;
pub mod types;
pub mod validator;

// Re-export commonly used types
pub use adapter::{HttpAdapter, HttparseAdapter, ParserAdapter};
pub use alloc::CountingAllocator;
pub use config::{Config, ConfigLoader, EngineConfig, ServerConfig};
pub use error::{AdapterError, EngineError, EngineResult, ValidationError};
pub use model::{BenchmarkResult, HttpMessage, RunOutcome, TestConfig};
pub use registry::AdapterRegistry;
pub use runner::BenchmarkRunner;
pub use state::{RunPhase, RunStateMachine};
pub use types::Orientation;
pub use validator::Validator;
