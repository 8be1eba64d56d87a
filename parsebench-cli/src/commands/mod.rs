// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! CLI command modules.

use std::sync::Arc;

use parsebench_core::{AdapterRegistry, BenchmarkRunner, Config, ConfigLoader, EngineResult};

pub mod libraries;
pub mod run;
pub mod serve;
pub mod validate;

/// Load the configuration named by `-c`, or the built-in defaults.
pub fn load_config(path: Option<&str>, registry: &AdapterRegistry) -> EngineResult<Config> {
    match path {
        Some(path) => {
            let config = ConfigLoader::load_file(path, registry)?;
            tracing::debug!(config = %path, "Configuration loaded");
            Ok(config)
        }
        None => Ok(Config::default()),
    }
}

/// Build the shared runner for a validated configuration.
pub fn build_runner(config: &Config, registry: Arc<AdapterRegistry>) -> Arc<BenchmarkRunner> {
    let defaults = config.engine.resolve_defaults(&registry);
    Arc::new(BenchmarkRunner::with_default_libraries(registry, defaults))
}
