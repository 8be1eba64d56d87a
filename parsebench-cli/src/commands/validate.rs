// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! `parsebench validate` command - Validate configuration file.

use parsebench_core::{AdapterRegistry, ConfigLoader};

pub async fn execute(file: &str, registry: &AdapterRegistry) -> Result<(), Box<dyn std::error::Error>> {
    tracing::info!(file = %file, "Validating configuration");

    match ConfigLoader::load_file(file, registry) {
        Ok(config) => {
            println!("✓ Configuration is valid");
            println!();
            println!("Server Settings:");
            println!("  Bind Address:       {}", config.server.bind_address);
            println!("  Port:               {}", config.server.port);
            match config.server.metrics_port {
                Some(port) => println!("  Metrics Port:       {}", port),
                None => println!("  Metrics Port:       disabled"),
            }
            println!();
            let defaults = config.engine.resolve_defaults(registry);
            println!("Default Libraries ({}):", defaults.len());
            for name in &defaults {
                println!("  - {}", name);
            }
            Ok(())
        }
        Err(e) => {
            eprintln!("✗ Configuration validation failed:");
            eprintln!("  {}", e);
            std::process::exit(1);
        }
    }
}
