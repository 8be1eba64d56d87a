// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! `parsebench libraries` command - List registered parser backends.

use parsebench_core::BenchmarkRunner;

pub async fn execute(runner: &BenchmarkRunner) -> Result<(), Box<dyn std::error::Error>> {
    let defaults = runner.validator().default_libraries();

    println!("Registered parsers:");
    for name in runner.registry().available() {
        let tag = if defaults.contains(&name) { " (default)" } else { "" };
        println!("  - {}{}", name, tag);
    }
    for (alias, target) in runner.registry().aliases() {
        println!("  - {} (alias of {})", alias, target);
    }
    println!();
    println!("Total: {} parser(s)", runner.registry().len());

    Ok(())
}
