// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! Parsebench CLI
//!
//! Command-line interface and HTTP API for the HTTP parser benchmark engine.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use parsebench_core::{AdapterRegistry, Config, CountingAllocator};
use tracing_subscriber::EnvFilter;

mod commands;
mod metrics;
mod server;

/// Per-thread allocation counters feed the memory columns of every result.
#[global_allocator]
static GLOBAL: CountingAllocator = CountingAllocator;

/// Parsebench - Compare HTTP/1.x parser backends on your own messages
#[derive(Parser)]
#[command(name = "parsebench")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Configuration file path
    #[arg(short, long)]
    pub config: Option<String>,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the HTTP API
    Serve {
        /// Override the configured API port
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Benchmark a raw HTTP message stored in a file
    Run {
        /// Path to the message file
        file: PathBuf,

        /// Message type: request or response (detected when omitted)
        #[arg(short = 't', long = "type")]
        message_type: Option<String>,

        /// Parse iterations per library (0 = default)
        #[arg(short = 'n', long, default_value_t = 0)]
        iterations: i64,

        /// Worker threads per library (0 = default)
        #[arg(short = 'j', long, default_value_t = 0)]
        concurrency: i64,

        /// Library to benchmark, repeatable (default: configured set)
        #[arg(short = 'l', long = "lib")]
        libraries: Vec<String>,

        /// Skip allocation accounting
        #[arg(long)]
        no_memory: bool,

        /// Print the result as JSON
        #[arg(long)]
        json: bool,
    },

    /// List registered parser libraries
    Libraries,

    /// Validate a configuration file
    Validate {
        /// Path to the configuration file
        file: String,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Initialize logging; RUST_LOG wins over -v. Logs go to stderr so
    // `run --json` output stays clean.
    let log_level = if cli.verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let registry = AdapterRegistry::new_shared();

    // `validate` checks its own file argument and must not fail on `-c`.
    let config = match &cli.command {
        Commands::Validate { .. } => Config::default(),
        _ => commands::load_config(cli.config.as_deref(), &registry)?,
    };
    let runner = commands::build_runner(&config, registry);

    // Dispatch to command handlers
    match cli.command {
        Commands::Serve { port } => commands::serve::execute(&config, runner, port).await,
        Commands::Run {
            file,
            message_type,
            iterations,
            concurrency,
            libraries,
            no_memory,
            json,
        } => {
            let opts = commands::run::RunOptions {
                file,
                message_type,
                iterations,
                concurrency,
                libraries,
                no_memory,
                json,
            };
            commands::run::execute(runner, opts).await
        }
        Commands::Libraries => commands::libraries::execute(&runner).await,
        Commands::Validate { file } => commands::validate::execute(&file, runner.registry()).await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_run_command() {
        let cli = Cli::parse_from([
            "parsebench", "-v", "run", "req.http", "-n", "500", "-j", "4", "-l", "http", "-l",
            "httparse", "--no-memory",
        ]);
        assert!(cli.verbose);
        match cli.command {
            Commands::Run {
                iterations,
                concurrency,
                libraries,
                no_memory,
                json,
                ..
            } => {
                assert_eq!(iterations, 500);
                assert_eq!(concurrency, 4);
                assert_eq!(libraries, vec!["http", "httparse"]);
                assert!(no_memory);
                assert!(!json);
            }
            _ => panic!("expected run command"),
        }
    }

    #[test]
    fn test_run_has_no_report_output() {
        assert!(Cli::try_parse_from(["parsebench", "run", "req.http", "--output", "reports"]).is_err());
        assert!(Cli::try_parse_from(["parsebench", "run", "req.http", "-o", "reports"]).is_err());
    }

    #[test]
    fn test_parse_serve_with_config() {
        let cli = Cli::parse_from(["parsebench", "-c", "bench.yaml", "serve", "--port", "9000"]);
        assert_eq!(cli.config.as_deref(), Some("bench.yaml"));
        assert!(matches!(cli.command, Commands::Serve { port: Some(9000) }));
    }

    #[test]
    fn test_cli_definition() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
