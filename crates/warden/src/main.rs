// SPDX-FileCopyrightText: 2026 Warden Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Warden - outbound HTTP egress guard.
//!
//! Binary entry point: runs single guarded requests, checks destinations
//! against the classifier, and prints the effective configuration.

#[cfg(not(target_env = "msvc"))]
use tikv_jemallocator::Jemalloc;

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: Jemalloc = Jemalloc;

mod check;
mod request;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing::debug;
use warden_config::WardenConfig;

/// Warden - outbound HTTP egress guard.
#[derive(Parser, Debug)]
#[command(name = "warden", version, about, long_about = None)]
struct Cli {
    /// Read configuration from this file instead of the standard locations.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Perform one guarded HTTP request and print the tool output.
    Request(request::RequestArgs),
    /// Classify a destination host without contacting it.
    Check {
        /// Hostname or IPv4 address.
        host: String,
    },
    /// Print the effective configuration as TOML.
    Config,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let loaded = match &cli.config {
        Some(path) => warden_config::load_and_validate_path(path),
        None => warden_config::load_and_validate(),
    };
    let config = match loaded {
        Ok(config) => config,
        Err(errors) => {
            warden_config::render_errors(&errors);
            std::process::exit(1);
        }
    };

    init_tracing(&config.logging.level);
    debug!(
        path = ?cli.config,
        proxy = config.proxy.enabled,
        "configuration loaded"
    );

    let code = match cli.command {
        Commands::Request(args) => request::run(&config, args).await,
        Commands::Check { host } => check::run(&config, &host).await,
        Commands::Config => print_config(&config),
    };
    std::process::exit(code);
}

fn print_config(config: &WardenConfig) -> i32 {
    match toml::to_string_pretty(config) {
        Ok(text) => {
            print!("{text}");
            0
        }
        Err(e) => {
            eprintln!("warden: failed to render configuration: {e}");
            1
        }
    }
}

/// Initialize the tracing subscriber. `RUST_LOG` takes precedence over the
/// configured level.
fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("warden={log_level},warn")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_names(false)
        .with_writer(std::io::stderr)
        .init();
}
