//! # Protolab - Prototype Readiness Tracker
//!
//! The main binary for Protolab.
//!
//! This application provides:
//! - HTTP REST API server (axum-based)
//! - CLI interface for prototypes and test cases
//!
//! ## Architecture
//!
//! ```text
//! ┌───────────────────────────────────────────────────┐
//! │              apps/protolab (THE BINARY)           │
//! │                                                   │
//! │   ┌─────────────┐            ┌─────────────┐      │
//! │   │    CLI      │            │  HTTP API   │      │
//! │   │   (clap)    │            │   (axum)    │      │
//! │   └──────┬──────┘            └──────┬──────┘      │
//! │          └────────────┬─────────────┘             │
//! │                       ▼                           │
//! │               ┌───────────────┐                   │
//! │               │ protolab-core │                   │
//! │               │  (THE LOGIC)  │                   │
//! │               └───────────────┘                   │
//! └───────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```bash
//! # Start the HTTP server with demo data
//! protolab server --host 0.0.0.0 --port 8080 --seed
//!
//! # CLI operations
//! protolab status
//! protolab create -n "Thermal Rig" -a Space -o "Lab B" -t 2026-12-01
//! protolab advance 01J...
//! ```

use clap::Parser;
use protolab::cli;
use protolab::config::{FileConfig, LogFormat};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

// =============================================================================
// APPLICATION ENTRY POINT
// =============================================================================

#[tokio::main]
async fn main() {
    // Parse CLI arguments
    let cli = cli::Cli::parse();

    let file = match FileConfig::from_file(&cli.config) {
        Ok(file) => file,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };

    // Initialize tracing: PROTOLAB_LOG_FORMAT=json enables machine-parseable output.
    let default_filter = if cli.verbose {
        "protolab=debug,tower_http=debug"
    } else {
        "protolab=info,tower_http=debug"
    };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| default_filter.into());

    match LogFormat::resolve(&file.log) {
        LogFormat::Json => {
            tracing_subscriber::registry()
                .with(filter)
                .with(tracing_subscriber::fmt::layer().json())
                .init();
        }
        LogFormat::Text => {
            tracing_subscriber::registry()
                .with(filter)
                .with(tracing_subscriber::fmt::layer())
                .init();
        }
    }

    // Display startup banner
    if !cli.quiet && !cli.json_mode {
        print_banner();
    }

    // Execute command
    if let Err(e) = cli::execute(cli, file).await {
        tracing::error!("Error: {}", e);
        std::process::exit(1);
    }
}

/// Print the Protolab startup banner.
fn print_banner() {
    println!(
        r#"
  ┌─┐┬─┐┌─┐┌┬┐┌─┐┬  ┌─┐┌┐
  ├─┘├┬┘│ │ │ │ ││  ├─┤├┴┐
  ┴  ┴└─└─┘ ┴ └─┘┴─┘┴ ┴└─┘

  Prototype Readiness Tracker v{}

  DESIGN → BUILD → TEST → READY
"#,
        env!("CARGO_PKG_VERSION")
    );
}
