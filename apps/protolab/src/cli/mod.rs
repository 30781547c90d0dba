//! # Protolab CLI Module
//!
//! This module implements the CLI interface for Protolab.
//!
//! ## Available Commands
//!
//! - `server` - Start the HTTP server
//! - `status` - Show portfolio counts
//! - `list` / `show` - Inspect prototypes with readiness
//! - `create` / `edit` / `advance` / `delete` - Manage prototypes
//! - `add-test` / `set-result` / `remove-test` - Manage test cases
//! - `seed` - Insert the demo portfolio into an empty store
//! - `init` - Initialize a new database

mod commands;

use crate::config::{self, FileConfig, SecurityConfig, StorageConfig};
use clap::{Parser, Subcommand};
use protolab_core::ProtolabError;
use std::path::PathBuf;

pub use commands::*;

// =============================================================================
// CLI STRUCTURE
// =============================================================================

/// Protolab - Prototype Readiness Tracker
///
/// Tracks hardware prototypes from DESIGN to READY and blocks release
/// until their test cases say they are ready.
#[derive(Parser, Debug)]
#[command(name = "protolab")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose (debug) logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress banner output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Path to the TOML config file (optional)
    #[arg(short = 'C', long, global = true, default_value = config::DEFAULT_CONFIG_FILE)]
    pub config: PathBuf,

    /// Path to the database [default: protolab.redb]
    #[arg(short = 'D', long, global = true)]
    pub database: Option<PathBuf>,

    /// Storage backend: "redb" (ACID database) or "memory" (volatile) [default: redb]
    #[arg(short = 'B', long, global = true)]
    pub backend: Option<String>,

    /// Output in JSON format (same bodies as the HTTP API)
    #[arg(long, global = true)]
    pub json_mode: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start HTTP server
    Server {
        /// Host to bind to [default: 127.0.0.1]
        #[arg(short = 'H', long)]
        host: Option<String>,

        /// Port to bind to [default: 8080]
        #[arg(short, long)]
        port: Option<u16>,

        /// Insert the demo portfolio first if the store is empty
        #[arg(long)]
        seed: bool,
    },

    /// Show portfolio counts
    Status,

    /// List all prototypes with readiness
    List,

    /// Show one prototype with its test cases
    Show {
        /// Prototype id
        id: String,
    },

    /// Create a prototype (starts in DESIGN)
    Create {
        #[arg(short, long)]
        name: Option<String>,

        /// Space, Automotive, Industrial or Other
        #[arg(short, long)]
        area: Option<String>,

        #[arg(short, long)]
        owner: Option<String>,

        /// YYYY-MM-DD
        #[arg(short, long)]
        target_date: Option<String>,
    },

    /// Edit name, area, owner or target date of a prototype
    Edit {
        /// Prototype id
        id: String,

        #[arg(short, long)]
        name: Option<String>,

        #[arg(short, long)]
        area: Option<String>,

        #[arg(short, long)]
        owner: Option<String>,

        #[arg(short, long)]
        target_date: Option<String>,
    },

    /// Advance a prototype to its next status
    Advance {
        /// Prototype id
        id: String,
    },

    /// Delete a prototype and its test cases
    Delete {
        /// Prototype id
        id: String,
    },

    /// Add a test case to a prototype
    AddTest {
        /// Owning prototype id
        prototype_id: String,

        #[arg(short = 'T', long)]
        title: Option<String>,

        /// FUNCTIONAL, ENVIRONMENTAL or INTEGRATION
        #[arg(short = 't', long = "type")]
        test_type: Option<String>,
    },

    /// Record the result of a test case
    SetResult {
        /// Test case id
        id: String,

        /// NOT_RUN, PASS or FAIL
        result: String,
    },

    /// Delete a test case
    RemoveTest {
        /// Test case id
        id: String,
    },

    /// Insert the demo portfolio if the store is empty
    Seed,

    /// Initialize a new empty database
    Init {
        /// Replace an existing database
        #[arg(short, long)]
        force: bool,
    },
}

// =============================================================================
// COMMAND EXECUTION
// =============================================================================

/// Execute the CLI with parsed arguments and the loaded config file.
pub async fn execute(cli: Cli, file: FileConfig) -> Result<(), ProtolabError> {
    let storage = StorageConfig::resolve(cli.database, cli.backend.as_deref(), &file.storage)?;
    let ctx = Context {
        storage,
        json_mode: cli.json_mode,
    };

    match cli.command {
        Some(Commands::Server { host, port, seed }) => {
            let bind = config::resolve_bind(host, port, &file.server);
            let security = SecurityConfig::resolve(&file.security);
            cmd_server(&ctx, &bind, &security, seed).await
        }
        Some(Commands::Status) | None => cmd_status(&ctx),
        Some(Commands::List) => cmd_list(&ctx),
        Some(Commands::Show { id }) => cmd_show(&ctx, &id),
        Some(Commands::Create {
            name,
            area,
            owner,
            target_date,
        }) => cmd_create(
            &ctx,
            name.as_deref(),
            area.as_deref(),
            owner.as_deref(),
            target_date.as_deref(),
        ),
        Some(Commands::Edit {
            id,
            name,
            area,
            owner,
            target_date,
        }) => cmd_edit(
            &ctx,
            &id,
            name.as_deref(),
            area.as_deref(),
            owner.as_deref(),
            target_date.as_deref(),
        ),
        Some(Commands::Advance { id }) => cmd_advance(&ctx, &id),
        Some(Commands::Delete { id }) => cmd_delete(&ctx, &id),
        Some(Commands::AddTest {
            prototype_id,
            title,
            test_type,
        }) => cmd_add_test(&ctx, &prototype_id, title.as_deref(), test_type.as_deref()),
        Some(Commands::SetResult { id, result }) => cmd_set_result(&ctx, &id, &result),
        Some(Commands::RemoveTest { id }) => cmd_remove_test(&ctx, &id),
        Some(Commands::Seed) => cmd_seed(&ctx),
        Some(Commands::Init { force }) => cmd_init(&ctx, force),
    }
}
