//! StreamStatus CLI
//!
//! Runs the webhook server and lets operators drive a sync by hand.
//!
//! # Commands
//!
//! - `serve` - Listen for EventSub deliveries
//! - `apply` - Run one sync cycle for a broadcaster
//! - `status` - Show a broadcaster's current row
//!
//! Configuration comes from the environment (`SS_USERNAME`, `SS_TOKEN`,
//! `SS_SECRETKEY`, `SS_GH_REPO`, ...).

mod commands;

use clap::{Args, Parser, Subcommand};
use std::net::SocketAddr;
use tracing_subscriber::EnvFilter;

/// Mirrors live stream status into a git-hosted markdown page.
#[derive(Parser)]
#[command(name = "statuss")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(global = true, short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve the webhook endpoint
    Serve {
        /// Address to listen on (defaults to 0.0.0.0 and PORT / SS_PORT)
        #[arg(short, long)]
        bind: Option<SocketAddr>,
    },

    /// Set a broadcaster online or offline without a webhook
    Apply {
        /// Broadcaster name as it appears in the document
        entity: String,

        #[command(flatten)]
        state: StateArgs,

        /// Only report what would change
        #[arg(short, long)]
        dry_run: bool,
    },

    /// Show a broadcaster's current row state
    Status {
        /// Broadcaster name as it appears in the document
        entity: String,
    },

    /// Show version information
    Version,
}

#[derive(Args)]
#[group(required = true, multiple = false)]
struct StateArgs {
    /// Mark the broadcaster online
    #[arg(long)]
    online: bool,

    /// Mark the broadcaster offline
    #[arg(long)]
    offline: bool,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // RUST_LOG wins over --verbose
    let level = if cli.verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    match cli.command {
        Commands::Serve { bind } => commands::serve::run(bind)?,
        Commands::Apply {
            entity,
            state,
            dry_run,
        } => commands::apply::run(&entity, state.online, dry_run)?,
        Commands::Status { entity } => commands::status::run(&entity)?,
        Commands::Version => {
            println!("statuss v{}", env!("CARGO_PKG_VERSION"));
        }
    }

    Ok(())
}
