//! Copihue CLI - store setup and management tools.
//!
//! # Usage
//!
//! ```bash
//! # Ensure product metafield definitions exist
//! copihue-cli provision metafields
//!
//! # Ensure content metaobject definitions exist
//! copihue-cli provision metaobjects
//!
//! # Both
//! copihue-cli provision all
//! ```
//!
//! Provisioning is idempotent: definitions that already exist are counted as
//! skipped, so the commands are safe to run from deployment automation.
//!
//! # Exit codes
//!
//! - 0 - every definition was created or already existed
//! - 1 - at least one definition failed, the token grant was rejected, or
//!   the environment configuration is invalid

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "copihue-cli")]
#[command(author, version, about = "Copihue Books CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Ensure remote schema definitions exist
    Provision {
        #[command(subcommand)]
        target: ProvisionTarget,
    },
}

#[derive(Subcommand)]
enum ProvisionTarget {
    /// Product metafield definitions (book metadata)
    Metafields,
    /// Content metaobject definitions (hero gallery, about us)
    Metaobjects,
    /// All definitions
    All,
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    match run(cli).await {
        Ok(summary) => {
            tracing::info!("Done: {summary}");
            if !summary.is_success() {
                std::process::exit(1);
            }
        }
        Err(e) => {
            tracing::error!("Command failed: {e}");
            std::process::exit(1);
        }
    }
}

async fn run(
    cli: Cli,
) -> Result<copihue_admin::provision::ProvisionSummary, Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Provision { target } => match target {
            ProvisionTarget::Metafields => commands::provision::metafields().await,
            ProvisionTarget::Metaobjects => commands::provision::metaobjects().await,
            ProvisionTarget::All => commands::provision::all().await,
        },
    }
}
