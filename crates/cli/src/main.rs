//! Clerk Admin CLI - Database migrations and chat permission management.
//!
//! # Usage
//!
//! ```bash
//! # Run admin database migrations
//! clerk-admin-cli migrate
//!
//! # Grant, revoke and list chat permissions
//! clerk-admin-cli permissions grant user_2abc --notes "beta tester"
//! clerk-admin-cli permissions revoke user_2abc
//! clerk-admin-cli permissions list
//! ```
//!
//! # Commands
//!
//! - `migrate` - Run database migrations
//! - `permissions` - Manage chat permissions

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "clerk-admin-cli")]
#[command(author, version, about = "Clerk Admin CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations
    Migrate,
    /// Manage chat permissions
    Permissions {
        #[command(subcommand)]
        action: PermissionAction,
    },
}

#[derive(Subcommand)]
enum PermissionAction {
    /// Enable chat for a user
    Grant {
        /// Clerk user ID
        user_id: String,

        /// Clerk user ID of the granting admin
        #[arg(short, long)]
        by: Option<String>,

        /// Free-form note stored with the grant
        #[arg(short, long)]
        notes: Option<String>,
    },
    /// Disable chat for a user (the record is kept)
    Revoke {
        /// Clerk user ID
        user_id: String,
    },
    /// List all chat permission records
    List,
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    let result: Result<(), Box<dyn std::error::Error>> = run(cli).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Migrate => commands::migrate::run().await?,
        Commands::Permissions { action } => match action {
            PermissionAction::Grant { user_id, by, notes } => {
                commands::permissions::grant(&user_id, by.as_deref(), notes.as_deref()).await?;
            }
            PermissionAction::Revoke { user_id } => {
                commands::permissions::revoke(&user_id).await?;
            }
            PermissionAction::List => commands::permissions::list().await?,
        },
    }
    Ok(())
}
