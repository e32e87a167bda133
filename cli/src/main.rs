// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! # Phish-Vigil CLI
//!
//! The `vigil` binary runs the human-risk API and administers its state.
//!
//! ## Commands
//!
//! - `vigil serve` - Interaction ingestion and dashboard API
//! - `vigil config show|validate|generate` - Configuration management
//! - `vigil token issue` - Sign interaction tokens for simulation mails
//! - `vigil user add|list` - User provisioning
//! - `vigil dashboard` - Organization risk posture
//! - `vigil audit` - Interaction audit trail
//! - `vigil update` - Database migrations

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use std::path::PathBuf;

use phish_vigil::commands::{
    self, AuditCommand, ConfigCommand, DashboardCommand, ServeCommand, TokenCommand, UpdateCommand,
    UserCommand,
};
use phish_vigil_core::domain::vigil_config::VigilConfigManifest;

/// Phish-Vigil - human risk scoring for phishing simulations
#[derive(Parser)]
#[command(name = "vigil")]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Path to configuration file (overrides discovery)
    #[arg(
        short,
        long,
        global = true,
        env = "VIGIL_CONFIG_PATH",
        value_name = "FILE"
    )]
    config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error); defaults to the configured level
    #[arg(long, global = true, env = "VIGIL_LOG_LEVEL")]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the API server
    #[command(name = "serve")]
    Serve {
        #[command(flatten)]
        command: ServeCommand,
    },

    /// Configuration management
    #[command(name = "config")]
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },

    /// Interaction token operations
    #[command(name = "token")]
    Token {
        #[command(subcommand)]
        command: TokenCommand,
    },

    /// User management
    #[command(name = "user")]
    User {
        #[command(subcommand)]
        command: UserCommand,
    },

    /// Show the organization risk posture
    #[command(name = "dashboard")]
    Dashboard {
        #[command(flatten)]
        command: DashboardCommand,
    },

    /// Show the interaction audit trail
    #[command(name = "audit")]
    Audit {
        #[command(flatten)]
        command: AuditCommand,
    },

    /// Update the Phish-Vigil database
    #[command(name = "update")]
    Update {
        #[command(flatten)]
        command: UpdateCommand,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let _ = dotenvy::dotenv();
    let cli = Cli::parse();

    // Logging settings come from the manifest unless the flag overrides them
    let logging = VigilConfigManifest::load_or_default(cli.config.clone())
        .map(|c| c.logging())
        .unwrap_or_else(|_| VigilConfigManifest::default().logging());
    let level = cli.log_level.clone().unwrap_or(logging.level);
    init_logging(&level, &logging.format)?;

    match cli.command {
        Some(Commands::Serve { command }) => commands::serve::execute(command, cli.config).await,
        Some(Commands::Config { command }) => {
            commands::config::handle_command(command, cli.config).await
        }
        Some(Commands::Token { command }) => {
            commands::token::handle_command(command, cli.config).await
        }
        Some(Commands::User { command }) => {
            commands::user::handle_command(command, cli.config).await
        }
        Some(Commands::Dashboard { command }) => {
            commands::dashboard::execute(command, cli.config).await
        }
        Some(Commands::Audit { command }) => commands::audit::execute(command, cli.config).await,
        Some(Commands::Update { command }) => commands::update::execute(command, cli.config).await,
        None => {
            // No command provided - show help
            eprintln!("{}", "No command specified. Use --help for usage.".yellow());
            std::process::exit(1);
        }
    }
}

/// Initialize tracing subscriber for logging
fn init_logging(level: &str, format: &str) -> Result<()> {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .or_else(|_| tracing_subscriber::EnvFilter::try_new(level))
        .context("Failed to create log filter")?;

    if format.eq_ignore_ascii_case("json") {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .json()
            .with_current_span(false)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .with_thread_ids(false)
            .with_file(false)
            .with_line_number(false)
            .compact()
            .init();
    }

    Ok(())
}
