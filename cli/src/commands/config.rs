// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Configuration management commands
//!
//! Commands: show, validate, generate

use anyhow::{Context, Result};
use clap::Subcommand;
use colored::Colorize;
use std::path::PathBuf;

use phish_vigil_core::domain::vigil_config::{StorageBackendKind, VigilConfigManifest};

#[derive(Subcommand)]
pub enum ConfigCommand {
    /// Show current configuration
    Show {
        /// Show config file paths checked
        #[arg(long)]
        paths: bool,
    },

    /// Validate configuration file
    Validate {
        /// Path to config file (default: discover)
        #[arg(value_name = "FILE")]
        file: Option<PathBuf>,
    },

    /// Generate sample configuration
    Generate {
        /// Output path (default: ./vigil-config.yaml)
        #[arg(short, long, default_value = "./vigil-config.yaml")]
        output: PathBuf,

        /// Include examples and comments
        #[arg(long)]
        examples: bool,
    },
}

pub async fn handle_command(
    command: ConfigCommand,
    config_override: Option<PathBuf>,
) -> Result<()> {
    match command {
        ConfigCommand::Show { paths } => show(config_override, paths).await,
        ConfigCommand::Validate { file } => validate(file.or(config_override)).await,
        ConfigCommand::Generate { output, examples } => generate(output, examples).await,
    }
}

async fn show(config_override: Option<PathBuf>, show_paths: bool) -> Result<()> {
    let config = VigilConfigManifest::load_or_default(config_override.clone())
        .context("Failed to load configuration")?;

    if show_paths {
        println!("{}", "Configuration discovery paths:".bold());
        if let Some(path) = &config_override {
            println!("  1. --config flag: {}", path.display());
        } else {
            println!("  1. --config flag: {}", "(not set)".dimmed());
        }
        println!(
            "  2. VIGIL_CONFIG_PATH: {}",
            std::env::var("VIGIL_CONFIG_PATH")
                .unwrap_or_else(|_| "(not set)".to_string())
                .dimmed()
        );
        println!("  3. ./vigil-config.yaml");
        println!("  4. ~/.vigil/config.yaml");
        println!("  5. /etc/vigil/config.yaml");
        println!();
    }

    println!("{}", "Current configuration:".bold());
    println!();

    println!("{}", "Node:".bold());
    println!("  Name: {}", config.metadata.name);
    if let Some(version) = &config.metadata.version {
        println!("  Version: {}", version);
    }
    println!();

    let server = &config.spec.server;
    println!("{}", "Server:".bold());
    println!("  Listen: {}:{}", server.bind_address, server.port);
    println!();

    let security = &config.spec.security;
    println!("{}", "Interaction Tokens:".bold());
    println!("  Issuer: {}", security.token_issuer);
    println!("  Audience: {}", security.token_audience);
    println!("  TTL: {}s", security.token_ttl_seconds);
    println!("  Secret: {}", redact_secret(&security.secret_key));
    println!();

    let storage = &config.spec.storage;
    println!("{}", "Storage:".bold());
    match storage.backend {
        StorageBackendKind::InMemory => println!("  Backend: in-memory"),
        StorageBackendKind::Postgres => {
            println!("  Backend: postgres");
            println!(
                "  Connection: {}",
                if storage.connection_string.is_some() { "(set)" } else { "(missing)" }
            );
            println!("  Max connections: {}", storage.max_connections);
        }
    }
    println!();

    let logging = config.logging();
    println!("{}", "Observability:".bold());
    println!("  Log level: {} ({})", logging.level, logging.format);
    match config.metrics() {
        Some(metrics) => println!("  Prometheus: port {}", metrics.port),
        None => println!("  Prometheus: {}", "disabled".dimmed()),
    }
    println!();

    Ok(())
}

fn redact_secret(secret: &str) -> String {
    if let Some(var) = secret.strip_prefix("env:") {
        format!("from ${}", var)
    } else {
        "(inline, redacted)".to_string()
    }
}

async fn validate(config_path: Option<PathBuf>) -> Result<()> {
    println!("Validating configuration...");

    let config = VigilConfigManifest::load_or_default(config_path)
        .context("Failed to load configuration")?;

    config
        .validate()
        .context("Configuration validation failed")?;

    println!("{}", "✓ Configuration is valid".green());

    Ok(())
}

async fn generate(output: PathBuf, with_examples: bool) -> Result<()> {
    let sample = if with_examples {
        include_str!("../../templates/config-with-examples.yaml")
    } else {
        include_str!("../../templates/config-minimal.yaml")
    };

    std::fs::write(&output, sample)
        .with_context(|| format!("Failed to write config to {:?}", output))?;

    println!(
        "{}",
        format!("✓ Configuration generated: {}", output.display()).green()
    );

    Ok(())
}
