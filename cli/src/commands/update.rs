// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Database Update Command
//!
//! Implements `vigil update`, which applies the embedded SQL migrations
//! (`users`, `audit_logs`) to the configured PostgreSQL database.
//!
//! # Usage
//!
//! ```bash
//! # Apply all pending migrations
//! vigil update
//!
//! # Preview migrations without applying
//! vigil update --dry-run
//! ```
//!
//! # Environment
//!
//! The connection string comes from `spec.storage.connection_string`, or
//! from `DATABASE_URL` when set.

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use sqlx::postgres::PgPoolOptions;
use std::path::PathBuf;

use phish_vigil_core::domain::repository::StorageBackend;
use phish_vigil_core::domain::vigil_config::VigilConfigManifest;

#[derive(Args)]
pub struct UpdateCommand {
    /// Perform a dry run without applying changes
    #[arg(long)]
    dry_run: bool,
}

pub async fn execute(cmd: UpdateCommand, config_path: Option<PathBuf>) -> Result<()> {
    println!("{}", "Phish-Vigil Update".bold().green());

    let config = VigilConfigManifest::load_or_default(config_path)
        .context("Failed to load configuration")?;
    let database_url = match config.spec.storage.to_backend()? {
        StorageBackend::PostgreSQL(pg) => pg.connection_string,
        StorageBackend::InMemory => anyhow::bail!(
            "Storage backend is in-memory. Set DATABASE_URL or spec.storage to run updates."
        ),
    };

    println!("Connecting to database...");
    let pool = PgPoolOptions::new()
        .max_connections(1)
        .connect(&database_url)
        .await
        .context("Failed to connect to database")?;

    static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("./migrations");

    let applied_count = sqlx::query("SELECT version FROM _sqlx_migrations")
        .fetch_all(&pool)
        .await
        .map(|rows| rows.len())
        .unwrap_or(0);

    let total_migrations = MIGRATOR.iter().count();

    println!(
        "Migration status: {} applied, {} total available.",
        applied_count, total_migrations
    );

    if applied_count < total_migrations {
        if cmd.dry_run {
            println!("Pending migrations found (Dry Run):");
            for migration in MIGRATOR.iter().skip(applied_count) {
                println!(" - {} {}", migration.version, migration.description);
            }
            println!("Skipping application due to --dry-run");
            return Ok(());
        }

        println!("Applying pending migrations...");
        MIGRATOR.run(&pool).await.context("Failed to apply migrations")?;
        println!("{}", "✓ Database updated successfully.".green());
    } else {
        println!("{}", "✓ Database is up to date.".green());
    }

    Ok(())
}
