// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Interaction token commands
//!
//! Tokens are what the simulation mails embed in their links and report
//! buttons; the API resolves them back to a user.

use anyhow::{Context, Result};
use clap::Subcommand;
use std::path::PathBuf;

use phish_vigil_core::domain::clock::Clock;
use phish_vigil_core::domain::user::UserId;

use crate::runtime::VigilRuntime;

#[derive(Subcommand)]
pub enum TokenCommand {
    /// Issue a signed interaction token for a user
    Issue {
        /// User id (UUID) or email address
        #[arg(long, value_name = "USER")]
        user: String,

        /// Token lifetime (default: spec.security.token_ttl_seconds)
        #[arg(long)]
        ttl_seconds: Option<u64>,
    },
}

pub async fn handle_command(command: TokenCommand, config_path: Option<PathBuf>) -> Result<()> {
    match command {
        TokenCommand::Issue { user, ttl_seconds } => issue(config_path, &user, ttl_seconds).await,
    }
}

async fn issue(config_path: Option<PathBuf>, user: &str, ttl_seconds: Option<u64>) -> Result<()> {
    let runtime = VigilRuntime::load(config_path).await?;

    let user_id = match UserId::from_string(user) {
        Ok(id) => id,
        Err(_) => {
            runtime.warn_if_ephemeral();
            runtime
                .repositories
                .users
                .find_by_email(user)
                .await
                .context("Failed to look up user")?
                .map(|u| u.id)
                .with_context(|| format!("No user with email '{}'", user))?
        }
    };

    let ttl_seconds = ttl_seconds.unwrap_or(runtime.config.spec.security.token_ttl_seconds);
    let ttl = chrono::Duration::seconds(i64::try_from(ttl_seconds).context("TTL out of range")?);
    let token = runtime
        .tokens
        .issue(user_id, ttl, runtime.clock.now())
        .context("Failed to sign interaction token")?;

    println!("{}", token);
    Ok(())
}
