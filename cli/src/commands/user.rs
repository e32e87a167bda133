// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! User management commands
//!
//! Commands: add, list

use anyhow::{Context, Result};
use clap::Subcommand;
use colored::Colorize;
use std::path::PathBuf;

use phish_vigil_core::domain::risk_engine::RiskMetrics;
use phish_vigil_core::domain::user::UserRole;

use crate::runtime::VigilRuntime;

#[derive(Subcommand)]
pub enum UserCommand {
    /// Provision a user with the default risk state
    Add {
        #[arg(long)]
        email: String,

        /// USER, ANALYST, CISO or ADMIN
        #[arg(long, default_value = "USER")]
        role: UserRole,

        #[arg(long)]
        department: Option<String>,
    },

    /// List users with their current risk metrics
    List,
}

pub async fn handle_command(command: UserCommand, config_path: Option<PathBuf>) -> Result<()> {
    let runtime = VigilRuntime::load(config_path).await?;
    runtime.warn_if_ephemeral();

    match command {
        UserCommand::Add {
            email,
            role,
            department,
        } => {
            let user = runtime
                .provisioning_service()
                .provision_user(&email, role, department)
                .await
                .context("Failed to provision user")?;
            println!(
                "{}",
                format!("✓ User {} provisioned ({})", user.email, user.id).green()
            );
            Ok(())
        }
        UserCommand::List => {
            let users = runtime
                .repositories
                .users
                .list_all()
                .await
                .context("Failed to list users")?;

            if users.is_empty() {
                println!("{}", "No users provisioned".yellow());
                return Ok(());
            }

            println!(
                "{:<36}  {:<32}  {:<8}  {:>6}  {:>10}  {}",
                "ID".bold(),
                "EMAIL".bold(),
                "ROLE".bold(),
                "RISK".bold(),
                "RESILIENCE".bold(),
                "TRAINING".bold()
            );
            for user in users {
                let metrics = RiskMetrics::from_state(&user.risk);
                let training = if user.risk.training_due {
                    "due".red().to_string()
                } else {
                    "-".dimmed().to_string()
                };
                println!(
                    "{:<36}  {:<32}  {:<8}  {:>6.1}  {:>10.1}  {}",
                    user.id.to_string(),
                    user.email,
                    user.role.as_str(),
                    metrics.risk,
                    metrics.resilience,
                    training
                );
            }
            Ok(())
        }
    }
}
