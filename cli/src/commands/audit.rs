// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! `vigil audit`: reads back the interaction audit trail.

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use std::path::PathBuf;

use crate::runtime::VigilRuntime;

#[derive(Args)]
pub struct AuditCommand {
    /// Only records for this actor email
    #[arg(long)]
    actor: Option<String>,

    /// Maximum number of records, newest first
    #[arg(long, default_value_t = 20)]
    limit: usize,
}

pub async fn execute(cmd: AuditCommand, config_path: Option<PathBuf>) -> Result<()> {
    let runtime = VigilRuntime::load(config_path).await?;
    runtime.warn_if_ephemeral();

    let audit = &runtime.repositories.audit;
    let records = match &cmd.actor {
        Some(actor) => audit.find_by_actor(actor, Some(cmd.limit)).await,
        None => audit.list_recent(cmd.limit).await,
    }
    .context("Failed to read audit log")?;

    if records.is_empty() {
        println!("{}", "No audit records".yellow());
        return Ok(());
    }

    for record in records {
        println!(
            "{}  {:<32}  {:<12}  {}",
            record.timestamp.to_rfc3339(),
            record.actor_email,
            record.action_type.as_deref().unwrap_or("-"),
            record.event_hash.dimmed()
        );
    }

    Ok(())
}
