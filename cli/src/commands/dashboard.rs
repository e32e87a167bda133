// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

use anyhow::Result;
use clap::Args;
use colored::Colorize;
use serde_json::json;
use std::path::PathBuf;

use phish_vigil_core::application::DashboardQueryError;
use phish_vigil_core::domain::dashboard::PostureStatus;
use phish_vigil_core::domain::risk_engine::round1;

use crate::runtime::VigilRuntime;

#[derive(Args)]
pub struct DashboardCommand {
    /// Print the same JSON document the API serves
    #[arg(long)]
    json: bool,
}

pub async fn execute(cmd: DashboardCommand, config_path: Option<PathBuf>) -> Result<()> {
    let runtime = VigilRuntime::load(config_path).await?;
    runtime.warn_if_ephemeral();

    let org = match runtime.dashboard_service().organization_risk().await {
        Ok(org) => org,
        Err(DashboardQueryError::Dashboard(_)) => {
            if cmd.json {
                println!("{}", json!({ "msg": "No data" }));
            } else {
                println!("{}", "No data".yellow());
            }
            return Ok(());
        }
        Err(e) => return Err(e.into()),
    };

    if cmd.json {
        println!(
            "{}",
            json!({
                "Organization Risk": round1(org.avg_risk),
                "Resilience Index": round1(org.avg_resilience),
                "Status": org.status.as_str(),
            })
        );
        return Ok(());
    }

    let status = match org.status {
        PostureStatus::Improving => org.status.as_str().green(),
        PostureStatus::AttentionNeeded => org.status.as_str().yellow(),
    };
    println!("{}", "Organization Risk Posture".bold());
    println!("  Users:            {}", org.population);
    println!("  Organization Risk: {:.1}", round1(org.avg_risk));
    println!("  Resilience Index:  {:.1}", round1(org.avg_resilience));
    println!("  Status:            {}", status);

    Ok(())
}
