// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Organization-wide risk posture computed from a snapshot of user states.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::user::UserRiskState;

/// Average resilience strictly above this value reads as improving.
pub const IMPROVING_RESILIENCE_THRESHOLD: f64 = 50.0;

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum DashboardError {
    #[error("No users to aggregate")]
    EmptyPopulation,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PostureStatus {
    #[serde(rename = "Improving")]
    Improving,
    #[serde(rename = "Attention Needed")]
    AttentionNeeded,
}

impl PostureStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Improving => "Improving",
            Self::AttentionNeeded => "Attention Needed",
        }
    }
}

impl std::fmt::Display for PostureStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OrganizationRisk {
    pub avg_risk: f64,
    pub avg_resilience: f64,
    pub status: PostureStatus,
    pub population: usize,
}

/// Mean risk and resilience over `states`.
pub fn aggregate<'a, I>(states: I) -> Result<OrganizationRisk, DashboardError>
where
    I: IntoIterator<Item = &'a UserRiskState>,
{
    let (count, risk_sum, resilience_sum) = states
        .into_iter()
        .fold((0usize, 0.0f64, 0.0f64), |(n, r, s), state| {
            (n + 1, r + state.risk_score, s + state.resilience_score)
        });

    if count == 0 {
        return Err(DashboardError::EmptyPopulation);
    }

    let avg_risk = risk_sum / count as f64;
    let avg_resilience = resilience_sum / count as f64;
    let status = if avg_resilience > IMPROVING_RESILIENCE_THRESHOLD {
        PostureStatus::Improving
    } else {
        PostureStatus::AttentionNeeded
    };

    Ok(OrganizationRisk {
        avg_risk,
        avg_resilience,
        status,
        population: count,
    })
}
