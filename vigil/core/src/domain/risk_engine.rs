// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! # Risk Scoring Engine
//!
//! Pure state transition applied to a [`UserRiskState`] for every simulated
//! phishing interaction. The engine performs no I/O and never mutates its
//! input: callers receive a fresh [`RiskUpdate`] and decide how and when to
//! persist it.
//!
//! ## Update order
//!
//! ```text
//! elapsed whole days ─► exponential decay of risk
//!                    ─► event deltas (CLICK / REPORT / no-op)
//!                    ─► clamp to [0, 100]
//!                    ─► velocity, counters, confidence, timestamp
//! ```
//!
//! A `now` earlier than `last_risk_update` (clock skew) is treated as zero
//! elapsed days, so decay can never amplify risk.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::user::{InteractionKind, UserRiskState};

/// Fraction of risk shed per elapsed day, applied as `exp(-rate * days)`.
pub const DECAY_RATE_PER_DAY: f64 = 0.01;

pub const CLICK_RISK_DELTA: f64 = 25.0;
pub const CLICK_RESILIENCE_DELTA: f64 = -10.0;
/// Post-decay risk above which a click is penalised harder.
pub const HIGH_RISK_THRESHOLD: f64 = 50.0;
pub const HIGH_RISK_CLICK_MULTIPLIER: f64 = 1.5;

pub const REPORT_RISK_DELTA: f64 = -15.0;
pub const REPORT_RESILIENCE_DELTA: f64 = 5.0;
/// Streak length (post-increment) from which every report earns the bonus.
pub const STREAK_BONUS_THRESHOLD: u32 = 3;
pub const STREAK_BONUS_MULTIPLIER: f64 = 1.5;

/// Interaction count at which the confidence index saturates at 1.0.
pub const CONFIDENCE_SATURATION_INTERACTIONS: f64 = 10.0;

pub const SCORE_MIN: f64 = 0.0;
pub const SCORE_MAX: f64 = 100.0;

/// Headline numbers returned to the caller after an interaction.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RiskMetrics {
    pub risk: f64,
    pub resilience: f64,
}

impl RiskMetrics {
    pub fn from_state(state: &UserRiskState) -> Self {
        Self {
            risk: round1(state.risk_score),
            resilience: round1(state.resilience_score),
        }
    }
}

/// Result of one engine step.
#[derive(Debug, Clone, PartialEq)]
pub struct RiskUpdate {
    pub state: UserRiskState,
    pub metrics: RiskMetrics,
    /// Whole days used for decay (never negative).
    pub elapsed_days: i64,
    pub decay: f64,
    /// Unclamped deltas chosen for the event kind.
    pub delta_risk: f64,
    pub delta_resilience: f64,
}

impl RiskUpdate {
    pub fn streak_bonus_applied(&self) -> bool {
        self.delta_resilience > REPORT_RESILIENCE_DELTA
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct RiskEngine;

impl RiskEngine {
    pub fn new() -> Self {
        Self
    }

    /// Compute the next risk state for `kind` observed at `now`.
    pub fn apply_event(
        &self,
        state: &UserRiskState,
        kind: InteractionKind,
        now: DateTime<Utc>,
    ) -> RiskUpdate {
        let mut next = state.clone();

        let elapsed_days = elapsed_days(state.last_risk_update, now);
        let decay = decay_factor(elapsed_days);
        next.risk_score *= decay;

        let (delta_risk, delta_resilience) = match kind {
            InteractionKind::Click => {
                let multiplier = if next.risk_score > HIGH_RISK_THRESHOLD {
                    HIGH_RISK_CLICK_MULTIPLIER
                } else {
                    1.0
                };
                next.consecutive_safe_campaigns = 0;
                next.training_due = true;
                (CLICK_RISK_DELTA * multiplier, CLICK_RESILIENCE_DELTA)
            }
            InteractionKind::Report => {
                next.consecutive_safe_campaigns = next.consecutive_safe_campaigns.saturating_add(1);
                let mut delta_res = REPORT_RESILIENCE_DELTA;
                if next.consecutive_safe_campaigns >= STREAK_BONUS_THRESHOLD {
                    delta_res *= STREAK_BONUS_MULTIPLIER;
                }
                (REPORT_RISK_DELTA, delta_res)
            }
            InteractionKind::Unrecognized => (0.0, 0.0),
        };

        let prev_risk = next.risk_score;
        next.risk_score = clamp_score(next.risk_score + delta_risk);
        next.resilience_score = clamp_score(next.resilience_score + delta_resilience);
        next.risk_velocity = next.risk_score - prev_risk;

        next.total_interactions = next.total_interactions.saturating_add(1);
        next.confidence_index = confidence_for(next.total_interactions);
        next.last_risk_update = state.last_risk_update.max(now);

        let metrics = RiskMetrics::from_state(&next);
        RiskUpdate {
            state: next,
            metrics,
            elapsed_days,
            decay,
            delta_risk,
            delta_resilience,
        }
    }
}

/// Whole 24h periods between `last` and `now`, truncated, floored at zero.
pub fn elapsed_days(last: DateTime<Utc>, now: DateTime<Utc>) -> i64 {
    (now - last).num_days().max(0)
}

pub fn decay_factor(days: i64) -> f64 {
    (-DECAY_RATE_PER_DAY * days as f64).exp()
}

pub fn confidence_for(total_interactions: u64) -> f64 {
    (total_interactions as f64 / CONFIDENCE_SATURATION_INTERACTIONS).min(1.0)
}

fn clamp_score(value: f64) -> f64 {
    value.clamp(SCORE_MIN, SCORE_MAX)
}

/// Round to one decimal place, correctly rounded from the exact binary value
/// with ties to even (`1.25` becomes `1.2`).
pub fn round1(value: f64) -> f64 {
    format!("{:.1}", value).parse().unwrap_or(value)
}
