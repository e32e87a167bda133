// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! # Interaction Application Service
//!
//! Orchestrates one simulated-phishing interaction end to end:
//!
//! ```text
//! token ─► TokenVerifier ─► UserRepository::find_by_id
//!       ─► AuditSink::record            (fire-and-forget)
//!       ─► RiskEngine::apply_event      (pure)
//!       ─► UserRepository::save         (version-checked, retried on conflict)
//! ```
//!
//! The read-modify-write is protected by the repository's optimistic
//! concurrency check. A lost race reloads the user and recomputes from the
//! fresh state, so concurrent interactions for one user are never dropped.

use async_trait::async_trait;
use serde_json::json;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::domain::audit::{AuditRecord, AuditSink};
use crate::domain::clock::Clock;
use crate::domain::repository::{RepositoryError, UserRepository};
use crate::domain::risk_engine::{RiskEngine, RiskMetrics};
use crate::domain::token::{TokenError, TokenVerifier};
use crate::domain::user::{InteractionKind, UserId, UserRiskState};

pub const DEFAULT_MAX_SAVE_ATTEMPTS: u32 = 3;

#[derive(Debug, Error)]
pub enum InteractionError {
    #[error(transparent)]
    Token(#[from] TokenError),

    #[error("User not found: {0}")]
    UserNotFound(UserId),

    #[error("Concurrent updates to user {user_id} did not settle after {attempts} attempts")]
    Conflict { user_id: UserId, attempts: u32 },

    #[error("Repository error: {0}")]
    Repository(#[from] RepositoryError),
}

#[derive(Debug, Clone, PartialEq)]
pub struct InteractionOutcome {
    pub user_id: UserId,
    pub kind: InteractionKind,
    pub metrics: RiskMetrics,
    pub state: UserRiskState,
    /// This interaction flipped `training_due` from false to true.
    pub training_newly_due: bool,
}

#[async_trait]
pub trait InteractionService: Send + Sync {
    /// Apply the interaction carried by `credential`. `raw_kind` is the wire value, if any.
    async fn record_interaction(
        &self,
        credential: &str,
        raw_kind: Option<&str>,
    ) -> Result<InteractionOutcome, InteractionError>;
}

pub struct StandardInteractionService {
    verifier: Arc<dyn TokenVerifier>,
    users: Arc<dyn UserRepository>,
    audit: Arc<dyn AuditSink>,
    clock: Arc<dyn Clock>,
    engine: RiskEngine,
    max_attempts: u32,
}

impl StandardInteractionService {
    pub fn new(
        verifier: Arc<dyn TokenVerifier>,
        users: Arc<dyn UserRepository>,
        audit: Arc<dyn AuditSink>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            verifier,
            users,
            audit,
            clock,
            engine: RiskEngine::new(),
            max_attempts: DEFAULT_MAX_SAVE_ATTEMPTS,
        }
    }

    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts.max(1);
        self
    }
}

#[async_trait]
impl InteractionService for StandardInteractionService {
    async fn record_interaction(
        &self,
        credential: &str,
        raw_kind: Option<&str>,
    ) -> Result<InteractionOutcome, InteractionError> {
        let user_id = self.verifier.verify(credential).map_err(|e| {
            metrics::counter!("vigil_token_rejections_total", "reason" => token_reason(&e)).increment(1);
            warn!("Rejected interaction token: {}", e);
            e
        })?;
        let kind = InteractionKind::parse(raw_kind);

        let mut user = self
            .users
            .find_by_id(user_id)
            .await?
            .ok_or(InteractionError::UserNotFound(user_id))?;

        let record = AuditRecord::new(user.email.clone(), raw_kind.map(str::to_string), self.clock.now())
            .with_metadata(json!({ "user_id": user_id.to_string(), "kind": kind.as_str() }));
        self.audit.record(record).await;

        for attempt in 1..=self.max_attempts {
            let was_due = user.risk.training_due;
            let update = self.engine.apply_event(&user.risk, kind, self.clock.now());

            let mut next = user.clone();
            next.apply_risk(update.state);

            match self.users.save(&next).await {
                Ok(version) => {
                    next.version = version;
                    let training_newly_due = !was_due && next.risk.training_due;

                    metrics::counter!("vigil_interactions_total", "kind" => kind.as_str()).increment(1);
                    if training_newly_due {
                        metrics::counter!("vigil_training_due_total").increment(1);
                    }
                    info!(
                        user_id = %user_id,
                        kind = %kind,
                        risk = update.metrics.risk,
                        resilience = update.metrics.resilience,
                        velocity = next.risk.risk_velocity,
                        decay_days = update.elapsed_days,
                        "Risk updated"
                    );

                    return Ok(InteractionOutcome {
                        user_id,
                        kind,
                        metrics: update.metrics,
                        state: next.risk,
                        training_newly_due,
                    });
                }
                Err(e) if e.is_conflict() => {
                    metrics::counter!("vigil_interaction_conflicts_total").increment(1);
                    debug!(user_id = %user_id, attempt, "Version conflict, reloading user");
                    user = self
                        .users
                        .find_by_id(user_id)
                        .await?
                        .ok_or(InteractionError::UserNotFound(user_id))?;
                }
                Err(e) => return Err(e.into()),
            }
        }

        warn!(user_id = %user_id, attempts = self.max_attempts, "Giving up on contended risk update");
        Err(InteractionError::Conflict {
            user_id,
            attempts: self.max_attempts,
        })
    }
}

fn token_reason(err: &TokenError) -> &'static str {
    match err {
        TokenError::Invalid => "invalid",
        TokenError::Expired => "expired",
    }
}
