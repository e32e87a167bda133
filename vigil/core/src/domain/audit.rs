// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! # Interaction Audit Trail
//!
//! Every interaction that reaches a known user is recorded before its risk
//! update is applied. Records are append-only and keyed by a SHA-256
//! `event_hash` over the timestamp and actor.
//!
//! Recording is fire-and-forget from the caller's perspective: an
//! [`AuditSink`] swallows (and logs) its own failures.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditRecord {
    pub id: Uuid,
    pub event_hash: String,
    pub timestamp: DateTime<Utc>,
    pub actor_email: String,
    /// Interaction kind exactly as received on the wire.
    pub action_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<serde_json::Value>,
}

impl AuditRecord {
    pub fn new(
        actor_email: impl Into<String>,
        action_type: Option<String>,
        timestamp: DateTime<Utc>,
    ) -> Self {
        let actor_email = actor_email.into();
        Self {
            id: Uuid::new_v4(),
            event_hash: event_hash(timestamp, &actor_email),
            timestamp,
            actor_email,
            action_type,
            metadata: None,
        }
    }

    pub fn with_metadata(mut self, metadata: serde_json::Value) -> Self {
        self.metadata = Some(metadata);
        self
    }
}

/// Hex SHA-256 of `"{timestamp}{actor_email}"`, timestamp at nanosecond precision.
pub fn event_hash(timestamp: DateTime<Utc>, actor_email: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(timestamp.to_rfc3339_opts(chrono::SecondsFormat::Nanos, true).as_bytes());
    hasher.update(actor_email.as_bytes());
    hex::encode(hasher.finalize())
}

#[async_trait]
pub trait AuditSink: Send + Sync {
    async fn record(&self, record: AuditRecord);
}
