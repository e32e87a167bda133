// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! # Interaction Audit Logger
//!
//! Emits a structured `INFO` record on the `vigil_audit` tracing target for
//! every interaction and persists it through an [`AuditRepository`].
//!
//! Persistence failures are reported at `WARN` and swallowed: an audit
//! outage must not block risk updates.

use async_trait::async_trait;
use std::sync::Arc;
use tracing::{info, warn};

use crate::domain::audit::{AuditRecord, AuditSink};
use crate::domain::repository::AuditRepository;

pub struct AuditLogger {
    repository: Arc<dyn AuditRepository>,
}

impl AuditLogger {
    pub fn new(repository: Arc<dyn AuditRepository>) -> Self {
        Self { repository }
    }
}

#[async_trait]
impl AuditSink for AuditLogger {
    async fn record(&self, record: AuditRecord) {
        info!(
            target: "vigil_audit",
            event_hash = %record.event_hash,
            actor = %record.actor_email,
            action = record.action_type.as_deref().unwrap_or("-"),
            timestamp = %record.timestamp.to_rfc3339(),
            "interaction recorded"
        );

        if let Err(e) = self.repository.append(&record).await {
            metrics::counter!("vigil_audit_failures_total").increment(1);
            warn!(event_hash = %record.event_hash, "Failed to persist audit record: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::repository::RepositoryError;
    use crate::infrastructure::repositories::InMemoryAuditRepository;
    use chrono::Utc;

    struct FailingAuditRepository;

    #[async_trait]
    impl AuditRepository for FailingAuditRepository {
        async fn append(&self, _record: &AuditRecord) -> Result<(), RepositoryError> {
            Err(RepositoryError::Database("connection reset".to_string()))
        }
        async fn find_by_actor(&self, _actor: &str, _limit: Option<usize>) -> Result<Vec<AuditRecord>, RepositoryError> {
            Ok(vec![])
        }
        async fn list_recent(&self, _limit: usize) -> Result<Vec<AuditRecord>, RepositoryError> {
            Ok(vec![])
        }
    }

    #[tokio::test]
    async fn test_record_persists() {
        let repo = Arc::new(InMemoryAuditRepository::new());
        let logger = AuditLogger::new(repo.clone());
        logger
            .record(AuditRecord::new("alice@corp.local", Some("CLICK".into()), Utc::now()))
            .await;
        assert_eq!(repo.len(), 1);
    }

    #[tokio::test]
    async fn test_record_swallows_store_failure() {
        let logger = AuditLogger::new(Arc::new(FailingAuditRepository));
        // Must not panic or propagate.
        logger
            .record(AuditRecord::new("alice@corp.local", None, Utc::now()))
            .await;
    }
}
