// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

use async_trait::async_trait;
use sqlx::postgres::{PgPool, PgRow};
use sqlx::Row;

use crate::domain::audit::AuditRecord;
use crate::domain::repository::{AuditRepository, RepositoryError};

pub struct PostgresAuditRepository {
    pool: PgPool,
}

impl PostgresAuditRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Postgres LIMIT is a signed BIGINT; oversized limits saturate.
fn sql_limit(limit: usize) -> i64 {
    i64::try_from(limit).unwrap_or(i64::MAX)
}

fn record_from_row(row: &PgRow) -> Result<AuditRecord, RepositoryError> {
    Ok(AuditRecord {
        id: row.try_get("id")?,
        event_hash: row.try_get("event_hash")?,
        timestamp: row.try_get("timestamp")?,
        actor_email: row.try_get("actor_email")?,
        action_type: row.try_get("action_type")?,
        metadata: row.try_get("metadata_json")?,
    })
}

#[async_trait]
impl AuditRepository for PostgresAuditRepository {
    async fn append(&self, record: &AuditRecord) -> Result<(), RepositoryError> {
        sqlx::query(
            r#"
            INSERT INTO audit_logs (id, event_hash, timestamp, actor_email, action_type, metadata_json)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(record.id)
        .bind(&record.event_hash)
        .bind(record.timestamp)
        .bind(&record.actor_email)
        .bind(&record.action_type)
        .bind(&record.metadata)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn find_by_actor(
        &self,
        actor_email: &str,
        limit: Option<usize>,
    ) -> Result<Vec<AuditRecord>, RepositoryError> {
        let limit = limit.map(sql_limit).unwrap_or(i64::MAX);
        let rows = sqlx::query(
            r#"
            SELECT id, event_hash, timestamp, actor_email, action_type, metadata_json
            FROM audit_logs
            WHERE lower(actor_email) = lower($1)
            ORDER BY timestamp DESC
            LIMIT $2
            "#,
        )
        .bind(actor_email)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(record_from_row).collect()
    }

    async fn list_recent(&self, limit: usize) -> Result<Vec<AuditRecord>, RepositoryError> {
        let rows = sqlx::query(
            r#"
            SELECT id, event_hash, timestamp, actor_email, action_type, metadata_json
            FROM audit_logs
            ORDER BY timestamp DESC
            LIMIT $1
            "#,
        )
        .bind(sql_limit(limit))
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(record_from_row).collect()
    }
}
