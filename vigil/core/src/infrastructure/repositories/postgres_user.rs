// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

use async_trait::async_trait;
use sqlx::postgres::{PgPool, PgRow};
use sqlx::Row;

use crate::domain::repository::{RepositoryError, UserRepository};
use crate::domain::user::{User, UserId, UserRiskState, UserRole};

const USER_COLUMNS: &str = r#"
    id, email, role, department,
    risk_score, resilience_score, risk_velocity, confidence_index,
    consecutive_safe_campaigns, total_interactions, training_due, last_risk_update,
    version, created_at
"#;

pub struct PostgresUserRepository {
    pool: PgPool,
}

impl PostgresUserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn insert(&self, user: &User) -> Result<u64, RepositoryError> {
        sqlx::query(
            r#"
            INSERT INTO users (
                id, email, role, department,
                risk_score, resilience_score, risk_velocity, confidence_index,
                consecutive_safe_campaigns, total_interactions, training_due, last_risk_update,
                version, created_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, 1, $13)
            "#,
        )
        .bind(user.id.0)
        .bind(&user.email)
        .bind(user.role.as_str())
        .bind(&user.department)
        .bind(user.risk.risk_score)
        .bind(user.risk.resilience_score)
        .bind(user.risk.risk_velocity)
        .bind(user.risk.confidence_index)
        .bind(user.risk.consecutive_safe_campaigns as i32)
        .bind(user.risk.total_interactions as i64)
        .bind(user.risk.training_due)
        .bind(user.risk.last_risk_update)
        .bind(user.created_at)
        .execute(&self.pool)
        .await?;

        Ok(1)
    }

    async fn update(&self, user: &User) -> Result<u64, RepositoryError> {
        let result = sqlx::query(
            r#"
            UPDATE users SET
                email = $3,
                role = $4,
                department = $5,
                risk_score = $6,
                resilience_score = $7,
                risk_velocity = $8,
                confidence_index = $9,
                consecutive_safe_campaigns = $10,
                total_interactions = $11,
                training_due = $12,
                last_risk_update = $13,
                version = version + 1
            WHERE id = $1 AND version = $2
            "#,
        )
        .bind(user.id.0)
        .bind(user.version as i64)
        .bind(&user.email)
        .bind(user.role.as_str())
        .bind(&user.department)
        .bind(user.risk.risk_score)
        .bind(user.risk.resilience_score)
        .bind(user.risk.risk_velocity)
        .bind(user.risk.confidence_index)
        .bind(user.risk.consecutive_safe_campaigns as i32)
        .bind(user.risk.total_interactions as i64)
        .bind(user.risk.training_due)
        .bind(user.risk.last_risk_update)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 1 {
            return Ok(user.version + 1);
        }

        // Zero rows: either the user vanished or someone else saved first.
        let exists = sqlx::query("SELECT 1 FROM users WHERE id = $1")
            .bind(user.id.0)
            .fetch_optional(&self.pool)
            .await?
            .is_some();

        if exists {
            Err(RepositoryError::Conflict {
                entity: format!("user {}", user.id),
                expected: user.version,
            })
        } else {
            Err(RepositoryError::NotFound(format!("user {}", user.id)))
        }
    }
}

fn user_from_row(row: &PgRow) -> Result<User, RepositoryError> {
    let role: String = row.try_get("role")?;
    let role = role
        .parse::<UserRole>()
        .map_err(|e| RepositoryError::Serialization(e.to_string()))?;
    let streak: i32 = row.try_get("consecutive_safe_campaigns")?;
    let interactions: i64 = row.try_get("total_interactions")?;
    let version: i64 = row.try_get("version")?;

    Ok(User {
        id: UserId(row.try_get("id")?),
        email: row.try_get("email")?,
        role,
        department: row.try_get("department")?,
        risk: UserRiskState {
            risk_score: row.try_get("risk_score")?,
            resilience_score: row.try_get("resilience_score")?,
            risk_velocity: row.try_get("risk_velocity")?,
            confidence_index: row.try_get("confidence_index")?,
            consecutive_safe_campaigns: u32::try_from(streak)
                .map_err(|e| RepositoryError::Serialization(e.to_string()))?,
            total_interactions: u64::try_from(interactions)
                .map_err(|e| RepositoryError::Serialization(e.to_string()))?,
            training_due: row.try_get("training_due")?,
            last_risk_update: row.try_get("last_risk_update")?,
        },
        version: u64::try_from(version)
            .map_err(|e| RepositoryError::Serialization(e.to_string()))?,
        created_at: row.try_get("created_at")?,
    })
}

#[async_trait]
impl UserRepository for PostgresUserRepository {
    async fn save(&self, user: &User) -> Result<u64, RepositoryError> {
        if user.version == 0 {
            self.insert(user).await
        } else {
            self.update(user).await
        }
    }

    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, RepositoryError> {
        let row = sqlx::query(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1"))
            .bind(id.0)
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(user_from_row).transpose()
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, RepositoryError> {
        let row = sqlx::query(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE lower(email) = lower($1)"
        ))
        .bind(email.trim())
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(user_from_row).transpose()
    }

    async fn list_all(&self) -> Result<Vec<User>, RepositoryError> {
        let rows = sqlx::query(&format!("SELECT {USER_COLUMNS} FROM users ORDER BY email ASC"))
            .fetch_all(&self.pool)
            .await?;

        rows.iter().map(user_from_row).collect()
    }

    async fn count(&self) -> Result<u64, RepositoryError> {
        let row = sqlx::query("SELECT COUNT(*) AS n FROM users")
            .fetch_one(&self.pool)
            .await?;
        let n: i64 = row.try_get("n")?;
        Ok(n.max(0) as u64)
    }
}
