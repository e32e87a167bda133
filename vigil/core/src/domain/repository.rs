// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! # Domain Repository Interfaces
//!
//! Persistence contracts for each aggregate, defined in the domain layer and
//! implemented in `crate::infrastructure::repositories`.
//!
//! | Trait | Aggregate | Implementations |
//! |-------|-----------|----------------|
//! | `UserRepository` | `User` | `InMemoryUserRepository`, `PostgresUserRepository` |
//! | `AuditRepository` | `AuditRecord` | `InMemoryAuditRepository`, `PostgresAuditRepository` |
//!
//! ## Optimistic Concurrency
//!
//! `UserRepository::save` is a compare-and-swap on `User::version`. Two
//! interactions racing on the same user cannot both win: the loser gets
//! [`RepositoryError::Conflict`] and must reload and reapply.

use async_trait::async_trait;

use crate::domain::audit::AuditRecord;
use crate::domain::user::{User, UserId};

/// Storage backend enum for pluggable persistence
#[derive(Debug, Clone)]
pub enum StorageBackend {
    InMemory,
    PostgreSQL(PostgresConfig),
}

#[derive(Debug, Clone)]
pub struct PostgresConfig {
    pub connection_string: String,
    pub max_connections: u32,
}

#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Insert (version 0) or update (matching version). Returns the stored version.
    async fn save(&self, user: &User) -> Result<u64, RepositoryError>;

    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, RepositoryError>;

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, RepositoryError>;

    async fn list_all(&self) -> Result<Vec<User>, RepositoryError>;

    async fn count(&self) -> Result<u64, RepositoryError>;
}

#[async_trait]
pub trait AuditRepository: Send + Sync {
    async fn append(&self, record: &AuditRecord) -> Result<(), RepositoryError>;

    /// Records for one actor, newest first.
    async fn find_by_actor(&self, actor_email: &str, limit: Option<usize>) -> Result<Vec<AuditRecord>, RepositoryError>;

    /// Newest records first.
    async fn list_recent(&self, limit: usize) -> Result<Vec<AuditRecord>, RepositoryError>;
}

/// Repository errors
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("Entity not found: {0}")]
    NotFound(String),

    #[error("Concurrent modification of {entity}: expected version {expected}")]
    Conflict { entity: String, expected: u64 },

    #[error("Duplicate entity: {0}")]
    Duplicate(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl RepositoryError {
    pub fn is_conflict(&self) -> bool {
        matches!(self, Self::Conflict { .. })
    }
}

impl From<sqlx::Error> for RepositoryError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => RepositoryError::NotFound("Row not found".to_string()),
            sqlx::Error::Database(ref db) if db.is_unique_violation() => {
                RepositoryError::Duplicate(db.message().to_string())
            }
            _ => RepositoryError::Database(err.to_string()),
        }
    }
}

impl From<serde_json::Error> for RepositoryError {
    fn from(err: serde_json::Error) -> Self {
        RepositoryError::Serialization(err.to_string())
    }
}
