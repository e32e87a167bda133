// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Repository Factory
//!
//! Creates concrete repository implementations from the configured
//! [`StorageBackend`]. The domain layer only sees the traits; the PostgreSQL
//! variants share one connection pool.

use anyhow::Result;
use sqlx::PgPool;
use std::sync::Arc;
use tracing::info;

use crate::domain::repository::{AuditRepository, StorageBackend, UserRepository};
use crate::infrastructure::db::Database;
use crate::infrastructure::repositories::{
    InMemoryAuditRepository, InMemoryUserRepository, PostgresAuditRepository, PostgresUserRepository,
};

/// Creates a UserRepository implementation based on the configured backend.
///
/// `pool` must be `Some` for the PostgreSQL backend.
pub fn create_user_repository(
    backend: &StorageBackend,
    pool: Option<PgPool>,
) -> Result<Arc<dyn UserRepository>> {
    match (backend, pool) {
        (StorageBackend::InMemory, _) => Ok(Arc::new(InMemoryUserRepository::new())),
        (StorageBackend::PostgreSQL(_), Some(pool)) => Ok(Arc::new(PostgresUserRepository::new(pool))),
        (StorageBackend::PostgreSQL(_), None) => {
            anyhow::bail!("PostgreSQL backend configured without a connection pool")
        }
    }
}

/// Creates an AuditRepository implementation based on the configured backend.
pub fn create_audit_repository(
    backend: &StorageBackend,
    pool: Option<PgPool>,
) -> Result<Arc<dyn AuditRepository>> {
    match (backend, pool) {
        (StorageBackend::InMemory, _) => Ok(Arc::new(InMemoryAuditRepository::new())),
        (StorageBackend::PostgreSQL(_), Some(pool)) => Ok(Arc::new(PostgresAuditRepository::new(pool))),
        (StorageBackend::PostgreSQL(_), None) => {
            anyhow::bail!("PostgreSQL backend configured without a connection pool")
        }
    }
}

pub struct Repositories {
    pub users: Arc<dyn UserRepository>,
    pub audit: Arc<dyn AuditRepository>,
}

/// Connects to the backend (if it needs a connection) and builds both repositories.
pub async fn connect_repositories(backend: &StorageBackend) -> Result<Repositories> {
    let pool = match backend {
        StorageBackend::InMemory => {
            info!("Using in-memory storage; state is lost on shutdown");
            None
        }
        StorageBackend::PostgreSQL(config) => {
            let db = Database::new(config).await?;
            info!("Connected to PostgreSQL");
            Some(db.get_pool().clone())
        }
    };

    Ok(Repositories {
        users: create_user_repository(backend, pool.clone())?,
        audit: create_audit_repository(backend, pool)?,
    })
}
