// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Repository Implementations
//!
//! Infrastructure implementations of the repository abstractions defined in
//! `crate::domain::repository`.
//!
//! # Available Implementations
//!
//! ## PostgreSQL Repositories
//!
//! - **PostgresUserRepository** - Users and their risk state, version-checked updates
//! - **PostgresAuditRepository** - Append-only interaction audit log
//!
//! ## In-Memory Repositories
//!
//! Lightweight implementations for development and tests:
//! - **InMemoryUserRepository** - `RwLock<HashMap>` with the same version semantics
//! - **InMemoryAuditRepository** - Append-only `Vec`
//!
//! # Usage
//!
//! ```ignore
//! use sqlx::PgPool;
//! use repositories::PostgresUserRepository;
//!
//! let pool = PgPool::connect(&database_url).await?;
//! let repo = PostgresUserRepository::new(pool);
//! let user = repo.find_by_email("alice@corp.local").await?;
//! ```

pub mod postgres_audit;
pub mod postgres_user;

pub use postgres_audit::PostgresAuditRepository;
pub use postgres_user::PostgresUserRepository;

use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;

use crate::domain::audit::AuditRecord;
use crate::domain::repository::{AuditRepository, RepositoryError, UserRepository};
use crate::domain::user::{User, UserId};

#[derive(Clone, Default)]
pub struct InMemoryUserRepository {
    users: Arc<RwLock<HashMap<UserId, User>>>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn save(&self, user: &User) -> Result<u64, RepositoryError> {
        let mut users = self.users.write();

        match users.get(&user.id) {
            Some(existing) if existing.version != user.version => {
                return Err(RepositoryError::Conflict {
                    entity: format!("user {}", user.id),
                    expected: user.version,
                });
            }
            Some(_) => {}
            None if user.version != 0 => {
                return Err(RepositoryError::NotFound(format!("user {}", user.id)));
            }
            None => {}
        }

        let email_taken = users
            .values()
            .any(|u| u.id != user.id && u.email.eq_ignore_ascii_case(&user.email));
        if email_taken {
            return Err(RepositoryError::Duplicate(format!("email {}", user.email)));
        }

        let mut stored = user.clone();
        stored.version = user.version + 1;
        let version = stored.version;
        users.insert(stored.id, stored);
        Ok(version)
    }

    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, RepositoryError> {
        Ok(self.users.read().get(&id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, RepositoryError> {
        let users = self.users.read();
        Ok(users
            .values()
            .find(|u| u.email.eq_ignore_ascii_case(email.trim()))
            .cloned())
    }

    async fn list_all(&self) -> Result<Vec<User>, RepositoryError> {
        let users = self.users.read();
        let mut all: Vec<User> = users.values().cloned().collect();
        all.sort_by(|a, b| a.email.cmp(&b.email));
        Ok(all)
    }

    async fn count(&self) -> Result<u64, RepositoryError> {
        Ok(self.users.read().len() as u64)
    }
}

#[derive(Clone, Default)]
pub struct InMemoryAuditRepository {
    records: Arc<RwLock<Vec<AuditRecord>>>,
}

impl InMemoryAuditRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.records.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.read().is_empty()
    }
}

#[async_trait]
impl AuditRepository for InMemoryAuditRepository {
    async fn append(&self, record: &AuditRecord) -> Result<(), RepositoryError> {
        let mut records = self.records.write();
        if records.iter().any(|r| r.event_hash == record.event_hash) {
            return Err(RepositoryError::Duplicate(format!(
                "audit event {}",
                record.event_hash
            )));
        }
        records.push(record.clone());
        Ok(())
    }

    async fn find_by_actor(
        &self,
        actor_email: &str,
        limit: Option<usize>,
    ) -> Result<Vec<AuditRecord>, RepositoryError> {
        let records = self.records.read();
        let matching = records
            .iter()
            .rev()
            .filter(|r| r.actor_email.eq_ignore_ascii_case(actor_email))
            .take(limit.unwrap_or(usize::MAX))
            .cloned()
            .collect();
        Ok(matching)
    }

    async fn list_recent(&self, limit: usize) -> Result<Vec<AuditRecord>, RepositoryError> {
        let records = self.records.read();
        Ok(records.iter().rev().take(limit).cloned().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::user::UserRole;
    use chrono::{Duration, Utc};

    fn user(email: &str) -> User {
        User::new(email, UserRole::User, None, Utc::now()).unwrap()
    }

    #[tokio::test]
    async fn test_insert_then_update_bumps_version() {
        let repo = InMemoryUserRepository::new();
        let mut alice = user("alice@corp.local");

        alice.version = repo.save(&alice).await.unwrap();
        assert_eq!(alice.version, 1);

        alice.risk.risk_score = 35.0;
        alice.version = repo.save(&alice).await.unwrap();
        assert_eq!(alice.version, 2);

        let stored = repo.find_by_id(alice.id).await.unwrap().unwrap();
        assert_eq!(stored.risk.risk_score, 35.0);
        assert_eq!(stored.version, 2);
    }

    #[tokio::test]
    async fn test_stale_version_conflicts() {
        let repo = InMemoryUserRepository::new();
        let alice = user("alice@corp.local");
        repo.save(&alice).await.unwrap();

        let first = repo.find_by_id(alice.id).await.unwrap().unwrap();
        let second = first.clone();

        repo.save(&first).await.unwrap();
        let err = repo.save(&second).await.unwrap_err();
        assert!(err.is_conflict());
    }

    #[tokio::test]
    async fn test_duplicate_email_rejected() {
        let repo = InMemoryUserRepository::new();
        repo.save(&user("alice@corp.local")).await.unwrap();
        let err = repo.save(&user("ALICE@corp.local")).await.unwrap_err();
        assert!(matches!(err, RepositoryError::Duplicate(_)));
        assert_eq!(repo.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_update_of_unknown_user_is_not_found() {
        let repo = InMemoryUserRepository::new();
        let mut ghost = user("ghost@corp.local");
        ghost.version = 3;
        assert!(matches!(
            repo.save(&ghost).await,
            Err(RepositoryError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_find_by_email_ignores_case() {
        let repo = InMemoryUserRepository::new();
        let alice = user("alice@corp.local");
        repo.save(&alice).await.unwrap();
        let found = repo.find_by_email("Alice@Corp.Local").await.unwrap().unwrap();
        assert_eq!(found.id, alice.id);
    }

    #[tokio::test]
    async fn test_audit_newest_first_and_unique_hash() {
        let repo = InMemoryAuditRepository::new();
        let t = Utc::now();
        let a = AuditRecord::new("alice@corp.local", Some("CLICK".into()), t);
        let b = AuditRecord::new("bob@corp.local", Some("REPORT".into()), t + Duration::seconds(1));
        let c = AuditRecord::new("alice@corp.local", None, t + Duration::seconds(2));
        repo.append(&a).await.unwrap();
        repo.append(&b).await.unwrap();
        repo.append(&c).await.unwrap();

        assert!(matches!(repo.append(&a).await, Err(RepositoryError::Duplicate(_))));

        let recent = repo.list_recent(2).await.unwrap();
        assert_eq!(recent, vec![c.clone(), b.clone()]);

        let alice = repo.find_by_actor("alice@corp.local", None).await.unwrap();
        assert_eq!(alice, vec![c, a]);
        assert_eq!(repo.len(), 3);
    }
}
