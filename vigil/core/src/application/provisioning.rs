// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! User provisioning: creates users with the default risk state and seeds the
//! bootstrap administrator on an empty store.

use std::sync::Arc;
use thiserror::Error;
use tracing::info;

use crate::domain::clock::Clock;
use crate::domain::repository::{RepositoryError, UserRepository};
use crate::domain::user::{User, UserError, UserRiskState, UserRole};

pub const BOOTSTRAP_ADMIN_EMAIL: &str = "admin@corp.local";

#[derive(Debug, Error)]
pub enum ProvisioningError {
    #[error(transparent)]
    InvalidUser(#[from] UserError),

    #[error("User already exists: {0}")]
    AlreadyExists(String),

    #[error("Repository error: {0}")]
    Repository(RepositoryError),
}

impl From<RepositoryError> for ProvisioningError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::Duplicate(what) => ProvisioningError::AlreadyExists(what),
            other => ProvisioningError::Repository(other),
        }
    }
}

pub struct ProvisioningService {
    users: Arc<dyn UserRepository>,
    clock: Arc<dyn Clock>,
}

impl ProvisioningService {
    pub fn new(users: Arc<dyn UserRepository>, clock: Arc<dyn Clock>) -> Self {
        Self { users, clock }
    }

    pub async fn provision_user(
        &self,
        email: &str,
        role: UserRole,
        department: Option<String>,
    ) -> Result<User, ProvisioningError> {
        let mut user = User::new(email, role, department, self.clock.now())?;
        if self.users.find_by_email(&user.email).await?.is_some() {
            return Err(ProvisioningError::AlreadyExists(user.email));
        }
        user.version = self.users.save(&user).await?;
        info!(user_id = %user.id, email = %user.email, role = %user.role, "User provisioned");
        Ok(user)
    }

    /// Seed the CISO account when no users exist. Returns whether a user was created.
    pub async fn ensure_bootstrap_admin(&self) -> Result<bool, ProvisioningError> {
        if self.users.count().await? > 0 {
            return Ok(false);
        }
        let now = self.clock.now();
        let mut admin = User::new(BOOTSTRAP_ADMIN_EMAIL, UserRole::Ciso, None, now)?;
        admin.risk = UserRiskState::with_risk(0.0, now);
        self.users.save(&admin).await?;
        info!(user_id = %admin.id, "Database initialized with bootstrap administrator");
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::clock::SystemClock;
    use crate::infrastructure::repositories::InMemoryUserRepository;

    fn service() -> (ProvisioningService, Arc<InMemoryUserRepository>) {
        let repo = Arc::new(InMemoryUserRepository::new());
        (ProvisioningService::new(repo.clone(), Arc::new(SystemClock)), repo)
    }

    #[tokio::test]
    async fn test_bootstrap_admin_seeded_once() {
        let (service, repo) = service();
        assert!(service.ensure_bootstrap_admin().await.unwrap());
        assert!(!service.ensure_bootstrap_admin().await.unwrap());

        let admin = repo.find_by_email(BOOTSTRAP_ADMIN_EMAIL).await.unwrap().unwrap();
        assert_eq!(admin.role, UserRole::Ciso);
        assert_eq!(admin.risk.risk_score, 0.0);
        assert_eq!(repo.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_bootstrap_skipped_when_users_exist() {
        let (service, repo) = service();
        service.provision_user("alice@corp.local", UserRole::User, None).await.unwrap();
        assert!(!service.ensure_bootstrap_admin().await.unwrap());
        assert!(repo.find_by_email(BOOTSTRAP_ADMIN_EMAIL).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_provision_user_defaults() {
        let (service, _repo) = service();
        let user = service
            .provision_user("Bob@Corp.Local", UserRole::Analyst, Some("SOC".into()))
            .await
            .unwrap();
        assert_eq!(user.email, "bob@corp.local");
        assert_eq!(user.version, 1);
        assert_eq!(user.risk.risk_score, 10.0);
        assert_eq!(user.department.as_deref(), Some("SOC"));
    }

    #[tokio::test]
    async fn test_provision_duplicate_rejected() {
        let (service, _repo) = service();
        service.provision_user("bob@corp.local", UserRole::User, None).await.unwrap();
        let err = service
            .provision_user("BOB@corp.local", UserRole::User, None)
            .await
            .unwrap_err();
        assert!(matches!(err, ProvisioningError::AlreadyExists(_)));
    }

    #[tokio::test]
    async fn test_provision_invalid_email() {
        let (service, _repo) = service();
        let err = service.provision_user("nobody", UserRole::User, None).await.unwrap_err();
        assert!(matches!(err, ProvisioningError::InvalidUser(_)));
    }
}
