// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Service wiring shared by the `vigil` subcommands.
//!
//! Loads and validates the configuration manifest, connects the configured
//! storage backend and builds the application services over it.

use anyhow::{Context, Result};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::warn;

use phish_vigil_core::application::repository_factory::{connect_repositories, Repositories};
use phish_vigil_core::application::{
    DashboardService, InteractionService, ProvisioningService, StandardInteractionService,
};
use phish_vigil_core::domain::clock::{Clock, SystemClock};
use phish_vigil_core::domain::repository::StorageBackend;
use phish_vigil_core::domain::vigil_config::VigilConfigManifest;
use phish_vigil_core::infrastructure::{AuditLogger, JwtInteractionTokens};

pub struct VigilRuntime {
    pub config: VigilConfigManifest,
    pub backend: StorageBackend,
    pub repositories: Repositories,
    pub tokens: Arc<JwtInteractionTokens>,
    pub clock: Arc<dyn Clock>,
}

impl VigilRuntime {
    pub async fn load(config_path: Option<PathBuf>) -> Result<Self> {
        let config = VigilConfigManifest::load_or_default(config_path)
            .context("Failed to load configuration")?;
        config.validate().context("Configuration validation failed")?;
        Self::from_config(config).await
    }

    pub async fn from_config(config: VigilConfigManifest) -> Result<Self> {
        let backend = config.spec.storage.to_backend()?;
        let repositories = connect_repositories(&backend)
            .await
            .context("Failed to initialize storage backend")?;

        let security = &config.spec.security;
        let secret = security.resolve_secret()?;
        let tokens = Arc::new(
            JwtInteractionTokens::new(&secret, &security.token_issuer, &security.token_audience)
                .context("Failed to initialize token signer")?,
        );

        Ok(Self {
            config,
            backend,
            repositories,
            tokens,
            clock: Arc::new(SystemClock),
        })
    }

    /// Warn when a one-shot command runs against storage that dies with the process.
    pub fn warn_if_ephemeral(&self) {
        if matches!(self.backend, StorageBackend::InMemory) {
            warn!("Storage backend is in-memory; nothing persists beyond this command");
        }
    }

    pub fn interaction_service(&self) -> Arc<dyn InteractionService> {
        let audit = Arc::new(AuditLogger::new(self.repositories.audit.clone()));
        Arc::new(StandardInteractionService::new(
            self.tokens.clone(),
            self.repositories.users.clone(),
            audit,
            self.clock.clone(),
        ))
    }

    pub fn dashboard_service(&self) -> Arc<DashboardService> {
        Arc::new(DashboardService::new(self.repositories.users.clone()))
    }

    pub fn provisioning_service(&self) -> ProvisioningService {
        ProvisioningService::new(self.repositories.users.clone(), self.clock.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use phish_vigil_core::domain::user::UserRole;

    #[tokio::test]
    async fn test_default_runtime_serves_issued_tokens() {
        let runtime = VigilRuntime::from_config(VigilConfigManifest::default()).await.unwrap();
        let user = runtime
            .provisioning_service()
            .provision_user("carol@corp.local", UserRole::User, None)
            .await
            .unwrap();
        let token = runtime
            .tokens
            .issue(user.id, Duration::minutes(5), runtime.clock.now())
            .unwrap();

        let outcome = runtime
            .interaction_service()
            .record_interaction(&token, Some("REPORT"))
            .await
            .unwrap();
        assert_eq!(outcome.metrics.risk, 0.0);
        assert_eq!(outcome.metrics.resilience, 5.0);

        let org = runtime.dashboard_service().organization_risk().await.unwrap();
        assert_eq!(org.population, 1);
        assert_eq!(runtime.repositories.audit.list_recent(10).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_postgres_without_connection_string_fails() {
        let yaml = r#"
apiVersion: 100monkeys.ai/v1
kind: VigilConfig
metadata:
  name: broken
spec:
  storage:
    backend: postgres
"#;
        let config = VigilConfigManifest::from_yaml_str(yaml).unwrap();
        assert!(VigilRuntime::from_config(config).await.is_err());
    }
}
