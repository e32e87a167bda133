// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

use std::sync::Arc;
use thiserror::Error;

use crate::domain::dashboard::{aggregate, DashboardError, OrganizationRisk};
use crate::domain::repository::{RepositoryError, UserRepository};

#[derive(Debug, Error)]
pub enum DashboardQueryError {
    #[error(transparent)]
    Dashboard(#[from] DashboardError),

    #[error("Repository error: {0}")]
    Repository(#[from] RepositoryError),
}

/// Read side of the organizational risk dashboard.
pub struct DashboardService {
    users: Arc<dyn UserRepository>,
}

impl DashboardService {
    pub fn new(users: Arc<dyn UserRepository>) -> Self {
        Self { users }
    }

    pub async fn organization_risk(&self) -> Result<OrganizationRisk, DashboardQueryError> {
        let users = self.users.list_all().await?;
        let org = aggregate(users.iter().map(|u| &u.risk))?;
        metrics::gauge!("vigil_org_avg_risk").set(org.avg_risk);
        metrics::gauge!("vigil_org_avg_resilience").set(org.avg_resilience);
        Ok(org)
    }
}
