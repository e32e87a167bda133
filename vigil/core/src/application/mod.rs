// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

pub mod dashboard;
pub mod interaction;
pub mod provisioning;
pub mod repository_factory;

pub use dashboard::{DashboardQueryError, DashboardService};
pub use interaction::{InteractionError, InteractionOutcome, InteractionService, StandardInteractionService};
pub use provisioning::{ProvisioningError, ProvisioningService};
