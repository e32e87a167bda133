// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Phish-Vigil core: risk scoring engine, services and HTTP surface.
//!
//! # Architecture
//!
//! - **domain**: risk engine, user aggregate, repository and token ports
//! - **application**: interaction, dashboard and provisioning services
//! - **infrastructure**: PostgreSQL and in-memory repositories, JWT tokens, audit logger
//! - **presentation**: axum router

pub mod application;
pub mod domain;
pub mod infrastructure;
pub mod presentation;

pub use domain::*;
