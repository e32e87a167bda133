// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! # Presentation Layer (`phish-vigil-core`)
//!
//! HTTP surface that translates external requests into application service
//! calls. No risk arithmetic lives here.
//!
//! | Module | Transport | Description |
//! |--------|-----------|-------------|
//! | [`api`] | HTTP (Axum) | Interaction ingestion, organization dashboard, health |

pub mod api;
