// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! # Domain Layer
//!
//! The risk model and the contracts its collaborators implement. Nothing in
//! here performs I/O.
//!
//! | Module | Contents |
//! |--------|----------|
//! | [`user`] | `User` aggregate, `UserRiskState`, `InteractionKind` |
//! | [`risk_engine`] | Decay, event deltas, streak bonus, derived metrics |
//! | [`dashboard`] | Organization-wide aggregation |
//! | [`audit`] | Audit records and the `AuditSink` contract |
//! | [`repository`] | Persistence contracts |
//! | [`token`] | Interaction credential verification contract |
//! | [`clock`] | Injected time source |
//! | [`vigil_config`] | Node configuration manifest |

pub mod audit;
pub mod clock;
pub mod dashboard;
pub mod repository;
pub mod risk_engine;
pub mod token;
pub mod user;
pub mod vigil_config;
