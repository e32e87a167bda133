// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

pub mod audit_logger;
pub mod db;
pub mod repositories;
pub mod token;

pub use audit_logger::AuditLogger;
pub use token::JwtInteractionTokens;
