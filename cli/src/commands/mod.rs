// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Command implementations for the Phish-Vigil CLI

pub mod audit;
pub mod config;
pub mod dashboard;
pub mod serve;
pub mod token;
pub mod update;
pub mod user;

pub use self::audit::AuditCommand;
pub use self::config::ConfigCommand;
pub use self::dashboard::DashboardCommand;
pub use self::serve::ServeCommand;
pub use self::token::TokenCommand;
pub use self::update::UpdateCommand;
pub use self::user::UserCommand;
