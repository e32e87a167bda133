// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

use thiserror::Error;

use crate::domain::user::UserId;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TokenError {
    #[error("Invalid Token")]
    Invalid,
    #[error("Token Expired")]
    Expired,
}

/// Maps the opaque credential embedded in a simulation email to the user it was issued for.
pub trait TokenVerifier: Send + Sync {
    fn verify(&self, credential: &str) -> Result<UserId, TokenError>;
}
