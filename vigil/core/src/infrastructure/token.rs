// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! # Interaction Tokens
//!
//! Every simulation email carries a short HS256 JWT naming the target user.
//! The landing page posts it back with the interaction kind, and the
//! [`JwtInteractionTokens`] verifier turns it back into a [`UserId`].
//!
//! Claims: `uid`, `iss`, `aud`, `iat`, `exp`. Issuer and audience are pinned
//! from configuration, so a token minted for another surface is rejected even
//! when the signature is valid.

use anyhow::Result;
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::domain::token::{TokenError, TokenVerifier};
use crate::domain::user::UserId;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InteractionClaims {
    pub uid: String,
    pub iss: String,
    pub aud: String,
    pub iat: i64,
    pub exp: i64,
}

pub struct JwtInteractionTokens {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    issuer: String,
    audience: String,
}

impl JwtInteractionTokens {
    pub fn new(secret: &str, issuer: &str, audience: &str) -> Result<Self> {
        if secret.is_empty() {
            return Err(anyhow::anyhow!("secret must not be empty"));
        }
        if issuer.is_empty() {
            return Err(anyhow::anyhow!("issuer must not be empty"));
        }
        if audience.is_empty() {
            return Err(anyhow::anyhow!("audience must not be empty"));
        }
        Ok(Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            issuer: issuer.to_string(),
            audience: audience.to_string(),
        })
    }

    /// Mint a token for `user_id` valid for `ttl` from `now`.
    pub fn issue(&self, user_id: UserId, ttl: Duration, now: DateTime<Utc>) -> Result<String> {
        let claims = InteractionClaims {
            uid: user_id.to_string(),
            iss: self.issuer.clone(),
            aud: self.audience.clone(),
            iat: now.timestamp(),
            exp: (now + ttl).timestamp(),
        };
        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)?;
        Ok(token)
    }

    fn validation(&self) -> Validation {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_required_spec_claims(&["exp", "iss", "aud"]);
        validation.set_issuer(&[&self.issuer]);
        validation.set_audience(&[&self.audience]);
        validation
    }
}

impl TokenVerifier for JwtInteractionTokens {
    fn verify(&self, credential: &str) -> Result<UserId, TokenError> {
        let data = decode::<InteractionClaims>(credential, &self.decoding_key, &self.validation())
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => TokenError::Expired,
                _ => {
                    debug!("Interaction token rejected: {}", e);
                    TokenError::Invalid
                }
            })?;

        UserId::from_string(&data.claims.uid).map_err(|_| TokenError::Invalid)
    }
}
