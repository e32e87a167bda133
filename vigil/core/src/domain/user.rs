// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

// ============================================================================
// Value Objects
// ============================================================================

/// Unique identifier for a simulated-phishing target
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UserId(pub Uuid);

impl UserId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn from_string(s: &str) -> Result<Self, uuid::Error> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}

impl Default for UserId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum UserRole {
    #[default]
    User,
    Analyst,
    Ciso,
    Admin,
}

impl UserRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::User => "USER",
            Self::Analyst => "ANALYST",
            Self::Ciso => "CISO",
            Self::Admin => "ADMIN",
        }
    }
}

impl std::fmt::Display for UserRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for UserRole {
    type Err = UserError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "USER" => Ok(Self::User),
            "ANALYST" => Ok(Self::Analyst),
            "CISO" => Ok(Self::Ciso),
            "ADMIN" => Ok(Self::Admin),
            _ => Err(UserError::UnknownRole(s.to_string())),
        }
    }
}

/// Simulated-phishing interaction reported by a landing page or mail plugin.
///
/// The wire value is an open string; anything other than `CLICK` or `REPORT`
/// lands on [`InteractionKind::Unrecognized`], which carries no score deltas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum InteractionKind {
    Click,
    Report,
    Unrecognized,
}

impl InteractionKind {
    /// Case-sensitive parse of the wire value. `None` (field absent) is unrecognized.
    pub fn parse(raw: Option<&str>) -> Self {
        match raw {
            Some("CLICK") => Self::Click,
            Some("REPORT") => Self::Report,
            _ => Self::Unrecognized,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Click => "CLICK",
            Self::Report => "REPORT",
            Self::Unrecognized => "UNRECOGNIZED",
        }
    }
}

impl std::fmt::Display for InteractionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Risk State
// ============================================================================

/// Per-user susceptibility state recomputed on every interaction.
///
/// Invariants after every update: `risk_score` and `resilience_score` stay in
/// `[0, 100]`, `confidence_index` in `[0, 1]`, and `last_risk_update` never
/// moves backwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserRiskState {
    pub risk_score: f64,
    pub resilience_score: f64,
    /// Signed change of `risk_score` from the previous update.
    pub risk_velocity: f64,
    pub confidence_index: f64,
    pub consecutive_safe_campaigns: u32,
    pub total_interactions: u64,
    /// Remedial training should be scheduled; set on CLICK, cleared externally.
    pub training_due: bool,
    pub last_risk_update: DateTime<Utc>,
}

impl UserRiskState {
    pub const DEFAULT_RISK_SCORE: f64 = 10.0;

    /// Fresh state for a newly provisioned user.
    pub fn new(now: DateTime<Utc>) -> Self {
        Self::with_risk(Self::DEFAULT_RISK_SCORE, now)
    }

    pub fn with_risk(risk_score: f64, now: DateTime<Utc>) -> Self {
        Self {
            risk_score: risk_score.clamp(0.0, 100.0),
            resilience_score: 0.0,
            risk_velocity: 0.0,
            confidence_index: 0.0,
            consecutive_safe_campaigns: 0,
            total_interactions: 0,
            training_due: false,
            last_risk_update: now,
        }
    }
}

// ============================================================================
// Aggregate Root
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub email: String,
    pub role: UserRole,
    pub department: Option<String>,
    pub risk: UserRiskState,
    /// Optimistic-concurrency token, bumped by the repository on every save.
    pub version: u64,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum UserError {
    #[error("Invalid email address: '{0}'")]
    InvalidEmail(String),
    #[error("Unknown role: '{0}'")]
    UnknownRole(String),
}

impl User {
    pub fn new(
        email: impl Into<String>,
        role: UserRole,
        department: Option<String>,
        now: DateTime<Utc>,
    ) -> Result<Self, UserError> {
        let email = email.into().trim().to_ascii_lowercase();
        validate_email(&email)?;
        Ok(Self {
            id: UserId::new(),
            email,
            role,
            department: department.filter(|d| !d.trim().is_empty()),
            risk: UserRiskState::new(now),
            version: 0,
            created_at: now,
        })
    }

    /// Replace the risk state with a newly computed one.
    pub fn apply_risk(&mut self, risk: UserRiskState) {
        self.risk = risk;
    }
}

fn validate_email(email: &str) -> Result<(), UserError> {
    let valid = match email.split_once('@') {
        Some((local, domain)) => !local.is_empty() && !domain.is_empty() && !domain.contains('@'),
        None => false,
    };
    if valid {
        Ok(())
    } else {
        Err(UserError::InvalidEmail(email.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_user_has_default_risk_state() {
        let now = Utc::now();
        let user = User::new("alice@corp.local", UserRole::User, Some("Finance".into()), now).unwrap();
        assert_eq!(user.risk.risk_score, 10.0);
        assert_eq!(user.risk.resilience_score, 0.0);
        assert_eq!(user.risk.total_interactions, 0);
        assert_eq!(user.risk.consecutive_safe_campaigns, 0);
        assert!(!user.risk.training_due);
        assert_eq!(user.risk.last_risk_update, now);
        assert_eq!(user.version, 0);
    }

    #[test]
    fn test_new_user_rejects_bad_email() {
        let now = Utc::now();
        assert!(User::new("", UserRole::User, None, now).is_err());
        assert!(User::new("no-at-sign", UserRole::User, None, now).is_err());
        assert!(User::new("@corp.local", UserRole::User, None, now).is_err());
        assert!(User::new("a@b@c", UserRole::User, None, now).is_err());
    }

    #[test]
    fn test_email_is_normalised() {
        let user = User::new("  Alice@Corp.Local ", UserRole::User, None, Utc::now()).unwrap();
        assert_eq!(user.email, "alice@corp.local");
    }

    #[test]
    fn test_blank_department_is_dropped() {
        let user = User::new("bob@corp.local", UserRole::User, Some("  ".into()), Utc::now()).unwrap();
        assert_eq!(user.department, None);
    }

    #[test]
    fn test_interaction_kind_parse_is_case_sensitive() {
        assert_eq!(InteractionKind::parse(Some("CLICK")), InteractionKind::Click);
        assert_eq!(InteractionKind::parse(Some("REPORT")), InteractionKind::Report);
        assert_eq!(InteractionKind::parse(Some("click")), InteractionKind::Unrecognized);
        assert_eq!(InteractionKind::parse(Some("NOOP")), InteractionKind::Unrecognized);
        assert_eq!(InteractionKind::parse(None), InteractionKind::Unrecognized);
    }

    #[test]
    fn test_role_parse_and_serde() {
        assert_eq!("ciso".parse::<UserRole>().unwrap(), UserRole::Ciso);
        assert!("janitor".parse::<UserRole>().is_err());
        assert_eq!(serde_json::to_string(&UserRole::Ciso).unwrap(), "\"CISO\"");
    }
}
