// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Interaction service tests over the in-memory adapters.

use async_trait::async_trait;
use chrono::{Duration, TimeZone, Utc};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use phish_vigil_core::application::interaction::{
    InteractionError, InteractionService, StandardInteractionService,
};
use phish_vigil_core::domain::audit::AuditSink;
use phish_vigil_core::domain::clock::{Clock, FixedClock};
use phish_vigil_core::domain::repository::{AuditRepository, RepositoryError, UserRepository};
use phish_vigil_core::domain::token::{TokenError, TokenVerifier};
use phish_vigil_core::domain::user::{InteractionKind, User, UserId, UserRole};
use phish_vigil_core::infrastructure::repositories::{InMemoryAuditRepository, InMemoryUserRepository};
use phish_vigil_core::infrastructure::AuditLogger;

struct StaticVerifier {
    tokens: HashMap<String, UserId>,
}

impl TokenVerifier for StaticVerifier {
    fn verify(&self, credential: &str) -> Result<UserId, TokenError> {
        match credential {
            "expired" => Err(TokenError::Expired),
            other => self.tokens.get(other).copied().ok_or(TokenError::Invalid),
        }
    }
}

struct Harness {
    service: StandardInteractionService,
    users: InMemoryUserRepository,
    audit: InMemoryAuditRepository,
    clock: Arc<FixedClock>,
    alice: UserId,
}

async fn harness_with(users_port: Option<Arc<dyn UserRepository>>, users: InMemoryUserRepository) -> Harness {
    let clock = Arc::new(FixedClock::new(Utc.with_ymd_and_hms(2026, 3, 2, 9, 0, 0).unwrap()));
    let alice = User::new("alice@corp.local", UserRole::User, Some("Finance".into()), clock.now())
        .unwrap();
    let alice_id = alice.id;
    users.save(&alice).await.unwrap();

    let mut tokens = HashMap::new();
    tokens.insert("alice-token".to_string(), alice_id);
    tokens.insert("ghost-token".to_string(), UserId::new());

    let audit = InMemoryAuditRepository::new();
    let sink: Arc<dyn AuditSink> = Arc::new(AuditLogger::new(Arc::new(audit.clone())));
    let port: Arc<dyn UserRepository> = match users_port {
        Some(port) => port,
        None => Arc::new(users.clone()),
    };

    let service = StandardInteractionService::new(
        Arc::new(StaticVerifier { tokens }),
        port,
        sink,
        clock.clone(),
    );

    Harness {
        service,
        users,
        audit,
        clock,
        alice: alice_id,
    }
}

async fn harness() -> Harness {
    harness_with(None, InMemoryUserRepository::new()).await
}

#[tokio::test]
async fn click_raises_risk_and_flags_training() {
    let h = harness().await;

    let outcome = h.service.record_interaction("alice-token", Some("CLICK")).await.unwrap();

    assert_eq!(outcome.kind, InteractionKind::Click);
    assert_eq!(outcome.metrics.risk, 35.0);
    assert_eq!(outcome.metrics.resilience, 0.0);
    assert!(outcome.training_newly_due);

    let stored = h.users.find_by_id(h.alice).await.unwrap().unwrap();
    assert_eq!(stored.version, 2);
    assert_eq!(stored.risk.risk_velocity, 25.0);
    assert_eq!(stored.risk.total_interactions, 1);
    assert_eq!(stored.risk.confidence_index, 0.1);
    assert!(stored.risk.training_due);
}

#[tokio::test]
async fn second_click_does_not_report_training_again() {
    let h = harness().await;
    h.service.record_interaction("alice-token", Some("CLICK")).await.unwrap();
    h.clock.advance(Duration::seconds(5));

    let outcome = h.service.record_interaction("alice-token", Some("CLICK")).await.unwrap();
    assert!(!outcome.training_newly_due);
    assert_eq!(outcome.metrics.risk, 60.0);
}

#[tokio::test]
async fn report_streak_earns_bonus() {
    let h = harness().await;

    let mut last = None;
    for _ in 0..3 {
        last = Some(h.service.record_interaction("alice-token", Some("REPORT")).await.unwrap());
        h.clock.advance(Duration::seconds(1));
    }

    let outcome = last.unwrap();
    assert_eq!(outcome.metrics.risk, 0.0);
    assert_eq!(outcome.metrics.resilience, 17.5);
    assert_eq!(outcome.state.consecutive_safe_campaigns, 3);
    assert_eq!(h.audit.len(), 3);
}

#[tokio::test]
async fn risk_decays_between_campaigns() {
    let h = harness().await;
    h.service.record_interaction("alice-token", Some("CLICK")).await.unwrap();
    h.clock.advance(Duration::days(30));

    let outcome = h.service.record_interaction("alice-token", Some("REPORT")).await.unwrap();
    // 35 * e^-0.3 - 15
    assert_eq!(outcome.metrics.risk, 10.9);
}

#[tokio::test]
async fn unrecognized_kind_only_touches_counters() {
    let h = harness().await;

    let outcome = h.service.record_interaction("alice-token", Some("click")).await.unwrap();
    assert_eq!(outcome.kind, InteractionKind::Unrecognized);
    assert_eq!(outcome.metrics.risk, 10.0);
    assert_eq!(outcome.state.total_interactions, 1);
    assert!(!outcome.training_newly_due);

    let records = h.audit.find_by_actor("alice@corp.local", None).await.unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].action_type.as_deref(), Some("click"));
}

#[tokio::test]
async fn missing_kind_is_audited_without_action() {
    let h = harness().await;
    let outcome = h.service.record_interaction("alice-token", None).await.unwrap();
    assert_eq!(outcome.kind, InteractionKind::Unrecognized);

    let records = h.audit.list_recent(10).await.unwrap();
    assert_eq!(records[0].action_type, None);
}

#[tokio::test]
async fn bad_tokens_are_rejected_before_any_write() {
    let h = harness().await;

    let err = h.service.record_interaction("forged", Some("CLICK")).await.unwrap_err();
    assert!(matches!(err, InteractionError::Token(TokenError::Invalid)));
    assert_eq!(err.to_string(), "Invalid Token");

    let err = h.service.record_interaction("expired", Some("CLICK")).await.unwrap_err();
    assert!(matches!(err, InteractionError::Token(TokenError::Expired)));
    assert_eq!(err.to_string(), "Token Expired");

    assert!(h.audit.is_empty());
    let stored = h.users.find_by_id(h.alice).await.unwrap().unwrap();
    assert_eq!(stored.version, 1);
}

#[tokio::test]
async fn unknown_user_is_not_found() {
    let h = harness().await;
    let err = h.service.record_interaction("ghost-token", Some("CLICK")).await.unwrap_err();
    assert!(matches!(err, InteractionError::UserNotFound(_)));
    assert!(h.audit.is_empty());
}

/// Lets another writer slip in an update before the first save.
struct RacingUserRepository {
    inner: InMemoryUserRepository,
    raced: AtomicBool,
}

#[async_trait]
impl UserRepository for RacingUserRepository {
    async fn save(&self, user: &User) -> Result<u64, RepositoryError> {
        if !self.raced.swap(true, Ordering::SeqCst) {
            let mut other = self.inner.find_by_id(user.id).await?.unwrap();
            other.risk.total_interactions += 1;
            self.inner.save(&other).await?;
        }
        self.inner.save(user).await
    }
    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, RepositoryError> {
        self.inner.find_by_id(id).await
    }
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, RepositoryError> {
        self.inner.find_by_email(email).await
    }
    async fn list_all(&self) -> Result<Vec<User>, RepositoryError> {
        self.inner.list_all().await
    }
    async fn count(&self) -> Result<u64, RepositoryError> {
        self.inner.count().await
    }
}

struct AlwaysConflictingUserRepository {
    inner: InMemoryUserRepository,
}

#[async_trait]
impl UserRepository for AlwaysConflictingUserRepository {
    async fn save(&self, user: &User) -> Result<u64, RepositoryError> {
        Err(RepositoryError::Conflict {
            entity: format!("user {}", user.id),
            expected: user.version,
        })
    }
    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, RepositoryError> {
        self.inner.find_by_id(id).await
    }
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, RepositoryError> {
        self.inner.find_by_email(email).await
    }
    async fn list_all(&self) -> Result<Vec<User>, RepositoryError> {
        self.inner.list_all().await
    }
    async fn count(&self) -> Result<u64, RepositoryError> {
        self.inner.count().await
    }
}

#[tokio::test]
async fn lost_race_is_retried_on_fresh_state() {
    let users = InMemoryUserRepository::new();
    let racing: Arc<dyn UserRepository> = Arc::new(RacingUserRepository {
        inner: users.clone(),
        raced: AtomicBool::new(false),
    });
    let h = harness_with(Some(racing), users).await;

    let outcome = h.service.record_interaction("alice-token", Some("CLICK")).await.unwrap();

    // The competing writer's increment is preserved.
    assert_eq!(outcome.state.total_interactions, 2);
    let stored = h.users.find_by_id(h.alice).await.unwrap().unwrap();
    assert_eq!(stored.version, 3);
    assert_eq!(stored.risk.risk_score, 35.0);
}

#[tokio::test]
async fn persistent_conflict_gives_up() {
    let users = InMemoryUserRepository::new();
    let conflicting: Arc<dyn UserRepository> =
        Arc::new(AlwaysConflictingUserRepository { inner: users.clone() });
    let h = harness_with(Some(conflicting), users).await;

    let err = h.service.record_interaction("alice-token", Some("REPORT")).await.unwrap_err();
    assert!(matches!(err, InteractionError::Conflict { attempts: 3, .. }));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_interactions_are_all_counted() {
    let h = harness().await;
    let service = Arc::new(h.service.with_max_attempts(100));

    let mut handles = Vec::new();
    for _ in 0..20 {
        let service = service.clone();
        handles.push(tokio::spawn(async move {
            service.record_interaction("alice-token", Some("REPORT")).await
        }));
    }
    for handle in handles {
        handle.await.unwrap().unwrap();
    }

    let stored = h.users.find_by_id(h.alice).await.unwrap().unwrap();
    assert_eq!(stored.risk.total_interactions, 20);
    assert_eq!(stored.risk.consecutive_safe_campaigns, 20);
    assert_eq!(stored.version, 21);
}
