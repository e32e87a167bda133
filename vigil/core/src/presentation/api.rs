// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use std::time::Instant;
use tower_http::trace::TraceLayer;
use tracing::error;

use crate::application::dashboard::{DashboardQueryError, DashboardService};
use crate::application::interaction::{InteractionError, InteractionService};
use crate::domain::risk_engine::round1;

pub struct AppState {
    pub interaction_service: Arc<dyn InteractionService>,
    pub dashboard_service: Arc<DashboardService>,
    pub start_time: Instant,
}

pub fn app(
    interaction_service: Arc<dyn InteractionService>,
    dashboard_service: Arc<DashboardService>,
) -> Router {
    let state = Arc::new(AppState {
        interaction_service,
        dashboard_service,
        start_time: Instant::now(),
    });

    Router::new()
        .route("/api/v5/interact", post(interact))
        .route("/api/v5/dashboard", get(dashboard))
        .route("/health", get(health))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[derive(Debug, Deserialize)]
pub struct InteractRequest {
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
}

async fn interact(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<InteractRequest>,
) -> Response {
    let credential = payload.token.unwrap_or_default();
    match state
        .interaction_service
        .record_interaction(&credential, payload.kind.as_deref())
        .await
    {
        Ok(outcome) => Json(json!({
            "status": "success",
            "metrics": {
                "risk": outcome.metrics.risk,
                "resilience": outcome.metrics.resilience,
            }
        }))
        .into_response(),
        Err(e) => interaction_error_response(e),
    }
}

fn interaction_error_response(err: InteractionError) -> Response {
    let status = match &err {
        InteractionError::Token(_) => StatusCode::BAD_REQUEST,
        InteractionError::UserNotFound(_) => StatusCode::NOT_FOUND,
        InteractionError::Conflict { .. } => StatusCode::CONFLICT,
        InteractionError::Repository(e) => {
            error!("Interaction failed on storage: {}", e);
            StatusCode::INTERNAL_SERVER_ERROR
        }
    };
    (status, Json(json!({ "error": err.to_string() }))).into_response()
}

async fn dashboard(State(state): State<Arc<AppState>>) -> Response {
    match state.dashboard_service.organization_risk().await {
        Ok(org) => Json(json!({
            "Organization Risk": round1(org.avg_risk),
            "Resilience Index": round1(org.avg_resilience),
            "Status": org.status.as_str(),
        }))
        .into_response(),
        Err(DashboardQueryError::Dashboard(_)) => Json(json!({ "msg": "No data" })).into_response(),
        Err(DashboardQueryError::Repository(e)) => {
            error!("Dashboard query failed: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": e.to_string() })),
            )
                .into_response()
        }
    }
}

async fn health(State(state): State<Arc<AppState>>) -> Json<serde_json::Value> {
    Json(json!({
        "status": "healthy",
        "uptime_seconds": state.start_time.elapsed().as_secs(),
    }))
}
