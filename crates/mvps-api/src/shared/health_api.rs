//! Health Check Endpoints
//!
//! Standard probes for orchestrators and monitoring.
//! - /health - Combined health status
//! - /health/live - Liveness probe
//! - /health/ready - Readiness probe
//! - /health/startup - Startup probe

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::SqlitePool;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use utoipa::ToSchema;
use utoipa_axum::{router::OpenApiRouter, routes};

/// Health status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "UPPERCASE")]
pub enum HealthStatus {
    Up,
    Down,
    /// Serving, but startup has not completed
    Degraded,
}

/// Individual health check result
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct HealthCheck {
    pub name: String,
    pub status: HealthStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_ms: Option<u64>,
}

/// Full health response
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub status: HealthStatus,
    pub timestamp: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub checks: Vec<HealthCheck>,
}

/// Simple health status response
#[derive(Debug, Serialize, ToSchema)]
pub struct SimpleHealthResponse {
    pub status: HealthStatus,
}

/// Health service state
#[derive(Clone)]
pub struct HealthState {
    pub pool: SqlitePool,
    pub version: Option<String>,
    pub started_at: DateTime<Utc>,
    /// Set once schema and seeding are done
    ready: Arc<AtomicBool>,
}

impl HealthState {
    pub fn new(pool: SqlitePool, version: Option<String>) -> Self {
        Self {
            pool,
            version,
            started_at: Utc::now(),
            ready: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn set_ready(&self) {
        self.ready.store(true, Ordering::SeqCst);
    }

    pub fn is_ready(&self) -> bool {
        self.ready.load(Ordering::SeqCst)
    }

    async fn check_database(&self) -> HealthCheck {
        let start = std::time::Instant::now();

        match sqlx::query("SELECT 1").execute(&self.pool).await {
            Ok(_) => HealthCheck {
                name: "database".to_string(),
                status: HealthStatus::Up,
                message: None,
                duration_ms: Some(start.elapsed().as_millis() as u64),
            },
            Err(e) => HealthCheck {
                name: "database".to_string(),
                status: HealthStatus::Down,
                message: Some(format!("Ping failed: {}", e)),
                duration_ms: Some(start.elapsed().as_millis() as u64),
            },
        }
    }
}

fn status_code_for(status: HealthStatus) -> StatusCode {
    if status == HealthStatus::Down {
        StatusCode::SERVICE_UNAVAILABLE
    } else {
        StatusCode::OK
    }
}

/// Combined health check
#[utoipa::path(
    get,
    path = "",
    tag = "health",
    responses(
        (status = 200, description = "Service is healthy", body = HealthResponse),
        (status = 503, description = "Service is unhealthy", body = HealthResponse)
    )
)]
pub async fn get_health(State(state): State<HealthState>) -> Response {
    let check = state.check_database().await;

    let mut overall = check.status;
    if overall == HealthStatus::Up && !state.is_ready() {
        overall = HealthStatus::Degraded;
    }

    let response = HealthResponse {
        status: overall,
        timestamp: Utc::now(),
        version: state.version.clone(),
        checks: vec![check],
    };

    (status_code_for(overall), Json(response)).into_response()
}

/// Liveness probe
///
/// Always 200 while the process serves requests.
#[utoipa::path(
    get,
    path = "/live",
    tag = "health",
    responses(
        (status = 200, description = "Service is alive", body = SimpleHealthResponse)
    )
)]
pub async fn get_liveness() -> Json<SimpleHealthResponse> {
    Json(SimpleHealthResponse {
        status: HealthStatus::Up,
    })
}

/// Readiness probe
#[utoipa::path(
    get,
    path = "/ready",
    tag = "health",
    responses(
        (status = 200, description = "Service is ready", body = SimpleHealthResponse),
        (status = 503, description = "Service is not ready", body = SimpleHealthResponse)
    )
)]
pub async fn get_readiness(State(state): State<HealthState>) -> Response {
    let status = if state.is_ready() {
        state.check_database().await.status
    } else {
        HealthStatus::Down
    };

    (status_code_for(status), Json(SimpleHealthResponse { status })).into_response()
}

/// Startup probe
#[utoipa::path(
    get,
    path = "/startup",
    tag = "health",
    responses(
        (status = 200, description = "Startup complete", body = SimpleHealthResponse),
        (status = 503, description = "Still starting", body = SimpleHealthResponse)
    )
)]
pub async fn get_startup(State(state): State<HealthState>) -> Response {
    let status = if state.is_ready() {
        HealthStatus::Up
    } else {
        HealthStatus::Down
    };

    (status_code_for(status), Json(SimpleHealthResponse { status })).into_response()
}

/// Create health router
pub fn health_router(state: HealthState) -> OpenApiRouter {
    OpenApiRouter::new()
        .routes(routes!(get_health))
        .routes(routes!(get_liveness))
        .routes(routes!(get_readiness))
        .routes(routes!(get_startup))
        .with_state(state)
}
