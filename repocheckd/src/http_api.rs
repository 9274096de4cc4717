//! HTTP API for repository checks.
//!
//! Provides:
//! - `/check?url=<repo>` - Run the validation pipeline for one repository
//! - `/health` - Basic daemon health check
//! - `/rules` - Rejection catalog

use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::{
    Json, Router,
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
};
use repocheck_common::{Pipeline, RejectionCode, Verdict};
use serde::Deserialize;
use serde_json::json;
use tracing::{info, warn};

/// Shared state for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    /// Validation pipeline shared by all requests.
    pub pipeline: Pipeline,
    /// Deadline for one validation run.
    pub deadline: Duration,
    /// Daemon version.
    pub version: &'static str,
    /// Daemon start time.
    pub started_at: Instant,
    /// Daemon PID.
    pub pid: u32,
}

#[derive(Debug, Deserialize)]
pub struct CheckParams {
    url: Option<String>,
}

/// Create the HTTP router.
pub fn create_router(state: HttpState) -> Router {
    Router::new()
        .route("/check", get(check_handler))
        .route("/health", get(health_handler))
        .route("/rules", get(rules_handler))
        .with_state(Arc::new(state))
}

/// Handler for `/check`.
///
/// 200 when approved, 422 when rejected, 400 without a `url` and 504 when
/// the run does not finish within the deadline.
async fn check_handler(
    State(state): State<Arc<HttpState>>,
    Query(params): Query<CheckParams>,
) -> impl IntoResponse {
    let Some(url) = params.url.filter(|u| !u.trim().is_empty()) else {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({
                "error": "missing_url",
                "message": "query parameter `url` is required",
            })),
        );
    };
    let url = url.trim();

    match state.pipeline.run_with_deadline(url, state.deadline).await {
        Ok(Verdict::Approved(_)) => (StatusCode::OK, Json(json!({ "approved": true }))),
        Ok(Verdict::Rejected { stage, rejection }) => (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(json!({
                "approved": false,
                "reason": rejection.reason(),
                "code": rejection.code.code_string(),
                "stage": stage,
            })),
        ),
        Err(exceeded) => {
            warn!(%url, deadline_secs = state.deadline.as_secs(), "check timed out");
            (
                StatusCode::GATEWAY_TIMEOUT,
                Json(json!({
                    "approved": false,
                    "error": "deadline_exceeded",
                    "message": exceeded.to_string(),
                })),
            )
        }
    }
}

/// Handler for `/health` - Basic daemon health check.
///
/// Returns 200 OK if the daemon is running.
async fn health_handler(State(state): State<Arc<HttpState>>) -> impl IntoResponse {
    let uptime_secs = state.started_at.elapsed().as_secs();

    Json(json!({
        "status": "healthy",
        "version": state.version,
        "pid": state.pid,
        "uptime_seconds": uptime_secs,
    }))
}

/// Handler for `/rules` - the full rejection catalog.
async fn rules_handler() -> impl IntoResponse {
    let entries: Vec<_> = RejectionCode::all().iter().map(RejectionCode::entry).collect();
    Json(entries)
}

/// Serve the API on `listen` until `shutdown` resolves.
pub async fn serve(
    listen: &str,
    state: HttpState,
    shutdown: impl std::future::Future<Output = ()> + Send + 'static,
) -> std::io::Result<()> {
    let router = create_router(state);
    let listener = tokio::net::TcpListener::bind(listen).await?;

    info!("Listening for check requests on {}", listener.local_addr()?);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown)
        .await
}
