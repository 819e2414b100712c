use crate::infra::AppState;
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::Extension;
use axum::Json;
use complaint_desk::workflows::complaints::{
    complaint_router, leaderboard_router, AgentDirectory, ComplaintRepository, ComplaintService,
    Leaderboard, PointLedger,
};
use serde_json::json;
use std::sync::Arc;

pub(crate) fn with_desk_routes<R, L, D>(
    service: Arc<ComplaintService<R, D>>,
    leaderboard: Arc<Leaderboard<L, D>>,
) -> axum::Router
where
    R: ComplaintRepository + 'static,
    L: PointLedger + 'static,
    D: AgentDirectory + 'static,
{
    complaint_router(service)
        .merge(leaderboard_router(leaderboard))
        .route("/health", axum::routing::get(healthcheck))
        .route("/ready", axum::routing::get(readiness_endpoint))
        .route("/metrics", axum::routing::get(metrics_endpoint))
}

pub(crate) async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub(crate) async fn readiness_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(std::sync::atomic::Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

pub(crate) async fn metrics_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}
