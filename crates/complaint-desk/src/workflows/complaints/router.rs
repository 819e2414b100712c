use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use super::domain::{ComplaintIntake, ValidationError};
use super::leaderboard::{AgentAllTimeSummary, AgentMonthlySummary, Leaderboard};
use super::repository::{AgentDirectory, ComplaintRepository, PointLedger};
use super::service::{ComplaintService, ComplaintServiceError};

/// Body of a status change request; the complaint id comes from the path.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TransitionRequest {
    pub target_status: String,
    #[serde(default)]
    pub note: Option<String>,
    #[serde(default)]
    pub acting_agent_id: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct MonthQuery {
    #[serde(default)]
    pub month: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct AgentPointsView {
    pub monthly: AgentMonthlySummary,
    pub all_time: AgentAllTimeSummary,
}

/// Router builder exposing intake and status transitions.
pub fn complaint_router<R, D>(service: Arc<ComplaintService<R, D>>) -> Router
where
    R: ComplaintRepository + 'static,
    D: AgentDirectory + 'static,
{
    Router::new()
        .route("/api/v1/complaints", post(create_handler::<R, D>))
        .route(
            "/api/v1/complaints/:complaint_id",
            get(complaint_handler::<R, D>),
        )
        .route(
            "/api/v1/complaints/:complaint_id/status",
            post(transition_handler::<R, D>),
        )
        .with_state(service)
}

/// Router builder exposing agent point summaries and the leaderboard.
pub fn leaderboard_router<L, D>(leaderboard: Arc<Leaderboard<L, D>>) -> Router
where
    L: PointLedger + 'static,
    D: AgentDirectory + 'static,
{
    Router::new()
        .route(
            "/api/v1/agents/:agent_id/points",
            get(agent_points_handler::<L, D>),
        )
        .route("/api/v1/leaderboard", get(leaderboard_handler::<L, D>))
        .with_state(leaderboard)
}

pub(crate) async fn create_handler<R, D>(
    State(service): State<Arc<ComplaintService<R, D>>>,
    payload: Result<axum::Json<ComplaintIntake>, JsonRejection>,
) -> Response
where
    R: ComplaintRepository + 'static,
    D: AgentDirectory + 'static,
{
    let axum::Json(intake) = match payload {
        Ok(payload) => payload,
        Err(rejection) => return body_rejected(rejection),
    };
    match service.create(intake) {
        Ok(complaint) => (StatusCode::CREATED, axum::Json(complaint)).into_response(),
        Err(error) => error_response(&error),
    }
}

pub(crate) async fn complaint_handler<R, D>(
    State(service): State<Arc<ComplaintService<R, D>>>,
    Path(complaint_id): Path<String>,
) -> Response
where
    R: ComplaintRepository + 'static,
    D: AgentDirectory + 'static,
{
    match service.get(&complaint_id) {
        Ok(complaint) => (StatusCode::OK, axum::Json(complaint)).into_response(),
        Err(error) => error_response(&error),
    }
}

pub(crate) async fn transition_handler<R, D>(
    State(service): State<Arc<ComplaintService<R, D>>>,
    Path(complaint_id): Path<String>,
    payload: Result<axum::Json<TransitionRequest>, JsonRejection>,
) -> Response
where
    R: ComplaintRepository + 'static,
    D: AgentDirectory + 'static,
{
    let axum::Json(request) = match payload {
        Ok(payload) => payload,
        Err(rejection) => return body_rejected(rejection),
    };
    let outcome = service.transition(
        &complaint_id,
        &request.target_status,
        request.note.as_deref(),
        request.acting_agent_id.as_deref(),
    );
    match outcome {
        Ok(outcome) => (StatusCode::OK, axum::Json(outcome)).into_response(),
        Err(error) => error_response(&error),
    }
}

pub(crate) async fn agent_points_handler<L, D>(
    State(leaderboard): State<Arc<Leaderboard<L, D>>>,
    Path(agent_id): Path<String>,
    Query(query): Query<MonthQuery>,
) -> Response
where
    L: PointLedger + 'static,
    D: AgentDirectory + 'static,
{
    let view = leaderboard
        .agent_monthly_summary(&agent_id, query.month.as_deref())
        .and_then(|monthly| {
            let all_time = leaderboard.agent_all_time_summary(&agent_id)?;
            Ok(AgentPointsView { monthly, all_time })
        });
    match view {
        Ok(view) => (StatusCode::OK, axum::Json(view)).into_response(),
        Err(error) => error_response(&error),
    }
}

pub(crate) async fn leaderboard_handler<L, D>(
    State(leaderboard): State<Arc<Leaderboard<L, D>>>,
    Query(query): Query<MonthQuery>,
) -> Response
where
    L: PointLedger + 'static,
    D: AgentDirectory + 'static,
{
    match leaderboard.roster_summary(query.month.as_deref()) {
        Ok(summary) => (StatusCode::OK, axum::Json(summary)).into_response(),
        Err(error) => error_response(&error),
    }
}

/// Undecodable or incomplete JSON bodies are field validation failures, not 422s.
fn body_rejected(rejection: JsonRejection) -> Response {
    let error = ComplaintServiceError::from(ValidationError::MalformedBody(rejection.body_text()));
    error_response(&error)
}

pub(crate) fn status_for(error: &ComplaintServiceError) -> StatusCode {
    match error {
        ComplaintServiceError::Validation(_) => StatusCode::BAD_REQUEST,
        ComplaintServiceError::NotFound { .. } => StatusCode::NOT_FOUND,
        ComplaintServiceError::IllegalTransition(_)
        | ComplaintServiceError::DuplicateInvoice { .. } => StatusCode::CONFLICT,
        ComplaintServiceError::NoteTooShort { .. } => StatusCode::UNPROCESSABLE_ENTITY,
        ComplaintServiceError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// JSON error body naming the failed precondition so clients can correct the request.
pub fn error_response(error: &ComplaintServiceError) -> Response {
    let mut payload = json!({
        "error": error.kind(),
        "message": error.to_string(),
    });

    let details = match error {
        ComplaintServiceError::IllegalTransition(rejection) => json!({
            "current_status": rejection.current(),
            "allowed_next": rejection.allowed_next(),
        }),
        ComplaintServiceError::NoteTooShort { required, actual } => json!({
            "required_words": required,
            "word_count": actual,
        }),
        ComplaintServiceError::DuplicateInvoice { invoice } => json!({
            "invoice_number": invoice,
        }),
        ComplaintServiceError::NotFound { entity, id } => json!({
            "entity": entity,
            "id": id,
        }),
        ComplaintServiceError::Validation(_) | ComplaintServiceError::Internal(_) => Value::Null,
    };
    if let (Value::Object(body), Value::Object(extra)) = (&mut payload, details) {
        body.extend(extra);
    }

    (status_for(error), axum::Json(payload)).into_response()
}
