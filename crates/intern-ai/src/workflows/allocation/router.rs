use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use serde::Deserialize;
use serde_json::json;
use tracing::warn;

use super::domain::{AllocationId, AllocationStatus, Roster};
use super::events::LogFilter;
use super::repository::{AllocationRecord, AllocationRepository, RepositoryError};
use super::service::{AllocationService, AllocationServiceError, DecisionRequest};

/// Router builder exposing allocation runs, reviewer decisions, and the audit trail.
pub fn allocation_router<R>(service: Arc<AllocationService<R>>) -> Router
where
    R: AllocationRepository + 'static,
{
    Router::new()
        .route("/api/v1/allocations/runs", post(run_handler::<R>))
        .route("/api/v1/allocations", get(list_handler::<R>))
        .route("/api/v1/allocations/logs", get(logs_handler::<R>))
        .route(
            "/api/v1/allocations/:allocation_id",
            get(status_handler::<R>),
        )
        .route(
            "/api/v1/allocations/:allocation_id/decision",
            post(decision_handler::<R>),
        )
        .route("/api/v1/agents", get(agents_handler::<R>))
        .with_state(service)
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct ListQuery {
    #[serde(default)]
    status: Option<AllocationStatus>,
}

pub(crate) async fn run_handler<R>(
    State(service): State<Arc<AllocationService<R>>>,
    axum::Json(roster): axum::Json<Roster>,
) -> Response
where
    R: AllocationRepository + 'static,
{
    // Scoring and matching are CPU-bound; keep them off the async workers.
    match tokio::task::spawn_blocking(move || service.run(roster)).await {
        Ok(Ok(report)) if report.rejected_input() => {
            (StatusCode::UNPROCESSABLE_ENTITY, axum::Json(report)).into_response()
        }
        Ok(Ok(report)) => (StatusCode::OK, axum::Json(report)).into_response(),
        Ok(Err(error)) => error_response(error),
        Err(join_error) => {
            warn!(error = %join_error, "allocation run task failed");
            let payload = json!({ "error": "allocation run did not complete" });
            (StatusCode::INTERNAL_SERVER_ERROR, axum::Json(payload)).into_response()
        }
    }
}

pub(crate) async fn list_handler<R>(
    State(service): State<Arc<AllocationService<R>>>,
    Query(query): Query<ListQuery>,
) -> Response
where
    R: AllocationRepository + 'static,
{
    match service.list(query.status) {
        Ok(records) => {
            let views: Vec<_> = records.iter().map(AllocationRecord::status_view).collect();
            (StatusCode::OK, axum::Json(views)).into_response()
        }
        Err(error) => error_response(error),
    }
}

pub(crate) async fn status_handler<R>(
    State(service): State<Arc<AllocationService<R>>>,
    Path(allocation_id): Path<String>,
) -> Response
where
    R: AllocationRepository + 'static,
{
    match service.get(&AllocationId(allocation_id)) {
        Ok(record) => (StatusCode::OK, axum::Json(record.status_view())).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn decision_handler<R>(
    State(service): State<Arc<AllocationService<R>>>,
    Path(allocation_id): Path<String>,
    axum::Json(request): axum::Json<DecisionRequest>,
) -> Response
where
    R: AllocationRepository + 'static,
{
    match service.decide(&AllocationId(allocation_id), request.decision) {
        Ok(record) => (StatusCode::OK, axum::Json(record.status_view())).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn logs_handler<R>(
    State(service): State<Arc<AllocationService<R>>>,
    Query(filter): Query<LogFilter>,
) -> Response
where
    R: AllocationRepository + 'static,
{
    let entries = service.logs(&filter);
    let payload = json!({
        "stats": service.log_stats(),
        "entries": entries,
    });
    (StatusCode::OK, axum::Json(payload)).into_response()
}

pub(crate) async fn agents_handler<R>(State(service): State<Arc<AllocationService<R>>>) -> Response
where
    R: AllocationRepository + 'static,
{
    let agents: Vec<_> = service
        .agent_statuses()
        .into_iter()
        .map(|(stage, status)| {
            json!({
                "agent": stage.agent(),
                "key": stage.key(),
                "status": status.label(),
            })
        })
        .collect();
    (StatusCode::OK, axum::Json(agents)).into_response()
}

fn error_response(error: AllocationServiceError) -> Response {
    let status = match &error {
        AllocationServiceError::Repository(RepositoryError::NotFound) => StatusCode::NOT_FOUND,
        AllocationServiceError::Repository(RepositoryError::Conflict)
        | AllocationServiceError::Repository(RepositoryError::StatusChanged { .. })
        | AllocationServiceError::IllegalTransition { .. } => StatusCode::CONFLICT,
        AllocationServiceError::Repository(RepositoryError::Unavailable(_)) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    };
    let payload = json!({
        "error": error.to_string(),
    });
    (status, axum::Json(payload)).into_response()
}
