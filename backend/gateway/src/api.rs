//! Axum REST API handlers.
//!
//! One handler per protocol operation, mapped 1:1 onto the lifecycle
//! engine. The gateway owns nothing but transport encoding: payloads are
//! decoded here, the engine decides everything else.

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::error;

use crowdfund_protocol::{Project, ProjectDraft, ProjectRegistry, ProjectStatus, ProtocolError};

pub struct ApiState {
    pub registry: ProjectRegistry,
}

// ─────────────────────────────────────────────────────────
// Request / response shapes
// ─────────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct ContributeRequest {
    pub contributor: String,
    pub amount: u64,
}

#[derive(Deserialize)]
pub struct UpdateStatusRequest {
    pub status: String,
}

#[derive(Deserialize)]
pub struct ProjectsQuery {
    pub status: Option<String>,
}

#[derive(Serialize)]
pub struct ProjectsResponse {
    pub count: usize,
    pub projects: Vec<Project>,
}

#[derive(Serialize)]
pub struct ContributorsResponse {
    pub project_id: String,
    pub count: usize,
    pub contributors: Vec<String>,
}

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
}

#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

// ─────────────────────────────────────────────────────────
// Error mapping
// ─────────────────────────────────────────────────────────

fn status_for(err: &ProtocolError) -> StatusCode {
    match err {
        ProtocolError::InvalidPayload(_) | ProtocolError::InvalidStatus(_) => {
            StatusCode::BAD_REQUEST
        }
        ProtocolError::NotFound(_) => StatusCode::NOT_FOUND,
        ProtocolError::ProjectExpired => StatusCode::CONFLICT,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn fail(err: ProtocolError) -> Response {
    let status = status_for(&err);
    if status == StatusCode::INTERNAL_SERVER_ERROR {
        error!("operation failed: {err}");
    }
    (
        status,
        Json(serde_json::json!(ErrorResponse {
            error: err.to_string()
        })),
    )
        .into_response()
}

fn project_or_fail(result: Result<Project, ProtocolError>) -> Response {
    match result {
        Ok(project) => (StatusCode::OK, Json(project)).into_response(),
        Err(e) => fail(e),
    }
}

/// Parse the optional `?status=` filter into the closed enum. An
/// unrecognised filter string is an error, never a silent empty result.
fn parse_status_filter(raw: Option<&str>) -> Result<Option<ProjectStatus>, ProtocolError> {
    match raw {
        None => Ok(None),
        Some(s) => ProjectStatus::parse(s)
            .map(Some)
            .ok_or_else(|| ProtocolError::InvalidStatus(s.to_string())),
    }
}

// ─────────────────────────────────────────────────────────
// Handlers
// ─────────────────────────────────────────────────────────

/// `GET /health`
pub async fn health() -> impl IntoResponse {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// `POST /projects`
pub async fn create_project(
    State(state): State<Arc<ApiState>>,
    Json(draft): Json<ProjectDraft>,
) -> Response {
    project_or_fail(state.registry.create_project(draft).await)
}

/// `GET /projects?status=`
pub async fn get_projects(
    State(state): State<Arc<ApiState>>,
    Query(query): Query<ProjectsQuery>,
) -> Response {
    let filter = match parse_status_filter(query.status.as_deref()) {
        Ok(filter) => filter,
        Err(e) => return fail(e),
    };

    match state.registry.get_projects(filter).await {
        Ok(projects) => {
            let count = projects.len();
            (
                StatusCode::OK,
                Json(serde_json::json!(ProjectsResponse { count, projects })),
            )
                .into_response()
        }
        Err(e) => fail(e),
    }
}

/// `GET /projects/:id`
pub async fn get_project(
    State(state): State<Arc<ApiState>>,
    Path(id): Path<String>,
) -> Response {
    project_or_fail(state.registry.get_project(&id).await)
}

/// `PUT /projects/:id`
pub async fn update_project(
    State(state): State<Arc<ApiState>>,
    Path(id): Path<String>,
    Json(draft): Json<ProjectDraft>,
) -> Response {
    project_or_fail(state.registry.update_project(&id, draft).await)
}

/// `POST /projects/:id/contributions`
pub async fn contribute(
    State(state): State<Arc<ApiState>>,
    Path(id): Path<String>,
    Json(req): Json<ContributeRequest>,
) -> Response {
    project_or_fail(
        state
            .registry
            .contribute(&id, &req.contributor, req.amount)
            .await,
    )
}

/// `GET /projects/:id/contributors`
pub async fn get_contributors(
    State(state): State<Arc<ApiState>>,
    Path(id): Path<String>,
) -> Response {
    match state.registry.get_contributors(&id).await {
        Ok(contributors) => {
            let count = contributors.len();
            (
                StatusCode::OK,
                Json(serde_json::json!(ContributorsResponse {
                    project_id: id,
                    count,
                    contributors,
                })),
            )
                .into_response()
        }
        Err(e) => fail(e),
    }
}

/// `PUT /projects/:id/status`
pub async fn update_status(
    State(state): State<Arc<ApiState>>,
    Path(id): Path<String>,
    Json(req): Json<UpdateStatusRequest>,
) -> Response {
    project_or_fail(state.registry.update_status(&id, &req.status).await)
}

/// `POST /projects/:id/cancel`
pub async fn cancel_project(
    State(state): State<Arc<ApiState>>,
    Path(id): Path<String>,
) -> Response {
    project_or_fail(state.registry.cancel_project(&id).await)
}

// ─────────────────────────────────────────────────────────
// Unit tests
// ─────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_mapping() {
        assert_eq!(
            status_for(&ProtocolError::InvalidPayload("x".into())),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_for(&ProtocolError::InvalidStatus("x".into())),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_for(&ProtocolError::NotFound("x".into())),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            status_for(&ProtocolError::ProjectExpired),
            StatusCode::CONFLICT
        );
        assert_eq!(
            status_for(&ProtocolError::Internal("x".into())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn status_filter_parsing() {
        assert_eq!(parse_status_filter(None).unwrap(), None);
        assert_eq!(
            parse_status_filter(Some("Funding")).unwrap(),
            Some(ProjectStatus::Funding)
        );
        assert_eq!(
            parse_status_filter(Some("Expired")).unwrap(),
            Some(ProjectStatus::Expired)
        );
        assert!(parse_status_filter(Some("funding")).is_err());
        assert!(parse_status_filter(Some("")).is_err());
    }
}
