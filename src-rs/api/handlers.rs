use std::sync::Arc;
use std::time::Duration;

use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Deserialize;
use serde_json::json;
use tracing::info;

use super::worker::{spawn_work, CommandHandler};
use crate::backend::{StatusReport, SubmitRequest, SubmitResponse};
use crate::task::TaskStore;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<TaskStore>,
    pub handler: CommandHandler,
    pub token: Option<String>,
    pub work_delay: Duration,
}

#[derive(Debug, Deserialize, Default)]
pub struct TasksQuery {
    pub limit: Option<usize>,
}

#[derive(Debug)]
pub enum ApiError {
    Unauthorized,
    BadRequest(String),
    NotFound(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::Unauthorized => (StatusCode::UNAUTHORIZED, "unauthorized".to_string()),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
        };
        (status, Json(json!({ "error": message }))).into_response()
    }
}

pub async fn handle_health() -> Json<serde_json::Value> {
    Json(json!({"status": "ok", "version": env!("CARGO_PKG_VERSION")}))
}

pub async fn handle_submit(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(req): Json<SubmitRequest>,
) -> Result<Json<SubmitResponse>, ApiError> {
    authorize(&state, &headers)?;
    if req.command.trim().is_empty() {
        return Err(ApiError::BadRequest("command required".to_string()));
    }

    let task = state.store.create(&req.command);
    info!("queued task {}", task.id);
    spawn_work(
        state.store.clone(),
        state.handler.clone(),
        state.work_delay,
        task.id.clone(),
        req.command,
    );
    Ok(Json(SubmitResponse {
        task_id: Some(task.id),
    }))
}

pub async fn handle_status(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<Json<StatusReport>, ApiError> {
    authorize(&state, &headers)?;
    let task = state
        .store
        .get(&id)
        .ok_or_else(|| ApiError::NotFound(format!("task not found: {}", id)))?;
    Ok(Json(StatusReport {
        status: task.status,
        report: task.report,
    }))
}

pub async fn handle_tasks(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<TasksQuery>,
) -> Result<Json<serde_json::Value>, ApiError> {
    authorize(&state, &headers)?;
    let tasks = state.store.list(query.limit.unwrap_or(10));
    Ok(Json(json!({ "tasks": tasks })))
}

fn authorize(state: &AppState, headers: &HeaderMap) -> Result<(), ApiError> {
    let expected = match &state.token {
        Some(token) => format!("Bearer {}", token),
        None => return Ok(()),
    };
    let provided = headers
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok());
    if provided == Some(expected.as_str()) {
        Ok(())
    } else {
        Err(ApiError::Unauthorized)
    }
}
