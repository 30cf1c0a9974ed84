//! JSON task API under `/api`
//!
//! Every response is `{"success": true, "data": …}` or
//! `{"success": false, "error": "…"}`.

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use chrono::Utc;
use serde::Serialize;
use serde_json::json;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use tracing::warn;

use super::AppState;
use crate::board::BoardError;
use crate::command::ListFilters;
use crate::task::{TaskDraft, TaskId, TaskPatch, TaskStatus};

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/tasks", get(list_tasks).post(create_task))
        .route(
            "/tasks/{id}",
            get(get_task).put(update_task).delete(delete_task),
        )
        .route("/search", get(search_tasks))
        .route("/status", get(status))
        .route("/test/focalboard", get(test_board))
}

type Params = Query<HashMap<String, String>>;

fn ok<T: Serialize>(status: StatusCode, data: T) -> Response {
    (status, Json(json!({ "success": true, "data": data }))).into_response()
}

fn fail(status: StatusCode, error: impl ToString) -> Response {
    let body = json!({ "success": false, "error": error.to_string() });
    (status, Json(body)).into_response()
}

/// Missing tasks are 404 and rejected fields 400; anything else gets `fallback`
fn board_failure(err: BoardError, fallback: StatusCode) -> Response {
    let status = match &err {
        BoardError::NotFound(_) => StatusCode::NOT_FOUND,
        BoardError::Validation(_) => StatusCode::BAD_REQUEST,
        _ => fallback,
    };
    if status.is_server_error() {
        warn!("Task API request failed: {}", err);
    }
    fail(status, err)
}

/// `status`, `priority`, `assignee` and `tag` query parameters; others are ignored
fn filters_from(params: &HashMap<String, String>) -> Result<ListFilters, Response> {
    let mut filters = ListFilters::default();
    for (key, value) in params {
        filters
            .apply_token(&format!("{}:{}", key, value))
            .map_err(|e| fail(StatusCode::BAD_REQUEST, e))?;
    }
    Ok(filters)
}

async fn list_tasks(State(state): State<Arc<AppState>>, Query(params): Params) -> Response {
    let filters = match filters_from(&params) {
        Ok(filters) => filters,
        Err(resp) => return resp,
    };
    match state.processor.store().list(&filters).await {
        Ok(tasks) => ok(StatusCode::OK, tasks),
        Err(e) => board_failure(e, StatusCode::INTERNAL_SERVER_ERROR),
    }
}

async fn create_task(
    State(state): State<Arc<AppState>>,
    body: Result<Json<TaskDraft>, JsonRejection>,
) -> Response {
    let Json(draft) = match body {
        Ok(body) => body,
        Err(e) => return fail(StatusCode::BAD_REQUEST, e.body_text()),
    };
    match state.processor.store().create(draft).await {
        Ok(task) => ok(StatusCode::CREATED, task),
        Err(e) => board_failure(e, StatusCode::BAD_REQUEST),
    }
}

async fn get_task(State(state): State<Arc<AppState>>, Path(id): Path<String>) -> Response {
    match state.processor.store().get(&TaskId::new(id)).await {
        Ok(task) => ok(StatusCode::OK, task),
        Err(e) => board_failure(e, StatusCode::NOT_FOUND),
    }
}

async fn update_task(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    body: Result<Json<TaskPatch>, JsonRejection>,
) -> Response {
    let Json(patch) = match body {
        Ok(body) => body,
        Err(e) => return fail(StatusCode::BAD_REQUEST, e.body_text()),
    };
    match state.processor.store().update(&TaskId::new(id), &patch).await {
        Ok(task) => ok(StatusCode::OK, task),
        Err(e) => board_failure(e, StatusCode::BAD_REQUEST),
    }
}

async fn delete_task(State(state): State<Arc<AppState>>, Path(id): Path<String>) -> Response {
    match state.processor.store().delete(&TaskId::new(id)).await {
        Ok(deleted) => ok(StatusCode::OK, json!({ "deleted": deleted })),
        Err(e) => board_failure(e, StatusCode::BAD_REQUEST),
    }
}

/// `?q=` plus the list filters
async fn search_tasks(State(state): State<Arc<AppState>>, Query(mut params): Params) -> Response {
    let query = params.remove("q").unwrap_or_default();
    let query = query.trim();
    if query.is_empty() {
        return fail(StatusCode::BAD_REQUEST, "Missing q parameter");
    }
    let filters = match filters_from(&params) {
        Ok(filters) => filters,
        Err(resp) => return resp,
    };
    match state.processor.store().search(query, &filters).await {
        Ok(tasks) => ok(StatusCode::OK, tasks),
        Err(e) => board_failure(e, StatusCode::BAD_REQUEST),
    }
}

/// Task count, overall and per status
async fn status(State(state): State<Arc<AppState>>) -> Response {
    let tasks = match state.processor.store().list(&ListFilters::default()).await {
        Ok(tasks) => tasks,
        Err(e) => return board_failure(e, StatusCode::INTERNAL_SERVER_ERROR),
    };

    let mut counts: BTreeMap<&'static str, usize> =
        TaskStatus::ALL.iter().map(|s| (s.code(), 0)).collect();
    for task in &tasks {
        *counts.entry(task.status.code()).or_default() += 1;
    }

    ok(
        StatusCode::OK,
        json!({
            "totalTasks": tasks.len(),
            "statusCounts": counts,
            "lastUpdated": Utc::now().to_rfc3339(),
        }),
    )
}

async fn test_board(State(state): State<Arc<AppState>>) -> Response {
    let store = state.processor.store();
    let connected = store.test_connection().await;
    ok(
        StatusCode::OK,
        json!({ "connected": connected, "store": store.name() }),
    )
}
