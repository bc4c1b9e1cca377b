use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, Query, State};
use axum::Json;
use chrono::Utc;
use mindflow_core::task::{resolve_ai_priority, TaskInput, TaskPatchInput};
use mindflow_core::{Event, PriorityScorer, TaskFilter};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::info;

use super::parse_id;
use super::parse_user_id;
use super::response::{created, decode_body, ok, ApiError, ApiResult};
use crate::AppState;

const INVALID_TASK_ID: &str = "Invalid task ID";
const TASK_NOT_FOUND: &str = "Task not found";

#[derive(Debug, Default, Deserialize)]
pub(crate) struct TaskListQuery {
    #[serde(rename = "userId")]
    user_id: Option<String>,
    filter: Option<String>,
    limit: Option<String>,
    offset: Option<String>,
}

fn parse_paging(raw: Option<&str>, default: u32, name: &str) -> Result<u32, ApiError> {
    match raw {
        None => Ok(default),
        Some(v) => v
            .trim()
            .parse::<u32>()
            .map_err(|_| ApiError::BadRequest(format!("Invalid {name}"))),
    }
}

pub(crate) async fn list_tasks_handler(
    State(state): State<AppState>,
    Query(query): Query<TaskListQuery>,
) -> ApiResult {
    let user_id = parse_user_id(query.user_id.as_deref())?;
    let filter = match query.filter.as_deref() {
        None => TaskFilter::default(),
        Some(raw) => raw
            .parse::<TaskFilter>()
            .map_err(|_| ApiError::BadRequest("Invalid filter".to_string()))?,
    };
    let limit = parse_paging(query.limit.as_deref(), state.default_page_size, "limit")?;
    let offset = parse_paging(query.offset.as_deref(), 0, "offset")?;

    let db = state.db.lock().await;
    let tasks = db.list_tasks(user_id, filter, limit, offset, Utc::now())?;
    Ok(ok(tasks))
}

pub(crate) async fn create_task_handler(
    State(state): State<AppState>,
    body: Result<Json<Value>, JsonRejection>,
) -> ApiResult {
    let input: TaskInput = decode_body(body)?;
    let now = Utc::now();
    let new_task = input.validate()?.scored(&PriorityScorer::at(now));

    let db = state.db.lock().await;
    let task = db.create_task(&new_task, now)?;
    state
        .broadcaster
        .broadcast(task.user_id, &Event::TaskCreated(task.clone()));
    info!(task_id = task.id, user_id = task.user_id, "task created");
    Ok(created(task))
}

pub(crate) async fn update_task_handler(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
    body: Result<Json<Value>, JsonRejection>,
) -> ApiResult {
    let id = parse_id(&raw_id, INVALID_TASK_ID)?;
    let input: TaskPatchInput = decode_body(body)?;
    let now = Utc::now();

    let db = state.db.lock().await;
    let before = db
        .get_task(id)?
        .ok_or_else(|| ApiError::NotFound(TASK_NOT_FOUND.to_string()))?;
    let patch = input.validate()?;
    let mut merged = patch.apply_to(&before);
    merged.ai_priority = resolve_ai_priority(&before, &merged, &PriorityScorer::at(now));

    let task = db.update_task(&merged, now)?;
    state
        .broadcaster
        .broadcast(task.user_id, &Event::TaskUpdated(task.clone()));
    Ok(ok(task))
}

pub(crate) async fn delete_task_handler(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
) -> ApiResult {
    let id = parse_id(&raw_id, INVALID_TASK_ID)?;

    let db = state.db.lock().await;
    let task = db
        .get_task(id)?
        .ok_or_else(|| ApiError::NotFound(TASK_NOT_FOUND.to_string()))?;
    db.delete_task(id)?;
    state
        .broadcaster
        .broadcast(task.user_id, &Event::TaskDeleted { id });
    info!(task_id = id, user_id = task.user_id, "task deleted");
    Ok(ok(json!({ "success": true })))
}
