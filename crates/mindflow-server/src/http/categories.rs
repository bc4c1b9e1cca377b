use axum::extract::rejection::JsonRejection;
use axum::extract::{Query, State};
use axum::Json;
use chrono::Utc;
use mindflow_core::CategoryInput;
use serde_json::Value;

use super::response::{created, decode_body, ok, ApiResult};
use super::UserQuery;
use crate::AppState;

pub(crate) async fn list_categories_handler(
    State(state): State<AppState>,
    Query(query): Query<UserQuery>,
) -> ApiResult {
    let user_id = query.user_id()?;
    let db = state.db.lock().await;
    Ok(ok(db.list_categories(user_id)?))
}

pub(crate) async fn create_category_handler(
    State(state): State<AppState>,
    body: Result<Json<Value>, JsonRejection>,
) -> ApiResult {
    let input: CategoryInput = decode_body(body)?;
    let category = input.validate()?;
    let db = state.db.lock().await;
    Ok(created(db.create_category(&category, Utc::now())?))
}
