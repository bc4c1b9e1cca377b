use axum::extract::rejection::JsonRejection;
use axum::extract::{Query, State};
use axum::Json;
use chrono::Utc;
use mindflow_core::stats::ProductivityInput;
use mindflow_core::Timeframe;
use serde::Deserialize;
use serde_json::Value;

use super::parse_user_id;
use super::response::{decode_body, ok, ApiError, ApiResult};
use super::UserQuery;
use crate::AppState;

pub(crate) async fn stats_handler(
    State(state): State<AppState>,
    Query(query): Query<UserQuery>,
) -> ApiResult {
    let user_id = query.user_id()?;
    let db = state.db.lock().await;
    Ok(ok(db.dashboard_stats(user_id, Utc::now())?))
}

pub(crate) async fn category_progress_handler(
    State(state): State<AppState>,
    Query(query): Query<UserQuery>,
) -> ApiResult {
    let user_id = query.user_id()?;
    let db = state.db.lock().await;
    Ok(ok(db.category_progress(user_id)?))
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct ProductivityQuery {
    #[serde(rename = "userId")]
    user_id: Option<String>,
    timeframe: Option<String>,
}

pub(crate) async fn productivity_handler(
    State(state): State<AppState>,
    Query(query): Query<ProductivityQuery>,
) -> ApiResult {
    let user_id = parse_user_id(query.user_id.as_deref())?;
    let timeframe = match query.timeframe.as_deref() {
        None => Timeframe::default(),
        Some(raw) => raw
            .parse::<Timeframe>()
            .map_err(|_| ApiError::BadRequest("Invalid timeframe".to_string()))?,
    };
    let db = state.db.lock().await;
    Ok(ok(db.productivity(user_id, timeframe, Utc::now())?))
}

/// Upsert the user's record for the record's calendar day.
pub(crate) async fn record_productivity_handler(
    State(state): State<AppState>,
    body: Result<Json<Value>, JsonRejection>,
) -> ApiResult {
    let input: ProductivityInput = decode_body(body)?;
    let now = Utc::now();
    let record = input.validate(now)?;
    let db = state.db.lock().await;
    Ok(ok(db.upsert_productivity(&record, now)?))
}
