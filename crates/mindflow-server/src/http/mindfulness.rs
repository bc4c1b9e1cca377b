use axum::extract::rejection::JsonRejection;
use axum::extract::{Query, State};
use axum::Json;
use chrono::Utc;
use mindflow_core::{Event, SessionInput, TipKind};
use serde::Deserialize;
use serde_json::Value;

use super::response::{created, decode_body, ok, ApiError, ApiResult};
use super::UserQuery;
use crate::AppState;

#[derive(Debug, Default, Deserialize)]
pub(crate) struct TipQuery {
    #[serde(rename = "type")]
    kind: Option<String>,
}

/// A random tip, or `null` when none match.
pub(crate) async fn tip_handler(
    State(state): State<AppState>,
    Query(query): Query<TipQuery>,
) -> ApiResult {
    let kind = match query.kind.as_deref() {
        None | Some("") => None,
        Some(raw) => Some(
            TipKind::parse(raw)
                .ok_or_else(|| ApiError::BadRequest("Invalid tip type".to_string()))?,
        ),
    };
    let db = state.db.lock().await;
    Ok(ok(db.random_tip(kind)?))
}

pub(crate) async fn activities_handler(State(state): State<AppState>) -> ApiResult {
    let db = state.db.lock().await;
    Ok(ok(db.list_activities()?))
}

pub(crate) async fn create_session_handler(
    State(state): State<AppState>,
    body: Result<Json<Value>, JsonRejection>,
) -> ApiResult {
    let input: SessionInput = decode_body(body)?;
    let new_session = input.validate()?;

    let db = state.db.lock().await;
    let session = db.create_session(&new_session, Utc::now())?;
    state.broadcaster.broadcast(
        session.user_id,
        &Event::MindfulnessCompleted(session.clone()),
    );
    Ok(created(session))
}

pub(crate) async fn streak_handler(
    State(state): State<AppState>,
    Query(query): Query<UserQuery>,
) -> ApiResult {
    let user_id = query.user_id()?;
    let db = state.db.lock().await;
    Ok(ok(db.mindfulness_streak(user_id, Utc::now().date_naive())?))
}
