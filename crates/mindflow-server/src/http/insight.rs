use axum::extract::{Query, State};
use chrono::Utc;

use super::response::{ok, ApiResult};
use super::UserQuery;
use crate::AppState;

pub(crate) async fn insight_handler(
    State(state): State<AppState>,
    Query(query): Query<UserQuery>,
) -> ApiResult {
    let user_id = query.user_id()?;
    let signals = {
        let db = state.db.lock().await;
        db.insight_signals(user_id, Utc::now())?
    };
    Ok(ok(state.insights.select(&signals)))
}
