pub mod categories;
pub mod dashboard;
pub mod health;
pub mod insight;
pub mod mindfulness;
pub mod response;
pub mod tasks;

use mindflow_core::UserId;
use serde::Deserialize;

use response::ApiError;

/// `?userId=` on read endpoints.
#[derive(Debug, Default, Deserialize)]
pub struct UserQuery {
    #[serde(rename = "userId")]
    pub user_id: Option<String>,
}

impl UserQuery {
    pub fn user_id(&self) -> Result<UserId, ApiError> {
        parse_user_id(self.user_id.as_deref())
    }
}

/// Positive integer user id, otherwise 400 "Invalid user ID".
pub fn parse_user_id(raw: Option<&str>) -> Result<UserId, ApiError> {
    raw.and_then(|v| v.trim().parse::<UserId>().ok())
        .filter(|id| *id > 0)
        .ok_or_else(|| ApiError::BadRequest("Invalid user ID".to_string()))
}

/// Numeric path id, otherwise 400 with `message`.
pub fn parse_id(raw: &str, message: &str) -> Result<i64, ApiError> {
    raw.trim()
        .parse::<i64>()
        .map_err(|_| ApiError::BadRequest(message.to_string()))
}
