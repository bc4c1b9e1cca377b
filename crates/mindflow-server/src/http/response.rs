//! Response envelopes and the error type every handler returns.

use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use mindflow_core::{CoreError, FieldError, ValidationError};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{json, Value};
use tracing::error;

#[derive(Serialize)]
struct DataBody<T> {
    data: T,
}

/// `200 {"data": ...}`
pub fn ok<T: Serialize>(data: T) -> Response {
    (StatusCode::OK, Json(DataBody { data })).into_response()
}

/// `201 {"data": ...}`
pub fn created<T: Serialize>(data: T) -> Response {
    (StatusCode::CREATED, Json(DataBody { data })).into_response()
}

pub type ApiResult = Result<Response, ApiError>;

#[derive(Debug)]
pub enum ApiError {
    /// 400 with every rejected field.
    Validation(Vec<FieldError>),
    BadRequest(String),
    NotFound(String),
    /// 500. The detail is logged, never returned.
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::Validation(fields) => {
                (StatusCode::BAD_REQUEST, Json(json!({ "error": fields }))).into_response()
            }
            ApiError::BadRequest(message) => {
                (StatusCode::BAD_REQUEST, Json(json!({ "error": message }))).into_response()
            }
            ApiError::NotFound(message) => {
                (StatusCode::NOT_FOUND, Json(json!({ "error": message }))).into_response()
            }
            ApiError::Internal(detail) => {
                error!(error = %detail, "request failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({ "error": "Internal server error" })),
                )
                    .into_response()
            }
        }
    }
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        ApiError::Validation(err.fields)
    }
}

impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::Validation(v) => v.into(),
            CoreError::NotFound { entity, .. } => ApiError::NotFound(format!("{entity} not found")),
            other => ApiError::Internal(other.to_string()),
        }
    }
}

/// Decode a request body, reporting a mistyped field as a field error.
///
/// Bodies that are not JSON at all still come back as a plain 400.
pub fn decode_body<T: DeserializeOwned>(
    body: Result<Json<Value>, JsonRejection>,
) -> Result<T, ApiError> {
    let Json(value) = body?;
    serde_path_to_error::deserialize(value).map_err(|err| {
        let path = err.path().to_string();
        let field = if path == "." { "body".to_string() } else { path };
        ApiError::Validation(vec![FieldError {
            field,
            message: err.inner().to_string(),
        }])
    })
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}
