use axum::response::Response;
use serde_json::json;

use super::response::ok;

pub(crate) async fn healthz_handler() -> Response {
    ok(json!({ "status": "ok" }))
}
