#![forbid(unsafe_code)]
//! HTTP and WebSocket surface for Mindflow.
//!
//! Handlers validate input, call into [`mindflow_core::Database`], run the
//! pure scoring/streak/insight components and push change-events to the
//! owning user's live connection.

pub mod http;
pub mod ws;

use std::sync::Arc;

use axum::routing::{get, put};
use axum::Router;
use mindflow_core::{
    ConnectionRegistry, Database, EventBroadcaster, InsightSelector, RandomInsightSelector,
};
use tokio::sync::Mutex;

/// Shared server context. Every server instance owns its own registry, so
/// several servers can run side by side in one process.
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<Mutex<Database>>,
    pub registry: Arc<ConnectionRegistry>,
    pub broadcaster: EventBroadcaster,
    pub insights: Arc<dyn InsightSelector>,
    pub default_page_size: u32,
    pub ws_path: String,
}

impl AppState {
    pub fn new(db: Database) -> Self {
        let registry = Arc::new(ConnectionRegistry::new());
        Self {
            db: Arc::new(Mutex::new(db)),
            broadcaster: EventBroadcaster::new(Arc::clone(&registry)),
            registry,
            insights: Arc::new(RandomInsightSelector::new()),
            default_page_size: 50,
            ws_path: "/ws".to_string(),
        }
    }

    pub fn with_insights(mut self, insights: Arc<dyn InsightSelector>) -> Self {
        self.insights = insights;
        self
    }

    pub fn with_page_size(mut self, page_size: u32) -> Self {
        self.default_page_size = page_size;
        self
    }

    pub fn with_ws_path(mut self, ws_path: impl Into<String>) -> Self {
        self.ws_path = ws_path.into();
        self
    }
}

pub fn build_router(state: AppState) -> Router {
    let ws_path = state.ws_path.clone();
    Router::new()
        .route("/healthz", get(http::health::healthz_handler))
        .route(
            "/api/tasks",
            get(http::tasks::list_tasks_handler).post(http::tasks::create_task_handler),
        )
        .route(
            "/api/tasks/:id",
            put(http::tasks::update_task_handler).delete(http::tasks::delete_task_handler),
        )
        .route(
            "/api/categories",
            get(http::categories::list_categories_handler)
                .post(http::categories::create_category_handler),
        )
        .route("/api/mindfulness/tips", get(http::mindfulness::tip_handler))
        .route(
            "/api/mindfulness/activities",
            get(http::mindfulness::activities_handler),
        )
        .route(
            "/api/mindfulness/sessions",
            axum::routing::post(http::mindfulness::create_session_handler),
        )
        .route(
            "/api/mindfulness/streak",
            get(http::mindfulness::streak_handler),
        )
        .route("/api/dashboard/stats", get(http::dashboard::stats_handler))
        .route(
            "/api/dashboard/category-progress",
            get(http::dashboard::category_progress_handler),
        )
        .route(
            "/api/dashboard/productivity",
            get(http::dashboard::productivity_handler)
                .post(http::dashboard::record_productivity_handler),
        )
        .route("/api/ai/insight", get(http::insight::insight_handler))
        .route(&ws_path, get(ws::ws_handler))
        .with_state(state)
}
