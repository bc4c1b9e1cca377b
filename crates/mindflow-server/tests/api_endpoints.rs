//! End-to-end HTTP tests against a server bound to an ephemeral port.

use std::sync::Arc;

use chrono::{Duration, Utc};
use mindflow_core::storage::seed_catalog;
use mindflow_core::{Database, Insight, InsightKind, InsightSelector, InsightSignals};
use mindflow_server::{build_router, AppState};
use reqwest::StatusCode;
use serde_json::{json, Value};
use tokio::net::TcpListener;

struct FixedInsight;

impl InsightSelector for FixedInsight {
    fn select(&self, signals: &InsightSignals) -> Insight {
        Insight::new(
            format!("{} recent tasks", signals.recent_tasks.len()),
            InsightKind::Recommendation,
        )
    }
}

async fn spawn_server() -> String {
    let db = Database::open_memory().expect("open db");
    seed_catalog(&db, Utc::now()).expect("seed");
    let state = AppState::new(db).with_insights(Arc::new(FixedInsight));
    let app = build_router(state);

    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("addr");
    tokio::spawn(async move { axum::serve(listener, app).await });
    format!("http://{addr}")
}

async fn create_task(client: &reqwest::Client, base: &str, body: Value) -> (StatusCode, Value) {
    let resp = client
        .post(format!("{base}/api/tasks"))
        .json(&body)
        .send()
        .await
        .expect("request");
    let status = resp.status();
    (status, resp.json().await.expect("json"))
}

#[tokio::test]
async fn healthz_reports_ok() {
    let base = spawn_server().await;
    let body: Value = reqwest::get(format!("{base}/healthz"))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body["data"]["status"], "ok");
}

#[tokio::test]
async fn ai_task_is_scored_on_create_and_listed() {
    let base = spawn_server().await;
    let client = reqwest::Client::new();
    let due = Utc::now() + Duration::days(2) + Duration::hours(6);

    let (status, body) = create_task(
        &client,
        &base,
        json!({
            "title": "Quarterly plan",
            "description": "d".repeat(120),
            "priority": "ai",
            "isMindful": true,
            "dueDate": due.to_rfc3339(),
            "userId": 1,
        }),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["data"]["aiPriority"], 83);
    assert_eq!(body["data"]["priority"], "ai");

    let listed: Value = client
        .get(format!("{base}/api/tasks?userId=1"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let tasks = listed["data"].as_array().unwrap();
    assert_eq!(tasks.len(), 1);
    assert_eq!(tasks[0]["title"], "Quarterly plan");
    assert!(tasks[0]["category"].is_null());

    let (_, plain) = create_task(
        &client,
        &base,
        json!({ "title": "Groceries", "priority": "high", "userId": 1 }),
    )
    .await;
    assert!(plain["data"]["aiPriority"].is_null());
}

#[tokio::test]
async fn invalid_user_id_is_rejected() {
    let base = spawn_server().await;
    for path in [
        "/api/tasks?userId=abc",
        "/api/tasks",
        "/api/dashboard/stats?userId=0",
        "/api/mindfulness/streak?userId=x",
        "/api/ai/insight",
    ] {
        let resp = reqwest::get(format!("{base}{path}")).await.unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST, "{path}");
        let body: Value = resp.json().await.unwrap();
        assert_eq!(body["error"], "Invalid user ID", "{path}");
    }
}

#[tokio::test]
async fn invalid_task_payload_lists_field_errors() {
    let base = spawn_server().await;
    let client = reqwest::Client::new();
    let (status, body) = create_task(&client, &base, json!({ "priority": "urgent" })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let fields: Vec<&str> = body["error"]
        .as_array()
        .unwrap()
        .iter()
        .filter_map(|e| e["field"].as_str())
        .collect();
    assert!(fields.contains(&"title"));
    assert!(fields.contains(&"priority"));
    assert!(fields.contains(&"userId"));
}

#[tokio::test]
async fn update_and_delete_missing_task_is_not_found() {
    let base = spawn_server().await;
    let client = reqwest::Client::new();

    let resp = client
        .put(format!("{base}/api/tasks/999"))
        .json(&json!({ "completed": true }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["error"], "Task not found");

    let resp = client
        .delete(format!("{base}/api/tasks/999"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    let resp = client
        .delete(format!("{base}/api/tasks/nope"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn update_then_delete_task() {
    let base = spawn_server().await;
    let client = reqwest::Client::new();
    let (_, created) = create_task(
        &client,
        &base,
        json!({ "title": "Stretch", "priority": "medium", "userId": 3 }),
    )
    .await;
    let id = created["data"]["id"].as_i64().unwrap();

    let updated: Value = client
        .put(format!("{base}/api/tasks/{id}"))
        .json(&json!({ "completed": true, "priority": "ai" }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(updated["data"]["completed"], true);
    assert!(updated["data"]["aiPriority"].as_u64().is_some());

    let resp = client
        .delete(format!("{base}/api/tasks/{id}"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["data"]["success"], true);

    let listed: Value = client
        .get(format!("{base}/api/tasks?userId=3&filter=all"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert!(listed["data"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn category_progress_is_idempotent() {
    let base = spawn_server().await;
    let client = reqwest::Client::new();
    let category: Value = client
        .post(format!("{base}/api/categories"))
        .json(&json!({ "name": "Work", "color": "#4F46E5", "userId": 5 }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let category_id = category["data"]["id"].as_i64().unwrap();

    for (title, completed) in [("a", true), ("b", false), ("c", false)] {
        let (status, _) = create_task(
            &client,
            &base,
            json!({
                "title": title,
                "priority": "low",
                "completed": completed,
                "categoryId": category_id,
                "userId": 5,
            }),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
    }

    let url = format!("{base}/api/dashboard/category-progress?userId=5");
    let first: Value = client.get(&url).send().await.unwrap().json().await.unwrap();
    let second: Value = client.get(&url).send().await.unwrap().json().await.unwrap();
    assert_eq!(first, second);
    assert_eq!(first["data"][0]["completedTasks"], 1);
    assert_eq!(first["data"][0]["totalTasks"], 3);
    assert_eq!(first["data"][0]["percentage"], 33);
}

#[tokio::test]
async fn foreign_category_is_not_found() {
    let base = spawn_server().await;
    let client = reqwest::Client::new();
    let (status, body) = create_task(
        &client,
        &base,
        json!({ "title": "x", "priority": "low", "categoryId": 77, "userId": 1 }),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Category not found");
}

#[tokio::test]
async fn session_counts_toward_streak_and_dashboard() {
    let base = spawn_server().await;
    let client = reqwest::Client::new();

    let streak: Value = client
        .get(format!("{base}/api/mindfulness/streak?userId=8"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(streak["data"]["days"], 0);
    assert_eq!(
        streak["data"]["message"],
        "Start your mindfulness journey today!"
    );

    let activities: Value = client
        .get(format!("{base}/api/mindfulness/activities"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let activity_id = activities["data"][0]["id"].as_i64().unwrap();

    let resp = client
        .post(format!("{base}/api/mindfulness/sessions"))
        .json(&json!({ "userId": 8, "activityId": activity_id, "duration": 600 }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::CREATED);

    let streak: Value = client
        .get(format!("{base}/api/mindfulness/streak?userId=8"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(streak["data"]["days"], 1);

    let stats: Value = client
        .get(format!("{base}/api/dashboard/stats?userId=8"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(stats["data"]["mindfulnessMinutes"], 10);
    assert_eq!(stats["data"]["activeTasks"], 0);
}

#[tokio::test]
async fn session_requires_positive_duration() {
    let base = spawn_server().await;
    let resp = reqwest::Client::new()
        .post(format!("{base}/api/mindfulness/sessions"))
        .json(&json!({ "userId": 8, "duration": 0 }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn tips_filter_by_type() {
    let base = spawn_server().await;
    let body: Value = reqwest::get(format!("{base}/api/mindfulness/tips?type=daily"))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body["data"]["type"], "daily");

    let resp = reqwest::get(format!("{base}/api/mindfulness/tips?type=weekly"))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn productivity_upsert_and_timeframe() {
    let base = spawn_server().await;
    let client = reqwest::Client::new();
    for score in [60, 75] {
        let resp = client
            .post(format!("{base}/api/dashboard/productivity"))
            .json(&json!({
                "userId": 4,
                "focusScore": score,
                "completedTasks": 2,
                "mindfulnessMinutes": 15,
                "hourlyData": [{ "hour": 9, "score": score }],
            }))
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
    }

    let week: Value = client
        .get(format!("{base}/api/dashboard/productivity?userId=4&timeframe=week"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let points = week["data"].as_array().unwrap();
    assert_eq!(points.len(), 1);
    assert_eq!(points[0]["focusScore"], 75);

    let resp = client
        .get(format!("{base}/api/dashboard/productivity?userId=4&timeframe=year"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn insight_uses_the_configured_selector() {
    let base = spawn_server().await;
    let body: Value = reqwest::get(format!("{base}/api/ai/insight?userId=2"))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body["data"]["message"], "0 recent tasks");
    assert_eq!(body["data"]["type"], "recommendation");
}

#[tokio::test]
async fn mistyped_fields_are_reported_per_field() {
    let base = spawn_server().await;
    let client = reqwest::Client::new();

    let (status, body) = create_task(
        &client,
        &base,
        json!({ "title": "a", "priority": "low", "userId": "abc" }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let errors = body["error"].as_array().expect("field error list");
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0]["field"], "userId");
    assert!(errors[0]["message"].is_string());

    let resp = client
        .post(format!("{base}/api/mindfulness/sessions"))
        .json(&json!({ "userId": 1, "duration": "ten" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["error"][0]["field"], "duration");
}

#[tokio::test]
async fn update_of_missing_task_is_not_found_before_validation() {
    let base = spawn_server().await;
    let resp = reqwest::Client::new()
        .put(format!("{base}/api/tasks/999"))
        .json(&json!({ "priority": "urgent" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["error"], "Task not found");
}
