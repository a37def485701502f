//! Shared helpers for the integration tests.
#![allow(dead_code)]

use axum_test::TestServer;
use cases_api::config::{ApiConfig, AppEnv};
use cases_api::routes::{AppState, create_app};
use cases_api::storage::UserContext;
use serde_json::{Value, json};

pub const SECRET: &str = "integration-test-secret-at-least-32-chars";

pub struct TestApp {
    pub server: TestServer,
    pub state: AppState,
}

pub fn test_config() -> ApiConfig {
    ApiConfig {
        jwt_secret: Some(SECRET.to_string()),
        app_env: AppEnv::Production,
        rate_limit_per_minute: 100_000,
        ..Default::default()
    }
}

pub fn spawn_with(config: ApiConfig) -> TestApp {
    let state = AppState::in_memory(config).unwrap();
    let server = TestServer::new(create_app(state.clone())).unwrap();
    TestApp { server, state }
}

pub fn spawn() -> TestApp {
    spawn_with(test_config())
}

impl TestApp {
    /// A valid access token for the given user.
    pub fn token(&self, user_id: i64, name: &str) -> String {
        let user = UserContext {
            user_id,
            name: name.to_string(),
        };
        self.state.jwt.issue_token(&user, "test-session").unwrap()
    }
}

/// Ids of a minimal set of catalogs a case can reference.
pub struct Catalogs {
    pub source: i64,
    pub status: i64,
    pub initial_condition: i64,
    pub final_condition: i64,
    pub close_reason_group: i64,
    pub close_reason: i64,
    pub priority_low: i64,
    pub priority_high: i64,
    pub sla: i64,
    pub sla_condition: i64,
}

async fn post_id(app: &TestApp, token: &str, path: &str, body: Value) -> i64 {
    let response = app
        .server
        .post(path)
        .authorization_bearer(token)
        .json(&body)
        .await;
    response.assert_status_ok();
    response.json::<Value>()["id"].as_i64().unwrap()
}

pub async fn seed_catalogs(app: &TestApp, token: &str) -> Catalogs {
    let source = post_id(app, token, "/cases/sources", json!({"name": "Phone", "type": "CALL"})).await;
    let status = post_id(app, token, "/cases/statuses", json!({"name": "Support"})).await;
    let initial_condition = post_id(
        app,
        token,
        &format!("/cases/statuses/{}/status", status),
        json!({"name": "New"}),
    )
    .await;
    let final_condition = post_id(
        app,
        token,
        &format!("/cases/statuses/{}/status", status),
        json!({"name": "Closed", "final": true}),
    )
    .await;
    let close_reason_group = post_id(app, token, "/cases/close_reason_groups", json!({"name": "Default"})).await;
    let close_reason = post_id(
        app,
        token,
        &format!("/cases/close_reason_groups/{}/close_reasons", close_reason_group),
        json!({"name": "Solved"}),
    )
    .await;
    let priority_low = post_id(app, token, "/cases/priorities", json!({"name": "Low", "color": "#00FF00"})).await;
    let priority_high = post_id(app, token, "/cases/priorities", json!({"name": "High", "color": "#FF0000"})).await;
    let sla = post_id(
        app,
        token,
        "/cases/slas",
        json!({"name": "Standard", "reaction_time": 60, "resolution_time": 480}),
    )
    .await;
    let sla_condition = post_id(
        app,
        token,
        &format!("/cases/slas/{}/sla_conditions", sla),
        json!({
            "name": "Urgent",
            "priorities": [{"id": priority_high}],
            "reaction_time": 15,
            "resolution_time": 120
        }),
    )
    .await;

    Catalogs {
        source,
        status,
        initial_condition,
        final_condition,
        close_reason_group,
        close_reason,
        priority_low,
        priority_high,
        sla,
        sla_condition,
    }
}

/// Create a case and return its JSON.
pub async fn create_case(app: &TestApp, token: &str, catalogs: &Catalogs, subject: &str) -> Value {
    let response = app
        .server
        .post("/cases")
        .authorization_bearer(token)
        .json(&json!({
            "subject": subject,
            "source": {"id": catalogs.source},
            "status": {"id": catalogs.status}
        }))
        .await;
    response.assert_status_ok();
    response.json::<Value>()
}
