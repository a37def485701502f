//! Basic API tests: health, docs and authentication.

#[path = "common/mod.rs"]
mod common;

use axum::http::StatusCode;
use cases_api::services::JwtService;
use cases_api::storage::UserContext;
use serde_json::Value;

#[tokio::test]
async fn test_health_check() {
    let app = common::spawn();
    let response = app.server.get("/health").await;
    assert_eq!(response.status_code(), StatusCode::OK);
    let body: Value = response.json();
    assert_eq!(body["status"], "ok");
    assert_eq!(body["service"], "cases-api");
}

#[tokio::test]
async fn test_openapi_document() {
    let app = common::spawn();
    let response = app.server.get("/openapi.json").await;
    assert_eq!(response.status_code(), StatusCode::OK);
    let doc: Value = response.json();
    assert!(doc["paths"]["/cases"].is_object());
    assert!(doc["paths"]["/cases/{case_etag}/timeline"].is_object());
    for path in [
        "/cases/priorities",
        "/cases/priorities/{id}",
        "/cases/sources/{id}",
        "/cases/statuses/{status_id}/status/{id}",
        "/cases/close_reason_groups/{close_reason_group_id}/close_reasons",
        "/cases/slas/{sla_id}/sla_conditions/{id}",
    ] {
        assert!(doc["paths"][path].is_object(), "missing {}", path);
    }
    let priorities = &doc["paths"]["/cases/priorities"];
    assert_eq!(priorities["get"]["operationId"], "list_priority");
    assert_eq!(priorities["post"]["operationId"], "create_priority");
    let conditions = &doc["paths"]["/cases/slas/{sla_id}/sla_conditions/{id}"];
    for method in ["get", "put", "patch", "delete"] {
        assert!(conditions[method].is_object(), "missing {}", method);
    }
    assert!(doc["components"]["securitySchemes"]["bearer_auth"].is_object());
}

#[tokio::test]
async fn test_swagger_page() {
    let app = common::spawn();
    let response = app.server.get("/swagger").await;
    assert_eq!(response.status_code(), StatusCode::OK);
    assert!(response.text().contains("openapi.json"));
}

#[tokio::test]
async fn test_requests_without_token_are_rejected() {
    let app = common::spawn();
    let response = app.server.get("/cases").await;
    assert_eq!(response.status_code(), StatusCode::UNAUTHORIZED);
    let body: Value = response.json();
    assert_eq!(body["code"], "unauthorized");
    assert_eq!(body["status"], 401);
}

#[tokio::test]
async fn test_token_from_another_secret_is_rejected() {
    let app = common::spawn();
    let foreign = JwtService::new("some-other-secret-that-is-also-32-chars-long");
    let user = UserContext {
        user_id: 1,
        name: "mallory".to_string(),
    };
    let token = foreign.issue_token(&user, "s").unwrap();

    let response = app.server.get("/cases").authorization_bearer(token).await;
    assert_eq!(response.status_code(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_expired_token_is_rejected() {
    let app = common::spawn();
    let expired =
        JwtService::new(common::SECRET).with_token_duration(chrono::Duration::minutes(-5));
    let user = UserContext {
        user_id: 1,
        name: "late".to_string(),
    };
    let token = expired.issue_token(&user, "s").unwrap();

    let response = app.server.get("/cases").authorization_bearer(token).await;
    assert_eq!(response.status_code(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_rate_limit() {
    let app = common::spawn_with(cases_api::config::ApiConfig {
        rate_limit_per_minute: 2,
        ..common::test_config()
    });
    let token = app.token(1, "busy");

    let mut limited = false;
    for _ in 0..10 {
        let response = app.server.get("/cases").authorization_bearer(&token).await;
        if response.status_code() == StatusCode::TOO_MANY_REQUESTS {
            let body: Value = response.json();
            assert_eq!(body["code"], "rate_limited");
            limited = true;
            break;
        }
    }
    assert!(limited);
}
