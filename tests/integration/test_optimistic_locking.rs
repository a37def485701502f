//! Integration tests for etag-based optimistic locking.

#[path = "common/mod.rs"]
mod common;

use axum::http::StatusCode;
use cases_api::models::Etag;
use cases_api::storage::RecordKind;
use serde_json::{Value, json};

#[tokio::test]
async fn test_stale_etag_is_rejected() {
    let app = common::spawn();
    let token = app.token(1, "agent");
    let catalogs = common::seed_catalogs(&app, &token).await;
    let case = common::create_case(&app, &token, &catalogs, "Race").await;
    let v1 = case["etag"].as_str().unwrap().to_string();

    let first = app
        .server
        .patch(&format!("/cases/{}", v1))
        .authorization_bearer(&token)
        .json(&json!({"description": "first writer"}))
        .await;
    first.assert_status_ok();
    let v2: Value = first.json();
    assert_ne!(v2["etag"], case["etag"]);

    let second = app
        .server
        .patch(&format!("/cases/{}", v1))
        .authorization_bearer(&token)
        .json(&json!({"description": "second writer"}))
        .await;
    assert_eq!(second.status_code(), StatusCode::CONFLICT);
    let body: Value = second.json();
    assert_eq!(body["code"], "version_conflict");

    let current: Value = app
        .server
        .get(&format!("/cases/{}", case["id"]))
        .authorization_bearer(&token)
        .await
        .json();
    assert_eq!(current["description"], "first writer");
}

#[tokio::test]
async fn test_bare_id_skips_version_check() {
    let app = common::spawn();
    let token = app.token(1, "agent");
    let catalogs = common::seed_catalogs(&app, &token).await;
    let case = common::create_case(&app, &token, &catalogs, "Last write wins").await;
    let id = case["id"].as_i64().unwrap();

    for text in ["one", "two"] {
        app.server
            .patch(&format!("/cases/{}", id))
            .authorization_bearer(&token)
            .json(&json!({"description": text}))
            .await
            .assert_status_ok();
    }
    let current: Value = app
        .server
        .get(&format!("/cases/{}", id))
        .authorization_bearer(&token)
        .await
        .json();
    assert_eq!(current["ver"], 3);
}

#[tokio::test]
async fn test_stale_delete_is_rejected() {
    let app = common::spawn();
    let token = app.token(1, "agent");
    let catalogs = common::seed_catalogs(&app, &token).await;
    let case = common::create_case(&app, &token, &catalogs, "Delete race").await;
    let stale = case["etag"].as_str().unwrap().to_string();

    let updated: Value = app
        .server
        .patch(&format!("/cases/{}", stale))
        .authorization_bearer(&token)
        .json(&json!({"subject": "Delete race (edited)"}))
        .await
        .json();

    let rejected = app
        .server
        .delete(&format!("/cases/{}", stale))
        .authorization_bearer(&token)
        .await;
    assert_eq!(rejected.status_code(), StatusCode::CONFLICT);

    app.server
        .delete(&format!("/cases/{}", updated["etag"].as_str().unwrap()))
        .authorization_bearer(&token)
        .await
        .assert_status_ok();
}

#[tokio::test]
async fn test_etag_of_another_kind_is_rejected() {
    let app = common::spawn();
    let token = app.token(1, "agent");
    let catalogs = common::seed_catalogs(&app, &token).await;
    let case = common::create_case(&app, &token, &catalogs, "Kinds").await;
    let id = case["id"].as_i64().unwrap();

    let comment_etag = Etag::new(RecordKind::CaseComment, id, 1).encode();
    let response = app
        .server
        .get(&format!("/cases/{}", comment_etag))
        .authorization_bearer(&token)
        .await;
    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_comment_etag_versioning() {
    let app = common::spawn();
    let token = app.token(4, "writer");
    let catalogs = common::seed_catalogs(&app, &token).await;
    let case = common::create_case(&app, &token, &catalogs, "Comment race").await;

    let published: Value = app
        .server
        .post(&format!("/cases/{}/comments", case["id"]))
        .authorization_bearer(&token)
        .json(&json!([{"text": "draft"}]))
        .await
        .json();
    let v1 = published[0]["etag"].as_str().unwrap().to_string();

    app.server
        .put(&format!("/cases/comments/{}", v1))
        .authorization_bearer(&token)
        .json(&json!({"text": "final"}))
        .await
        .assert_status_ok();

    let stale = app
        .server
        .put(&format!("/cases/comments/{}", v1))
        .authorization_bearer(&token)
        .json(&json!({"text": "lost update"}))
        .await;
    assert_eq!(stale.status_code(), StatusCode::CONFLICT);
}
