//! Integration tests for the case endpoints.

#[path = "common/mod.rs"]
mod common;

use axum::http::StatusCode;
use cases_api::models::Sla;
use cases_api::storage::Repository;
use chrono::{DateTime, Utc};
use serde_json::{Value, json};

fn timestamp(v: &Value) -> DateTime<Utc> {
    v.as_str().unwrap().parse().unwrap()
}

#[tokio::test]
async fn test_create_case_fills_server_fields() {
    let app = common::spawn();
    let token = app.token(7, "Agent Seven");
    let catalogs = common::seed_catalogs(&app, &token).await;

    let case = common::create_case(&app, &token, &catalogs, "Cannot log in").await;
    let id = case["id"].as_i64().unwrap();
    assert_eq!(case["name"], format!("CS-{}", id));
    assert_eq!(case["ver"], 1);
    assert!(!case["etag"].as_str().unwrap().is_empty());
    assert_eq!(case["source"]["name"], "Phone");
    assert_eq!(case["status"]["name"], "Support");
    assert_eq!(case["status_condition"]["id"], catalogs.initial_condition);
    assert_eq!(case["status_condition"]["name"], "New");
    assert_eq!(case["author"]["id"], 7);
    assert_eq!(case["created_by"]["name"], "Agent Seven");
    assert!(case.get("sla").is_none());
}

#[tokio::test]
async fn test_create_case_validation() {
    let app = common::spawn();
    let token = app.token(1, "agent");
    let catalogs = common::seed_catalogs(&app, &token).await;

    let no_subject = app
        .server
        .post("/cases")
        .authorization_bearer(&token)
        .json(&json!({"source": {"id": catalogs.source}, "status": {"id": catalogs.status}}))
        .await;
    assert_eq!(no_subject.status_code(), StatusCode::BAD_REQUEST);

    let unknown_priority = app
        .server
        .post("/cases")
        .authorization_bearer(&token)
        .json(&json!({
            "subject": "x",
            "source": {"id": catalogs.source},
            "status": {"id": catalogs.status},
            "priority": {"id": 555555}
        }))
        .await;
    assert_eq!(unknown_priority.status_code(), StatusCode::BAD_REQUEST);

    let foreign_condition = app
        .server
        .post("/cases")
        .authorization_bearer(&token)
        .json(&json!({
            "subject": "x",
            "source": {"id": catalogs.source},
            "status": {"id": catalogs.status},
            "status_condition": {"id": catalogs.close_reason}
        }))
        .await;
    assert_eq!(foreign_condition.status_code(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_sla_planned_times() {
    let app = common::spawn();
    let token = app.token(1, "agent");
    let catalogs = common::seed_catalogs(&app, &token).await;

    let urgent: Value = app
        .server
        .post("/cases")
        .authorization_bearer(&token)
        .json(&json!({
            "subject": "Production outage",
            "source": {"id": catalogs.source},
            "status": {"id": catalogs.status},
            "priority": {"id": catalogs.priority_high},
            "sla": {"id": catalogs.sla}
        }))
        .await
        .json();
    assert_eq!(urgent["sla_condition"]["id"], catalogs.sla_condition);
    let created = timestamp(&urgent["created_at"]);
    assert_eq!((timestamp(&urgent["planned_reaction_at"]) - created).num_minutes(), 15);
    assert_eq!((timestamp(&urgent["planned_resolve_at"]) - created).num_minutes(), 120);

    let routine: Value = app
        .server
        .post("/cases")
        .authorization_bearer(&token)
        .json(&json!({
            "subject": "Typo on page",
            "source": {"id": catalogs.source},
            "status": {"id": catalogs.status},
            "priority": {"id": catalogs.priority_low},
            "sla": {"id": catalogs.sla}
        }))
        .await
        .json();
    assert!(routine.get("sla_condition").is_none());
    let created = timestamp(&routine["created_at"]);
    assert_eq!((timestamp(&routine["planned_reaction_at"]) - created).num_minutes(), 60);
    assert_eq!((timestamp(&routine["planned_resolve_at"]) - created).num_minutes(), 480);
}

#[tokio::test]
async fn test_out_of_range_sla_minutes() {
    let app = common::spawn();
    let token = app.token(1, "agent");
    let catalogs = common::seed_catalogs(&app, &token).await;

    let huge = app
        .server
        .post("/cases/slas")
        .authorization_bearer(&token)
        .json(&json!({
            "name": "Forever",
            "reaction_time": 200_000_000_000i64,
            "resolution_time": 200_000_000_000i64
        }))
        .await;
    assert_eq!(huge.status_code(), StatusCode::BAD_REQUEST);

    // A record stored without validation must not break case writes.
    let stored = Repository::<Sla>::new(app.state.storage.clone())
        .insert(None, Sla::new("Legacy", 200_000_000_000, 200_000_000_000))
        .await
        .unwrap();
    let response = app
        .server
        .post("/cases")
        .authorization_bearer(&token)
        .json(&json!({
            "subject": "Long wait",
            "source": {"id": catalogs.source},
            "status": {"id": catalogs.status},
            "sla": {"id": stored.id}
        }))
        .await;
    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert_eq!(body["code"], "invalid_argument");
}

#[tokio::test]
async fn test_closing_requires_reason_from_group() {
    let app = common::spawn();
    let token = app.token(1, "agent");
    let catalogs = common::seed_catalogs(&app, &token).await;
    let case = common::create_case(&app, &token, &catalogs, "Close me").await;
    let id = case["id"].as_i64().unwrap();

    let without_reason = app
        .server
        .patch(&format!("/cases/{}", id))
        .authorization_bearer(&token)
        .json(&json!({"status_condition": {"id": catalogs.final_condition}}))
        .await;
    assert_eq!(without_reason.status_code(), StatusCode::BAD_REQUEST);

    let other_group: Value = app
        .server
        .post("/cases/close_reason_groups")
        .authorization_bearer(&token)
        .json(&json!({"name": "Spam"}))
        .await
        .json();
    let wrong_group = app
        .server
        .patch(&format!("/cases/{}", id))
        .authorization_bearer(&token)
        .json(&json!({
            "status_condition": {"id": catalogs.final_condition},
            "close_reason_group": {"id": other_group["id"]},
            "close": {"close_reason": {"id": catalogs.close_reason}}
        }))
        .await;
    assert_eq!(wrong_group.status_code(), StatusCode::BAD_REQUEST);

    let closed: Value = app
        .server
        .patch(&format!("/cases/{}", id))
        .authorization_bearer(&token)
        .json(&json!({
            "status_condition": {"id": catalogs.final_condition},
            "close_reason_group": {"id": catalogs.close_reason_group},
            "close": {"close_result": "Reset password", "close_reason": {"id": catalogs.close_reason}}
        }))
        .await
        .json();
    assert_eq!(closed["status_condition"]["name"], "Closed");
    assert_eq!(closed["close"]["close_reason"]["name"], "Solved");
    assert_eq!(closed["close"]["close_result"], "Reset password");
}

#[tokio::test]
async fn test_moving_case_to_another_status() {
    let app = common::spawn();
    let token = app.token(1, "agent");
    let catalogs = common::seed_catalogs(&app, &token).await;
    let case = common::create_case(&app, &token, &catalogs, "Billing dispute").await;
    let id = case["id"].as_i64().unwrap();

    let escalation: Value = app
        .server
        .post("/cases/statuses")
        .authorization_bearer(&token)
        .json(&json!({"name": "Escalation"}))
        .await
        .json();
    let escalation_id = escalation["id"].as_i64().unwrap();
    let conditions = format!("/cases/statuses/{}/status", escalation_id);
    let triage: Value = app
        .server
        .post(&conditions)
        .authorization_bearer(&token)
        .json(&json!({"name": "Triage"}))
        .await
        .json();
    let working: Value = app
        .server
        .post(&conditions)
        .authorization_bearer(&token)
        .json(&json!({"name": "Working"}))
        .await
        .json();

    let moved: Value = app
        .server
        .patch(&format!("/cases/{}", id))
        .authorization_bearer(&token)
        .json(&json!({"status": {"id": escalation_id}}))
        .await
        .json();
    assert_eq!(moved["status"]["id"], escalation_id);
    assert_eq!(moved["status_condition"]["id"], triage["id"]);
    assert_eq!(moved["status_condition"]["name"], "Triage");

    let back: Value = app
        .server
        .patch(&format!("/cases/{}", id))
        .authorization_bearer(&token)
        .json(&json!({
            "status": {"id": catalogs.status},
            "status_condition": {"id": catalogs.initial_condition}
        }))
        .await
        .json();
    assert_eq!(back["status_condition"]["id"], catalogs.initial_condition);

    let explicit: Value = app
        .server
        .patch(&format!("/cases/{}", id))
        .authorization_bearer(&token)
        .json(&json!({
            "status": {"id": escalation_id},
            "status_condition": {"id": working["id"]}
        }))
        .await
        .json();
    assert_eq!(explicit["status_condition"]["id"], working["id"]);

    let mismatched = app
        .server
        .patch(&format!("/cases/{}", id))
        .authorization_bearer(&token)
        .json(&json!({
            "status": {"id": catalogs.status},
            "status_condition": {"id": working["id"]}
        }))
        .await;
    assert_eq!(mismatched.status_code(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_patch_and_put() {
    let app = common::spawn();
    let token = app.token(3, "agent");
    let catalogs = common::seed_catalogs(&app, &token).await;
    let case = common::create_case(&app, &token, &catalogs, "Slow laptop").await;
    let etag = case["etag"].as_str().unwrap();

    let patched: Value = app
        .server
        .patch(&format!("/cases/{}", etag))
        .authorization_bearer(&token)
        .json(&json!({"description": "Takes 10 minutes to boot", "name": "ignored"}))
        .await
        .json();
    assert_eq!(patched["subject"], "Slow laptop");
    assert_eq!(patched["description"], "Takes 10 minutes to boot");
    assert_eq!(patched["name"], case["name"]);
    assert_eq!(patched["ver"], 2);

    let masked: Value = app
        .server
        .patch(&format!("/cases/{}", patched["id"]))
        .authorization_bearer(&token)
        .add_query_param("x_json_mask", "subject")
        .json(&json!({"subject": "Very slow laptop", "description": "not applied"}))
        .await
        .json();
    assert_eq!(masked["subject"], "Very slow laptop");
    assert_eq!(masked["description"], "Takes 10 minutes to boot");

    let replaced: Value = app
        .server
        .put(&format!("/cases/{}", masked["etag"].as_str().unwrap()))
        .authorization_bearer(&token)
        .json(&json!({
            "subject": "Laptop replaced",
            "source": {"id": catalogs.source},
            "status": {"id": catalogs.status}
        }))
        .await
        .json();
    assert_eq!(replaced["subject"], "Laptop replaced");
    assert!(replaced.get("description").is_none());
    assert_eq!(replaced["author"]["id"], 3);
    assert_eq!(replaced["status_condition"]["id"], catalogs.initial_condition);

    let bad_mask = app
        .server
        .patch(&format!("/cases/{}", replaced["id"]))
        .authorization_bearer(&token)
        .add_query_param("x_json_mask", "etag")
        .json(&json!({"etag": "x"}))
        .await;
    assert_eq!(bad_mask.status_code(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_search_cases() {
    let app = common::spawn();
    let token = app.token(1, "agent");
    let catalogs = common::seed_catalogs(&app, &token).await;
    common::create_case(&app, &token, &catalogs, "Printer jam").await;
    common::create_case(&app, &token, &catalogs, "Printer out of toner").await;
    let urgent: Value = app
        .server
        .post("/cases")
        .authorization_bearer(&token)
        .json(&json!({
            "subject": "Email down",
            "source": {"id": catalogs.source},
            "status": {"id": catalogs.status},
            "priority": {"id": catalogs.priority_high}
        }))
        .await
        .json();

    let printers: Value = app
        .server
        .get("/cases")
        .authorization_bearer(&token)
        .add_query_param("q", "printer")
        .await
        .json();
    assert_eq!(printers["items"].as_array().unwrap().len(), 2);

    let high: Value = app
        .server
        .get("/cases")
        .authorization_bearer(&token)
        .add_query_param("priority", catalogs.priority_high)
        .add_query_param("fields", "id,subject")
        .await
        .json();
    let items = high["items"].as_array().unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0], json!({"id": urgent["id"], "subject": "Email down"}));

    let by_id: Value = app
        .server
        .get("/cases")
        .authorization_bearer(&token)
        .add_query_param("id", format!("{},999999", urgent["id"]))
        .await
        .json();
    assert_eq!(by_id["items"].as_array().unwrap().len(), 1);

    let newest_first: Value = app
        .server
        .get("/cases")
        .authorization_bearer(&token)
        .add_query_param("sort", "-id")
        .add_query_param("size", 1)
        .await
        .json();
    assert_eq!(newest_first["items"][0]["id"], urgent["id"]);
    assert_eq!(newest_first["next"], true);

    let bad_filter = app
        .server
        .get("/cases")
        .authorization_bearer(&token)
        .add_query_param("status", "abc")
        .await;
    assert_eq!(bad_filter.status_code(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_locate_with_embeds() {
    let app = common::spawn();
    let token = app.token(1, "agent");
    let catalogs = common::seed_catalogs(&app, &token).await;
    let case = common::create_case(&app, &token, &catalogs, "Embed me").await;
    let etag = case["etag"].as_str().unwrap();

    app.server
        .post(&format!("/cases/{}/comments", etag))
        .authorization_bearer(&token)
        .json(&json!([{"text": "Looking into it"}]))
        .await
        .assert_status_ok();

    let plain: Value = app
        .server
        .get(&format!("/cases/{}", etag))
        .authorization_bearer(&token)
        .await
        .json();
    assert_eq!(plain["subject"], "Embed me");
    assert!(plain.get("comments").is_none());

    let embedded: Value = app
        .server
        .get(&format!("/cases/{}", etag))
        .authorization_bearer(&token)
        .add_query_param("fields", "id,subject,comments,files")
        .await
        .json();
    assert!(embedded.get("status").is_none());
    assert_eq!(embedded["comments"]["items"][0]["text"], "Looking into it");
    assert_eq!(embedded["files"]["items"], json!([]));
}

#[tokio::test]
async fn test_delete_case_cascades() {
    let app = common::spawn();
    let token = app.token(1, "agent");
    let catalogs = common::seed_catalogs(&app, &token).await;
    let case = common::create_case(&app, &token, &catalogs, "Doomed").await;
    let other = common::create_case(&app, &token, &catalogs, "Survivor").await;
    let id = case["id"].as_i64().unwrap();

    app.server
        .post(&format!("/cases/{}/related", other["id"]))
        .authorization_bearer(&token)
        .json(&json!([{"related_case": {"id": id}, "relation_type": "RELATES_TO"}]))
        .await
        .assert_status_ok();
    app.server
        .post(&format!("/cases/{}/files", id))
        .authorization_bearer(&token)
        .json(&json!({"name": "log.txt", "size": 120}))
        .await
        .assert_status_ok();

    let deleted: Value = app
        .server
        .delete(&format!("/cases/{}", case["etag"].as_str().unwrap()))
        .authorization_bearer(&token)
        .await
        .json();
    assert_eq!(deleted["id"], id);

    let gone = app
        .server
        .get(&format!("/cases/{}", id))
        .authorization_bearer(&token)
        .await;
    assert_eq!(gone.status_code(), StatusCode::NOT_FOUND);

    let related: Value = app
        .server
        .get(&format!("/cases/{}/related", other["id"]))
        .authorization_bearer(&token)
        .await
        .json();
    assert_eq!(related["items"], json!([]));
}

#[tokio::test]
async fn test_malformed_case_reference() {
    let app = common::spawn();
    let token = app.token(1, "agent");
    let response = app
        .server
        .get("/cases/!!not-an-etag!!")
        .authorization_bearer(&token)
        .await;
    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
}
