//! Integration tests for related cases.

#[path = "common/mod.rs"]
mod common;

use axum::http::StatusCode;
use serde_json::{Value, json};

struct Fixture {
    app: common::TestApp,
    token: String,
    ids: Vec<i64>,
}

async fn fixture(count: usize) -> Fixture {
    let app = common::spawn();
    let token = app.token(1, "agent");
    let catalogs = common::seed_catalogs(&app, &token).await;
    let mut ids = Vec::new();
    for i in 0..count {
        let case = common::create_case(&app, &token, &catalogs, &format!("Case {}", i)).await;
        ids.push(case["id"].as_i64().unwrap());
    }
    Fixture { app, token, ids }
}

impl Fixture {
    async fn relate(&self, from: i64, to: i64, relation: &str) -> axum_test::TestResponse {
        self.app
            .server
            .post(&format!("/cases/{}/related", from))
            .authorization_bearer(&self.token)
            .json(&json!([{"related_case": {"id": to}, "relation_type": relation}]))
            .await
    }

    async fn related_of(&self, case_id: i64) -> Vec<Value> {
        let page: Value = self
            .app
            .server
            .get(&format!("/cases/{}/related", case_id))
            .authorization_bearer(&self.token)
            .await
            .json();
        page["items"].as_array().cloned().unwrap_or_default()
    }
}

#[tokio::test]
async fn test_relation_visible_from_both_sides() {
    let f = fixture(2).await;
    let (a, b) = (f.ids[0], f.ids[1]);

    let created: Value = f.relate(a, b, "BLOCKS").await.json();
    assert_eq!(created[0]["primary_case"]["id"], a);
    assert_eq!(created[0]["related_case"]["id"], b);
    assert_eq!(created[0]["related_case"]["name"], format!("CS-{}", b));

    let from_a = f.related_of(a).await;
    assert_eq!(from_a.len(), 1);
    assert_eq!(from_a[0]["relation_type"], "BLOCKS");

    let from_b = f.related_of(b).await;
    assert_eq!(from_b.len(), 1);
    assert_eq!(from_b[0]["primary_case"]["id"], b);
    assert_eq!(from_b[0]["related_case"]["id"], a);
    assert_eq!(from_b[0]["relation_type"], "IS_BLOCKED_BY");
}

#[tokio::test]
async fn test_duplicate_and_self_relations() {
    let f = fixture(2).await;
    let (a, b) = (f.ids[0], f.ids[1]);

    f.relate(a, b, "RELATES_TO").await.assert_status_ok();
    let again = f.relate(b, a, "CAUSES").await;
    assert_eq!(again.status_code(), StatusCode::CONFLICT);

    let selfish = f.relate(a, a, "RELATES_TO").await;
    assert_eq!(selfish.status_code(), StatusCode::BAD_REQUEST);

    let missing = f.relate(a, 999_999, "RELATES_TO").await;
    assert_eq!(missing.status_code(), StatusCode::BAD_REQUEST);

    let untyped = f
        .app
        .server
        .post(&format!("/cases/{}/related", b))
        .authorization_bearer(&f.token)
        .json(&json!([{"related_case": {"id": a}}]))
        .await;
    assert!(untyped.status_code().is_client_error());
}

#[tokio::test]
async fn test_parent_child_cycle_rejected() {
    let f = fixture(3).await;
    let (a, b, c) = (f.ids[0], f.ids[1], f.ids[2]);

    f.relate(a, b, "IS_CHILD_OF").await.assert_status_ok();
    f.relate(b, c, "IS_CHILD_OF").await.assert_status_ok();
    let cycle = f.relate(a, c, "IS_PARENT_OF").await;
    assert_eq!(cycle.status_code(), StatusCode::BAD_REQUEST);

    let fine = f.relate(c, a, "RELATES_TO").await;
    fine.assert_status_ok();
}

#[tokio::test]
async fn test_update_from_inverted_side() {
    let f = fixture(3).await;
    let (a, b, c) = (f.ids[0], f.ids[1], f.ids[2]);

    let created: Value = f.relate(a, b, "DUPLICATES").await.json();
    let rel_etag = created[0]["etag"].as_str().unwrap().to_string();

    let updated: Value = f
        .app
        .server
        .patch(&format!("/cases/{}/related/{}", b, rel_etag))
        .authorization_bearer(&f.token)
        .json(&json!({"relation_type": "BLOCKS"}))
        .await
        .json();
    assert_eq!(updated["primary_case"]["id"], b);
    assert_eq!(updated["relation_type"], "BLOCKS");

    let from_a = f.related_of(a).await;
    assert_eq!(from_a[0]["relation_type"], "IS_BLOCKED_BY");

    let retarget = f
        .app
        .server
        .patch(&format!("/cases/{}/related/{}", b, updated["id"]))
        .authorization_bearer(&f.token)
        .json(&json!({"related_case": {"id": c}}))
        .await;
    assert_eq!(retarget.status_code(), StatusCode::BAD_REQUEST);

    let owner_retarget: Value = f
        .app
        .server
        .patch(&format!("/cases/{}/related/{}", a, updated["id"]))
        .authorization_bearer(&f.token)
        .json(&json!({"related_case": {"id": c}}))
        .await
        .json();
    assert_eq!(owner_retarget["related_case"]["id"], c);
    assert!(f.related_of(b).await.is_empty());
}

#[tokio::test]
async fn test_stale_relation_etag() {
    let f = fixture(2).await;
    let (a, b) = (f.ids[0], f.ids[1]);
    let created: Value = f.relate(a, b, "CAUSES").await.json();
    let v1 = created[0]["etag"].as_str().unwrap().to_string();

    f.app
        .server
        .put(&format!("/cases/{}/related/{}", a, v1))
        .authorization_bearer(&f.token)
        .json(&json!({"related_case": {"id": b}, "relation_type": "RELATES_TO"}))
        .await
        .assert_status_ok();

    let stale = f
        .app
        .server
        .delete(&format!("/cases/{}/related/{}", a, v1))
        .authorization_bearer(&f.token)
        .await;
    assert_eq!(stale.status_code(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_reset_replaces_owned_relations() {
    let f = fixture(4).await;
    let (a, b, c, d) = (f.ids[0], f.ids[1], f.ids[2], f.ids[3]);

    f.relate(a, b, "RELATES_TO").await.assert_status_ok();
    f.relate(d, a, "BLOCKS").await.assert_status_ok();

    let reset: Value = f
        .app
        .server
        .put(&format!("/cases/{}/related", a))
        .authorization_bearer(&f.token)
        .json(&json!([{"related_case": {"id": c}, "relation_type": "CAUSES"}]))
        .await
        .json();
    assert_eq!(reset.as_array().unwrap().len(), 1);

    let mut seen: Vec<i64> = f
        .related_of(a)
        .await
        .iter()
        .map(|r| r["related_case"]["id"].as_i64().unwrap())
        .collect();
    seen.sort();
    assert_eq!(seen, vec![c, d]);
    assert!(f.related_of(b).await.is_empty());
}

#[tokio::test]
async fn test_reset_with_empty_list_clears_owned_relations() {
    let f = fixture(3).await;
    let (a, b, c) = (f.ids[0], f.ids[1], f.ids[2]);

    f.relate(a, b, "BLOCKS").await.assert_status_ok();
    f.relate(c, a, "RELATES_TO").await.assert_status_ok();

    let response = f
        .app
        .server
        .put(&format!("/cases/{}/related", a))
        .authorization_bearer(&f.token)
        .json(&json!([]))
        .await;
    response.assert_status_ok();
    let reset: Value = response.json();
    assert_eq!(reset, json!([]));

    assert!(f.related_of(b).await.is_empty());
    let from_a = f.related_of(a).await;
    assert_eq!(from_a.len(), 1);
    assert_eq!(from_a[0]["related_case"]["id"], c);

    let merge_nothing = f
        .app
        .server
        .post(&format!("/cases/{}/related", a))
        .authorization_bearer(&f.token)
        .json(&json!([]))
        .await;
    assert_eq!(merge_nothing.status_code(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_relation_not_visible_from_unrelated_case() {
    let f = fixture(3).await;
    let (a, b, c) = (f.ids[0], f.ids[1], f.ids[2]);
    let created: Value = f.relate(a, b, "RELATES_TO").await.json();

    let response = f
        .app
        .server
        .get(&format!("/cases/{}/related/{}", c, created[0]["id"]))
        .authorization_bearer(&f.token)
        .await;
    assert_eq!(response.status_code(), StatusCode::NOT_FOUND);

    let deleted = f
        .app
        .server
        .delete(&format!("/cases/{}/related/{}", b, created[0]["id"]))
        .authorization_bearer(&f.token)
        .await;
    deleted.assert_status_ok();
    assert!(f.related_of(a).await.is_empty());
}
