mod common;

use axum::http::StatusCode;
use chrono::{DateTime, Duration, Utc};
use serde_json::{Value, json};

use common::bearer;

// ─── CREATE ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_create_link_with_custom_slug() {
    let app = common::spawn_app();
    let (_, token) = app.account("alice").await;

    let response = app
        .server
        .post("/api/links")
        .add_header("Authorization", bearer(&token))
        .json(&json!({ "url": "https://example.com/sale", "custom_slug": "spring-sale" }))
        .await;

    response.assert_status(StatusCode::CREATED);
    let body = response.json::<Value>();
    assert_eq!(body["slug"], "spring-sale");
    assert_eq!(body["short_url"], "https://min.fy/spring-sale");
    assert_eq!(body["status"], "active");
    assert_eq!(body["days_until_expiry"], 30);
    assert_eq!(body["is_active"], true);
}

#[tokio::test]
async fn test_create_link_trims_custom_slug() {
    let app = common::spawn_app();
    let (_, token) = app.account("alice").await;

    let response = app
        .server
        .post("/api/links")
        .add_header("Authorization", bearer(&token))
        .json(&json!({ "url": "https://example.com", "custom_slug": "  my-link  " }))
        .await;

    response.assert_status(StatusCode::CREATED);
    assert_eq!(response.json::<Value>()["slug"], "my-link");
}

#[tokio::test]
async fn test_create_link_random_slug() {
    let app = common::spawn_app();
    let (_, token) = app.account("alice").await;

    let response = app
        .server
        .post("/api/links")
        .add_header("Authorization", bearer(&token))
        .json(&json!({ "url": "https://example.com", "custom_slug": "" }))
        .await;

    response.assert_status(StatusCode::CREATED);
    let slug = response.json::<Value>()["slug"].as_str().unwrap().to_string();
    assert_eq!(slug.len(), 6);
    assert!(slug.chars().all(|c| c.is_ascii_alphanumeric()));
}

#[tokio::test]
async fn test_create_link_invalid_slugs() {
    let app = common::spawn_app();
    let (_, token) = app.account("alice").await;

    for slug in ["MyLink", "my_link", "my--link", "-edge", "abc"] {
        let response = app
            .server
            .post("/api/links")
            .add_header("Authorization", bearer(&token))
            .json(&json!({ "url": "https://example.com", "custom_slug": slug }))
            .await;

        response.assert_status_bad_request();
        let body = response.json::<Value>();
        assert_eq!(body["error"]["code"], "validation_error", "{slug}");
        assert_eq!(body["error"]["details"]["kind"], "invalid_format", "{slug}");
    }
}

#[tokio::test]
async fn test_create_link_reserved_slug() {
    let app = common::spawn_app();
    let (_, token) = app.account("alice").await;

    let response = app
        .server
        .post("/api/links")
        .add_header("Authorization", bearer(&token))
        .json(&json!({ "url": "https://example.com", "custom_slug": "admin" }))
        .await;

    response.assert_status_bad_request();
    assert_eq!(
        response.json::<Value>()["error"]["details"]["kind"],
        "reserved_slug"
    );
}

#[tokio::test]
async fn test_create_link_taken_slug_across_owners() {
    let app = common::spawn_app();
    let (bob, _) = app.account("bob").await;
    let (_, token) = app.account("alice").await;
    app.link(bob.id, "team", Utc::now() + Duration::days(30))
        .await;

    let response = app
        .server
        .post("/api/links")
        .add_header("Authorization", bearer(&token))
        .json(&json!({ "url": "https://example.com", "custom_slug": "team" }))
        .await;

    response.assert_status(StatusCode::CONFLICT);
    let body = response.json::<Value>();
    assert_eq!(body["error"]["code"], "conflict");
    assert_eq!(body["error"]["details"]["kind"], "slug_taken");
}

#[tokio::test]
async fn test_create_link_invalid_url() {
    let app = common::spawn_app();
    let (_, token) = app.account("alice").await;

    for url in ["", "not a url", "ftp://example.com/file", "javascript:alert(1)"] {
        let response = app
            .server
            .post("/api/links")
            .add_header("Authorization", bearer(&token))
            .json(&json!({ "url": url }))
            .await;

        response.assert_status_bad_request();
    }
}

#[tokio::test]
async fn test_create_link_requires_token() {
    let app = common::spawn_app();

    let response = app
        .server
        .post("/api/links")
        .json(&json!({ "url": "https://example.com" }))
        .await;

    response.assert_status_unauthorized();
    assert_eq!(response.header("www-authenticate"), "Bearer");
}

#[tokio::test]
async fn test_create_link_rejects_unknown_token() {
    let app = common::spawn_app();

    let response = app
        .server
        .post("/api/links")
        .add_header("Authorization", bearer("not-a-real-token"))
        .json(&json!({ "url": "https://example.com" }))
        .await;

    response.assert_status_unauthorized();
}

#[tokio::test]
async fn test_create_link_forbidden_for_deleted_account() {
    let app = common::spawn_app();
    let (_, token) = app.account("alice").await;

    app.server
        .delete("/api/account")
        .add_header("Authorization", bearer(&token))
        .await
        .assert_status_ok();

    let response = app
        .server
        .post("/api/links")
        .add_header("Authorization", bearer(&token))
        .json(&json!({ "url": "https://example.com" }))
        .await;

    response.assert_status_forbidden();
}

// ─── LIST ────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_list_links_only_live_and_own() {
    let app = common::spawn_app();
    let (alice, token) = app.account("alice").await;
    let (bob, _) = app.account("bob").await;
    let now = Utc::now();

    app.link(alice.id, "soon", now + Duration::days(2)).await;
    app.link(alice.id, "later", now + Duration::days(20)).await;
    app.link(alice.id, "past", now - Duration::days(1)).await;
    let paused = app.link(alice.id, "paused", now + Duration::days(20)).await;
    app.deactivate(paused.id).await;
    app.link(bob.id, "bobs", now + Duration::days(20)).await;

    let response = app
        .server
        .get("/api/links")
        .add_header("Authorization", bearer(&token))
        .await;

    response.assert_status_ok();
    let body = response.json::<Value>();
    assert_eq!(body["pagination"]["total_items"], 2);

    let items = body["items"].as_array().unwrap();
    let slugs: Vec<&str> = items.iter().map(|i| i["slug"].as_str().unwrap()).collect();
    // Newest first.
    assert_eq!(slugs, vec!["later", "soon"]);
    assert_eq!(items[1]["status"], "expiring_soon");
    assert_eq!(items[0]["status"], "active");
}

#[tokio::test]
async fn test_list_links_pagination() {
    let app = common::spawn_app();
    let (alice, token) = app.account("alice").await;

    for i in 0..3 {
        app.link(alice.id, &format!("link{i}"), Utc::now() + Duration::days(10))
            .await;
    }

    let response = app
        .server
        .get("/api/links")
        .add_query_param("page", 2)
        .add_query_param("page_size", 2)
        .add_header("Authorization", bearer(&token))
        .await;

    response.assert_status_ok();
    let body = response.json::<Value>();
    assert_eq!(body["pagination"]["total_items"], 3);
    assert_eq!(body["pagination"]["total_pages"], 2);
    assert_eq!(body["items"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_list_links_invalid_page_size() {
    let app = common::spawn_app();
    let (_, token) = app.account("alice").await;

    app.server
        .get("/api/links")
        .add_query_param("page_size", 500)
        .add_header("Authorization", bearer(&token))
        .await
        .assert_status_bad_request();
}

// ─── EXTEND ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_extend_overdue_link() {
    let app = common::spawn_app();
    let (alice, token) = app.account("alice").await;
    let old_expiry = Utc::now() - Duration::days(10);
    let link = app.link(alice.id, "overdue", old_expiry).await;
    app.deactivate(link.id).await;

    let response = app
        .server
        .post(&format!("/api/links/{}/extend", link.id))
        .add_header("Authorization", bearer(&token))
        .await;

    response.assert_status_ok();
    let body = response.json::<Value>();
    let new_expiry: DateTime<Utc> = serde_json::from_value(body["expires_at"].clone()).unwrap();
    assert_eq!(new_expiry, old_expiry + Duration::days(7));
    assert_eq!(body["is_active"], true);
    // Still in the past after one extension.
    assert_eq!(body["status"], "expired");
}

#[tokio::test]
async fn test_extend_foreign_link_is_not_found() {
    let app = common::spawn_app();
    let (bob, _) = app.account("bob").await;
    let (_, token) = app.account("alice").await;
    let link = app.link(bob.id, "bobs", Utc::now() + Duration::days(5)).await;

    app.server
        .post(&format!("/api/links/{}/extend", link.id))
        .add_header("Authorization", bearer(&token))
        .await
        .assert_status_not_found();

    assert_eq!(app.stored_link("bobs").await.expires_at, link.expires_at);
}

// ─── DELETE ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_delete_link_success() {
    let app = common::spawn_app();
    let (alice, token) = app.account("alice").await;
    let link = app.link(alice.id, "del1", Utc::now() + Duration::days(5)).await;

    app.server
        .delete(&format!("/api/links/{}", link.id))
        .add_header("Authorization", bearer(&token))
        .await
        .assert_status(StatusCode::NO_CONTENT);

    app.server.get("/del1").await.assert_status_not_found();
}

#[tokio::test]
async fn test_delete_link_not_found() {
    let app = common::spawn_app();
    let (_, token) = app.account("alice").await;

    app.server
        .delete("/api/links/9999")
        .add_header("Authorization", bearer(&token))
        .await
        .assert_status_not_found();
}

#[tokio::test]
async fn test_delete_foreign_link_is_forbidden() {
    let app = common::spawn_app();
    let (bob, _) = app.account("bob").await;
    let (_, token) = app.account("alice").await;
    let link = app.link(bob.id, "bobs", Utc::now() + Duration::days(5)).await;

    app.server
        .delete(&format!("/api/links/{}", link.id))
        .add_header("Authorization", bearer(&token))
        .await
        .assert_status_forbidden();

    assert_eq!(app.server.get("/bobs").await.status_code(), 307);
}
