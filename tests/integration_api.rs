//! API Integration Tests
//!
//! These tests require a database connection (DATABASE_URL) with the
//! migrations applied.

use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
    middleware, Router,
};
use rust_decimal_macros::dec;
use serde_json::Value;
use sqlx::PgPool;
use tower::util::ServiceExt;
use uuid::Uuid;

use chrono::Utc;
use invitepay::api;
use invitepay::handlers::CreateInvitationCommand;

mod common;

fn test_app(pool: PgPool) -> Router {
    api::create_router()
        .layer(middleware::from_fn(
            invitepay::api::middleware::context_middleware,
        ))
        .with_state(pool)
}

fn member_request(method: &str, uri: &str, user_id: Uuid, body: Option<String>) -> Request<Body> {
    let builder = Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .header("X-User-Id", user_id.to_string())
        .header("X-User-Role", "member");
    match body {
        Some(body) => builder.body(Body::from(body)).unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

fn admin_request(method: &str, uri: &str, admin_id: Uuid, body: Option<String>) -> Request<Body> {
    let builder = Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .header("X-User-Id", admin_id.to_string())
        .header("X-User-Role", "admin");
    match body {
        Some(body) => builder.body(Body::from(body)).unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

async fn json_body(response: axum::response::Response) -> Value {
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&body).unwrap()
}

fn create_command(template_id: Uuid, package_id: Uuid, bride: &str, groom: &str) -> String {
    let command = CreateInvitationCommand::new(
        template_id,
        package_id,
        "Our Wedding".to_string(),
        bride.to_string(),
        groom.to_string(),
        Utc::now(),
    );
    serde_json::to_string(&command).unwrap()
}

#[tokio::test]
async fn test_publish_e2e() {
    let pool = common::setup_test_db().await;
    let app = test_app(pool.clone());

    // User with balance 100.00, package price 50.00
    let user_id = common::seed_user(&pool, "member", dec!(100.00)).await;
    let template_id = common::seed_template(&pool).await;
    let package_id = common::seed_package(&pool, dec!(50.00)).await;

    // 1. Create the draft
    let req = member_request(
        "POST",
        "/invitations",
        user_id,
        Some(create_command(template_id, package_id, "Alice", "Bob")),
    );
    let response = app.clone().oneshot(req).await.unwrap();
    assert_eq!(response.status(), StatusCode::CREATED, "Creation failed");
    let invitation = json_body(response).await;
    assert_eq!(invitation["state"], "draft");
    assert_eq!(invitation["slug"], "alice-bob-wedding");
    assert!(invitation["published_at"].is_null());
    let invitation_id = invitation["id"].as_str().unwrap().to_string();

    // 2. Publish it
    let req = member_request(
        "POST",
        &format!("/invitations/{invitation_id}/publish"),
        user_id,
        None,
    );
    let response = app.clone().oneshot(req).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK, "Publish failed");
    let published = json_body(response).await;
    assert_eq!(published["state"], "published");
    assert!(!published["published_at"].is_null());

    // 3. Balance was debited by exactly the package price
    let req = member_request("GET", "/wallet/balance", user_id, None);
    let response = app.clone().oneshot(req).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json = json_body(response).await;
    assert_eq!(json["balance"], "50.00");

    // 4. Second publish fails AlreadyPublished, balance unchanged
    let req = member_request(
        "POST",
        &format!("/invitations/{invitation_id}/publish"),
        user_id,
        None,
    );
    let response = app.clone().oneshot(req).await.unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);
    let json = json_body(response).await;
    assert_eq!(json["error_code"], "already_published");

    let req = member_request("GET", "/wallet/balance", user_id, None);
    let response = app.clone().oneshot(req).await.unwrap();
    let json = json_body(response).await;
    assert_eq!(json["balance"], "50.00");
}

#[tokio::test]
async fn test_publish_insufficient_balance_changes_nothing() {
    let pool = common::setup_test_db().await;
    let app = test_app(pool.clone());

    let user_id = common::seed_user(&pool, "member", dec!(40.00)).await;
    let template_id = common::seed_template(&pool).await;
    let package_id = common::seed_package(&pool, dec!(50.00)).await;

    let req = member_request(
        "POST",
        "/invitations",
        user_id,
        Some(create_command(template_id, package_id, "Cleo", "Dan")),
    );
    let response = app.clone().oneshot(req).await.unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let invitation = json_body(response).await;
    let invitation_id = invitation["id"].as_str().unwrap().to_string();

    let req = member_request(
        "POST",
        &format!("/invitations/{invitation_id}/publish"),
        user_id,
        None,
    );
    let response = app.clone().oneshot(req).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = json_body(response).await;
    assert_eq!(json["error_code"], "insufficient_balance");

    // invitation is still a draft and the balance is untouched
    let req = member_request("GET", &format!("/invitations/{invitation_id}"), user_id, None);
    let response = app.clone().oneshot(req).await.unwrap();
    let json = json_body(response).await;
    assert_eq!(json["state"], "draft");
    assert!(json["published_at"].is_null());

    let req = member_request("GET", "/wallet/balance", user_id, None);
    let response = app.clone().oneshot(req).await.unwrap();
    let json = json_body(response).await;
    assert_eq!(json["balance"], "40.00");
}

#[tokio::test]
async fn test_publish_requires_ownership() {
    let pool = common::setup_test_db().await;
    let app = test_app(pool.clone());

    let owner_id = common::seed_user(&pool, "member", dec!(100.00)).await;
    let other_id = common::seed_user(&pool, "member", dec!(100.00)).await;
    let template_id = common::seed_template(&pool).await;
    let package_id = common::seed_package(&pool, dec!(50.00)).await;

    let req = member_request(
        "POST",
        "/invitations",
        owner_id,
        Some(create_command(template_id, package_id, "Eve", "Frank")),
    );
    let response = app.clone().oneshot(req).await.unwrap();
    let invitation = json_body(response).await;
    let invitation_id = invitation["id"].as_str().unwrap().to_string();

    let req = member_request(
        "POST",
        &format!("/invitations/{invitation_id}/publish"),
        other_id,
        None,
    );
    let response = app.clone().oneshot(req).await.unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    let json = json_body(response).await;
    assert_eq!(json["error_code"], "permission_denied");
}

#[tokio::test]
async fn test_topup_approval_e2e() {
    let pool = common::setup_test_db().await;
    let app = test_app(pool.clone());

    // TopupRequest for 150000 against a balance of 50000
    let user_id = common::seed_user(&pool, "member", dec!(50000)).await;
    let admin_id = common::seed_user(&pool, "admin", dec!(0)).await;

    // 1. Request the top-up
    let req = member_request(
        "POST",
        "/wallet/topups",
        user_id,
        Some(
            serde_json::json!({
                "amount": "150000",
                "payment_method": "bank_transfer",
                "payment_proof_url": "https://proof.example/receipt.jpg"
            })
            .to_string(),
        ),
    );
    let response = app.clone().oneshot(req).await.unwrap();
    assert_eq!(response.status(), StatusCode::CREATED, "Top-up request failed");
    let topup = json_body(response).await;
    assert_eq!(topup["status"], "pending");
    assert!(topup["processed_at"].is_null());
    let topup_id = topup["id"].as_str().unwrap().to_string();

    // 2. No balance effect while pending
    let req = member_request("GET", "/wallet/balance", user_id, None);
    let response = app.clone().oneshot(req).await.unwrap();
    let json = json_body(response).await;
    assert_eq!(json["balance"], "50000.00");

    // 3. Approve it
    let req = admin_request(
        "POST",
        &format!("/admin/topups/{topup_id}/process"),
        admin_id,
        Some(serde_json::json!({"decision": "approved", "admin_notes": "ok"}).to_string()),
    );
    let response = app.clone().oneshot(req).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK, "Processing failed");
    let processed = json_body(response).await;
    assert_eq!(processed["status"], "approved");
    assert_eq!(processed["processed_by"].as_str().unwrap(), admin_id.to_string());
    assert!(!processed["processed_at"].is_null());

    // 4. Balance reflects exactly one credit
    let req = member_request("GET", "/wallet/balance", user_id, None);
    let response = app.clone().oneshot(req).await.unwrap();
    let json = json_body(response).await;
    assert_eq!(json["balance"], "200000.00");

    // 5. Second processing (any decision) fails AlreadyProcessed
    let req = admin_request(
        "POST",
        &format!("/admin/topups/{topup_id}/process"),
        admin_id,
        Some(serde_json::json!({"decision": "rejected"}).to_string()),
    );
    let response = app.clone().oneshot(req).await.unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);
    let json = json_body(response).await;
    assert_eq!(json["error_code"], "already_processed");

    // balance unchanged after the rejected replay
    let req = member_request("GET", "/wallet/balance", user_id, None);
    let response = app.clone().oneshot(req).await.unwrap();
    let json = json_body(response).await;
    assert_eq!(json["balance"], "200000.00");
}

#[tokio::test]
async fn test_topup_rejection_has_no_balance_effect() {
    let pool = common::setup_test_db().await;
    let app = test_app(pool.clone());

    let user_id = common::seed_user(&pool, "member", dec!(25000)).await;
    let admin_id = common::seed_user(&pool, "admin", dec!(0)).await;

    let req = member_request(
        "POST",
        "/wallet/topups",
        user_id,
        Some(
            serde_json::json!({"amount": "10000", "payment_method": "bank_transfer"}).to_string(),
        ),
    );
    let response = app.clone().oneshot(req).await.unwrap();
    let topup = json_body(response).await;
    let topup_id = topup["id"].as_str().unwrap().to_string();

    let req = admin_request(
        "POST",
        &format!("/admin/topups/{topup_id}/process"),
        admin_id,
        Some(
            serde_json::json!({"decision": "rejected", "admin_notes": "proof unreadable"})
                .to_string(),
        ),
    );
    let response = app.clone().oneshot(req).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let processed = json_body(response).await;
    assert_eq!(processed["status"], "rejected");

    let req = member_request("GET", "/wallet/balance", user_id, None);
    let response = app.clone().oneshot(req).await.unwrap();
    let json = json_body(response).await;
    assert_eq!(json["balance"], "25000.00");
}

#[tokio::test]
async fn test_topup_processing_requires_admin_role() {
    let pool = common::setup_test_db().await;
    let app = test_app(pool.clone());

    let user_id = common::seed_user(&pool, "member", dec!(0)).await;

    let req = member_request(
        "POST",
        "/wallet/topups",
        user_id,
        Some(serde_json::json!({"amount": "5000", "payment_method": "ewallet"}).to_string()),
    );
    let response = app.clone().oneshot(req).await.unwrap();
    let topup = json_body(response).await;
    let topup_id = topup["id"].as_str().unwrap().to_string();

    // a member cannot reach the processing endpoint
    let req = member_request(
        "POST",
        &format!("/admin/topups/{topup_id}/process"),
        user_id,
        Some(serde_json::json!({"decision": "approved"}).to_string()),
    );
    let response = app.clone().oneshot(req).await.unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_slug_collisions_count_upward() {
    let pool = common::setup_test_db().await;
    let app = test_app(pool.clone());

    let user_id = common::seed_user(&pool, "member", dec!(0)).await;
    let template_id = common::seed_template(&pool).await;
    let package_id = common::seed_package(&pool, dec!(50.00)).await;

    // First couple takes the base slug
    let req = member_request(
        "POST",
        "/invitations",
        user_id,
        Some(create_command(template_id, package_id, "Alice", "Bob")),
    );
    let response = app.clone().oneshot(req).await.unwrap();
    let first = json_body(response).await;
    assert_eq!(first["slug"], "alice-bob-wedding");

    // Same names again roll to -1
    let req = member_request(
        "POST",
        "/invitations",
        user_id,
        Some(create_command(template_id, package_id, "Alice", "Bob")),
    );
    let response = app.clone().oneshot(req).await.unwrap();
    let second = json_body(response).await;
    assert_eq!(second["slug"], "alice-bob-wedding-1");

    // A preview for the same names would land on -2
    let req = member_request(
        "GET",
        "/invitations/slug-preview?bride_name=Alice&groom_name=Bob",
        user_id,
        None,
    );
    let response = app.clone().oneshot(req).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json = json_body(response).await;
    assert_eq!(json["slug"], "alice-bob-wedding-2");
}

#[tokio::test]
async fn test_published_slug_is_guest_visible() {
    let pool = common::setup_test_db().await;
    let app = test_app(pool.clone());

    let user_id = common::seed_user(&pool, "member", dec!(100.00)).await;
    let template_id = common::seed_template(&pool).await;
    let package_id = common::seed_package(&pool, dec!(50.00)).await;

    let req = member_request(
        "POST",
        "/invitations",
        user_id,
        Some(create_command(template_id, package_id, "Grace", "Henry")),
    );
    let response = app.clone().oneshot(req).await.unwrap();
    let invitation = json_body(response).await;
    let invitation_id = invitation["id"].as_str().unwrap().to_string();
    let slug = invitation["slug"].as_str().unwrap().to_string();

    // drafts are not visible to guests
    let req = Request::builder()
        .method("GET")
        .uri(format!("/public/invitations/{slug}"))
        .body(Body::empty())
        .unwrap();
    let response = app.clone().oneshot(req).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let req = member_request(
        "POST",
        &format!("/invitations/{invitation_id}/publish"),
        user_id,
        None,
    );
    let response = app.clone().oneshot(req).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let req = Request::builder()
        .method("GET")
        .uri(format!("/public/invitations/{slug}"))
        .body(Body::empty())
        .unwrap();
    let response = app.clone().oneshot(req).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json = json_body(response).await;
    assert_eq!(json["state"], "published");
}
