// ABOUTME: Integration tests for the public contact form endpoint
// ABOUTME: Covers validation failures, persistence, and response shape

mod common;

use anyhow::Result;
use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use leadbox::config::environment::RateLimitConfig;
use leadbox::database_plugins::DatabaseProvider;
use leadbox::server::build_router;
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

fn post_json(uri: &str, body: &Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn valid_payload() -> Value {
    json!({
        "businessName": "Acme Widgets",
        "name": "Jo Smith",
        "email": "jo@acme.test",
        "phone": "555-0100",
        "businessDescription": "We make widgets",
        "package": "Starter"
    })
}

async fn body_json(response: axum::response::Response) -> Result<Value> {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await?;
    Ok(serde_json::from_slice(&bytes)?)
}

#[tokio::test]
async fn valid_submission_returns_201_and_persists() -> Result<()> {
    let (app, resources) = common::create_test_app().await?;

    let response = app
        .oneshot(post_json("/api/submissions", &valid_payload()))
        .await?;
    assert_eq!(response.status(), StatusCode::CREATED);

    let body = body_json(response).await?;
    assert_eq!(body["businessName"], "Acme Widgets");
    assert_eq!(body["status"], "new");
    let id = body["id"].as_i64().unwrap();

    let stored = resources.database.get_submission(id).await?.unwrap();
    assert_eq!(stored.email, "jo@acme.test");
    assert_eq!(stored.status.as_str(), "new");
    Ok(())
}

#[tokio::test]
async fn missing_required_field_returns_400_without_write() -> Result<()> {
    let (app, resources) = common::create_test_app().await?;

    let mut payload = valid_payload();
    payload.as_object_mut().unwrap().remove("email");

    let response = app.oneshot(post_json("/api/submissions", &payload)).await?;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = body_json(response).await?;
    assert!(body["error"].as_str().unwrap().contains("email"));

    assert_eq!(resources.database.count_submissions(None).await?, 0);
    Ok(())
}

#[tokio::test]
async fn malformed_emails_are_rejected() -> Result<()> {
    let (app, resources) = common::create_test_app().await?;

    for bad in ["plainaddress", "a@b", "two@@x.com", "spaced out@x.com"] {
        let mut payload = valid_payload();
        payload["email"] = json!(bad);
        let response = app
            .clone()
            .oneshot(post_json("/api/submissions", &payload))
            .await?;
        assert_eq!(
            response.status(),
            StatusCode::BAD_REQUEST,
            "email {bad} was accepted"
        );
    }

    assert_eq!(resources.database.count_submissions(None).await?, 0);
    Ok(())
}

#[tokio::test]
async fn overlong_description_is_rejected() -> Result<()> {
    let (app, _) = common::create_test_app().await?;

    let mut payload = valid_payload();
    payload["businessDescription"] = json!("x".repeat(101));

    let response = app.oneshot(post_json("/api/submissions", &payload)).await?;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    Ok(())
}

#[tokio::test]
async fn optional_fields_round_trip() -> Result<()> {
    let (app, _) = common::create_test_app().await?;

    let mut payload = valid_payload();
    payload["package"] = json!("Other");
    payload["packageOther"] = json!("Something custom");
    payload["hasExistingWebsite"] = json!("yes");
    payload["existingWebsiteUrl"] = json!("https://acme.test");

    let response = app.oneshot(post_json("/api/submissions", &payload)).await?;
    assert_eq!(response.status(), StatusCode::CREATED);

    let body = body_json(response).await?;
    assert_eq!(body["package"], "Other");
    assert_eq!(body["packageOther"], "Something custom");
    assert_eq!(body["existingWebsiteUrl"], "https://acme.test");
    Ok(())
}

#[tokio::test]
async fn non_http_website_url_is_rejected() -> Result<()> {
    let (app, _) = common::create_test_app().await?;

    let mut payload = valid_payload();
    payload["existingWebsiteUrl"] = json!("javascript:alert(1)");

    let response = app.oneshot(post_json("/api/submissions", &payload)).await?;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    Ok(())
}

#[tokio::test]
async fn concurrent_submissions_get_distinct_ids() -> Result<()> {
    let (app, _) = common::create_test_app().await?;

    let mut ids = Vec::new();
    for i in 0..5 {
        let mut payload = valid_payload();
        payload["name"] = json!(format!("Submitter {i}"));
        let response = app
            .clone()
            .oneshot(post_json("/api/submissions", &payload))
            .await?;
        assert_eq!(response.status(), StatusCode::CREATED);
        ids.push(body_json(response).await?["id"].as_i64().unwrap());
    }

    let mut deduped = ids.clone();
    deduped.sort_unstable();
    deduped.dedup();
    assert_eq!(deduped.len(), ids.len());
    Ok(())
}

#[tokio::test]
async fn configured_submission_limit_is_enforced() -> Result<()> {
    let mut config = common::test_config();
    config.rate_limit = RateLimitConfig {
        enabled: true,
        submission_limit: 1,
        ..RateLimitConfig::default()
    };
    let resources = common::create_test_resources(config).await?;
    let app = build_router(Arc::clone(&resources));

    let first = app
        .clone()
        .oneshot(post_json("/api/submissions", &valid_payload()))
        .await?;
    assert_eq!(first.status(), StatusCode::CREATED);

    let second = app
        .oneshot(post_json("/api/submissions", &valid_payload()))
        .await?;
    assert_eq!(second.status(), StatusCode::TOO_MANY_REQUESTS);

    // Only the request under the limit reached the database
    assert_eq!(resources.database.count_submissions(None).await?, 1);
    Ok(())
}
