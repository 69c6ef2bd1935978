// ABOUTME: Integration tests for the public chat message endpoint
// ABOUTME: Covers session id generation, validation, and persistence

mod common;

use anyhow::Result;
use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use leadbox::database_plugins::DatabaseProvider;
use serde_json::{json, Value};
use tower::ServiceExt;

fn post_json(body: &Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/api/chat/messages")
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn body_json(response: axum::response::Response) -> Result<Value> {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await?;
    Ok(serde_json::from_slice(&bytes)?)
}

#[tokio::test]
async fn anonymous_message_gets_generated_session_id() -> Result<()> {
    let (app, resources) = common::create_test_app().await?;

    let response = app.oneshot(post_json(&json!({ "message": "hello" }))).await?;
    assert_eq!(response.status(), StatusCode::CREATED);

    let body = body_json(response).await?;
    let session_id = body["sessionId"].as_str().unwrap();
    assert!(!session_id.is_empty());

    let messages = resources.database.get_session_messages(session_id).await?;
    assert_eq!(messages.len(), 1);
    assert_eq!(messages[0].message, "hello");
    assert!(messages[0].user_name.is_none());
    assert!(messages[0].user_email.is_none());
    assert!(!messages[0].responded);
    Ok(())
}

#[tokio::test]
async fn supplied_session_id_threads_conversation() -> Result<()> {
    let (app, resources) = common::create_test_app().await?;

    for text in ["first", "second"] {
        let response = app
            .clone()
            .oneshot(post_json(&json!({
                "sessionId": "session-42",
                "message": text
            })))
            .await?;
        assert_eq!(response.status(), StatusCode::CREATED);
        let body = body_json(response).await?;
        assert_eq!(body["sessionId"], "session-42");
    }

    let messages = resources.database.get_session_messages("session-42").await?;
    assert_eq!(messages.len(), 2);
    // Oldest first within a session
    assert_eq!(messages[0].message, "first");
    assert_eq!(messages[1].message, "second");
    Ok(())
}

#[tokio::test]
async fn empty_message_is_rejected() -> Result<()> {
    let (app, resources) = common::create_test_app().await?;

    for payload in [json!({}), json!({ "message": "   " })] {
        let response = app.clone().oneshot(post_json(&payload)).await?;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    assert_eq!(resources.database.count_chat_messages().await?, 0);
    Ok(())
}

#[tokio::test]
async fn identified_visitor_fields_persist() -> Result<()> {
    let (app, resources) = common::create_test_app().await?;

    let response = app
        .oneshot(post_json(&json!({
            "message": "interested in a website",
            "userName": "Jo",
            "userEmail": "jo@acme.test"
        })))
        .await?;
    assert_eq!(response.status(), StatusCode::CREATED);

    let body = body_json(response).await?;
    let session_id = body["sessionId"].as_str().unwrap();
    let messages = resources.database.get_session_messages(session_id).await?;
    assert_eq!(messages[0].user_name.as_deref(), Some("Jo"));
    assert_eq!(messages[0].user_email.as_deref(), Some("jo@acme.test"));
    Ok(())
}

#[tokio::test]
async fn malformed_visitor_email_is_rejected() -> Result<()> {
    let (app, _) = common::create_test_app().await?;

    let response = app
        .oneshot(post_json(&json!({
            "message": "hello",
            "userEmail": "not-an-email"
        })))
        .await?;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    Ok(())
}
