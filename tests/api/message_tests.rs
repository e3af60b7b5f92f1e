//! Message endpoint tests that do not require a running store.
//!
//! Store-backed behavior (thread marking, pagination counts, deletion purge)
//! is covered by the repository contracts and the service/hub unit tests.

use axum::http::StatusCode;

use crate::common::{body_json, token_for, TestApp};

#[tokio::test]
async fn message_routes_require_authentication() {
    let app = TestApp::new();

    let response = app.get("/api/messages").await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let json = body_json(response).await;
    assert_eq!(json["code"], 10003);
}

#[tokio::test]
async fn malformed_bearer_tokens_are_rejected() {
    let app = TestApp::new();

    let response = app.get_auth("/api/messages", "not-a-real-token").await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn non_bearer_authorization_is_rejected() {
    let app = TestApp::new();

    let response = app
        .get_with_authorization("/api/messages", "Basic abc123")
        .await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn invalid_message_id_is_a_bad_request() {
    let app = TestApp::new();

    let response = app
        .delete_auth("/api/messages/not-a-number", &token_for("alice"))
        .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["code"], 10002);
}
