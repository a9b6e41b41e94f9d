//! `/api/rsvp` request handling without a database.

#![allow(clippy::unwrap_used, clippy::indexing_slicing)]

use axum::http::{Method, StatusCode};
use bramble_integration_tests::{app, empty_request, json_request, send_json};
use serde_json::json;

#[tokio::test]
async fn test_create_lists_every_missing_field() {
    let (status, body) = send_json(
        app(),
        json_request(Method::POST, "/api/rsvp", &json!({ "name": "Ada" })),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body["error"],
        "Missing required fields: event_id, email, status"
    );
}

#[tokio::test]
async fn test_create_rejects_bad_email() {
    let (status, body) = send_json(
        app(),
        json_request(
            Method::POST,
            "/api/rsvp",
            &json!({ "event_id": 1, "name": "Ada", "email": "not-an-email", "status": "going" }),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().starts_with("Invalid email"));
}

#[tokio::test]
async fn test_create_rejects_unknown_status() {
    let (status, body) = send_json(
        app(),
        json_request(
            Method::POST,
            "/api/rsvp",
            &json!({ "event_id": 1, "name": "Ada", "email": "ada@example.com", "status": "perhaps" }),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("perhaps"));
}

#[tokio::test]
async fn test_update_requires_id_and_status() {
    let (status, body) = send_json(app(), json_request(Method::PUT, "/api/rsvp", &json!({}))).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Missing required fields: id, status");
}

#[tokio::test]
async fn test_delete_requires_id() {
    let (status, _) = send_json(app(), json_request(Method::DELETE, "/api/rsvp", &json!({}))).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_get_is_method_not_allowed() {
    let (status, _) = send_json(app(), empty_request(Method::GET, "/api/rsvp")).await;

    assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
}
