//! `/api/events` request handling.
//!
//! Everything here is rejected before the database is queried, so these run
//! without `PostgreSQL`. The database-backed happy path lives in
//! `database.rs`.

#![allow(clippy::unwrap_used, clippy::indexing_slicing)]

use axum::http::{Method, StatusCode};
use bramble_integration_tests::{ADMIN_ID, app, empty_request, json_request, send_json};
use serde_json::{Value, json};

fn event_body(organizer_id: &str) -> Value {
    json!({
        "title": "Seed swap",
        "description": "Bring cuttings, leave with cuttings.",
        "date": "2024-06-15",
        "time": "7:00 PM",
        "location": "Community garden",
        "organizer_id": organizer_id,
    })
}

#[tokio::test]
async fn test_create_with_missing_fields_is_bad_request() {
    let (status, body) = send_json(
        app(),
        json_request(Method::POST, "/api/events", &json!({ "title": "Seed swap" })),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    let error = body["error"].as_str().unwrap();
    assert!(error.contains("date"), "{error}");
    assert!(error.contains("organizer_id"), "{error}");
}

#[tokio::test]
async fn test_create_with_impossible_date_is_bad_request() {
    let mut body = event_body(&ADMIN_ID.to_string());
    body["date"] = json!("2024-13-40");

    let (status, body) = send_json(app(), json_request(Method::POST, "/api/events", &body)).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("2024-13-40"));
}

#[tokio::test]
async fn test_create_with_bad_time_is_bad_request() {
    let mut body = event_body(&ADMIN_ID.to_string());
    body["time"] = json!("19h");

    let (status, _) = send_json(app(), json_request(Method::POST, "/api/events", &body)).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_create_by_non_admin_is_forbidden() {
    let body = event_body("5b1f2c9e-7d0a-4a56-9d8e-3f1c2b4a6d70");

    let (status, body) = send_json(app(), json_request(Method::POST, "/api/events", &body)).await;

    assert_eq!(status, StatusCode::FORBIDDEN);
    assert!(
        body["error"]
            .as_str()
            .unwrap()
            .contains("Only the site admin can manage events")
    );
}

#[tokio::test]
async fn test_non_uuid_organizer_is_forbidden() {
    let body = event_body("someone-else");

    let (status, _) = send_json(app(), json_request(Method::POST, "/api/events", &body)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = send_json(
        app(),
        json_request(
            Method::DELETE,
            "/api/events",
            &json!({ "id": 1, "organizer_id": "someone-else" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_update_requires_id() {
    let body = event_body(&ADMIN_ID.to_string());

    let (status, body) = send_json(app(), json_request(Method::PUT, "/api/events", &body)).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("id"));
}

#[tokio::test]
async fn test_update_by_non_admin_is_forbidden() {
    let mut body = event_body("5b1f2c9e-7d0a-4a56-9d8e-3f1c2b4a6d70");
    body["id"] = json!(1);

    let (status, _) = send_json(app(), json_request(Method::PUT, "/api/events", &body)).await;

    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_delete_needs_only_id_and_organizer() {
    let (status, body) = send_json(
        app(),
        json_request(Method::DELETE, "/api/events", &json!({ "id": 1 })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Missing required fields: organizer_id");

    let (status, _) = send_json(
        app(),
        json_request(
            Method::DELETE,
            "/api/events",
            &json!({ "id": 1, "organizer_id": "5b1f2c9e-7d0a-4a56-9d8e-3f1c2b4a6d70" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_malformed_json_is_bad_request() {
    let request = axum::http::Request::builder()
        .method(Method::POST)
        .uri("/api/events")
        .header("content-type", "application/json")
        .body(axum::body::Body::from("{not json"))
        .unwrap();

    let (status, body) = send_json(app(), request).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn test_get_is_method_not_allowed() {
    let (status, body) = send_json(app(), empty_request(Method::GET, "/api/events")).await;

    assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
    assert!(body["error"].is_string());
}
