//! Database-backed tests.
//!
//! These need a migrated database at `DATABASE_URL`:
//!
//! ```bash
//! cargo run -p bramble-cli -- migrate
//! cargo test -p bramble-integration-tests -- --ignored
//! ```

#![allow(clippy::unwrap_used, clippy::indexing_slicing)]

use axum::http::{Method, StatusCode};
use bramble_core::{EventId, ProductId, UserId};
use bramble_integration_tests::{ADMIN_ID, app_with_pool, database_url, json_request, send_json};
use bramble_storefront::db::{
    EventRepository, FavoriteRepository, ProductRepository, RepositoryError,
};
use rust_decimal::Decimal;
use serde_json::json;
use sqlx::PgPool;
use uuid::Uuid;

async fn pool() -> PgPool {
    PgPool::connect(&database_url()).await.unwrap()
}

async fn test_product(pool: &PgPool) -> ProductId {
    let id = ProductId::new(format!("test-{}", Uuid::new_v4()));
    ProductRepository::new(pool)
        .upsert(&id, "Test Product", None, Decimal::new(1250, 2), None)
        .await
        .unwrap();
    id
}

#[tokio::test]
#[ignore = "Requires a migrated PostgreSQL database"]
async fn test_readiness_with_database() {
    let (status, _) = bramble_integration_tests::send(
        app_with_pool(pool().await),
        bramble_integration_tests::empty_request(Method::GET, "/health/ready"),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
#[ignore = "Requires a migrated PostgreSQL database"]
async fn test_favorite_is_unique_per_user_and_product() {
    let pool = pool().await;
    let product_id = test_product(&pool).await;
    let user_id = UserId::new(Uuid::new_v4());
    let favorites = FavoriteRepository::new(&pool);

    let first = favorites.add(user_id, &product_id).await.unwrap();
    assert_eq!(first.product_id, product_id);

    let second = favorites.add(user_id, &product_id).await;
    assert!(matches!(second, Err(RepositoryError::Conflict(_))));

    // Another user may star the same product.
    favorites
        .add(UserId::new(Uuid::new_v4()), &product_id)
        .await
        .unwrap();

    assert!(favorites.remove(user_id, &product_id).await.unwrap());
    assert!(!favorites.remove(user_id, &product_id).await.unwrap());
}

#[tokio::test]
#[ignore = "Requires a migrated PostgreSQL database"]
async fn test_admin_event_lifecycle() {
    let pool = pool().await;
    let app = || app_with_pool(pool.clone());
    let admin = ADMIN_ID.to_string();

    let (status, body) = send_json(
        app(),
        json_request(
            Method::POST,
            "/api/events",
            &json!({
                "title": "Seed swap",
                "date": "2024-06-15",
                "time": "7:00 PM",
                "location": "Community garden",
                "organizer_id": admin,
            }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["message"], "Event created successfully");
    assert_eq!(body["data"]["date"], "2024-06-15");
    assert_eq!(body["data"]["time"], "7:00 PM");
    let id = body["data"]["id"].as_i64().unwrap();

    let (status, body) = send_json(
        app(),
        json_request(
            Method::POST,
            "/api/rsvp",
            &json!({ "event_id": id, "name": "Ada", "email": "ada@example.com", "status": "going" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["data"]["status"], "going");

    let (status, body) = send_json(
        app(),
        bramble_integration_tests::empty_request(Method::GET, &format!("/api/events/{id}/rsvps")),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["total"], 1);

    let (status, _) = send_json(
        app(),
        json_request(
            Method::DELETE,
            "/api/events",
            &json!({ "id": id, "organizer_id": admin }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let gone = EventRepository::new(&pool)
        .get(EventId::new(i32::try_from(id).unwrap()))
        .await
        .unwrap();
    assert!(gone.is_none());
}

#[tokio::test]
#[ignore = "Requires a migrated PostgreSQL database"]
async fn test_rsvp_for_missing_event_is_not_found() {
    let (status, _) = send_json(
        app_with_pool(pool().await),
        json_request(
            Method::POST,
            "/api/rsvp",
            &json!({ "event_id": i32::MAX, "name": "Ada", "email": "ada@example.com", "status": "maybe" }),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
}
