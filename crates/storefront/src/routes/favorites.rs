//! Favorites (auth required).
//!
//! The database is written first; the visitor's favorites slice only
//! changes once the write has succeeded.

use axum::{
    Json, Router,
    extract::{Path, State, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{delete, get},
};
use bramble_core::ProductId;
use bramble_core::store::favorites::is_favorite;
use bramble_core::store::{Favorite, action};
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::instrument;

use crate::db::{FavoriteRepository, RepositoryError};
use crate::error::{AppError, Result};
use crate::middleware::{RequireAuth, VisitorStore};
use crate::routes::api::json_body;
use crate::routes::products::find_product;
use crate::state::AppState;

/// `{ "product_id": "..." }`
#[derive(Debug, Deserialize)]
pub struct FavoriteRequest {
    pub product_id: String,
}

/// `GET /favorites`
///
/// Reloads the list from the database into the visitor's state.
#[instrument(skip_all, fields(user_id = %user.id))]
pub async fn index(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    mut store: VisitorStore,
) -> Result<Json<Vec<Favorite>>> {
    let favorites = FavoriteRepository::new(state.pool())
        .list_for_user(user.id)
        .await?;
    store.dispatch(action::favorites_loaded(favorites));

    let saved = store.save().await?;
    Ok(Json(saved.favorites.items))
}

/// `GET /favorites/{product_id}`
///
/// Membership check against the loaded list.
#[instrument(skip_all)]
pub async fn status(
    RequireAuth(_user): RequireAuth,
    store: VisitorStore,
    Path(product_id): Path<String>,
) -> Json<Value> {
    let favorite = is_favorite(&store.state().favorites, &ProductId::new(product_id));
    Json(json!({ "favorite": favorite }))
}

/// `POST /favorites`
#[instrument(skip_all, fields(user_id = %user.id))]
pub async fn add(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    mut store: VisitorStore,
    payload: std::result::Result<Json<FavoriteRequest>, JsonRejection>,
) -> Result<Response> {
    let product_id = ProductId::new(json_body(payload)?.product_id);
    find_product(&state, &product_id).await?;

    let favorite = FavoriteRepository::new(state.pool())
        .add(user.id, &product_id)
        .await
        .map_err(add_error)?;

    store.dispatch(action::favorite_added(favorite.clone()));
    store.save().await?;
    tracing::info!(%product_id, "Favorite added");

    Ok((StatusCode::CREATED, Json(favorite)).into_response())
}

/// A duplicate gets its own message; anything else is a plain failure.
fn add_error(error: RepositoryError) -> AppError {
    match error {
        RepositoryError::Conflict(_) => {
            AppError::Conflict("Product is already in your favorites".to_string())
        }
        other => other.into(),
    }
}

/// `DELETE /favorites/{product_id}`
#[instrument(skip_all, fields(user_id = %user.id))]
pub async fn remove(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    mut store: VisitorStore,
    Path(product_id): Path<String>,
) -> Result<Json<Value>> {
    let product_id = ProductId::new(product_id);

    let removed = FavoriteRepository::new(state.pool())
        .remove(user.id, &product_id)
        .await?;
    if !removed {
        return Err(AppError::NotFound(format!("favorite {product_id}")));
    }

    store.dispatch(action::favorite_removed(product_id));
    store.save().await?;

    Ok(Json(json!({ "message": "Removed from favorites" })))
}

/// Create the favorites routes router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/favorites", get(index).post(add))
        .route("/favorites/{product_id}", delete(remove).get(status))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    async fn error_body(error: AppError) -> (StatusCode, Value) {
        let response = error.into_response();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_duplicate_favorite_has_its_own_message() {
        let (status, body) = error_body(add_error(RepositoryError::Conflict(
            "favorites_user_id_product_id_key".to_string(),
        )))
        .await;

        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["error"], "Product is already in your favorites");
    }

    #[tokio::test]
    async fn test_other_failures_stay_generic() {
        let (status, body) = error_body(add_error(RepositoryError::Database(
            sqlx::Error::PoolTimedOut,
        )))
        .await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], "Internal server error");
    }
}
