//! RSVP endpoints. Open to anyone; an RSVP is identified by its id.

use axum::{
    Json, Router,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
    response::Response,
    routing::post,
};
use tracing::instrument;

use super::{api_response, json_body, method_not_allowed};
use crate::db::{RepositoryError, RsvpRepository};
use crate::error::{AppError, Result};
use crate::models::RsvpInput;
use crate::state::AppState;

/// `POST /api/rsvp`
#[instrument(skip_all)]
pub async fn create(
    State(state): State<AppState>,
    payload: std::result::Result<Json<RsvpInput>, JsonRejection>,
) -> Result<Response> {
    let rsvp = json_body(payload)?.validate_create()?;

    let created = RsvpRepository::new(state.pool())
        .create(&rsvp)
        .await
        .map_err(|e| match e {
            RepositoryError::NotFound => AppError::NotFound(format!("event {}", rsvp.event_id)),
            other => other.into(),
        })?;
    tracing::info!(rsvp_id = %created.id, event_id = %created.event_id, "RSVP created");

    Ok(api_response(
        StatusCode::CREATED,
        "RSVP created successfully",
        Some(&created),
    ))
}

/// `PUT /api/rsvp`
#[instrument(skip_all)]
pub async fn update(
    State(state): State<AppState>,
    payload: std::result::Result<Json<RsvpInput>, JsonRejection>,
) -> Result<Response> {
    let (id, status) = json_body(payload)?.validate_update()?;

    let rsvp = RsvpRepository::new(state.pool())
        .update_status(id, status)
        .await?;

    Ok(api_response(
        StatusCode::OK,
        "RSVP updated successfully",
        Some(&rsvp),
    ))
}

/// `DELETE /api/rsvp`
#[instrument(skip_all)]
pub async fn remove(
    State(state): State<AppState>,
    payload: std::result::Result<Json<RsvpInput>, JsonRejection>,
) -> Result<Response> {
    let id = json_body(payload)?.validate_delete()?;

    RsvpRepository::new(state.pool()).delete(id).await?;

    Ok(api_response::<()>(
        StatusCode::OK,
        "RSVP deleted successfully",
        None,
    ))
}

/// Create the RSVP routes router.
pub fn router() -> Router<AppState> {
    Router::new().route(
        "/api/rsvp",
        post(create)
            .put(update)
            .delete(remove)
            .fallback(method_not_allowed),
    )
}
