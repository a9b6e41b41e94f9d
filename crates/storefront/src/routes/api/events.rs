//! Event management endpoints.
//!
//! Only the site admin may create, update or delete events. The admin check
//! compares the payload's `organizer_id` to `BRAMBLE_ADMIN_ID` after field
//! validation and before the database is touched.

use axum::{
    Json, Router,
    extract::{Path, State, rejection::JsonRejection},
    http::StatusCode,
    response::Response,
    routing::{get, post},
};
use bramble_core::{EventId, UserId};
use tracing::instrument;

use super::{api_response, json_body, method_not_allowed};
use crate::db::{EventRepository, RepositoryError, RsvpRepository};
use crate::error::{AppError, Result};
use crate::models::EventInput;
use crate::state::AppState;

/// Reject anyone but the configured admin, returning the admin's id.
///
/// The claim is compared as text, so an `organizer_id` that is not even a
/// UUID is simply someone else.
fn require_admin(admin_id: UserId, organizer_id: &str) -> Result<UserId> {
    if organizer_id.eq_ignore_ascii_case(&admin_id.to_string()) {
        Ok(admin_id)
    } else {
        tracing::warn!(organizer_id, "Event change by non-admin rejected");
        Err(AppError::Forbidden(
            "Only the site admin can manage events".to_string(),
        ))
    }
}

/// `POST /api/events`
#[instrument(skip_all)]
pub async fn create(
    State(state): State<AppState>,
    payload: std::result::Result<Json<EventInput>, JsonRejection>,
) -> Result<Response> {
    let draft = json_body(payload)?.validate_create()?;
    let organizer = require_admin(state.config().admin_id, &draft.organizer_id)?;

    let event = EventRepository::new(state.pool())
        .create(&draft, organizer)
        .await?;
    tracing::info!(event_id = %event.id, "Event created");

    Ok(api_response(
        StatusCode::CREATED,
        "Event created successfully",
        Some(&event),
    ))
}

/// `PUT /api/events`
#[instrument(skip_all)]
pub async fn update(
    State(state): State<AppState>,
    payload: std::result::Result<Json<EventInput>, JsonRejection>,
) -> Result<Response> {
    let (id, draft) = json_body(payload)?.validate_update()?;
    let organizer = require_admin(state.config().admin_id, &draft.organizer_id)?;

    let event = EventRepository::new(state.pool())
        .update(id, &draft, organizer)
        .await
        .map_err(|e| not_found_as(e, id))?;
    tracing::info!(event_id = %id, "Event updated");

    Ok(api_response(
        StatusCode::OK,
        "Event updated successfully",
        Some(&event),
    ))
}

/// `DELETE /api/events`
#[instrument(skip_all)]
pub async fn remove(
    State(state): State<AppState>,
    payload: std::result::Result<Json<EventInput>, JsonRejection>,
) -> Result<Response> {
    let (id, organizer_id) = json_body(payload)?.validate_delete()?;
    require_admin(state.config().admin_id, &organizer_id)?;

    EventRepository::new(state.pool())
        .delete(id)
        .await
        .map_err(|e| not_found_as(e, id))?;
    tracing::info!(event_id = %id, "Event deleted");

    Ok(api_response::<()>(
        StatusCode::OK,
        "Event deleted successfully",
        None,
    ))
}

/// `GET /api/events/{id}/rsvps`
#[instrument(skip(state))]
pub async fn rsvp_summary(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Response> {
    let id = EventId::new(id);

    if EventRepository::new(state.pool()).get(id).await?.is_none() {
        return Err(AppError::NotFound(format!("event {id}")));
    }
    let summary = RsvpRepository::new(state.pool()).summary(id).await?;

    Ok(api_response(StatusCode::OK, "RSVP summary", Some(&summary)))
}

fn not_found_as(error: RepositoryError, id: EventId) -> AppError {
    match error {
        RepositoryError::NotFound => AppError::NotFound(format!("event {id}")),
        other => other.into(),
    }
}

/// Create the event routes router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/api/events",
            post(create)
                .put(update)
                .delete(remove)
                .fallback(method_not_allowed),
        )
        .route("/api/events/{id}/rsvps", get(rsvp_summary))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use uuid::Uuid;

    const ADMIN: Uuid = Uuid::from_u128(0x5b1f_2c9e_7d0a_4a56_9d8e_3f1c_2b4a_6d70);

    #[test]
    fn test_admin_claim_matches() {
        let admin = UserId::new(ADMIN);
        assert_eq!(require_admin(admin, &ADMIN.to_string()).unwrap(), admin);
        assert!(require_admin(admin, &ADMIN.to_string().to_uppercase()).is_ok());
    }

    #[test]
    fn test_other_claims_are_forbidden() {
        let admin = UserId::new(ADMIN);
        for claim in ["someone-else", "admin", Uuid::nil().to_string().as_str()] {
            assert!(
                matches!(require_admin(admin, claim), Err(AppError::Forbidden(_))),
                "{claim}"
            );
        }
    }
}
