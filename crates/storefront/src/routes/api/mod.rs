//! JSON API for events and RSVPs.
//!
//! Success bodies are `{"message": ..., "data": ...}`; failures are
//! `{"error": ...}` (see [`crate::error::AppError`]). Methods a route does
//! not serve answer 405 with the same error shape.

pub mod events;
pub mod rsvp;

use axum::{
    Json, Router,
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use serde_json::json;

use crate::error::AppError;
use crate::state::AppState;

/// Unwrap a JSON body, turning a rejection into a 400.
pub(crate) fn json_body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, AppError> {
    payload
        .map(|Json(body)| body)
        .map_err(|rejection| AppError::BadRequest(rejection.body_text()))
}

/// `{"message": ..., "data": ...}` with the given status.
pub(crate) fn api_response<T: Serialize>(
    status: StatusCode,
    message: &str,
    data: Option<&T>,
) -> Response {
    let body = match data {
        Some(data) => json!({ "message": message, "data": data }),
        None => json!({ "message": message }),
    };
    (status, Json(body)).into_response()
}

/// Fallback for methods a route does not serve.
pub(crate) async fn method_not_allowed() -> AppError {
    AppError::MethodNotAllowed
}

/// Create the API router.
pub fn router() -> Router<AppState> {
    Router::new().merge(events::router()).merge(rsvp::router())
}
