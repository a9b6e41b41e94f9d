//! Authentication extractors.
//!
//! The signed-in user is part of the visitor's saved state tree
//! (`StoreState::session`). These extractors read it without touching the
//! rest of the checkout state.

use axum::{extract::FromRequestParts, http::request::Parts};
use bramble_core::store::SessionUser;

use super::store::{load_state, session_from_parts};
use crate::error::AppError;

/// Extractor that requires a signed-in user.
///
/// Rejects with 401 when nobody is signed in.
///
/// # Example
///
/// ```rust,ignore
/// async fn protected_handler(
///     RequireAuth(user): RequireAuth,
/// ) -> impl IntoResponse {
///     format!("Hello, {}!", user.email)
/// }
/// ```
pub struct RequireAuth(pub SessionUser);

impl<S> FromRequestParts<S> for RequireAuth
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let OptionalAuth(user) = OptionalAuth::from_request_parts(parts, state).await?;
        user.map(Self)
            .ok_or_else(|| AppError::Unauthorized("Sign in required".to_string()))
    }
}

/// Extractor that optionally gets the signed-in user.
pub struct OptionalAuth(pub Option<SessionUser>);

impl<S> FromRequestParts<S> for OptionalAuth
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let session = session_from_parts(parts)?;
        let state = load_state(&session).await?;
        Ok(Self(state.session.user))
    }
}
