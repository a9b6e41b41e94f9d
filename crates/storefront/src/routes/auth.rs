//! Sign-in and sign-out.
//!
//! The browser authenticates with the auth provider directly and posts the
//! resulting access token here. We resolve it to a user, rotate the session
//! id, and hydrate the visitor's state with their favorites and saved
//! address.

use axum::{
    Json, Router,
    extract::{State, rejection::JsonRejection},
    routing::post,
};
use bramble_core::store::action;
use serde::Deserialize;
use serde_json::{Value, json};
use tower_sessions::Session;
use tracing::instrument;

use crate::db::{AddressRepository, FavoriteRepository};
use crate::error::{Result, clear_sentry_user, set_sentry_user};
use crate::middleware::VisitorStore;
use crate::models::FieldError;
use crate::routes::api::json_body;
use crate::state::AppState;

/// `{ "access_token": "..." }`
#[derive(Deserialize)]
pub struct SignInRequest {
    #[serde(default)]
    pub access_token: String,
}

/// `POST /auth/session`
#[instrument(skip_all)]
pub async fn sign_in(
    State(state): State<AppState>,
    session: Session,
    mut store: VisitorStore,
    payload: std::result::Result<Json<SignInRequest>, JsonRejection>,
) -> Result<Json<Value>> {
    let request = json_body(payload)?;
    let token = request.access_token.trim();
    if token.is_empty() {
        return Err(FieldError::Missing(vec!["access_token"]).into());
    }

    store.dispatch(action::set_loading(true));
    let user = state.auth().get_user(token).await?;

    // New identity, new session id.
    session.cycle_id().await?;
    store.dispatch(action::sign_in(user.clone()));

    let favorites = FavoriteRepository::new(state.pool())
        .list_for_user(user.id)
        .await?;
    store.dispatch(action::favorites_loaded(favorites));

    // A stored address wins over whatever the visitor typed as a guest.
    if let Some(address) = AddressRepository::new(state.pool())
        .get_for_user(user.id)
        .await?
    {
        if store.state().address.address.is_some() {
            store.dispatch(action::update_address(address));
        } else {
            store.dispatch(action::create_address(address));
        }
    }

    store.dispatch(action::set_loading(false));
    store.save().await?;

    set_sentry_user(&user.id, Some(user.email.as_str()));
    tracing::info!(user_id = %user.id, "Signed in");

    Ok(Json(json!({ "message": "Signed in", "data": user })))
}

/// `POST /auth/logout`
///
/// Forgets the user, their favorites and their address. The cart stays
/// with the visitor.
#[instrument(skip_all)]
pub async fn logout(session: Session, mut store: VisitorStore) -> Result<Json<Value>> {
    store.dispatch(action::sign_out());
    session.cycle_id().await?;
    store.save().await?;

    clear_sentry_user();

    Ok(Json(json!({ "message": "Signed out" })))
}

/// Create the auth routes router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/auth/session", post(sign_in))
        .route("/auth/logout", post(logout))
}
