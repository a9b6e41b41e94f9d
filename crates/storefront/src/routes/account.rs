//! Account routes (auth required): saved address, profile and the
//! realtime profile stream.

use std::convert::Infallible;
use std::time::Duration;

use axum::{
    Json, Router,
    extract::{State, rejection::JsonRejection},
    response::{
        Sse,
        sse::{Event, KeepAlive},
    },
    routing::get,
};
use bramble_core::store::{ShippingAddress, action};
use futures::Stream;
use serde::Deserialize;
use serde_json::{Value, json};
use tokio::time::MissedTickBehavior;
use tower_sessions::Session;
use tower_sessions_sqlx_store::PostgresStore;
use tracing::instrument;

use crate::db::{AddressRepository, ProfileRepository};
use crate::error::{AppError, Result};
use crate::middleware::{RequireAuth, VisitorStore, stored_session_user};
use crate::models::{Profile, ProfileChange};
use crate::routes::api::json_body;
use crate::state::AppState;

/// How often an open profile stream checks who its session belongs to.
const SESSION_RECHECK: Duration = Duration::from_secs(15);

/// Body of `PUT /account/profile`. Absent fields are cleared.
#[derive(Debug, Deserialize)]
pub struct ProfileUpdate {
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub avatar_url: Option<String>,
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// `GET /account/address`
#[instrument(skip_all, fields(user_id = %user.id))]
pub async fn address(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
) -> Result<Json<ShippingAddress>> {
    AddressRepository::new(state.pool())
        .get_for_user(user.id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound("No saved address".to_string()))
}

/// `DELETE /account/address`
#[instrument(skip_all, fields(user_id = %user.id))]
pub async fn delete_address(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    mut store: VisitorStore,
) -> Result<Json<Value>> {
    if !AddressRepository::new(state.pool())
        .delete_for_user(user.id)
        .await?
    {
        return Err(AppError::NotFound("No saved address".to_string()));
    }

    store.dispatch(action::delete_address());
    store.save().await?;

    Ok(Json(json!({ "message": "Address deleted" })))
}

/// `GET /account/profile`
#[instrument(skip_all, fields(user_id = %user.id))]
pub async fn profile(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
) -> Result<Json<Profile>> {
    ProfileRepository::new(state.pool())
        .get(user.id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound("No profile yet".to_string()))
}

/// `PUT /account/profile`
///
/// Saves the profile and pushes the change to the user's open streams.
#[instrument(skip_all, fields(user_id = %user.id))]
pub async fn update_profile(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    payload: std::result::Result<Json<ProfileUpdate>, JsonRejection>,
) -> Result<Json<Profile>> {
    let update = json_body(payload)?;

    let profile = ProfileRepository::new(state.pool())
        .upsert(
            user.id,
            non_blank(update.display_name.as_deref()),
            non_blank(update.avatar_url.as_deref()),
        )
        .await?;

    let delivered = state.profiles().publish(ProfileChange::from(profile.clone()));
    tracing::debug!(delivered, "Profile change published");

    Ok(Json(profile))
}

/// `GET /account/profile/events`
///
/// Server-sent `profile` events, one per change to the signed-in user's
/// profile. The stream follows the session: it switches channels if the
/// session changes hands and ends once it is signed out. The subscription is
/// released when the client disconnects.
#[instrument(skip_all, fields(user_id = %user.id))]
pub async fn profile_events(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    session: Session,
) -> Sse<impl Stream<Item = std::result::Result<Event, Infallible>>> {
    let mut subscription = state.profiles().subscribe(user.id);
    let sessions = PostgresStore::new(state.pool().clone());
    let session_id = session.id();

    let stream = async_stream::stream! {
        let mut recheck = tokio::time::interval(SESSION_RECHECK);
        recheck.set_missed_tick_behavior(MissedTickBehavior::Delay);
        recheck.tick().await;

        loop {
            let step = tokio::select! {
                change = subscription.recv() => StreamStep::Change(change),
                _ = recheck.tick() => StreamStep::Recheck,
            };

            match step {
                StreamStep::Change(Some(change)) => {
                    let data = serde_json::to_string(&change).unwrap_or_else(|_| {
                        r#"{"error":"Failed to serialize profile"}"#.to_string()
                    });
                    yield Ok(Event::default().event("profile").data(data));
                }
                StreamStep::Change(None) => break,
                StreamStep::Recheck => {
                    let current = match session_id {
                        Some(id) => stored_session_user(&sessions, &id).await,
                        None => Ok(None),
                    };
                    match current {
                        Ok(current) => {
                            if !subscription.follow(current.map(|u| u.id)) {
                                tracing::debug!("Session signed out, closing profile stream");
                                break;
                            }
                        }
                        Err(e) => {
                            tracing::warn!(error = %e, "Could not re-check profile stream session");
                        }
                    }
                }
            }
        }
    };

    Sse::new(stream).keep_alive(KeepAlive::default())
}

enum StreamStep {
    Change(Option<ProfileChange>),
    Recheck,
}

/// Create the account routes router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/account/address", get(address).delete(delete_address))
        .route("/account/profile", get(profile).put(update_profile))
        .route("/account/profile/events", get(profile_events))
}
