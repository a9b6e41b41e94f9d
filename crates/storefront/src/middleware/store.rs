//! The visitor's checkout store, loaded from and saved back to the session.
//!
//! Handlers extract a [`VisitorStore`], dispatch actions through it, and
//! call [`VisitorStore::save`] before responding. Every dispatched action
//! leaves a Sentry breadcrumb.

use axum::{extract::FromRequestParts, http::request::Parts};
use bramble_core::store::{Action, SessionUser, Store, StoreState};
use tower_sessions::{Session, SessionStore, session::Id, session_store};

use crate::error::{AppError, add_breadcrumb};
use crate::models::session_keys;
use crate::state::AppState;

/// Read the saved state tree, or an empty one for a new visitor.
///
/// # Errors
///
/// Returns an error if the session store cannot be read.
pub async fn load_state(session: &Session) -> Result<StoreState, tower_sessions::session::Error> {
    Ok(session
        .get::<StoreState>(session_keys::STORE_STATE)
        .await?
        .unwrap_or_default())
}

/// Who is signed in to a session right now, read from the store itself.
///
/// A request's [`Session`] caches its record, so long-lived responses use
/// this to notice sign-outs made by later requests. `None` when the session
/// is gone or nobody is signed in.
///
/// # Errors
///
/// Returns an error if the session store cannot be read.
pub async fn stored_session_user<S: SessionStore>(
    sessions: &S,
    id: &Id,
) -> Result<Option<SessionUser>, session_store::Error> {
    let Some(record) = sessions.load(id).await? else {
        return Ok(None);
    };

    Ok(record
        .data
        .get(session_keys::STORE_STATE)
        .and_then(|value| serde_json::from_value::<StoreState>(value.clone()).ok())
        .and_then(|state| state.session.user))
}

/// Session extension missing means the session layer is not installed.
pub(crate) fn session_from_parts(parts: &Parts) -> Result<Session, AppError> {
    parts
        .extensions
        .get::<Session>()
        .cloned()
        .ok_or_else(|| AppError::Internal("session layer not installed".to_string()))
}

/// A [`Store`] wrapped around the visitor's saved state.
pub struct VisitorStore {
    session: Session,
    store: Store,
}

impl VisitorStore {
    fn new(session: Session, state: StoreState, tax_rate: bramble_core::TaxRate) -> Self {
        let mut store = Store::with_state(state, tax_rate);
        store.subscribe(|action: &Action, _state: &StoreState| {
            add_breadcrumb("store", action.name(), None);
        });
        Self { session, store }
    }

    /// Apply an action to the visitor's state.
    pub fn dispatch(&mut self, action: impl Into<Action>) {
        let action = action.into();
        tracing::debug!(action = action.name(), "Dispatching");
        self.store.dispatch(action);
    }

    /// Current state.
    #[must_use]
    pub const fn state(&self) -> &StoreState {
        self.store.state()
    }

    /// Persist the state to the session and hand it back.
    ///
    /// # Errors
    ///
    /// Returns an error if the session store cannot be written.
    pub async fn save(self) -> Result<StoreState, AppError> {
        let state = self.store.into_state();
        self.session
            .insert(session_keys::STORE_STATE, &state)
            .await?;
        Ok(state)
    }
}

impl FromRequestParts<AppState> for VisitorStore {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let session = session_from_parts(parts)?;
        let saved = load_state(&session).await?;
        Ok(Self::new(session, saved, state.config().tax_rate))
    }
}
