//! Session slice: who is signed in, and whether a backend call is in flight.

use serde::{Deserialize, Serialize};

use super::Action;
use crate::{Email, UserId};

/// Identity of the signed-in visitor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionUser {
    pub id: UserId,
    pub email: Email,
}

/// Session transitions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "snake_case")]
pub enum SessionAction {
    SignedIn(SessionUser),
    SignedOut,
    Loading(bool),
}

/// The session slice of the store.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionState {
    pub user: Option<SessionUser>,
    pub loading: bool,
}

/// Apply an action to the session slice.
#[must_use]
pub fn reduce(mut state: SessionState, action: &Action) -> SessionState {
    let Action::Session(action) = action else {
        return state;
    };

    match action {
        SessionAction::SignedIn(user) => state.user = Some(user.clone()),
        SessionAction::SignedOut => state.user = None,
        SessionAction::Loading(loading) => state.loading = *loading,
    }

    state
}
