//! Favorites slice: products the signed-in user has starred.
//!
//! The slice only changes after the database has accepted the change; it
//! never holds a favorite that failed to persist.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{Action, SessionAction};
use crate::{ProductId, UserId};

/// A starred product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Favorite {
    pub user_id: UserId,
    pub product_id: ProductId,
    pub created_at: DateTime<Utc>,
}

/// Favorites transitions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "snake_case")]
pub enum FavoritesAction {
    Loaded(Vec<Favorite>),
    Added(Favorite),
    Removed(ProductId),
}

/// The favorites slice of the store.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FavoritesState {
    pub items: Vec<Favorite>,
}

/// Whether a product is in the loaded favorites list.
#[must_use]
pub fn is_favorite(state: &FavoritesState, product_id: &ProductId) -> bool {
    state.items.iter().any(|f| &f.product_id == product_id)
}

/// Apply an action to the favorites slice.
///
/// Signing out clears the list so the next visitor never sees it.
#[must_use]
pub fn reduce(mut state: FavoritesState, action: &Action) -> FavoritesState {
    match action {
        Action::Favorites(FavoritesAction::Loaded(items)) => state.items.clone_from(items),
        Action::Favorites(FavoritesAction::Added(favorite)) => {
            if !is_favorite(&state, &favorite.product_id) {
                state.items.push(favorite.clone());
            }
        }
        Action::Favorites(FavoritesAction::Removed(product_id)) => {
            state.items.retain(|f| &f.product_id != product_id);
        }
        Action::Session(SessionAction::SignedOut) => state.items.clear(),
        _ => {}
    }
    state
}
