//! Checkout state tree.
//!
//! Every slice is a plain value with a pure `reduce(state, &Action)`
//! function. [`Store`] owns one [`StoreState`], applies each dispatched
//! action to every slice, recomputes pricing after cart or delivery
//! changes, and then tells its subscribers.
//!
//! ```
//! use bramble_core::store::{Store, action};
//! use bramble_core::store::cart::CartProduct;
//! use bramble_core::{ProductId, TaxRate};
//! use rust_decimal::Decimal;
//!
//! let mut store = Store::new(TaxRate::STANDARD);
//! store.dispatch(action::insert_item(CartProduct {
//!     product_id: ProductId::new("tea"),
//!     name: "Loose leaf tea".to_string(),
//!     description: None,
//!     image_url: None,
//!     price: Decimal::from(10),
//! }));
//!
//! assert_eq!(store.breakdown().total, Decimal::new(1190, 2));
//! ```

pub mod action;
pub mod address;
pub mod cart;
pub mod delivery;
pub mod favorites;
pub mod pricing;
pub mod session;

use core::fmt;

use serde::{Deserialize, Serialize};

pub use address::{AddressAction, AddressState, ShippingAddress};
pub use cart::{CartAction, CartLineItem, CartProduct, CartState};
pub use delivery::{DeliveryAction, DeliveryOption, DeliveryState};
pub use favorites::{Favorite, FavoritesAction, FavoritesState};
pub use pricing::{PriceBreakdown, PricingAction, compute_breakdown};
pub use session::{SessionAction, SessionState, SessionUser};

use crate::TaxRate;

/// Any change to the state tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "slice", content = "action", rename_all = "snake_case")]
pub enum Action {
    Cart(CartAction),
    Address(AddressAction),
    Delivery(DeliveryAction),
    Pricing(PricingAction),
    Session(SessionAction),
    Favorites(FavoritesAction),
}

impl Action {
    /// Whether pricing has to be recomputed after this action.
    #[must_use]
    pub const fn affects_pricing(&self) -> bool {
        matches!(self, Self::Cart(_) | Self::Delivery(_))
    }

    /// Short name for logs and breadcrumbs, e.g. `cart.insert`.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Cart(CartAction::Insert(_)) => "cart.insert",
            Self::Cart(CartAction::Delete(_)) => "cart.delete",
            Self::Cart(CartAction::Increment(_)) => "cart.increment",
            Self::Cart(CartAction::Decrement(_)) => "cart.decrement",
            Self::Address(AddressAction::Created(_)) => "address.created",
            Self::Address(AddressAction::Updated(_)) => "address.updated",
            Self::Address(AddressAction::Deleted) => "address.deleted",
            Self::Delivery(DeliveryAction::FetchRequested) => "delivery.fetch_requested",
            Self::Delivery(DeliveryAction::OptionsLoaded(_)) => "delivery.options_loaded",
            Self::Delivery(DeliveryAction::Selected(_)) => "delivery.selected",
            Self::Delivery(DeliveryAction::OptionCreated(_)) => "delivery.option_created",
            Self::Pricing(PricingAction::SubtotalSet(_)) => "pricing.subtotal_set",
            Self::Pricing(PricingAction::TaxSet(_)) => "pricing.tax_set",
            Self::Pricing(PricingAction::DeliveryCostSet(_)) => "pricing.delivery_cost_set",
            Self::Pricing(PricingAction::TotalSet(_)) => "pricing.total_set",
            Self::Pricing(PricingAction::Recomputed(_)) => "pricing.recomputed",
            Self::Session(SessionAction::SignedIn(_)) => "session.signed_in",
            Self::Session(SessionAction::SignedOut) => "session.signed_out",
            Self::Session(SessionAction::Loading(_)) => "session.loading",
            Self::Favorites(FavoritesAction::Loaded(_)) => "favorites.loaded",
            Self::Favorites(FavoritesAction::Added(_)) => "favorites.added",
            Self::Favorites(FavoritesAction::Removed(_)) => "favorites.removed",
        }
    }
}

/// The whole state tree. Serializable so it can live in a visitor session.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreState {
    pub cart: CartState,
    pub address: AddressState,
    pub delivery: DeliveryState,
    pub pricing: PriceBreakdown,
    pub session: SessionState,
    pub favorites: FavoritesState,
}

impl StoreState {
    /// Run every slice reducer over one action.
    #[must_use]
    pub fn reduce(self, action: &Action) -> Self {
        Self {
            cart: cart::reduce(self.cart, action),
            address: address::reduce(self.address, action),
            delivery: delivery::reduce(self.delivery, action),
            pricing: pricing::reduce(self.pricing, action),
            session: session::reduce(self.session, action),
            favorites: favorites::reduce(self.favorites, action),
        }
    }
}

/// Handle returned by [`Store::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Listener = Box<dyn Fn(&Action, &StoreState) + Send + Sync>;

/// Single writer over a [`StoreState`].
pub struct Store {
    state: StoreState,
    tax_rate: TaxRate,
    listeners: Vec<(SubscriptionId, Listener)>,
    next_id: u64,
}

impl Store {
    /// An empty store.
    #[must_use]
    pub fn new(tax_rate: TaxRate) -> Self {
        Self::with_state(StoreState::default(), tax_rate)
    }

    /// Wrap a previously saved state.
    #[must_use]
    pub fn with_state(state: StoreState, tax_rate: TaxRate) -> Self {
        Self {
            state,
            tax_rate,
            listeners: Vec::new(),
            next_id: 0,
        }
    }

    #[must_use]
    pub const fn state(&self) -> &StoreState {
        &self.state
    }

    #[must_use]
    pub fn into_state(self) -> StoreState {
        self.state
    }

    #[must_use]
    pub const fn breakdown(&self) -> PriceBreakdown {
        self.state.pricing
    }

    #[must_use]
    pub const fn tax_rate(&self) -> TaxRate {
        self.tax_rate
    }

    /// Apply an action, then notify subscribers.
    ///
    /// Cart and delivery actions are followed by a `PricingAction::Recomputed`
    /// dispatch, so pricing is never stale once this returns. Subscribers see
    /// both actions, each with the state as it stood after that action.
    pub fn dispatch(&mut self, action: impl Into<Action>) {
        let action = action.into();
        self.apply(&action);

        if action.affects_pricing() {
            let breakdown =
                compute_breakdown(&self.state.cart, &self.state.delivery, self.tax_rate);
            self.apply(&Action::Pricing(PricingAction::Recomputed(breakdown)));
        }
    }

    fn apply(&mut self, action: &Action) {
        self.state = core::mem::take(&mut self.state).reduce(action);
        for (_, listener) in &self.listeners {
            listener(action, &self.state);
        }
    }

    /// Register a listener called after every applied action.
    pub fn subscribe<F>(&mut self, listener: F) -> SubscriptionId
    where
        F: Fn(&Action, &StoreState) + Send + Sync + 'static,
    {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        self.listeners.push((id, Box::new(listener)));
        id
    }

    /// Remove a listener. Returns `false` if it was already gone.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(listener_id, _)| *listener_id != id);
        self.listeners.len() != before
    }
}

impl fmt::Debug for Store {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Store")
            .field("state", &self.state)
            .field("tax_rate", &self.tax_rate)
            .field("listeners", &self.listeners.len())
            .finish()
    }
}
