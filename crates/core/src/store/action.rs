//! Action creators.
//!
//! Thin constructors so call sites read as intent (`add_to_cart(product)`)
//! rather than enum plumbing. The pricing creators compute their value from
//! the slices they depend on.

use rust_decimal::Decimal;

use super::address::{AddressAction, ShippingAddress};
use super::cart::{CartAction, CartProduct, CartState};
use super::delivery::{DeliveryAction, DeliveryOption, DeliveryState};
use super::favorites::{Favorite, FavoritesAction};
use super::pricing::{self, PricingAction};
use super::session::{SessionAction, SessionUser};
use super::Action;
use crate::{ProductId, TaxRate};

// =============================================================================
// Conversions
// =============================================================================

impl From<CartAction> for Action {
    fn from(action: CartAction) -> Self {
        Self::Cart(action)
    }
}

impl From<AddressAction> for Action {
    fn from(action: AddressAction) -> Self {
        Self::Address(action)
    }
}

impl From<DeliveryAction> for Action {
    fn from(action: DeliveryAction) -> Self {
        Self::Delivery(action)
    }
}

impl From<PricingAction> for Action {
    fn from(action: PricingAction) -> Self {
        Self::Pricing(action)
    }
}

impl From<SessionAction> for Action {
    fn from(action: SessionAction) -> Self {
        Self::Session(action)
    }
}

impl From<FavoritesAction> for Action {
    fn from(action: FavoritesAction) -> Self {
        Self::Favorites(action)
    }
}

// =============================================================================
// Cart
// =============================================================================

#[must_use]
pub fn insert_item(product: CartProduct) -> Action {
    CartAction::Insert(product).into()
}

#[must_use]
pub fn delete_item(product_id: ProductId) -> Action {
    CartAction::Delete(product_id).into()
}

#[must_use]
pub fn increment_item(product_id: ProductId) -> Action {
    CartAction::Increment(product_id).into()
}

#[must_use]
pub fn decrement_item(product_id: ProductId) -> Action {
    CartAction::Decrement(product_id).into()
}

// =============================================================================
// Address
// =============================================================================

#[must_use]
pub fn create_address(address: ShippingAddress) -> Action {
    AddressAction::Created(address).into()
}

#[must_use]
pub fn update_address(address: ShippingAddress) -> Action {
    AddressAction::Updated(address).into()
}

#[must_use]
pub fn delete_address() -> Action {
    AddressAction::Deleted.into()
}

// =============================================================================
// Delivery
// =============================================================================

/// Marks the start of a catalog fetch. The options arrive with
/// [`delivery_options_loaded`].
#[must_use]
pub fn fetch_delivery_options() -> Action {
    DeliveryAction::FetchRequested.into()
}

#[must_use]
pub fn delivery_options_loaded(options: Vec<DeliveryOption>) -> Action {
    DeliveryAction::OptionsLoaded(options).into()
}

#[must_use]
pub fn select_delivery(option: DeliveryOption) -> Action {
    DeliveryAction::Selected(option).into()
}

#[must_use]
pub fn create_delivery_option(option: DeliveryOption) -> Action {
    DeliveryAction::OptionCreated(option).into()
}

// =============================================================================
// Pricing
// =============================================================================

/// Set the subtotal from the cart lines.
#[must_use]
pub fn set_subtotal(cart: &CartState) -> Action {
    PricingAction::SubtotalSet(pricing::subtotal(cart)).into()
}

/// Set the tax owed on the cart's subtotal.
#[must_use]
pub fn set_tax(cart: &CartState, rate: TaxRate) -> Action {
    PricingAction::TaxSet(pricing::tax(pricing::subtotal(cart), rate)).into()
}

/// Set the delivery cost from the selected option.
#[must_use]
pub fn set_delivery_cost(delivery: &DeliveryState) -> Action {
    PricingAction::DeliveryCostSet(pricing::delivery_cost(delivery)).into()
}

#[must_use]
pub fn set_total(subtotal: Decimal, tax: Decimal, delivery_cost: Decimal) -> Action {
    PricingAction::TotalSet(pricing::total(subtotal, tax, delivery_cost)).into()
}

/// Replace the whole breakdown in one step.
#[must_use]
pub fn recompute_pricing(cart: &CartState, delivery: &DeliveryState, rate: TaxRate) -> Action {
    PricingAction::Recomputed(pricing::compute_breakdown(cart, delivery, rate)).into()
}

// =============================================================================
// Session
// =============================================================================

#[must_use]
pub fn sign_in(user: SessionUser) -> Action {
    SessionAction::SignedIn(user).into()
}

#[must_use]
pub fn sign_out() -> Action {
    SessionAction::SignedOut.into()
}

#[must_use]
pub fn set_loading(loading: bool) -> Action {
    SessionAction::Loading(loading).into()
}

// =============================================================================
// Favorites
// =============================================================================

#[must_use]
pub fn favorites_loaded(favorites: Vec<Favorite>) -> Action {
    FavoritesAction::Loaded(favorites).into()
}

/// Record a favorite the database has already accepted.
#[must_use]
pub fn favorite_added(favorite: Favorite) -> Action {
    FavoritesAction::Added(favorite).into()
}

#[must_use]
pub fn favorite_removed(product_id: ProductId) -> Action {
    FavoritesAction::Removed(product_id).into()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::DeliveryOptionId;

    #[test]
    fn test_pricing_creators_compute_their_values() {
        let mut cart = CartState::default();
        cart = super::super::cart::reduce(
            cart,
            &insert_item(CartProduct {
                product_id: ProductId::new("kettle"),
                name: "Kettle".to_string(),
                description: None,
                image_url: None,
                price: Decimal::from(25),
            }),
        );
        let delivery = DeliveryState {
            delivery_type: Some(DeliveryOption {
                id: DeliveryOptionId::new(1),
                name: "Standard".to_string(),
                price: Decimal::from(3),
                description: None,
            }),
            delivery_options: Vec::new(),
        };

        assert_eq!(
            set_subtotal(&cart),
            Action::Pricing(PricingAction::SubtotalSet(Decimal::from(25)))
        );
        assert_eq!(
            set_tax(&cart, TaxRate::STANDARD),
            Action::Pricing(PricingAction::TaxSet(Decimal::new(475, 2)))
        );
        assert_eq!(
            set_delivery_cost(&delivery),
            Action::Pricing(PricingAction::DeliveryCostSet(Decimal::from(3)))
        );
        assert_eq!(
            set_total(Decimal::from(25), Decimal::new(475, 2), Decimal::from(3)),
            Action::Pricing(PricingAction::TotalSet(Decimal::new(3275, 2)))
        );
    }

    #[test]
    fn test_address_creators_are_distinct_from_cart() {
        assert!(matches!(delete_address(), Action::Address(AddressAction::Deleted)));
        assert!(matches!(
            delete_item(ProductId::new("x")),
            Action::Cart(CartAction::Delete(_))
        ));
    }
}
