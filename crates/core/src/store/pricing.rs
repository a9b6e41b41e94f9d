//! Pricing slice and the breakdown selector.
//!
//! The four stored fields can still be set one at a time (`SubtotalSet`,
//! `TaxSet`, ...), but [`super::Store::dispatch`] recomputes all of them in
//! one step with [`compute_breakdown`] after every cart or delivery change.
//! Invariant after each recomputation: `total == subtotal + tax + delivery_cost`.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::Action;
use super::cart::CartState;
use super::delivery::DeliveryState;
use crate::{TaxRate, round_currency};

/// Money owed for the current cart and delivery choice.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceBreakdown {
    pub subtotal: Decimal,
    pub tax: Decimal,
    pub delivery_cost: Decimal,
    pub total: Decimal,
}

impl PriceBreakdown {
    /// Whether the stored fields agree with each other.
    #[must_use]
    pub fn is_consistent(&self) -> bool {
        self.total == self.subtotal + self.tax + self.delivery_cost
    }
}

/// Pricing transitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "snake_case")]
pub enum PricingAction {
    SubtotalSet(Decimal),
    TaxSet(Decimal),
    DeliveryCostSet(Decimal),
    TotalSet(Decimal),
    /// All four fields at once.
    Recomputed(PriceBreakdown),
}

/// Sum of `price * quantity` over every line.
#[must_use]
pub fn subtotal(cart: &CartState) -> Decimal {
    round_currency(cart.items.iter().map(super::CartLineItem::line_total).sum())
}

/// Tax owed on a subtotal.
#[must_use]
pub fn tax(subtotal: Decimal, rate: TaxRate) -> Decimal {
    rate.apply(subtotal)
}

/// Price of the selected delivery option, zero when nothing is selected.
#[must_use]
pub fn delivery_cost(delivery: &DeliveryState) -> Decimal {
    delivery
        .delivery_type
        .as_ref()
        .map_or(Decimal::ZERO, |option| round_currency(option.price))
}

/// `subtotal + tax + delivery_cost`.
#[must_use]
pub fn total(subtotal: Decimal, tax: Decimal, delivery_cost: Decimal) -> Decimal {
    subtotal + tax + delivery_cost
}

/// Compute every pricing field from the cart and delivery slices.
#[must_use]
pub fn compute_breakdown(
    cart: &CartState,
    delivery: &DeliveryState,
    rate: TaxRate,
) -> PriceBreakdown {
    let subtotal = subtotal(cart);
    let tax = tax(subtotal, rate);
    let delivery_cost = delivery_cost(delivery);

    PriceBreakdown {
        subtotal,
        tax,
        delivery_cost,
        total: total(subtotal, tax, delivery_cost),
    }
}

/// Apply an action to the pricing slice.
#[must_use]
pub fn reduce(mut state: PriceBreakdown, action: &Action) -> PriceBreakdown {
    let Action::Pricing(action) = action else {
        return state;
    };

    match *action {
        PricingAction::SubtotalSet(value) => state.subtotal = value,
        PricingAction::TaxSet(value) => state.tax = value,
        PricingAction::DeliveryCostSet(value) => state.delivery_cost = value,
        PricingAction::TotalSet(value) => state.total = value,
        PricingAction::Recomputed(breakdown) => state = breakdown,
    }

    state
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use core::str::FromStr;

    use super::*;
    use crate::store::cart::{CartLineItem, CartProduct};
    use crate::store::delivery::DeliveryOption;
    use crate::{DeliveryOptionId, ProductId};

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn line(id: &str, price: &str, quantity: u32) -> CartLineItem {
        CartLineItem {
            product: CartProduct {
                product_id: ProductId::new(id),
                name: id.to_string(),
                description: None,
                image_url: None,
                price: dec(price),
            },
            quantity,
        }
    }

    fn delivery(price: &str) -> DeliveryState {
        let option = DeliveryOption {
            id: DeliveryOptionId::new(1),
            name: "Courier".to_string(),
            price: dec(price),
            description: None,
        };
        DeliveryState {
            delivery_type: Some(option.clone()),
            delivery_options: vec![option],
        }
    }

    #[test]
    fn test_reference_breakdown() {
        let cart = CartState {
            items: vec![line("a", "10", 2), line("b", "5", 1)],
        };

        let breakdown = compute_breakdown(&cart, &delivery("3"), TaxRate::STANDARD);

        assert_eq!(breakdown.subtotal, dec("25"));
        assert_eq!(breakdown.tax, dec("4.75"));
        assert_eq!(breakdown.delivery_cost, dec("3"));
        assert_eq!(breakdown.total, dec("32.75"));
        assert!(breakdown.is_consistent());
    }

    #[test]
    fn test_empty_cart_without_delivery_is_zero() {
        let breakdown = compute_breakdown(
            &CartState::default(),
            &DeliveryState::default(),
            TaxRate::STANDARD,
        );
        assert_eq!(breakdown, PriceBreakdown::default());
    }

    #[test]
    fn test_zero_quantity_lines_cost_nothing() {
        let cart = CartState {
            items: vec![line("a", "19.99", 0), line("b", "2.50", 2)],
        };
        assert_eq!(subtotal(&cart), dec("5.00"));
    }

    #[test]
    fn test_free_delivery() {
        assert_eq!(delivery_cost(&delivery("0")), Decimal::ZERO);
    }

    #[test]
    fn test_setters_overwrite_one_field_each() {
        let state = reduce(
            PriceBreakdown::default(),
            &Action::Pricing(PricingAction::SubtotalSet(dec("25"))),
        );
        assert_eq!(state.subtotal, dec("25"));
        assert_eq!(state.total, Decimal::ZERO);
        // A lone setter leaves the breakdown inconsistent until the total is set.
        assert!(!state.is_consistent());

        let state = reduce(state, &Action::Pricing(PricingAction::TotalSet(dec("25"))));
        assert!(state.is_consistent());
    }
}
