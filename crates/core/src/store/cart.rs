//! Cart slice: one line per product, quantities moved in fixed steps.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::Action;
use crate::ProductId;

/// How much a single increment or decrement changes a line's quantity.
pub const QUANTITY_STEP: u32 = 1;

/// Product fields copied into the cart when a line is created.
///
/// Later catalog edits do not reach lines already in a cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartProduct {
    pub product_id: ProductId,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
    /// Unit price.
    pub price: Decimal,
}

/// A product and how many of it are in the cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartLineItem {
    #[serde(flatten)]
    pub product: CartProduct,
    pub quantity: u32,
}

impl CartLineItem {
    /// Unit price multiplied by quantity.
    #[must_use]
    pub fn line_total(&self) -> Decimal {
        self.product.price * Decimal::from(self.quantity)
    }
}

/// Cart transitions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "snake_case")]
pub enum CartAction {
    /// Add a product; bumps the quantity if it is already in the cart.
    Insert(CartProduct),
    /// Remove the line for a product.
    Delete(ProductId),
    /// Raise a line's quantity by [`QUANTITY_STEP`].
    Increment(ProductId),
    /// Lower a line's quantity by [`QUANTITY_STEP`], never below zero.
    Decrement(ProductId),
}

/// The cart slice of the store.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartState {
    pub items: Vec<CartLineItem>,
}

impl CartState {
    /// Find the line for a product.
    #[must_use]
    pub fn line(&self, product_id: &ProductId) -> Option<&CartLineItem> {
        self.items
            .iter()
            .find(|line| &line.product.product_id == product_id)
    }

    fn line_mut(&mut self, product_id: &ProductId) -> Option<&mut CartLineItem> {
        self.items
            .iter_mut()
            .find(|line| &line.product.product_id == product_id)
    }

    /// Sum of all quantities.
    #[must_use]
    pub fn total_quantity(&self) -> u32 {
        self.items.iter().map(|line| line.quantity).sum()
    }

    /// `true` when there are no lines at all (zero-quantity lines count as lines).
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Apply an action to the cart slice.
///
/// Actions addressed to other slices return the state unchanged.
#[must_use]
pub fn reduce(mut state: CartState, action: &Action) -> CartState {
    let Action::Cart(action) = action else {
        return state;
    };

    match action {
        CartAction::Insert(product) => {
            if let Some(line) = state.line_mut(&product.product_id) {
                line.quantity = line.quantity.saturating_add(QUANTITY_STEP);
            } else {
                state.items.push(CartLineItem {
                    product: product.clone(),
                    quantity: 1,
                });
            }
        }
        CartAction::Delete(product_id) => {
            state
                .items
                .retain(|line| &line.product.product_id != product_id);
        }
        CartAction::Increment(product_id) => {
            if let Some(line) = state.line_mut(product_id) {
                line.quantity = line.quantity.saturating_add(QUANTITY_STEP);
            }
        }
        CartAction::Decrement(product_id) => {
            if let Some(line) = state.line_mut(product_id)
                && line.quantity > 0
            {
                line.quantity = line.quantity.saturating_sub(QUANTITY_STEP);
            }
        }
    }

    state
}
