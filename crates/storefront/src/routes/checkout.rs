//! Checkout: delivery choice, shipping address and the Stripe hand-off.

use axum::{
    Json, Router,
    extract::{State, rejection::JsonRejection},
    routing::{get, post},
};
use bramble_core::{DeliveryOptionId, ProductId};
use bramble_core::store::{DeliveryOption, PriceBreakdown, ShippingAddress, action};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tracing::instrument;

use crate::db::{AddressRepository, DeliveryOptionRepository};
use crate::error::{AppError, Result, add_breadcrumb};
use crate::middleware::{OptionalAuth, VisitorStore};
use crate::models::FieldError;
use crate::routes::api::json_body;
use crate::services::{CheckoutRequest, CheckoutSession};
use crate::state::AppState;

/// Delivery catalog plus the current choice.
#[derive(Debug, Serialize)]
pub struct DeliveryView {
    pub delivery_options: Vec<DeliveryOption>,
    pub selected: Option<DeliveryOption>,
    pub pricing: PriceBreakdown,
}

/// `{ "option_id": 2 }`
#[derive(Debug, Deserialize)]
pub struct SelectDeliveryRequest {
    pub option_id: i32,
}

/// `GET /checkout/delivery-options`
///
/// Loads the catalog from the database into the visitor's state.
#[instrument(skip_all)]
pub async fn delivery_options(
    State(state): State<AppState>,
    mut store: VisitorStore,
) -> Result<Json<DeliveryView>> {
    store.dispatch(action::fetch_delivery_options());
    let options = DeliveryOptionRepository::new(state.pool()).list().await?;
    store.dispatch(action::delivery_options_loaded(options));

    let saved = store.save().await?;
    Ok(Json(DeliveryView {
        delivery_options: saved.delivery.delivery_options,
        selected: saved.delivery.delivery_type,
        pricing: saved.pricing,
    }))
}

/// `POST /checkout/delivery`
#[instrument(skip_all)]
pub async fn select_delivery(
    State(state): State<AppState>,
    mut store: VisitorStore,
    payload: std::result::Result<Json<SelectDeliveryRequest>, JsonRejection>,
) -> Result<Json<DeliveryView>> {
    let id = DeliveryOptionId::new(json_body(payload)?.option_id);

    let option = match store.state().delivery.option(id) {
        Some(option) => option.clone(),
        None => DeliveryOptionRepository::new(state.pool())
            .get(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("delivery option {id}")))?,
    };

    store.dispatch(action::select_delivery(option));

    let saved = store.save().await?;
    Ok(Json(DeliveryView {
        delivery_options: saved.delivery.delivery_options,
        selected: saved.delivery.delivery_type,
        pricing: saved.pricing,
    }))
}

/// Blank required address fields are treated as missing.
fn validate_address(address: &ShippingAddress) -> std::result::Result<(), FieldError> {
    let missing: Vec<&'static str> = [
        ("line1", &address.line1),
        ("city", &address.city),
        ("postal_code", &address.postal_code),
        ("state", &address.state),
        ("country", &address.country),
    ]
    .into_iter()
    .filter(|(_, value)| value.trim().is_empty())
    .map(|(name, _)| name)
    .collect();

    if missing.is_empty() {
        Ok(())
    } else {
        Err(FieldError::Missing(missing))
    }
}

/// `POST /checkout/address`
///
/// Replaces the session's shipping address. Signed-in users also get it
/// saved to their account.
#[instrument(skip_all)]
pub async fn save_address(
    State(state): State<AppState>,
    OptionalAuth(user): OptionalAuth,
    mut store: VisitorStore,
    payload: std::result::Result<Json<ShippingAddress>, JsonRejection>,
) -> Result<Json<ShippingAddress>> {
    let address = json_body(payload)?;
    validate_address(&address)?;

    if let Some(user) = &user {
        AddressRepository::new(state.pool())
            .upsert_for_user(user.id, &address)
            .await?;
    }

    if store.state().address.address.is_some() {
        store.dispatch(action::update_address(address.clone()));
    } else {
        store.dispatch(action::create_address(address.clone()));
    }
    store.save().await?;

    Ok(Json(address))
}

/// `POST /checkout/session`
///
/// Opens a Stripe Checkout session for the current cart, priced at the
/// configured tax rate.
#[instrument(skip_all)]
pub async fn create_session(
    State(state): State<AppState>,
    store: VisitorStore,
) -> Result<Json<CheckoutSession>> {
    let current = store.state();
    let config = state.config();

    let request = CheckoutRequest {
        cart: &current.cart,
        delivery: &current.delivery,
        tax_rate: config.tax_rate,
        currency: config.currency,
        customer_email: current.session.user.as_ref().map(|u| &u.email),
        shipping_address: current.address.address.as_ref(),
        success_url: config.url_for("/checkout/success?session_id={CHECKOUT_SESSION_ID}"),
        cancel_url: config.url_for("/cart"),
    };

    let session = state.stripe().create_checkout_session(&request).await?;

    add_breadcrumb(
        "checkout",
        "Stripe session created",
        Some(&[("session_id", session.id.as_str())]),
    );
    tracing::info!(session_id = %session.id, total = %request.total(), "Checkout started");

    Ok(Json(session))
}

/// `GET /checkout/success`
///
/// Stripe redirects here after payment. The paid-for lines are cleared.
#[instrument(skip_all)]
pub async fn success(mut store: VisitorStore) -> Result<Json<Value>> {
    let paid: Vec<ProductId> = store
        .state()
        .cart
        .items
        .iter()
        .map(|line| line.product.product_id.clone())
        .collect();
    for product_id in paid {
        store.dispatch(action::delete_item(product_id));
    }
    store.save().await?;

    Ok(Json(json!({ "message": "Thank you for your order" })))
}

/// Create the checkout routes router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/checkout/delivery-options", get(delivery_options))
        .route("/checkout/delivery", post(select_delivery))
        .route("/checkout/address", post(save_address))
        .route("/checkout/session", post(create_session))
        .route("/checkout/success", get(success))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_address_fields_are_missing() {
        let address = ShippingAddress {
            line1: "12 Hedge Lane".to_string(),
            line2: None,
            city: " ".to_string(),
            postal_code: "94110".to_string(),
            state: "CA".to_string(),
            country: String::new(),
        };

        assert_eq!(
            validate_address(&address),
            Err(FieldError::Missing(vec!["city", "country"]))
        );
    }
}
