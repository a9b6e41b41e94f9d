//! Cart endpoints.
//!
//! The cart lives in the visitor's session. Every change goes through the
//! visitor's store, so the price breakdown in the response is always the
//! one recomputed for the new cart.

use axum::{
    Json, Router,
    extract::{State, rejection::JsonRejection},
    routing::{get, post},
};
use bramble_core::ProductId;
use bramble_core::store::{CartLineItem, PriceBreakdown, StoreState, action};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tracing::instrument;

use crate::error::Result;
use crate::middleware::VisitorStore;
use crate::routes::api::json_body;
use crate::routes::products::find_product;
use crate::state::AppState;

/// Body of every cart mutation.
#[derive(Debug, Deserialize)]
pub struct CartItemRequest {
    pub product_id: String,
}

/// Cart lines with their price breakdown.
#[derive(Debug, Serialize)]
pub struct CartView {
    pub items: Vec<CartLineItem>,
    pub item_count: u32,
    pub pricing: PriceBreakdown,
}

impl From<&StoreState> for CartView {
    fn from(state: &StoreState) -> Self {
        Self {
            items: state.cart.items.clone(),
            item_count: state.cart.total_quantity(),
            pricing: state.pricing,
        }
    }
}

/// `GET /cart`
#[instrument(skip_all)]
pub async fn show(store: VisitorStore) -> Json<CartView> {
    Json(CartView::from(store.state()))
}

/// `GET /cart/count`
#[instrument(skip_all)]
pub async fn count(store: VisitorStore) -> Json<Value> {
    Json(json!({ "count": store.state().cart.total_quantity() }))
}

/// `POST /cart/add`
///
/// Copies the product's current name, description, image and price into
/// the cart line.
#[instrument(skip_all)]
pub async fn add(
    State(state): State<AppState>,
    mut store: VisitorStore,
    payload: std::result::Result<Json<CartItemRequest>, JsonRejection>,
) -> Result<Json<CartView>> {
    let request = json_body(payload)?;
    let product = find_product(&state, &ProductId::new(request.product_id)).await?;

    store.dispatch(action::insert_item(product.to_cart_product()));
    tracing::info!(product_id = %product.id, "Added to cart");

    respond(store).await
}

/// `POST /cart/increment`
#[instrument(skip_all)]
pub async fn increment(
    mut store: VisitorStore,
    payload: std::result::Result<Json<CartItemRequest>, JsonRejection>,
) -> Result<Json<CartView>> {
    let request = json_body(payload)?;
    store.dispatch(action::increment_item(ProductId::new(request.product_id)));
    respond(store).await
}

/// `POST /cart/decrement`
///
/// Stops at zero; the line stays in the cart until removed.
#[instrument(skip_all)]
pub async fn decrement(
    mut store: VisitorStore,
    payload: std::result::Result<Json<CartItemRequest>, JsonRejection>,
) -> Result<Json<CartView>> {
    let request = json_body(payload)?;
    store.dispatch(action::decrement_item(ProductId::new(request.product_id)));
    respond(store).await
}

/// `POST /cart/remove`
#[instrument(skip_all)]
pub async fn remove(
    mut store: VisitorStore,
    payload: std::result::Result<Json<CartItemRequest>, JsonRejection>,
) -> Result<Json<CartView>> {
    let request = json_body(payload)?;
    store.dispatch(action::delete_item(ProductId::new(request.product_id)));
    respond(store).await
}

async fn respond(store: VisitorStore) -> Result<Json<CartView>> {
    let state = store.save().await?;
    Ok(Json(CartView::from(&state)))
}

/// Create the cart routes router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/cart", get(show))
        .route("/cart/count", get(count))
        .route("/cart/add", post(add))
        .route("/cart/increment", post(increment))
        .route("/cart/decrement", post(decrement))
        .route("/cart/remove", post(remove))
}
