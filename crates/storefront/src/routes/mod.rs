//! HTTP route handlers for storefront.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                      - Liveness
//! GET  /health/ready                - Database ping
//!
//! # Events API (JSON)
//! POST|PUT|DELETE /api/events       - Manage events (admin)
//! GET  /api/events/{id}/rsvps       - RSVP head counts
//! POST|PUT|DELETE /api/rsvp         - Manage RSVPs
//!
//! # Shop
//! GET  /products, /products/{id}    - Catalog
//! GET  /cart, /cart/count           - Cart and price breakdown
//! POST /cart/{add,increment,decrement,remove}
//! GET  /checkout/delivery-options   - Load delivery catalog
//! POST /checkout/delivery           - Choose delivery
//! POST /checkout/address            - Set shipping address
//! POST /checkout/session            - Start Stripe Checkout
//! GET  /checkout/success            - Stripe return URL
//!
//! # Account (requires auth)
//! GET|POST /favorites, GET|DELETE /favorites/{product_id}
//! GET|DELETE /account/address
//! GET|PUT /account/profile
//! GET  /account/profile/events      - SSE profile changes
//!
//! # Auth
//! POST /auth/session                - Exchange provider token for a session
//! POST /auth/logout
//!
//! # Blog (HTML)
//! GET  /blog, /blog/{slug}, /blog/archive/{id}
//! ```

pub mod account;
pub mod api;
pub mod auth;
pub mod blog;
pub mod cart;
pub mod checkout;
pub mod favorites;
pub mod products;

use axum::{Router, extract::State, http::StatusCode, routing::get};

use crate::state::AppState;

/// Liveness health check endpoint.
///
/// Returns "ok" if the server is running. Does not check dependencies.
pub async fn health() -> &'static str {
    "ok"
}

/// Readiness health check endpoint.
///
/// Returns 503 Service Unavailable if the database is not reachable.
pub async fn readiness(State(state): State<AppState>) -> StatusCode {
    match sqlx::query("SELECT 1").fetch_one(state.pool()).await {
        Ok(_) => StatusCode::OK,
        Err(e) => {
            tracing::warn!(error = %e, "Readiness check failed");
            StatusCode::SERVICE_UNAVAILABLE
        }
    }
}

/// Create all routes for the storefront.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        .route("/health/ready", get(readiness))
        .merge(api::router())
        .merge(products::router())
        .merge(cart::router())
        .merge(checkout::router())
        .merge(favorites::router())
        .merge(account::router())
        .merge(auth::router())
        .merge(blog::router())
}
