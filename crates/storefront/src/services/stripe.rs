//! Stripe Checkout client.
//!
//! Creates hosted checkout sessions from the visitor's cart. Amounts are
//! sent in minor units; tax and delivery are separate line items so the
//! Stripe receipt matches the breakdown shown on the site. The breakdown is
//! recomputed here with the current tax rate, never taken from the session.

use std::sync::Arc;

use bramble_core::store::{
    CartState, DeliveryState, PriceBreakdown, ShippingAddress, compute_breakdown,
};
use bramble_core::{CurrencyCode, Email, Price, TaxRate};
use rust_decimal::Decimal;
use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::instrument;

use crate::config::StripeConfig;

/// Errors that can occur when talking to Stripe.
#[derive(Debug, Error)]
pub enum StripeError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Stripe rejected the request.
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// No line has a positive quantity.
    #[error("cart has nothing to pay for")]
    EmptyCart,

    /// An amount does not fit Stripe's integer minor units.
    #[error("amount out of range: {0}")]
    AmountOutOfRange(Decimal),

    /// Failed to parse the response.
    #[error("Parse error: {0}")]
    Parse(String),
}

/// A created checkout session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckoutSession {
    pub id: String,
    pub url: Option<String>,
}

/// Everything needed to open a checkout session.
#[derive(Debug, Clone)]
pub struct CheckoutRequest<'a> {
    pub cart: &'a CartState,
    pub delivery: &'a DeliveryState,
    pub tax_rate: TaxRate,
    pub currency: CurrencyCode,
    pub customer_email: Option<&'a Email>,
    pub shipping_address: Option<&'a ShippingAddress>,
    pub success_url: String,
    pub cancel_url: String,
}

impl CheckoutRequest<'_> {
    /// Pricing for the cart and delivery choice at today's tax rate.
    #[must_use]
    pub fn breakdown(&self) -> PriceBreakdown {
        compute_breakdown(self.cart, self.delivery, self.tax_rate)
    }

    /// The amount due, with its currency.
    #[must_use]
    pub fn total(&self) -> Price {
        Price::new(self.breakdown().total, self.currency)
    }
}

/// Stripe API client.
#[derive(Clone)]
pub struct StripeClient {
    inner: Arc<StripeClientInner>,
}

struct StripeClientInner {
    client: reqwest::Client,
    sessions_url: String,
    secret_key: String,
}

impl StripeClient {
    /// Create a new Stripe client.
    #[must_use]
    pub fn new(config: &StripeConfig) -> Self {
        Self {
            inner: Arc::new(StripeClientInner {
                client: reqwest::Client::new(),
                sessions_url: format!(
                    "{}/v1/checkout/sessions",
                    config.api_base.trim_end_matches('/')
                ),
                secret_key: config.secret_key.expose_secret().to_string(),
            }),
        }
    }

    /// Open a hosted checkout session.
    ///
    /// # Errors
    ///
    /// Returns `StripeError::EmptyCart` if nothing is billable, or another
    /// `StripeError` if Stripe rejects the request.
    #[instrument(skip_all, fields(total = %request.total()))]
    pub async fn create_checkout_session(
        &self,
        request: &CheckoutRequest<'_>,
    ) -> Result<CheckoutSession, StripeError> {
        let form = checkout_form(request)?;

        let response = self
            .inner
            .client
            .post(&self.inner.sessions_url)
            .bearer_auth(&self.inner.secret_key)
            .form(&form)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(StripeError::Api {
                status: status.as_u16(),
                message,
            });
        }

        response
            .json()
            .await
            .map_err(|e| StripeError::Parse(e.to_string()))
    }
}

struct LineItems<'a> {
    form: &'a mut Vec<(String, String)>,
    currency: &'static str,
    next: usize,
}

impl LineItems<'_> {
    fn push(&mut self, name: &str, unit_amount: i64, quantity: u32) {
        let prefix = format!("line_items[{}]", self.next);
        self.form.extend([
            (
                format!("{prefix}[price_data][currency]"),
                self.currency.to_string(),
            ),
            (
                format!("{prefix}[price_data][product_data][name]"),
                name.to_string(),
            ),
            (
                format!("{prefix}[price_data][unit_amount]"),
                unit_amount.to_string(),
            ),
            (format!("{prefix}[quantity]"), quantity.to_string()),
        ]);
        self.next += 1;
    }
}

fn minor_units(amount: Decimal, currency: CurrencyCode) -> Result<i64, StripeError> {
    Price::new(amount, currency)
        .minor_units()
        .ok_or(StripeError::AmountOutOfRange(amount))
}

/// Build the form-encoded body for `POST /v1/checkout/sessions`.
///
/// Zero-quantity lines are left out. Tax and delivery are only added when
/// they are non-zero.
///
/// # Errors
///
/// Returns `StripeError::EmptyCart` when no line has a positive quantity.
pub fn checkout_form(request: &CheckoutRequest<'_>) -> Result<Vec<(String, String)>, StripeError> {
    let currency = request.currency.code();
    let mut form = vec![
        ("mode".to_string(), "payment".to_string()),
        ("success_url".to_string(), request.success_url.clone()),
        ("cancel_url".to_string(), request.cancel_url.clone()),
    ];
    if let Some(email) = request.customer_email {
        form.push(("customer_email".to_string(), email.to_string()));
    }
    if let Some(address) = request.shipping_address {
        form.push((
            "metadata[shipping_address]".to_string(),
            address.one_line(),
        ));
    }
    form.push(("metadata[total]".to_string(), request.total().to_string()));

    let breakdown = request.breakdown();

    let mut lines = LineItems {
        form: &mut form,
        currency,
        next: 0,
    };

    for line in request.cart.items.iter().filter(|l| l.quantity > 0) {
        let amount = minor_units(line.product.price, request.currency)?;
        lines.push(&line.product.name, amount, line.quantity);
    }
    if lines.next == 0 {
        return Err(StripeError::EmptyCart);
    }

    if breakdown.tax > Decimal::ZERO {
        let amount = minor_units(breakdown.tax, request.currency)?;
        lines.push("Tax", amount, 1);
    }

    if let Some(option) = &request.delivery.delivery_type
        && breakdown.delivery_cost > Decimal::ZERO
    {
        let amount = minor_units(breakdown.delivery_cost, request.currency)?;
        lines.push(&format!("Delivery: {}", option.name), amount, 1);
    }

    Ok(form)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use bramble_core::store::{CartLineItem, CartProduct, DeliveryOption};
    use bramble_core::DeliveryOptionId;
    use bramble_core::ProductId;

    use super::*;

    fn cart() -> CartState {
        let line = |id: &str, price: i64, quantity| CartLineItem {
            product: CartProduct {
                product_id: ProductId::new(id),
                name: format!("Item {id}"),
                description: None,
                image_url: None,
                price: Decimal::from(price),
            },
            quantity,
        };
        CartState {
            items: vec![line("a", 10, 2), line("b", 5, 1), line("c", 99, 0)],
        }
    }

    fn delivery() -> DeliveryState {
        DeliveryState {
            delivery_type: Some(DeliveryOption {
                id: DeliveryOptionId::new(1),
                name: "Courier".to_string(),
                price: Decimal::from(3),
                description: None,
            }),
            delivery_options: Vec::new(),
        }
    }

    fn value<'a>(form: &'a [(String, String)], key: &str) -> Option<&'a str> {
        form.iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    #[test]
    fn test_form_has_items_tax_and_delivery() {
        let cart = cart();
        let delivery = delivery();
        let request = CheckoutRequest {
            cart: &cart,
            delivery: &delivery,
            tax_rate: TaxRate::STANDARD,
            currency: CurrencyCode::USD,
            customer_email: None,
            shipping_address: None,
            success_url: "https://shop.test/checkout/success".to_string(),
            cancel_url: "https://shop.test/cart".to_string(),
        };

        let form = checkout_form(&request).unwrap();

        assert_eq!(value(&form, "mode"), Some("payment"));
        assert_eq!(value(&form, "line_items[0][price_data][unit_amount]"), Some("1000"));
        assert_eq!(value(&form, "line_items[0][quantity]"), Some("2"));
        assert_eq!(value(&form, "line_items[1][price_data][currency]"), Some("usd"));
        // The zero-quantity line is skipped, so index 2 is the tax line.
        assert_eq!(
            value(&form, "line_items[2][price_data][product_data][name]"),
            Some("Tax")
        );
        assert_eq!(value(&form, "line_items[2][price_data][unit_amount]"), Some("475"));
        assert_eq!(
            value(&form, "line_items[3][price_data][product_data][name]"),
            Some("Delivery: Courier")
        );
        assert_eq!(value(&form, "line_items[3][price_data][unit_amount]"), Some("300"));
        assert!(value(&form, "line_items[4][quantity]").is_none());
        assert_eq!(value(&form, "metadata[total]"), Some("$32.75"));
        assert!(value(&form, "metadata[shipping_address]").is_none());
    }

    #[test]
    fn test_tax_follows_current_rate() {
        let cart = cart();
        let delivery = DeliveryState::default();
        let address = ShippingAddress {
            line1: "12 Hedge Lane".to_string(),
            line2: None,
            city: "Bath".to_string(),
            postal_code: "BA1 1AA".to_string(),
            state: String::new(),
            country: "GB".to_string(),
        };
        let request = CheckoutRequest {
            cart: &cart,
            delivery: &delivery,
            tax_rate: "0.2".parse().unwrap(),
            currency: CurrencyCode::GBP,
            customer_email: None,
            shipping_address: Some(&address),
            success_url: String::new(),
            cancel_url: String::new(),
        };

        let form = checkout_form(&request).unwrap();

        assert_eq!(value(&form, "line_items[2][price_data][unit_amount]"), Some("500"));
        assert_eq!(value(&form, "metadata[total]"), Some("£30.00"));
        assert_eq!(
            value(&form, "metadata[shipping_address]"),
            Some("12 Hedge Lane, Bath, BA1 1AA, GB")
        );
    }

    #[test]
    fn test_all_zero_quantities_is_empty_cart() {
        let mut cart = cart();
        for line in &mut cart.items {
            line.quantity = 0;
        }
        let delivery = DeliveryState::default();
        let request = CheckoutRequest {
            cart: &cart,
            delivery: &delivery,
            tax_rate: TaxRate::STANDARD,
            currency: CurrencyCode::EUR,
            customer_email: None,
            shipping_address: None,
            success_url: String::new(),
            cancel_url: String::new(),
        };

        assert!(matches!(checkout_form(&request), Err(StripeError::EmptyCart)));
    }
}
