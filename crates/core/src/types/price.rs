//! Type-safe price representation using decimal arithmetic.

use core::fmt;
use core::str::FromStr;

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

/// Errors that can occur when parsing prices, currencies or tax rates.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum PriceError {
    /// The currency code is not one we sell in.
    #[error("unsupported currency: {0}")]
    UnsupportedCurrency(String),
    /// The tax rate is not a decimal number.
    #[error("invalid tax rate: {0}")]
    InvalidTaxRate(String),
    /// The tax rate is outside `0..=1`.
    #[error("tax rate must be between 0 and 1 (got {0})")]
    TaxRateOutOfRange(Decimal),
}

/// Round a currency amount to cents, midpoint away from zero.
#[must_use]
pub fn round_currency(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// A price with currency information.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Price {
    /// Amount in the currency's standard unit (e.g., euros, not cents).
    pub amount: Decimal,
    /// ISO 4217 currency code.
    pub currency_code: CurrencyCode,
}

impl Price {
    /// Create a new price.
    #[must_use]
    pub const fn new(amount: Decimal, currency_code: CurrencyCode) -> Self {
        Self {
            amount,
            currency_code,
        }
    }

    /// Amount in minor units (cents), as payment gateways expect.
    ///
    /// Returns `None` if the amount does not fit in an `i64`.
    #[must_use]
    pub fn minor_units(&self) -> Option<i64> {
        (round_currency(self.amount) * Decimal::ONE_HUNDRED).to_i64()
    }

    /// Format for display (e.g., "€19.99").
    #[must_use]
    pub fn display(&self) -> String {
        format!(
            "{}{:.2}",
            self.currency_code.symbol(),
            round_currency(self.amount)
        )
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.display())
    }
}

/// ISO 4217 currency codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum CurrencyCode {
    #[default]
    EUR,
    USD,
    GBP,
}

impl CurrencyCode {
    /// Display symbol.
    #[must_use]
    pub const fn symbol(self) -> &'static str {
        match self {
            Self::EUR => "€",
            Self::USD => "$",
            Self::GBP => "£",
        }
    }

    /// Lowercase code, as used by Stripe.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::EUR => "eur",
            Self::USD => "usd",
            Self::GBP => "gbp",
        }
    }
}

impl FromStr for CurrencyCode {
    type Err = PriceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "eur" => Ok(Self::EUR),
            "usd" => Ok(Self::USD),
            "gbp" => Ok(Self::GBP),
            other => Err(PriceError::UnsupportedCurrency(other.to_owned())),
        }
    }
}

/// Sales tax rate as a fraction (0.19 = 19%).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaxRate(Decimal);

impl TaxRate {
    /// The storefront's standard VAT rate of 19%.
    pub const STANDARD: Self = Self(Decimal::from_parts(19, 0, 0, false, 2));

    /// Create a tax rate, rejecting values outside `0..=1`.
    ///
    /// # Errors
    ///
    /// Returns `PriceError::TaxRateOutOfRange` for negative rates or rates above 100%.
    pub fn new(rate: Decimal) -> Result<Self, PriceError> {
        if rate.is_sign_negative() || rate > Decimal::ONE {
            return Err(PriceError::TaxRateOutOfRange(rate));
        }
        Ok(Self(rate))
    }

    /// The rate as a fraction.
    #[must_use]
    pub const fn as_decimal(self) -> Decimal {
        self.0
    }

    /// Tax owed on `amount`, rounded to cents.
    #[must_use]
    pub fn apply(self, amount: Decimal) -> Decimal {
        round_currency(amount * self.0)
    }
}

impl Default for TaxRate {
    fn default() -> Self {
        Self::STANDARD
    }
}

impl FromStr for TaxRate {
    type Err = PriceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let rate = Decimal::from_str(s.trim())
            .map_err(|_| PriceError::InvalidTaxRate(s.to_owned()))?;
        Self::new(rate)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn test_standard_rate_is_nineteen_percent() {
        assert_eq!(TaxRate::STANDARD.as_decimal(), dec("0.19"));
        assert_eq!(TaxRate::default(), TaxRate::STANDARD);
    }

    #[test]
    fn test_apply_rounds_to_cents() {
        assert_eq!(TaxRate::STANDARD.apply(dec("25")), dec("4.75"));
        // 0.19 * 10.05 = 1.9095
        assert_eq!(TaxRate::STANDARD.apply(dec("10.05")), dec("1.91"));
    }

    #[test]
    fn test_tax_rate_range() {
        assert!(TaxRate::new(dec("-0.01")).is_err());
        assert!(TaxRate::new(dec("1.5")).is_err());
        assert!(TaxRate::new(Decimal::ZERO).is_ok());
        assert!("abc".parse::<TaxRate>().is_err());
        assert_eq!("0.07".parse::<TaxRate>().unwrap().as_decimal(), dec("0.07"));
    }

    #[test]
    fn test_minor_units() {
        let price = Price::new(dec("32.75"), CurrencyCode::EUR);
        assert_eq!(price.minor_units(), Some(3275));

        let whole = Price::new(dec("3"), CurrencyCode::EUR);
        assert_eq!(whole.minor_units(), Some(300));

        let tiny = Price::new(dec("0.005"), CurrencyCode::USD);
        assert_eq!(tiny.minor_units(), Some(1));
    }

    #[test]
    fn test_display() {
        assert_eq!(Price::new(dec("4.5"), CurrencyCode::EUR).display(), "€4.50");
        assert_eq!(Price::new(dec("10"), CurrencyCode::USD).to_string(), "$10.00");
    }

    #[test]
    fn test_currency_parse() {
        assert_eq!("USD".parse::<CurrencyCode>().unwrap(), CurrencyCode::USD);
        assert!("jpy".parse::<CurrencyCode>().is_err());
        assert_eq!(CurrencyCode::GBP.code(), "gbp");
    }
}
