//! # Payment Intent Gateway
//!
//! The seam to the external payment processor. A gateway turns an amount in
//! major currency units into a processor-side payment intent and hands back
//! the client secret the browser needs to confirm the card payment.
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │            PaymentGateway (trait)           │
//! │  ├── create_intent()                        │
//! │  └── provider_name()                        │
//! └─────────────────────────────────────────────┘
//!                        ▲
//!                ┌───────┴────────┐
//!                │ StripeIntent   │
//!                │   Gateway      │
//!                └────────────────┘
//! ```

use crate::error::{AppError, AppResult};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::sync::Arc;

/// Supported currencies (ISO 4217)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Currency {
    #[default]
    USD,
    EUR,
    GBP,
    JPY,
}

impl Currency {
    /// Returns the ISO 4217 currency code
    pub fn as_str(&self) -> &'static str {
        match self {
            Currency::USD => "usd",
            Currency::EUR => "eur",
            Currency::GBP => "gbp",
            Currency::JPY => "jpy",
        }
    }

    /// Returns the number of decimal places for this currency
    /// (JPY has 0 decimals, the others have 2)
    pub fn decimal_places(&self) -> u8 {
        match self {
            Currency::JPY => 0,
            _ => 2,
        }
    }

    /// Convert a major-unit amount to the smallest currency unit (cents, etc.)
    pub fn to_smallest_unit(&self, amount: f64) -> i64 {
        let multiplier = 10_f64.powi(self.decimal_places() as i32);
        (amount * multiplier).round() as i64
    }
}

impl FromStr for Currency {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "usd" => Ok(Currency::USD),
            "eur" => Ok(Currency::EUR),
            "gbp" => Ok(Currency::GBP),
            "jpy" => Ok(Currency::JPY),
            other => Err(AppError::Configuration(format!("unsupported currency: {other}"))),
        }
    }
}

impl std::fmt::Display for Currency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str().to_uppercase())
    }
}

/// A validated request for a card payment intent
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IntentRequest {
    /// Amount in the currency's smallest unit
    pub amount: i64,
    pub currency: Currency,
}

impl IntentRequest {
    /// Convert a caller-supplied major-unit total
    pub fn from_major_units(total: f64, currency: Currency) -> AppResult<Self> {
        if !total.is_finite() || total <= 0.0 {
            return Err(AppError::InvalidArgument(format!(
                "totalPrice must be a positive amount, got {total}"
            )));
        }
        Ok(Self {
            amount: currency.to_smallest_unit(total),
            currency,
        })
    }
}

/// The processor's answer, reduced to what the client may see
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientSecret {
    pub client_secret: String,
}

/// Core trait for payment processor implementations.
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Create a card-payment intent and return its client secret.
    async fn create_intent(&self, request: IntentRequest) -> AppResult<ClientSecret>;

    /// Currency every intent is created in
    fn currency(&self) -> Currency;

    /// Get the provider name (for logging).
    fn provider_name(&self) -> &'static str;
}

/// Type alias for a boxed payment gateway (dynamic dispatch)
pub type BoxedPaymentGateway = Arc<dyn PaymentGateway>;
