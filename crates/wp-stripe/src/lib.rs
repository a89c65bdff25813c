//! # wp-stripe
//!
//! Stripe payment gateway for the woodpecker backend.
//!
//! **StripeIntentGateway** creates card PaymentIntents through the
//! PaymentIntents API and returns only the client secret; the card is
//! confirmed client-side with Stripe.js.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use wp_core::{Currency, IntentRequest, PaymentGateway};
//! use wp_stripe::StripeIntentGateway;
//!
//! // Create gateway from environment
//! let gateway = StripeIntentGateway::from_env()?;
//!
//! // $20.00 becomes an intent for 2000 cents
//! let request = IntentRequest::from_major_units(20.0, Currency::USD)?;
//! let secret = gateway.create_intent(request).await?;
//! ```

pub mod config;
pub mod intent;

// Re-exports
pub use config::StripeConfig;
pub use intent::StripeIntentGateway;
