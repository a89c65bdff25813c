//! # Stripe Payment Intents
//!
//! Creates card PaymentIntents for the client-side payment flow. The browser
//! confirms the card payment with the returned client secret and later
//! reports the resulting transaction id back to the order endpoint.

use crate::config::StripeConfig;
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, error, info, instrument};
use uuid::Uuid;
use wp_core::{AppError, AppResult, ClientSecret, Currency, IntentRequest, PaymentGateway};

const PROVIDER: &str = "stripe";

/// Stripe PaymentIntents gateway
pub struct StripeIntentGateway {
    config: StripeConfig,
    client: Client,
}

impl StripeIntentGateway {
    /// Create a new gateway with its own pooled HTTP client
    pub fn new(config: StripeConfig) -> AppResult<Self> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()
            .map_err(|e| AppError::Configuration(format!("failed to create HTTP client: {e}")))?;

        Ok(Self { config, client })
    }

    /// Create from environment variables
    pub fn from_env() -> AppResult<Self> {
        Self::new(StripeConfig::from_env()?)
    }

    pub fn config(&self) -> &StripeConfig {
        &self.config
    }

    fn form_params(request: &IntentRequest) -> Vec<(&'static str, String)> {
        vec![
            ("amount", request.amount.to_string()),
            ("currency", request.currency.as_str().to_string()),
            ("payment_method_types[]", "card".to_string()),
        ]
    }
}

#[async_trait]
impl PaymentGateway for StripeIntentGateway {
    #[instrument(skip(self), fields(amount = request.amount, currency = %request.currency))]
    async fn create_intent(&self, request: IntentRequest) -> AppResult<ClientSecret> {
        let url = format!("{}/v1/payment_intents", self.config.api_base_url);
        let idempotency_key = Uuid::new_v4().to_string();

        debug!("Creating Stripe payment intent");

        let response = self
            .client
            .post(&url)
            .header("Authorization", self.config.auth_header())
            .header("Stripe-Version", &self.config.api_version)
            .header("Idempotency-Key", &idempotency_key)
            .form(&Self::form_params(&request))
            .send()
            .await
            .map_err(|e| AppError::upstream(PROVIDER, e))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| AppError::upstream(PROVIDER, e))?;

        if !status.is_success() {
            error!("Stripe API error: status={}, body={}", status, body);

            if let Ok(error_response) = serde_json::from_str::<StripeErrorResponse>(&body) {
                return Err(AppError::upstream(PROVIDER, error_response.error.message));
            }

            return Err(AppError::upstream(PROVIDER, format!("HTTP {status}")));
        }

        let intent: StripePaymentIntentResponse = serde_json::from_str(&body).map_err(|e| {
            AppError::upstream(PROVIDER, format!("failed to parse Stripe response: {e}"))
        })?;

        let client_secret = intent.client_secret.ok_or_else(|| {
            AppError::upstream(PROVIDER, "payment intent has no client secret")
        })?;

        info!(intent_id = %intent.id, "Created Stripe payment intent");

        Ok(ClientSecret { client_secret })
    }

    fn currency(&self) -> Currency {
        self.config.currency
    }

    fn provider_name(&self) -> &'static str {
        PROVIDER
    }
}

// =============================================================================
// Stripe API Types
// =============================================================================

#[derive(Debug, Deserialize)]
struct StripePaymentIntentResponse {
    id: String,
    #[serde(default)]
    client_secret: Option<String>,
}

#[derive(Debug, Deserialize)]
struct StripeErrorResponse {
    error: StripeError,
}

#[derive(Debug, Deserialize)]
struct StripeError {
    message: String,
}
