// src/services/payment.rs

//! Payment gateway adapter. A gateway failure aborts the whole
//! order-placement transaction; no retries here, retry policy belongs to
//! the client.

use crate::errors::AppError;
use async_trait::async_trait;
use serde::Deserialize;
use tracing::{error, info, instrument};

const STRIPE_API_BASE: &str = "https://api.stripe.com";

#[derive(Debug, Clone)]
pub struct PaymentIntent {
  pub intent_id: String,
  pub client_secret: String,
}

#[async_trait]
pub trait PaymentGateway: Send + Sync {
  /// Creates a payment intent for `amount_minor_units` of `currency`
  /// (e.g. cents of usd) and returns its id plus the client-usable secret.
  async fn create_intent(&self, amount_minor_units: i64, currency: &str) -> Result<PaymentIntent, AppError>;
}

pub struct StripeGateway {
  http: reqwest::Client,
  secret_key: String,
}

impl StripeGateway {
  pub fn new(secret_key: String) -> Self {
    Self {
      http: reqwest::Client::new(),
      secret_key,
    }
  }
}

#[derive(Debug, Deserialize)]
struct StripeIntentResponse {
  id: String,
  client_secret: String,
}

#[async_trait]
impl PaymentGateway for StripeGateway {
  #[instrument(name = "payment::create_intent", skip(self))]
  async fn create_intent(&self, amount_minor_units: i64, currency: &str) -> Result<PaymentIntent, AppError> {
    if amount_minor_units <= 0 {
      return Err(AppError::Gateway("Amount must be greater than zero".to_string()));
    }

    let params = [
      ("amount", amount_minor_units.to_string()),
      ("currency", currency.to_string()),
      ("automatic_payment_methods[enabled]", "true".to_string()),
    ];

    let response = self
      .http
      .post(format!("{}/v1/payment_intents", STRIPE_API_BASE))
      .bearer_auth(&self.secret_key)
      .form(&params)
      .send()
      .await
      .map_err(|e| {
        error!(error = %e, "Payment intent request failed to reach the processor.");
        AppError::Gateway(format!("Payment processor unreachable: {}", e))
      })?;

    let status = response.status();
    if !status.is_success() {
      let body = response.text().await.unwrap_or_default();
      error!(%status, %body, "Payment processor rejected the intent request.");
      return Err(AppError::Gateway(format!("Payment processor returned {}", status)));
    }

    let intent: StripeIntentResponse = response
      .json()
      .await
      .map_err(|e| AppError::Gateway(format!("Malformed payment processor response: {}", e)))?;

    info!(intent_id = %intent.id, "Payment intent created.");
    Ok(PaymentIntent {
      intent_id: intent.id,
      client_secret: intent.client_secret,
    })
  }
}
