// src/config.rs

use crate::errors::{AppError, Result};
use dotenvy::dotenv;
use std::env;

#[derive(Debug, Clone)]
pub struct AppConfig {
  pub server_host: String,
  pub server_port: u16,
  pub database_url: String,

  // Token service
  pub jwt_secret: String,
  pub jwt_expiration_secs: i64,

  // Payment gateway: absence of the credential disables stripe-mode intents.
  pub stripe_secret_key: Option<String>,
  pub currency: String,

  // Apply the idempotent schema bootstrap on startup.
  pub ensure_schema: bool,
}

impl AppConfig {
  pub fn from_env() -> Result<Self> {
    dotenv().ok(); // Load .env file if present

    let get_env = |var_name: &str| {
      env::var(var_name).map_err(|e| AppError::Config(format!("Missing environment variable '{}': {}", var_name, e)))
    };

    let server_host = get_env("SERVER_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
    let server_port = get_env("SERVER_PORT")
      .unwrap_or_else(|_| "3000".to_string())
      .parse::<u16>()
      .map_err(|e| AppError::Config(format!("Invalid SERVER_PORT: {}", e)))?;
    let database_url = get_env("DATABASE_URL")?;

    let jwt_secret = get_env("JWT_SECRET_KEY").unwrap_or_else(|_| "changeme".to_string());
    let jwt_expiration_secs = get_env("JWT_EXPIRATION")
      .unwrap_or_else(|_| "3600".to_string())
      .parse::<i64>()
      .map_err(|e| AppError::Config(format!("Invalid JWT_EXPIRATION: {}", e)))?;

    let stripe_secret_key = env::var("STRIPE_SECRET_KEY").ok().filter(|key| !key.is_empty());
    let currency = get_env("PAYMENT_CURRENCY").unwrap_or_else(|_| "usd".to_string());

    let ensure_schema = get_env("ENSURE_SCHEMA")
      .unwrap_or_else(|_| "true".to_string())
      .parse::<bool>()
      .map_err(|e| AppError::Config(format!("Invalid ENSURE_SCHEMA value: {}", e)))?;

    tracing::info!(
      gateway_configured = stripe_secret_key.is_some(),
      "Application configuration loaded successfully."
    );

    Ok(Self {
      server_host,
      server_port,
      database_url,
      jwt_secret,
      jwt_expiration_secs,
      stripe_secret_key,
      currency,
      ensure_schema,
    })
  }
}
