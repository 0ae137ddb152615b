// src/services/token_service.rs

//! Issues and validates the opaque bearer credentials carrying identity and
//! role claims. HS256 JWTs with standard `sub`/`exp` claims.

use crate::config::AppConfig;
use crate::errors::AppError;
use crate::models::User;
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
  pub sub: Uuid,
  pub username: String,
  pub roles: Vec<String>,
  pub exp: i64,
}

pub fn issue_token(user: &User, config: &AppConfig) -> Result<String, AppError> {
  let exp = (Utc::now() + Duration::seconds(config.jwt_expiration_secs)).timestamp();
  let claims = Claims {
    sub: user.id,
    username: user.username.clone(),
    roles: user.roles.0.clone(),
    exp,
  };
  encode(
    &Header::default(),
    &claims,
    &EncodingKey::from_secret(config.jwt_secret.as_bytes()),
  )
  .map_err(|e| AppError::Internal(format!("Token issuing failed: {}", e)))
}

pub fn decode_token(token: &str, config: &AppConfig) -> Result<Claims, AppError> {
  decode::<Claims>(
    token,
    &DecodingKey::from_secret(config.jwt_secret.as_bytes()),
    &Validation::default(),
  )
  .map(|data| data.claims)
  .map_err(|_| AppError::Auth("Invalid or expired token".to_string()))
}

#[cfg(test)]
mod tests {
  use super::*;
  use chrono::Utc;
  use sqlx::types::Json;

  fn test_config(secret: &str) -> AppConfig {
    AppConfig {
      server_host: "127.0.0.1".to_string(),
      server_port: 0,
      database_url: String::new(),
      jwt_secret: secret.to_string(),
      jwt_expiration_secs: 3600,
      stripe_secret_key: None,
      currency: "usd".to_string(),
      ensure_schema: false,
    }
  }

  fn test_user() -> User {
    User {
      id: Uuid::new_v4(),
      username: "alice".to_string(),
      password_hash: String::new(),
      first_name: None,
      last_name: None,
      is_admin: false,
      roles: Json(vec!["buyer".to_string(), "seller".to_string()]),
      created_at: Utc::now(),
      updated_at: Utc::now(),
    }
  }

  #[test]
  fn token_round_trip_preserves_identity_and_roles() {
    let config = test_config("test-secret");
    let user = test_user();
    let token = issue_token(&user, &config).unwrap();
    let claims = decode_token(&token, &config).unwrap();
    assert_eq!(claims.sub, user.id);
    assert_eq!(claims.username, "alice");
    assert_eq!(claims.roles, vec!["buyer".to_string(), "seller".to_string()]);
  }

  #[test]
  fn token_signed_with_other_secret_is_rejected() {
    let user = test_user();
    let token = issue_token(&user, &test_config("secret-a")).unwrap();
    assert!(decode_token(&token, &test_config("secret-b")).is_err());
  }

  #[test]
  fn garbage_token_is_rejected() {
    assert!(decode_token("not.a.token", &test_config("secret")).is_err());
  }
}
