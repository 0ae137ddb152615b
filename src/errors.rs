// src/errors.rs

use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use serde_json::json;
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum AppError {
  #[error("Validation Error: {0}")]
  Validation(String),

  #[error("Authentication Failed: {0}")]
  Auth(String),

  #[error("Forbidden: {0}")]
  Forbidden(String),

  #[error("Resource Not Found: {0}")]
  NotFound(String),

  /// One or more requested product ids do not exist; nothing is persisted.
  #[error("Unknown product ids: {}", ids_csv(.0))]
  UnknownProducts(Vec<Uuid>),

  /// The named product lacks the requested quantity; nothing is persisted.
  #[error("Insufficient stock for product {0}")]
  InsufficientStock(Uuid),

  #[error("Payment Gateway Error: {0}")]
  Gateway(String),

  #[error("Database Error: {0}")]
  Sqlx(#[from] sqlx::Error),

  #[error("Configuration Error: {0}")]
  Config(String),

  #[error("Internal Server Error: {0}")]
  Internal(String),
}

fn ids_csv(ids: &[Uuid]) -> String {
  ids.iter().map(Uuid::to_string).collect::<Vec<_>>().join(", ")
}

// Allow anyhow::Error to be converted into AppError::Internal for convenience
// in code using `?` on functions returning anyhow::Result.
impl From<anyhow::Error> for AppError {
  fn from(err: anyhow::Error) -> Self {
    if err.is::<sqlx::Error>() {
      return AppError::Sqlx(err.downcast::<sqlx::Error>().unwrap());
    }
    AppError::Internal(err.to_string())
  }
}

impl ResponseError for AppError {
  fn status_code(&self) -> StatusCode {
    match self {
      AppError::Validation(_) | AppError::UnknownProducts(_) => StatusCode::BAD_REQUEST,
      AppError::Auth(_) => StatusCode::UNAUTHORIZED,
      AppError::Forbidden(_) => StatusCode::FORBIDDEN,
      AppError::NotFound(_) => StatusCode::NOT_FOUND,
      AppError::InsufficientStock(_) => StatusCode::CONFLICT,
      AppError::Gateway(_) => StatusCode::BAD_GATEWAY,
      AppError::Sqlx(_) | AppError::Config(_) | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
  }

  fn error_response(&self) -> HttpResponse {
    tracing::error!(application_error = %self, "Responding with error");
    let body = match self {
      // Internal failures must not leak their details to the client.
      AppError::Sqlx(_) => json!({"error": "Database operation failed"}),
      AppError::Gateway(_) => json!({"error": "Payment provider error"}),
      AppError::Config(_) => json!({"error": "Configuration issue"}),
      AppError::Internal(_) => json!({"error": "An internal error occurred"}),
      other => json!({"error": other.to_string()}),
    };
    HttpResponse::build(self.status_code()).json(body)
  }
}

// Define a Result type alias for the application.
pub type Result<T, E = AppError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn unknown_products_maps_to_bad_request_and_names_ids() {
    let a = Uuid::new_v4();
    let b = Uuid::new_v4();
    let err = AppError::UnknownProducts(vec![a, b]);
    assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
    let message = err.to_string();
    assert!(message.contains(&a.to_string()));
    assert!(message.contains(&b.to_string()));
  }

  #[test]
  fn insufficient_stock_maps_to_conflict_and_names_product() {
    let id = Uuid::new_v4();
    let err = AppError::InsufficientStock(id);
    assert_eq!(err.status_code(), StatusCode::CONFLICT);
    assert!(err.to_string().contains(&id.to_string()));
  }

  #[test]
  fn gateway_failures_map_to_bad_gateway_without_leaking_detail() {
    let err = AppError::Gateway("connection reset by api.stripe.com".to_string());
    assert_eq!(err.status_code(), StatusCode::BAD_GATEWAY);
    let response = err.error_response();
    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
  }

  #[test]
  fn auth_and_forbidden_statuses() {
    assert_eq!(AppError::Auth("x".into()).status_code(), StatusCode::UNAUTHORIZED);
    assert_eq!(AppError::Forbidden("x".into()).status_code(), StatusCode::FORBIDDEN);
    assert_eq!(AppError::NotFound("x".into()).status_code(), StatusCode::NOT_FOUND);
  }
}
