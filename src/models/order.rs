// src/models/order.rs

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value as JsonValue;
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Order {
  pub id: Uuid,
  /// Absent for guest orders.
  pub user_id: Option<Uuid>,
  /// Gateway intent id; empty string when no gateway was involved.
  pub payment_intent: String,
  pub payment_status: bool,
  pub price: f64,
  /// Opaque client-supplied metadata (carries e.g. the requested payment mode).
  pub status: JsonValue,
  pub created_at: DateTime<Utc>,
  pub updated_at: DateTime<Utc>,
}
