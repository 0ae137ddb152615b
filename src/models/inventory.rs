// src/models/inventory.rs

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;
use uuid::Uuid;

/// One row per product; stock never goes negative as a result of order
/// placement (checked before any decrement inside the transaction).
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Inventory {
  pub product_id: Uuid,
  pub stock: i32,
  pub updated_at: DateTime<Utc>,
}
