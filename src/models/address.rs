// src/models/address.rs

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Address {
  pub id: Uuid,
  pub user_id: Uuid,
  pub line1: String,
  pub line2: Option<String>,
  pub city: String,
  pub state: Option<String>,
  pub postal_code: String,
  pub country: String,
  pub phone: Option<String>,
  pub is_default: bool,
  pub created_at: DateTime<Utc>,
  pub updated_at: DateTime<Utc>,
}
