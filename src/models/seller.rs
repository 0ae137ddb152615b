// src/models/seller.rs

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;
use uuid::Uuid;

/// Storefront identity of a user holding the seller role. Products are
/// linked to it through the `seller_products` table.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct SellerProfile {
  pub id: Uuid,
  pub user_id: Uuid,
  pub display_name: String,
  pub created_at: DateTime<Utc>,
  pub updated_at: DateTime<Utc>,
}
