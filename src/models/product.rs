// src/models/product.rs

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value as JsonValue;
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Product {
  pub id: Uuid,
  pub category_id: Uuid,
  pub title: String,
  pub description: Option<JsonValue>,
  /// Markdown price; when present it is the price used for order totals.
  pub discount_price: Option<f64>,
  pub sale_price: f64,
  // Opaque client-owned blobs, not interpreted by the core.
  pub colors: Option<JsonValue>,
  pub images: Option<JsonValue>,
  pub variants: Option<JsonValue>,
  pub created_at: DateTime<Utc>,
  pub updated_at: DateTime<Utc>,
}

pub const PRODUCT_COLUMNS: &str =
  "id, category_id, title, description, discount_price, sale_price, colors, images, variants, created_at, updated_at";

/// Same column list qualified for queries joining `products p`.
pub const PRODUCT_COLUMNS_QUALIFIED: &str =
  "p.id, p.category_id, p.title, p.description, p.discount_price, p.sale_price, p.colors, p.images, p.variants, \
   p.created_at, p.updated_at";
