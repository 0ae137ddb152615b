// src/web/handlers/inventory_handlers.rs

use actix_web::{web, HttpResponse};
use serde::Deserialize;
use serde_json::json;
use tracing::{info, instrument};
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::Inventory;
use crate::state::AppState;
use crate::web::extractors::AuthenticatedUser;
use crate::web::handlers::product_handlers::require_admin_or_owning_seller;

#[derive(Deserialize, Debug)]
pub struct InventoryPatchPayload {
  pub stock: i32,
}

#[instrument(name = "handler::get_stock", skip(state, path), fields(product_id = %path.as_ref()))]
pub async fn get_stock_handler(state: web::Data<AppState>, path: web::Path<Uuid>) -> Result<HttpResponse, AppError> {
  let product_id = path.into_inner();
  let inventory: Option<Inventory> =
    sqlx::query_as("SELECT product_id, stock, updated_at FROM inventory WHERE product_id = $1")
      .bind(product_id)
      .fetch_optional(&state.db_pool)
      .await?;
  // No row yet reads as zero stock.
  let stock = inventory.map(|row| row.stock).unwrap_or(0);
  Ok(HttpResponse::Ok().json(json!({"productId": product_id, "stock": stock})))
}

#[instrument(name = "handler::update_stock", skip(state, path, payload, auth_user), fields(product_id = %path.as_ref(), user_id = %auth_user.0.id))]
pub async fn update_stock_handler(
  state: web::Data<AppState>,
  path: web::Path<Uuid>,
  payload: web::Json<InventoryPatchPayload>,
  auth_user: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
  let product_id = path.into_inner();
  if payload.stock < 0 {
    return Err(AppError::Validation("stock must be non-negative".to_string()));
  }
  require_admin_or_owning_seller(&state.db_pool, &auth_user.0, product_id).await?;

  sqlx::query(
    "INSERT INTO inventory (product_id, stock) VALUES ($1, $2) \
     ON CONFLICT (product_id) DO UPDATE SET stock = EXCLUDED.stock, updated_at = now()",
  )
  .bind(product_id)
  .bind(payload.stock)
  .execute(&state.db_pool)
  .await?;

  info!(%product_id, stock = payload.stock, "Stock updated.");
  Ok(HttpResponse::Ok().json(json!({"productId": product_id, "stock": payload.stock})))
}
