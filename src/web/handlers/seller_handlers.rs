// src/web/handlers/seller_handlers.rs

use actix_web::{web, HttpResponse};
use tracing::instrument;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::product::PRODUCT_COLUMNS_QUALIFIED;
use crate::models::{Product, SellerProfile};
use crate::state::AppState;
use crate::web::handlers::product_handlers::ProductOut;

#[instrument(name = "handler::list_seller_products", skip(state, path), fields(username = %path.as_ref()))]
pub async fn list_seller_products_handler(
  state: web::Data<AppState>,
  path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
  let username = path.into_inner();

  let user_id: Option<Uuid> = sqlx::query_scalar("SELECT id FROM users WHERE username = $1")
    .bind(&username)
    .fetch_optional(&state.db_pool)
    .await?;
  let user_id = user_id.ok_or_else(|| AppError::NotFound("Seller user not found".to_string()))?;

  let seller: Option<SellerProfile> = sqlx::query_as(
    "SELECT id, user_id, display_name, created_at, updated_at FROM seller_profiles WHERE user_id = $1",
  )
  .bind(user_id)
  .fetch_optional(&state.db_pool)
  .await?;
  let seller = seller.ok_or_else(|| AppError::NotFound("Seller profile not found".to_string()))?;

  let products: Vec<Product> = sqlx::query_as(&format!(
    "SELECT {} FROM products p JOIN seller_products sp ON sp.product_id = p.id WHERE sp.seller_id = $1",
    PRODUCT_COLUMNS_QUALIFIED
  ))
  .bind(seller.id)
  .fetch_all(&state.db_pool)
  .await?;

  let out: Vec<ProductOut> = products.into_iter().map(ProductOut::from).collect();
  Ok(HttpResponse::Ok().json(out))
}
