// src/web/handlers/product_handlers.rs

use actix_web::{web, HttpResponse};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value as JsonValue};
use sqlx::{PgPool, QueryBuilder};
use std::collections::HashMap;
use tracing::{info, instrument};
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::product::PRODUCT_COLUMNS;
use crate::models::user::ROLE_SELLER;
use crate::models::{Product, User};
use crate::services::auth_service;
use crate::state::AppState;
use crate::web::extractors::AuthenticatedUser;

// --- DTOs (camelCase on the wire) ---

#[derive(Serialize, Deserialize, Debug)]
pub struct CategoryRef {
  pub id: Uuid,
}

#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct ProductOut {
  pub id: Uuid,
  pub title: String,
  pub discount_price: Option<f64>,
  pub sale_price: f64,
  pub description: Option<JsonValue>,
  pub colors: Option<JsonValue>,
  pub images: Option<JsonValue>,
  pub variants: Option<JsonValue>,
  pub category: CategoryRef,
}

impl From<Product> for ProductOut {
  fn from(p: Product) -> Self {
    Self {
      id: p.id,
      title: p.title,
      discount_price: p.discount_price,
      sale_price: p.sale_price,
      description: p.description,
      colors: p.colors,
      images: p.images,
      variants: p.variants,
      category: CategoryRef { id: p.category_id },
    }
  }
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct ProductCreatePayload {
  pub title: String,
  #[serde(default)]
  pub discount_price: Option<f64>,
  pub sale_price: f64,
  #[serde(default)]
  pub description: Option<JsonValue>,
  #[serde(default)]
  pub colors: Option<JsonValue>,
  #[serde(default)]
  pub images: Option<JsonValue>,
  #[serde(default)]
  pub variants: Option<JsonValue>,
  #[serde(default)]
  pub category: Option<CategoryRef>,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct ProductPatchPayload {
  #[serde(default)]
  pub title: Option<String>,
  #[serde(default)]
  pub discount_price: Option<f64>,
  #[serde(default)]
  pub sale_price: Option<f64>,
  #[serde(default)]
  pub description: Option<JsonValue>,
  #[serde(default)]
  pub colors: Option<JsonValue>,
  #[serde(default)]
  pub images: Option<JsonValue>,
  #[serde(default)]
  pub variants: Option<JsonValue>,
  #[serde(default)]
  pub category: Option<CategoryRef>,
}

// --- Shared helpers ---

pub(super) async fn fetch_product(pool: &PgPool, id: Uuid) -> Result<Product, AppError> {
  let product: Option<Product> =
    sqlx::query_as(&format!("SELECT {} FROM products WHERE id = $1", PRODUCT_COLUMNS))
      .bind(id)
      .fetch_optional(pool)
      .await?;
  product.ok_or_else(|| AppError::NotFound("Not found".to_string()))
}

/// True when the caller's seller profile owns the product listing.
pub(super) async fn is_owning_seller(pool: &PgPool, user_id: Uuid, product_id: Uuid) -> Result<bool, AppError> {
  let owns: Option<i32> = sqlx::query_scalar(
    "SELECT 1 FROM seller_products sp \
     JOIN seller_profiles s ON s.id = sp.seller_id \
     WHERE sp.product_id = $1 AND s.user_id = $2",
  )
  .bind(product_id)
  .bind(user_id)
  .fetch_optional(pool)
  .await?;
  Ok(owns.is_some())
}

pub(super) async fn require_admin_or_owning_seller(
  pool: &PgPool,
  user: &User,
  product_id: Uuid,
) -> Result<(), AppError> {
  if user.has_admin_override() || is_owning_seller(pool, user.id, product_id).await? {
    Ok(())
  } else {
    Err(AppError::Forbidden("Not allowed".to_string()))
  }
}

// --- Handler Implementations ---

#[instrument(name = "handler::create_product", skip(state, payload, auth_user), fields(user_id = %auth_user.0.id))]
pub async fn create_product_handler(
  state: web::Data<AppState>,
  payload: web::Json<ProductCreatePayload>,
  auth_user: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
  let user = auth_user.0;
  auth_service::require_roles(&user, &[ROLE_SELLER])?;

  let category = payload
    .category
    .as_ref()
    .ok_or_else(|| AppError::Validation("category.id required".to_string()))?;

  let seller_id: Option<Uuid> = sqlx::query_scalar("SELECT id FROM seller_profiles WHERE user_id = $1")
    .bind(user.id)
    .fetch_optional(&state.db_pool)
    .await?;
  let seller_id =
    seller_id.ok_or_else(|| AppError::Validation("Seller profile not found for user".to_string()))?;

  let product_id = Uuid::new_v4();
  let mut tx = state.db_pool.begin().await?;
  sqlx::query(
    "INSERT INTO products (id, category_id, title, description, discount_price, sale_price, colors, images, variants) \
     VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)",
  )
  .bind(product_id)
  .bind(category.id)
  .bind(&payload.title)
  .bind(&payload.description)
  .bind(payload.discount_price)
  .bind(payload.sale_price)
  .bind(&payload.colors)
  .bind(&payload.images)
  .bind(&payload.variants)
  .execute(&mut *tx)
  .await?;

  // Every listed product starts with an inventory row at zero stock.
  sqlx::query("INSERT INTO inventory (product_id, stock) VALUES ($1, 0) ON CONFLICT (product_id) DO NOTHING")
    .bind(product_id)
    .execute(&mut *tx)
    .await?;

  sqlx::query("INSERT INTO seller_products (id, seller_id, product_id) VALUES ($1, $2, $3)")
    .bind(Uuid::new_v4())
    .bind(seller_id)
    .bind(product_id)
    .execute(&mut *tx)
    .await?;
  tx.commit().await?;

  let product = fetch_product(&state.db_pool, product_id).await?;
  info!(%product_id, "Product created.");
  Ok(HttpResponse::Created().json(ProductOut::from(product)))
}

#[instrument(name = "handler::list_products", skip(state, query_params))]
pub async fn list_products_handler(
  state: web::Data<AppState>,
  query_params: web::Query<HashMap<String, String>>,
) -> Result<HttpResponse, AppError> {
  let mut qb = QueryBuilder::<sqlx::Postgres>::new(format!("SELECT {} FROM products WHERE TRUE", PRODUCT_COLUMNS));
  if let Some(title_contains) = query_params.get("where[title][contains]") {
    qb.push(" AND title ILIKE ");
    qb.push_bind(format!("%{}%", title_contains));
  }
  if let Some(category_id) = query_params.get("where[category][id]") {
    let category_id = Uuid::parse_str(category_id)
      .map_err(|_| AppError::Validation("invalid category id filter".to_string()))?;
    qb.push(" AND category_id = ");
    qb.push_bind(category_id);
  }
  qb.push(" ORDER BY created_at DESC");

  let products: Vec<Product> = qb.build_query_as().fetch_all(&state.db_pool).await?;
  let out: Vec<ProductOut> = products.into_iter().map(ProductOut::from).collect();
  Ok(HttpResponse::Ok().json(out))
}

#[instrument(name = "handler::get_product", skip(state, path), fields(product_id = %path.as_ref()))]
pub async fn get_product_handler(
  state: web::Data<AppState>,
  path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
  let product = fetch_product(&state.db_pool, path.into_inner()).await?;
  Ok(HttpResponse::Ok().json(ProductOut::from(product)))
}

#[instrument(name = "handler::patch_product", skip(state, path, payload, auth_user), fields(product_id = %path.as_ref(), user_id = %auth_user.0.id))]
pub async fn patch_product_handler(
  state: web::Data<AppState>,
  path: web::Path<Uuid>,
  payload: web::Json<ProductPatchPayload>,
  auth_user: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
  let mut product = fetch_product(&state.db_pool, path.into_inner()).await?;
  require_admin_or_owning_seller(&state.db_pool, &auth_user.0, product.id).await?;

  if let Some(title) = &payload.title {
    product.title = title.clone();
  }
  if let Some(discount_price) = payload.discount_price {
    product.discount_price = Some(discount_price);
  }
  if let Some(sale_price) = payload.sale_price {
    product.sale_price = sale_price;
  }
  if let Some(description) = &payload.description {
    product.description = Some(description.clone());
  }
  if let Some(colors) = &payload.colors {
    product.colors = Some(colors.clone());
  }
  if let Some(images) = &payload.images {
    product.images = Some(images.clone());
  }
  if let Some(variants) = &payload.variants {
    product.variants = Some(variants.clone());
  }
  if let Some(category) = &payload.category {
    product.category_id = category.id;
  }

  sqlx::query(
    "UPDATE products SET category_id = $1, title = $2, description = $3, discount_price = $4, sale_price = $5, \
     colors = $6, images = $7, variants = $8, updated_at = now() WHERE id = $9",
  )
  .bind(product.category_id)
  .bind(&product.title)
  .bind(&product.description)
  .bind(product.discount_price)
  .bind(product.sale_price)
  .bind(&product.colors)
  .bind(&product.images)
  .bind(&product.variants)
  .bind(product.id)
  .execute(&state.db_pool)
  .await?;

  Ok(HttpResponse::Ok().json(ProductOut::from(product)))
}

#[instrument(name = "handler::delete_product", skip(state, path, auth_user), fields(product_id = %path.as_ref(), user_id = %auth_user.0.id))]
pub async fn delete_product_handler(
  state: web::Data<AppState>,
  path: web::Path<Uuid>,
  auth_user: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
  let product = fetch_product(&state.db_pool, path.into_inner()).await?;
  require_admin_or_owning_seller(&state.db_pool, &auth_user.0, product.id).await?;

  sqlx::query("DELETE FROM products WHERE id = $1")
    .bind(product.id)
    .execute(&state.db_pool)
    .await?;
  info!(product_id = %product.id, "Product deleted.");
  Ok(HttpResponse::Ok().json(json!({"ok": true})))
}
