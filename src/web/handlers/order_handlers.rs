// src/web/handlers/order_handlers.rs

use actix_web::{web, HttpResponse};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value as JsonValue};
use sqlx::{PgPool, QueryBuilder};
use std::collections::HashMap;
use tracing::{info, instrument};
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::product::PRODUCT_COLUMNS_QUALIFIED;
use crate::models::{Order, Product};
use crate::services::order_service::{merge_order_lines, OrderLine};
use crate::state::AppState;
use crate::web::extractors::MaybeUser;
use crate::web::handlers::product_handlers::ProductOut;

// --- Request DTOs ---
// The checkout body is accepted in two shapes: the legacy
// `{products: {connect: [{id, quantity}]}}` and the current
// `{items: [{id, quantity}]}`. Both are normalized into one merged line
// list here, before any business logic runs.

#[derive(Deserialize, Debug)]
pub struct ItemRef {
  pub id: Uuid,
  #[serde(default = "default_quantity")]
  pub quantity: i32,
}

fn default_quantity() -> i32 {
  1
}

#[derive(Deserialize, Debug)]
pub struct LegacyProductConnect {
  #[serde(default)]
  pub connect: Vec<ItemRef>,
}

#[derive(Deserialize, Debug)]
pub struct UserRef {
  pub id: Uuid,
}

#[derive(Deserialize, Debug)]
pub struct OrderCreatePayload {
  #[serde(default)]
  pub products: Option<LegacyProductConnect>,
  #[serde(default)]
  pub items: Option<Vec<ItemRef>>,
  #[serde(default)]
  pub user: Option<UserRef>,
  /// Opaque metadata; `paymentMode: "stripe"` requests a payment intent.
  pub status: JsonValue,
  /// Client-declared total, honored only when strictly positive.
  #[serde(default)]
  pub price: Option<f64>,
}

pub fn normalized_lines(payload: &OrderCreatePayload) -> Vec<OrderLine> {
  let legacy = payload.products.iter().flat_map(|p| p.connect.iter());
  let current = payload.items.iter().flatten();
  merge_order_lines(legacy.chain(current).map(|item| (item.id, item.quantity)))
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct OrderPatchPayload {
  #[serde(default)]
  pub payment_status: Option<bool>,
}

#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct OrderOut {
  pub id: Uuid,
  pub price: f64,
  pub status: JsonValue,
  pub payment_status: bool,
  pub products: Vec<ProductOut>,
}

async fn fetch_order(pool: &PgPool, id: Uuid) -> Result<Order, AppError> {
  let order: Option<Order> = sqlx::query_as(
    "SELECT id, user_id, payment_intent, payment_status, price, status, created_at, updated_at \
     FROM orders WHERE id = $1",
  )
  .bind(id)
  .fetch_optional(pool)
  .await?;
  order.ok_or_else(|| AppError::NotFound("Not found".to_string()))
}

async fn order_out(pool: &PgPool, order: Order) -> Result<OrderOut, AppError> {
  let products: Vec<Product> = sqlx::query_as(&format!(
    "SELECT {} FROM products p JOIN order_products op ON op.product_id = p.id WHERE op.order_id = $1",
    PRODUCT_COLUMNS_QUALIFIED
  ))
  .bind(order.id)
  .fetch_all(pool)
  .await?;
  Ok(OrderOut {
    id: order.id,
    price: order.price,
    status: order.status,
    payment_status: order.payment_status,
    products: products.into_iter().map(ProductOut::from).collect(),
  })
}

// --- Handler Implementations ---

#[instrument(name = "handler::create_order", skip(state, payload, maybe_user))]
pub async fn create_order_handler(
  state: web::Data<AppState>,
  payload: web::Json<OrderCreatePayload>,
  maybe_user: MaybeUser,
) -> Result<HttpResponse, AppError> {
  let lines = normalized_lines(&payload);
  // Authenticated caller wins; otherwise the body may attribute the order.
  // With neither, this is a guest order.
  let user_id = maybe_user
    .0
    .map(|user| user.id)
    .or_else(|| payload.user.as_ref().map(|user| user.id));

  let placed = state
    .orders
    .place_order(&lines, user_id, payload.price, payload.status.clone())
    .await?;

  info!(order_id = %placed.order_id, "Order placement succeeded.");
  Ok(HttpResponse::Created().json(json!({"client_secret": placed.client_secret})))
}

#[instrument(name = "handler::list_orders", skip(state, query_params))]
pub async fn list_orders_handler(
  state: web::Data<AppState>,
  query_params: web::Query<HashMap<String, String>>,
) -> Result<HttpResponse, AppError> {
  let mut qb = QueryBuilder::<sqlx::Postgres>::new(
    "SELECT id, user_id, payment_intent, payment_status, price, status, created_at, updated_at \
     FROM orders WHERE TRUE",
  );
  if let Some(payment_intent) = query_params.get("where[paymentIntent]") {
    qb.push(" AND payment_intent = ");
    qb.push_bind(payment_intent.clone());
  }
  if let Some(user_id) = query_params.get("where[user][id]") {
    let user_id =
      Uuid::parse_str(user_id).map_err(|_| AppError::Validation("invalid user id filter".to_string()))?;
    qb.push(" AND user_id = ");
    qb.push_bind(user_id);
  }
  qb.push(" ORDER BY created_at DESC");

  let orders: Vec<Order> = qb.build_query_as().fetch_all(&state.db_pool).await?;
  let mut out = Vec::with_capacity(orders.len());
  for order in orders {
    out.push(order_out(&state.db_pool, order).await?);
  }
  Ok(HttpResponse::Ok().json(out))
}

#[instrument(name = "handler::get_order", skip(state, path), fields(order_id = %path.as_ref()))]
pub async fn get_order_handler(state: web::Data<AppState>, path: web::Path<Uuid>) -> Result<HttpResponse, AppError> {
  let order = fetch_order(&state.db_pool, path.into_inner()).await?;
  let out = order_out(&state.db_pool, order).await?;
  Ok(HttpResponse::Ok().json(out))
}

#[instrument(name = "handler::patch_order", skip(state, path, payload), fields(order_id = %path.as_ref()))]
pub async fn patch_order_handler(
  state: web::Data<AppState>,
  path: web::Path<Uuid>,
  payload: web::Json<OrderPatchPayload>,
) -> Result<HttpResponse, AppError> {
  let mut order = fetch_order(&state.db_pool, path.into_inner()).await?;
  if let Some(payment_status) = payload.payment_status {
    order.payment_status = payment_status;
    sqlx::query("UPDATE orders SET payment_status = $1, updated_at = now() WHERE id = $2")
      .bind(payment_status)
      .bind(order.id)
      .execute(&state.db_pool)
      .await?;
  }
  let out = order_out(&state.db_pool, order).await?;
  Ok(HttpResponse::Ok().json(out))
}

#[cfg(test)]
mod tests {
  use super::*;
  use serde_json::json;

  #[test]
  fn current_shape_parses_and_merges_duplicates() {
    let p1 = Uuid::new_v4();
    let body = json!({
      "items": [{"id": p1, "quantity": 2}, {"id": p1, "quantity": 3}],
      "status": {"paymentMode": "cash-on-delivery"}
    });
    let payload: OrderCreatePayload = serde_json::from_value(body).unwrap();
    let lines = normalized_lines(&payload);
    assert_eq!(lines, vec![OrderLine { product_id: p1, quantity: 5 }]);
  }

  #[test]
  fn legacy_connect_shape_is_accepted() {
    let p1 = Uuid::new_v4();
    let body = json!({
      "products": {"connect": [{"id": p1}]},
      "status": {"paymentMode": "stripe"}
    });
    let payload: OrderCreatePayload = serde_json::from_value(body).unwrap();
    let lines = normalized_lines(&payload);
    // Quantity defaults to 1 when the legacy shape omits it.
    assert_eq!(lines, vec![OrderLine { product_id: p1, quantity: 1 }]);
  }

  #[test]
  fn both_shapes_merge_into_one_line_list() {
    let p1 = Uuid::new_v4();
    let p2 = Uuid::new_v4();
    let body = json!({
      "products": {"connect": [{"id": p1, "quantity": 2}]},
      "items": [{"id": p2, "quantity": 1}, {"id": p1, "quantity": 1}],
      "status": {}
    });
    let payload: OrderCreatePayload = serde_json::from_value(body).unwrap();
    let lines = normalized_lines(&payload);
    assert_eq!(lines.len(), 2);
    assert_eq!(lines[0], OrderLine { product_id: p1, quantity: 3 });
    assert_eq!(lines[1], OrderLine { product_id: p2, quantity: 1 });
  }

  #[test]
  fn zero_quantity_is_clamped_to_one() {
    let p1 = Uuid::new_v4();
    let body = json!({
      "items": [{"id": p1, "quantity": 0}],
      "status": {}
    });
    let payload: OrderCreatePayload = serde_json::from_value(body).unwrap();
    assert_eq!(normalized_lines(&payload)[0].quantity, 1);
  }
}
