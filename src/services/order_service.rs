// src/services/order_service.rs

//! The order-placement transaction: price computation, inventory
//! reservation, optional payment-intent creation, and persistence of the
//! whole order graph as one atomic unit.

use crate::errors::AppError;
use crate::models::product::PRODUCT_COLUMNS;
use crate::models::{OrderItem, Product};
use crate::services::payment::PaymentGateway;
use crate::services::pricing;
use serde_json::Value as JsonValue;
use sqlx::PgPool;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{info, instrument};
use uuid::Uuid;

pub const STRIPE_PAYMENT_MODE: &str = "stripe";

/// One merged line of a checkout request: a product and the total quantity
/// requested across all occurrences of its id.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrderLine {
  pub product_id: Uuid,
  pub quantity: i32,
}

/// Merges requested items by product id, summing quantities. Quantities
/// below 1 are clamped up to 1 before merging. First-seen order of product
/// ids is preserved.
pub fn merge_order_lines<I>(requested: I) -> Vec<OrderLine>
where
  I: IntoIterator<Item = (Uuid, i32)>,
{
  let mut lines: Vec<OrderLine> = Vec::new();
  let mut index: HashMap<Uuid, usize> = HashMap::new();
  for (product_id, quantity) in requested {
    let quantity = quantity.max(1);
    match index.get(&product_id) {
      Some(&at) => lines[at].quantity += quantity,
      None => {
        index.insert(product_id, lines.len());
        lines.push(OrderLine { product_id, quantity });
      }
    }
  }
  lines
}

/// Converts a major-unit price into the gateway's minor units (e.g. dollars
/// to cents), rounding to the nearest whole unit.
pub fn to_minor_units(price: f64) -> i64 {
  (price * 100.0).round() as i64
}

/// Sum of `unit_price * quantity` over priced lines.
pub fn order_total<I>(priced: I) -> f64
where
  I: IntoIterator<Item = (f64, i32)>,
{
  priced
    .into_iter()
    .map(|(unit, quantity)| unit * f64::from(quantity))
    .sum()
}

/// The client-declared total is honored only when strictly positive;
/// otherwise the server-computed total is authoritative.
pub fn resolve_final_price(declared: Option<f64>, computed: f64) -> f64 {
  match declared {
    Some(price) if price > 0.0 => price,
    _ => computed,
  }
}

fn wants_stripe(status: &JsonValue) -> bool {
  status.get("paymentMode").and_then(JsonValue::as_str) == Some(STRIPE_PAYMENT_MODE)
}

#[derive(Debug, Clone)]
pub struct PlacedOrder {
  pub order_id: Uuid,
  /// Empty when no gateway interaction occurred.
  pub client_secret: String,
}

pub struct OrderService {
  pool: PgPool,
  gateway: Option<Arc<dyn PaymentGateway>>,
  currency: String,
}

impl OrderService {
  pub fn new(pool: PgPool, gateway: Option<Arc<dyn PaymentGateway>>, currency: String) -> Self {
    Self { pool, gateway, currency }
  }

  /// Places an order from already-merged lines. Product resolution, stock
  /// checks for every line, inventory decrements, order + line-item rows and
  /// the optional payment intent all commit together or not at all.
  #[instrument(name = "orders::place_order", skip(self, lines, status), fields(line_count = lines.len()))]
  pub async fn place_order(
    &self,
    lines: &[OrderLine],
    user_id: Option<Uuid>,
    declared_price: Option<f64>,
    status: JsonValue,
  ) -> Result<PlacedOrder, AppError> {
    let mut tx = self.pool.begin().await?;

    let ids: Vec<Uuid> = lines.iter().map(|line| line.product_id).collect();
    let products: Vec<Product> = sqlx::query_as(&format!(
      "SELECT {} FROM products WHERE id = ANY($1)",
      PRODUCT_COLUMNS
    ))
    .bind(&ids)
    .fetch_all(&mut *tx)
    .await?;

    let by_id: HashMap<Uuid, &Product> = products.iter().map(|p| (p.id, p)).collect();
    let missing: Vec<Uuid> = ids.iter().copied().filter(|id| !by_id.contains_key(id)).collect();
    if !missing.is_empty() {
      return Err(AppError::UnknownProducts(missing));
    }

    // Every line is checked before any decrement is applied. Rows are locked
    // in product-id order so two concurrent orders touching the same
    // products cannot deadlock; the lock serializes concurrent decrements.
    let mut lock_order: Vec<&OrderLine> = lines.iter().collect();
    lock_order.sort_by_key(|line| line.product_id);
    for line in &lock_order {
      let stock: Option<i32> = sqlx::query_scalar("SELECT stock FROM inventory WHERE product_id = $1 FOR UPDATE")
        .bind(line.product_id)
        .fetch_optional(&mut *tx)
        .await?;
      // A missing inventory row counts as zero stock.
      if stock.unwrap_or(0) < line.quantity {
        return Err(AppError::InsufficientStock(line.product_id));
      }
    }

    let priced: Vec<(OrderLine, f64)> = lines
      .iter()
      .map(|line| (*line, pricing::unit_price(by_id[&line.product_id])))
      .collect();
    let computed_total = order_total(priced.iter().map(|(line, unit)| (*unit, line.quantity)));
    let final_price = resolve_final_price(declared_price, computed_total);

    // The intent id must be on the order row before the transaction
    // commits; a gateway failure rolls everything back.
    let mut payment_intent = String::new();
    let mut client_secret = String::new();
    if wants_stripe(&status) {
      if let Some(gateway) = &self.gateway {
        let intent = gateway.create_intent(to_minor_units(final_price), &self.currency).await?;
        payment_intent = intent.intent_id;
        client_secret = intent.client_secret;
      }
    }

    let order_id = Uuid::new_v4();
    sqlx::query(
      "INSERT INTO orders (id, user_id, payment_intent, payment_status, price, status) \
       VALUES ($1, $2, $3, FALSE, $4, $5)",
    )
    .bind(order_id)
    .bind(user_id)
    .bind(&payment_intent)
    .bind(final_price)
    .bind(&status)
    .execute(&mut *tx)
    .await?;

    for (line, unit_price) in &priced {
      sqlx::query("UPDATE inventory SET stock = stock - $1, updated_at = now() WHERE product_id = $2")
        .bind(line.quantity)
        .bind(line.product_id)
        .execute(&mut *tx)
        .await?;
      let item = OrderItem {
        id: Uuid::new_v4(),
        order_id,
        product_id: line.product_id,
        quantity: line.quantity,
        unit_price: *unit_price,
      };
      sqlx::query(
        "INSERT INTO order_items (id, order_id, product_id, quantity, unit_price) VALUES ($1, $2, $3, $4, $5)",
      )
      .bind(item.id)
      .bind(item.order_id)
      .bind(item.product_id)
      .bind(item.quantity)
      .bind(item.unit_price)
      .execute(&mut *tx)
      .await?;
      sqlx::query("INSERT INTO order_products (order_id, product_id) VALUES ($1, $2)")
        .bind(order_id)
        .bind(line.product_id)
        .execute(&mut *tx)
        .await?;
    }

    tx.commit().await?;
    info!(%order_id, price = final_price, "Order placed.");
    Ok(PlacedOrder { order_id, client_secret })
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use serde_json::json;

  #[test]
  fn duplicate_ids_merge_into_one_line() {
    let p1 = Uuid::new_v4();
    let merged = merge_order_lines(vec![(p1, 2), (p1, 3)]);
    assert_eq!(merged, vec![OrderLine { product_id: p1, quantity: 5 }]);
  }

  #[test]
  fn quantities_below_one_are_clamped_up() {
    let p1 = Uuid::new_v4();
    let merged = merge_order_lines(vec![(p1, 0), (p1, -4)]);
    assert_eq!(merged[0].quantity, 2);
  }

  #[test]
  fn first_seen_order_is_preserved() {
    let p1 = Uuid::new_v4();
    let p2 = Uuid::new_v4();
    let merged = merge_order_lines(vec![(p2, 1), (p1, 1), (p2, 2)]);
    assert_eq!(merged.len(), 2);
    assert_eq!(merged[0], OrderLine { product_id: p2, quantity: 3 });
    assert_eq!(merged[1], OrderLine { product_id: p1, quantity: 1 });
  }

  #[test]
  fn total_is_sum_of_unit_times_quantity() {
    assert_eq!(order_total(vec![(8.0, 2), (10.0, 1)]), 26.0);
    assert_eq!(order_total(Vec::<(f64, i32)>::new()), 0.0);
  }

  #[test]
  fn declared_price_wins_only_when_positive() {
    assert_eq!(resolve_final_price(Some(42.0), 16.0), 42.0);
    assert_eq!(resolve_final_price(Some(0.0), 16.0), 16.0);
    assert_eq!(resolve_final_price(Some(-5.0), 16.0), 16.0);
    assert_eq!(resolve_final_price(None, 16.0), 16.0);
  }

  #[test]
  fn minor_units_round_to_nearest_cent() {
    assert_eq!(to_minor_units(16.0), 1600);
    assert_eq!(to_minor_units(19.999), 2000);
    assert_eq!(to_minor_units(0.004), 0);
  }

  #[test]
  fn stripe_mode_is_a_case_sensitive_literal() {
    assert!(wants_stripe(&json!({"paymentMode": "stripe"})));
    assert!(!wants_stripe(&json!({"paymentMode": "Stripe"})));
    assert!(!wants_stripe(&json!({"paymentMode": "cash-on-delivery"})));
    assert!(!wants_stripe(&json!({})));
  }
}
