// tests/order_assembly_tests.rs

//! Pure order-assembly properties: request-shape normalization, duplicate
//! consolidation, pricing and total computation. The transactional side
//! (all-or-nothing persistence, row locking) lives in the order service and
//! needs a live database to observe.

use chrono::Utc;
use marketplace_app::models::Product;
use marketplace_app::services::order_service::{
  merge_order_lines, order_total, resolve_final_price, to_minor_units, OrderLine,
};
use marketplace_app::services::pricing::unit_price;
use marketplace_app::web::handlers::order_handlers::{normalized_lines, OrderCreatePayload};
use serde_json::json;
use uuid::Uuid;

fn product(discount_price: Option<f64>, sale_price: f64) -> Product {
  Product {
    id: Uuid::new_v4(),
    category_id: Uuid::new_v4(),
    title: "Widget".to_string(),
    description: None,
    discount_price,
    sale_price,
    colors: None,
    images: None,
    variants: None,
    created_at: Utc::now(),
    updated_at: Utc::now(),
  }
}

#[test]
fn discounted_product_totals_use_the_discount_price() {
  // Discounted at 8.00 against a sale price of 10.00; two units requested.
  let p1 = product(Some(8.0), 10.0);
  let payload: OrderCreatePayload = serde_json::from_value(json!({
    "items": [{"id": p1.id, "quantity": 2}],
    "status": {"paymentMode": "cash-on-delivery"}
  }))
  .unwrap();

  let lines = normalized_lines(&payload);
  assert_eq!(lines, vec![OrderLine { product_id: p1.id, quantity: 2 }]);

  let unit = unit_price(&p1);
  let total = order_total(lines.iter().map(|line| (unit, line.quantity)));
  assert_eq!(total, 16.0);
  assert_eq!(resolve_final_price(payload.price, total), 16.0);
}

#[test]
fn computed_total_sums_every_line() {
  let p1 = product(Some(8.0), 10.0);
  let p2 = product(None, 3.5);
  let lines = merge_order_lines(vec![(p1.id, 2), (p2.id, 4)]);
  let priced: Vec<(f64, i32)> = lines
    .iter()
    .map(|line| {
      let unit = if line.product_id == p1.id { unit_price(&p1) } else { unit_price(&p2) };
      (unit, line.quantity)
    })
    .collect();
  assert_eq!(order_total(priced), 8.0 * 2.0 + 3.5 * 4.0);
}

#[test]
fn duplicates_across_both_request_shapes_become_one_line() {
  let p1 = Uuid::new_v4();
  let payload: OrderCreatePayload = serde_json::from_value(json!({
    "products": {"connect": [{"id": p1, "quantity": 2}]},
    "items": [{"id": p1, "quantity": 3}],
    "status": {}
  }))
  .unwrap();
  let lines = normalized_lines(&payload);
  assert_eq!(lines, vec![OrderLine { product_id: p1, quantity: 5 }]);
}

#[test]
fn declared_price_overrides_computed_total_only_when_positive() {
  assert_eq!(resolve_final_price(Some(99.0), 16.0), 99.0);
  assert_eq!(resolve_final_price(Some(0.0), 16.0), 16.0);
  assert_eq!(resolve_final_price(None, 16.0), 16.0);
}

#[test]
fn gateway_amount_is_final_price_in_minor_units() {
  assert_eq!(to_minor_units(16.0), 1600);
  assert_eq!(to_minor_units(19.999), 2000);
}

#[test]
fn empty_request_normalizes_to_no_lines() {
  let payload: OrderCreatePayload = serde_json::from_value(json!({"status": {}})).unwrap();
  assert!(normalized_lines(&payload).is_empty());
}
