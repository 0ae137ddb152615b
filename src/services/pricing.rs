// src/services/pricing.rs

use crate::models::Product;

/// Effective unit price for order totals: the discount price when one is
/// set, otherwise the regular sale price.
pub fn unit_price(product: &Product) -> f64 {
  product.discount_price.unwrap_or(product.sale_price)
}

#[cfg(test)]
mod tests {
  use super::*;
  use chrono::Utc;
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
  fn discount_price_wins_when_present() {
    assert_eq!(unit_price(&product(Some(8.0), 10.0)), 8.0);
  }

  #[test]
  fn sale_price_used_without_discount() {
    assert_eq!(unit_price(&product(None, 10.0)), 10.0);
  }
}
