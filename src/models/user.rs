// src/models/user.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;
use uuid::Uuid;

pub const ROLE_ADMIN: &str = "admin";
pub const ROLE_BUYER: &str = "buyer";
pub const ROLE_SELLER: &str = "seller";

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
  pub id: Uuid,
  pub username: String,
  #[serde(skip_serializing)] // Never send password hash to client
  pub password_hash: String,
  pub first_name: Option<String>,
  pub last_name: Option<String>,
  pub is_admin: bool,
  pub roles: Json<Vec<String>>,
  pub created_at: DateTime<Utc>,
  pub updated_at: DateTime<Utc>,
}

impl User {
  pub fn has_role(&self, role: &str) -> bool {
    self.roles.0.iter().any(|have| have == role)
  }

  /// Admins satisfy every capability check, via the flag or the role.
  pub fn has_admin_override(&self) -> bool {
    self.is_admin || self.has_role(ROLE_ADMIN)
  }

  /// The single authorization capability check: the caller must hold every
  /// required role, unless the admin override applies.
  pub fn is_allowed(&self, required: &[&str]) -> bool {
    self.has_admin_override() || required.iter().all(|role| self.has_role(role))
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn user_with(roles: &[&str], is_admin: bool) -> User {
    User {
      id: Uuid::new_v4(),
      username: "someone".to_string(),
      password_hash: String::new(),
      first_name: None,
      last_name: None,
      is_admin,
      roles: Json(roles.iter().map(|r| r.to_string()).collect()),
      created_at: Utc::now(),
      updated_at: Utc::now(),
    }
  }

  #[test]
  fn requires_every_listed_role() {
    let buyer = user_with(&[ROLE_BUYER], false);
    assert!(buyer.is_allowed(&[ROLE_BUYER]));
    assert!(!buyer.is_allowed(&[ROLE_SELLER]));
    assert!(!buyer.is_allowed(&[ROLE_BUYER, ROLE_SELLER]));

    let seller = user_with(&[ROLE_BUYER, ROLE_SELLER], false);
    assert!(seller.is_allowed(&[ROLE_BUYER, ROLE_SELLER]));
  }

  #[test]
  fn admin_flag_overrides_any_requirement() {
    let admin = user_with(&[], true);
    assert!(admin.is_allowed(&[ROLE_SELLER]));
  }

  #[test]
  fn admin_role_overrides_any_requirement() {
    let admin = user_with(&[ROLE_ADMIN], false);
    assert!(admin.is_allowed(&[ROLE_SELLER, ROLE_BUYER]));
  }
}
