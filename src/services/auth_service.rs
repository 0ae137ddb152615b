// src/services/auth_service.rs

//! Password hashing/verification and the centralized authorization check.

use crate::errors::AppError;
use crate::models::User;
use argon2::{
  password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
  Argon2,
};
use tracing::{debug, error, instrument};
use uuid::Uuid;

#[instrument(name = "auth_service::hash_password", skip(password), err(Display))]
pub fn hash_password(password: &str) -> Result<String, AppError> {
  if password.is_empty() {
    return Err(AppError::Validation("Password cannot be empty.".to_string()));
  }

  let salt = SaltString::generate(&mut OsRng);
  Argon2::default()
    .hash_password(password.as_bytes(), &salt)
    .map(|hash| hash.to_string())
    .map_err(|argon_err| {
      error!(error = %argon_err, "Argon2 password hashing failed.");
      AppError::Internal(format!("Password hashing process failed: {}", argon_err))
    })
}

#[instrument(name = "auth_service::verify_password", skip(hashed_password, provided_password))]
pub fn verify_password(hashed_password: &str, provided_password: &str) -> Result<bool, AppError> {
  let parsed_hash = PasswordHash::new(hashed_password).map_err(|parse_err| {
    error!(error = %parse_err, "Failed to parse stored password hash string.");
    AppError::Internal(format!("Invalid stored password hash format: {}", parse_err))
  })?;

  match Argon2::default().verify_password(provided_password.as_bytes(), &parsed_hash) {
    Ok(()) => Ok(true),
    Err(argon2::password_hash::Error::Password) => {
      debug!("Password verification failed: passwords do not match.");
      Ok(false)
    }
    Err(other) => {
      error!(error = %other, "Argon2 password verification encountered an error.");
      Err(AppError::Internal(format!(
        "Password verification process failed: {}",
        other
      )))
    }
  }
}

/// Capability check used by every protected endpoint. Admins (flag or role)
/// always pass; everyone else must hold all required roles.
pub fn require_roles(user: &User, required: &[&str]) -> Result<(), AppError> {
  if user.is_allowed(required) {
    Ok(())
  } else {
    Err(AppError::Forbidden("Insufficient permissions".to_string()))
  }
}

/// Restrict an operation on user-owned data to that user or an admin.
pub fn require_self_or_admin(user: &User, owner_id: Uuid) -> Result<(), AppError> {
  if user.has_admin_override() || user.id == owner_id {
    Ok(())
  } else {
    Err(AppError::Forbidden("Not allowed".to_string()))
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::models::user::{ROLE_BUYER, ROLE_SELLER};
  use chrono::Utc;
  use sqlx::types::Json;

  fn user(roles: &[&str], is_admin: bool) -> User {
    User {
      id: Uuid::new_v4(),
      username: "tester".to_string(),
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
  fn password_round_trip() {
    let hash = hash_password("hunter2").unwrap();
    assert!(verify_password(&hash, "hunter2").unwrap());
    assert!(!verify_password(&hash, "wrong").unwrap());
  }

  #[test]
  fn empty_password_rejected() {
    assert!(hash_password("").is_err());
  }

  #[test]
  fn role_check_rejects_missing_role() {
    let buyer = user(&[ROLE_BUYER], false);
    assert!(require_roles(&buyer, &[ROLE_SELLER]).is_err());
    assert!(require_roles(&buyer, &[ROLE_BUYER]).is_ok());
  }

  #[test]
  fn self_or_admin_check() {
    let plain = user(&[ROLE_BUYER], false);
    assert!(require_self_or_admin(&plain, plain.id).is_ok());
    assert!(require_self_or_admin(&plain, Uuid::new_v4()).is_err());

    let admin = user(&[], true);
    assert!(require_self_or_admin(&admin, Uuid::new_v4()).is_ok());
  }
}
