// src/web/handlers/auth_handlers.rs

use actix_web::{web, HttpResponse};
use serde::{Deserialize, Serialize};
use serde_json::json;
use sqlx::types::Json;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::user::{ROLE_BUYER, ROLE_SELLER};
use crate::models::User;
use crate::services::{auth_service, token_service};
use crate::state::AppState;
use crate::web::extractors::AuthenticatedUser;

// --- Request/Response DTOs (camelCase on the wire) ---

#[derive(Deserialize, Debug)]
pub struct CredentialsPayload {
  pub username: String,
  pub password: String,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct SignupPayload {
  pub username: String,
  pub password: String,
  #[serde(default)]
  pub first_name: Option<String>,
  #[serde(default)]
  pub last_name: Option<String>,
  /// "buyer" (default) or "seller".
  #[serde(default)]
  pub account_type: Option<String>,
  #[serde(default)]
  pub seller_display_name: Option<String>,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct UpgradeToSellerPayload {
  #[serde(default)]
  pub display_name: Option<String>,
}

#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct UserInfoResponse {
  pub access_token: String,
  pub id: Uuid,
  pub roles: Vec<String>,
  pub username: String,
}

impl UserInfoResponse {
  fn for_user(user: &User, state: &AppState) -> Result<Self, AppError> {
    Ok(Self {
      access_token: token_service::issue_token(user, &state.config)?,
      id: user.id,
      roles: user.roles.0.clone(),
      username: user.username.clone(),
    })
  }
}

async fn fetch_user_by_username(state: &AppState, username: &str) -> Result<Option<User>, AppError> {
  let user: Option<User> = sqlx::query_as(
    "SELECT id, username, password_hash, first_name, last_name, is_admin, roles, created_at, updated_at \
     FROM users WHERE username = $1",
  )
  .bind(username)
  .fetch_optional(&state.db_pool)
  .await?;
  Ok(user)
}

// --- Handler Implementations ---

#[instrument(name = "handler::login", skip(state, payload), fields(username = %payload.username))]
pub async fn login_handler(
  state: web::Data<AppState>,
  payload: web::Json<CredentialsPayload>,
) -> Result<HttpResponse, AppError> {
  let user = fetch_user_by_username(&state, &payload.username).await?;
  let Some(user) = user else {
    warn!("Login failed: unknown username.");
    return Err(AppError::Auth("Invalid credentials".to_string()));
  };
  if !auth_service::verify_password(&user.password_hash, &payload.password)? {
    warn!("Login failed: password mismatch.");
    return Err(AppError::Auth("Invalid credentials".to_string()));
  }

  info!(user_id = %user.id, "Login successful.");
  Ok(HttpResponse::Ok().json(UserInfoResponse::for_user(&user, &state)?))
}

#[instrument(name = "handler::signup", skip(state, payload), fields(username = %payload.username))]
pub async fn signup_handler(
  state: web::Data<AppState>,
  payload: web::Json<SignupPayload>,
) -> Result<HttpResponse, AppError> {
  if payload.username.is_empty() || payload.password.is_empty() {
    return Err(AppError::Validation("username and password are required".to_string()));
  }
  let account_type = payload.account_type.as_deref().unwrap_or(ROLE_BUYER);
  if account_type != ROLE_BUYER && account_type != ROLE_SELLER {
    return Err(AppError::Validation(
      "accountType must be 'buyer' or 'seller'".to_string(),
    ));
  }
  if fetch_user_by_username(&state, &payload.username).await?.is_some() {
    return Err(AppError::Validation("Username already exists".to_string()));
  }

  let roles: Vec<String> = if account_type == ROLE_SELLER {
    vec![ROLE_BUYER.to_string(), ROLE_SELLER.to_string()]
  } else {
    vec![ROLE_BUYER.to_string()]
  };
  let password_hash = auth_service::hash_password(&payload.password)?;
  let user_id = Uuid::new_v4();

  let mut tx = state.db_pool.begin().await?;
  sqlx::query(
    "INSERT INTO users (id, username, password_hash, first_name, last_name, is_admin, roles) \
     VALUES ($1, $2, $3, $4, $5, FALSE, $6)",
  )
  .bind(user_id)
  .bind(&payload.username)
  .bind(&password_hash)
  .bind(&payload.first_name)
  .bind(&payload.last_name)
  .bind(Json(&roles))
  .execute(&mut *tx)
  .await?;

  if roles.iter().any(|role| role == ROLE_SELLER) {
    let mut display_name = payload
      .seller_display_name
      .clone()
      .or_else(|| payload.first_name.clone())
      .unwrap_or_else(|| payload.username.clone());
    // Best-effort display-name uniqueness.
    let taken: Option<i32> = sqlx::query_scalar("SELECT 1 FROM seller_profiles WHERE display_name = $1")
      .bind(&display_name)
      .fetch_optional(&mut *tx)
      .await?;
    if taken.is_some() {
      display_name = format!("{}-{}", display_name, &user_id.to_string()[..6]);
    }
    sqlx::query("INSERT INTO seller_profiles (id, user_id, display_name) VALUES ($1, $2, $3)")
      .bind(Uuid::new_v4())
      .bind(user_id)
      .bind(&display_name)
      .execute(&mut *tx)
      .await?;
  }
  tx.commit().await?;

  let user = fetch_user_by_username(&state, &payload.username)
    .await?
    .ok_or_else(|| AppError::Internal("Signup committed but the user cannot be read back.".to_string()))?;
  info!(user_id = %user.id, "Signup successful.");
  Ok(HttpResponse::Created().json(UserInfoResponse::for_user(&user, &state)?))
}

#[instrument(name = "handler::me", skip(auth_user), fields(user_id = %auth_user.0.id))]
pub async fn me_handler(auth_user: AuthenticatedUser) -> Result<HttpResponse, AppError> {
  let user = auth_user.0;
  Ok(HttpResponse::Ok().json(json!({
    "id": user.id,
    "username": user.username,
    "isAdmin": user.is_admin,
    "firstName": user.first_name,
    "lastName": user.last_name,
    "roles": user.roles.0,
  })))
}

#[instrument(name = "handler::upgrade_to_seller", skip(state, payload, auth_user), fields(user_id = %auth_user.0.id))]
pub async fn upgrade_to_seller_handler(
  state: web::Data<AppState>,
  payload: web::Json<UpgradeToSellerPayload>,
  auth_user: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
  let mut user = auth_user.0;
  if user.has_role(ROLE_SELLER) {
    return Ok(HttpResponse::Ok().json(UserInfoResponse::for_user(&user, &state)?));
  }

  user.roles.0.push(ROLE_SELLER.to_string());
  let mut tx = state.db_pool.begin().await?;
  sqlx::query("UPDATE users SET roles = $1, updated_at = now() WHERE id = $2")
    .bind(Json(&user.roles.0))
    .bind(user.id)
    .execute(&mut *tx)
    .await?;

  let existing: Option<i32> = sqlx::query_scalar("SELECT 1 FROM seller_profiles WHERE user_id = $1")
    .bind(user.id)
    .fetch_optional(&mut *tx)
    .await?;
  if existing.is_none() {
    let display_name = payload
      .display_name
      .clone()
      .or_else(|| user.first_name.clone())
      .unwrap_or_else(|| user.username.clone());
    sqlx::query("INSERT INTO seller_profiles (id, user_id, display_name) VALUES ($1, $2, $3)")
      .bind(Uuid::new_v4())
      .bind(user.id)
      .bind(&display_name)
      .execute(&mut *tx)
      .await?;
  }
  tx.commit().await?;

  info!(user_id = %user.id, "User upgraded to seller.");
  Ok(HttpResponse::Ok().json(UserInfoResponse::for_user(&user, &state)?))
}
