// src/web/handlers/address_handlers.rs

use actix_web::{web, HttpResponse};
use serde::{Deserialize, Serialize};
use serde_json::json;
use sqlx::PgPool;
use tracing::instrument;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::Address;
use crate::services::auth_service;
use crate::state::AppState;
use crate::web::extractors::AuthenticatedUser;

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct AddressPayload {
  pub line1: String,
  #[serde(default)]
  pub line2: Option<String>,
  pub city: String,
  #[serde(default)]
  pub state: Option<String>,
  pub postal_code: String,
  pub country: String,
  #[serde(default)]
  pub phone: Option<String>,
  #[serde(default)]
  pub is_default: bool,
  pub user_id: Uuid,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct AddressPatchPayload {
  #[serde(default)]
  pub line1: Option<String>,
  #[serde(default)]
  pub line2: Option<String>,
  #[serde(default)]
  pub city: Option<String>,
  #[serde(default)]
  pub state: Option<String>,
  #[serde(default)]
  pub postal_code: Option<String>,
  #[serde(default)]
  pub country: Option<String>,
  #[serde(default)]
  pub phone: Option<String>,
  #[serde(default)]
  pub is_default: Option<bool>,
}

#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct AddressOut {
  pub id: Uuid,
  pub line1: String,
  pub line2: Option<String>,
  pub city: String,
  pub state: Option<String>,
  pub postal_code: String,
  pub country: String,
  pub phone: Option<String>,
  pub is_default: bool,
  pub user_id: Uuid,
}

impl From<Address> for AddressOut {
  fn from(a: Address) -> Self {
    Self {
      id: a.id,
      line1: a.line1,
      line2: a.line2,
      city: a.city,
      state: a.state,
      postal_code: a.postal_code,
      country: a.country,
      phone: a.phone,
      is_default: a.is_default,
      user_id: a.user_id,
    }
  }
}

const ADDRESS_COLUMNS: &str =
  "id, user_id, line1, line2, city, state, postal_code, country, phone, is_default, created_at, updated_at";

async fn fetch_address(pool: &PgPool, id: Uuid) -> Result<Address, AppError> {
  let address: Option<Address> = sqlx::query_as(&format!("SELECT {} FROM addresses WHERE id = $1", ADDRESS_COLUMNS))
    .bind(id)
    .fetch_optional(pool)
    .await?;
  address.ok_or_else(|| AppError::NotFound("Not found".to_string()))
}

async fn clear_default_for_user(pool: &PgPool, user_id: Uuid) -> Result<(), AppError> {
  sqlx::query("UPDATE addresses SET is_default = FALSE, updated_at = now() WHERE user_id = $1")
    .bind(user_id)
    .execute(pool)
    .await?;
  Ok(())
}

#[instrument(name = "handler::create_address", skip(state, payload, auth_user), fields(user_id = %auth_user.0.id))]
pub async fn create_address_handler(
  state: web::Data<AppState>,
  payload: web::Json<AddressPayload>,
  auth_user: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
  auth_service::require_self_or_admin(&auth_user.0, payload.user_id)?;

  if payload.is_default {
    clear_default_for_user(&state.db_pool, payload.user_id).await?;
  }

  let id = Uuid::new_v4();
  sqlx::query(
    "INSERT INTO addresses (id, user_id, line1, line2, city, state, postal_code, country, phone, is_default) \
     VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)",
  )
  .bind(id)
  .bind(payload.user_id)
  .bind(&payload.line1)
  .bind(&payload.line2)
  .bind(&payload.city)
  .bind(&payload.state)
  .bind(&payload.postal_code)
  .bind(&payload.country)
  .bind(&payload.phone)
  .bind(payload.is_default)
  .execute(&state.db_pool)
  .await?;

  let address = fetch_address(&state.db_pool, id).await?;
  Ok(HttpResponse::Created().json(AddressOut::from(address)))
}

#[instrument(name = "handler::list_user_addresses", skip(state, path, auth_user), fields(target_user = %path.as_ref(), user_id = %auth_user.0.id))]
pub async fn list_user_addresses_handler(
  state: web::Data<AppState>,
  path: web::Path<Uuid>,
  auth_user: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
  let target_user = path.into_inner();
  auth_service::require_self_or_admin(&auth_user.0, target_user)?;

  let addresses: Vec<Address> =
    sqlx::query_as(&format!("SELECT {} FROM addresses WHERE user_id = $1", ADDRESS_COLUMNS))
      .bind(target_user)
      .fetch_all(&state.db_pool)
      .await?;
  let out: Vec<AddressOut> = addresses.into_iter().map(AddressOut::from).collect();
  Ok(HttpResponse::Ok().json(out))
}

#[instrument(name = "handler::patch_address", skip(state, path, payload, auth_user), fields(address_id = %path.as_ref(), user_id = %auth_user.0.id))]
pub async fn patch_address_handler(
  state: web::Data<AppState>,
  path: web::Path<Uuid>,
  payload: web::Json<AddressPatchPayload>,
  auth_user: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
  let mut address = fetch_address(&state.db_pool, path.into_inner()).await?;
  auth_service::require_self_or_admin(&auth_user.0, address.user_id)?;

  if payload.is_default == Some(true) {
    clear_default_for_user(&state.db_pool, address.user_id).await?;
  }

  if let Some(line1) = &payload.line1 {
    address.line1 = line1.clone();
  }
  if let Some(line2) = &payload.line2 {
    address.line2 = Some(line2.clone());
  }
  if let Some(city) = &payload.city {
    address.city = city.clone();
  }
  if let Some(state_field) = &payload.state {
    address.state = Some(state_field.clone());
  }
  if let Some(postal_code) = &payload.postal_code {
    address.postal_code = postal_code.clone();
  }
  if let Some(country) = &payload.country {
    address.country = country.clone();
  }
  if let Some(phone) = &payload.phone {
    address.phone = Some(phone.clone());
  }
  if let Some(is_default) = payload.is_default {
    address.is_default = is_default;
  }

  sqlx::query(
    "UPDATE addresses SET line1 = $1, line2 = $2, city = $3, state = $4, postal_code = $5, country = $6, \
     phone = $7, is_default = $8, updated_at = now() WHERE id = $9",
  )
  .bind(&address.line1)
  .bind(&address.line2)
  .bind(&address.city)
  .bind(&address.state)
  .bind(&address.postal_code)
  .bind(&address.country)
  .bind(&address.phone)
  .bind(address.is_default)
  .bind(address.id)
  .execute(&state.db_pool)
  .await?;

  Ok(HttpResponse::Ok().json(AddressOut::from(address)))
}

#[instrument(name = "handler::delete_address", skip(state, path, auth_user), fields(address_id = %path.as_ref(), user_id = %auth_user.0.id))]
pub async fn delete_address_handler(
  state: web::Data<AppState>,
  path: web::Path<Uuid>,
  auth_user: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
  let address = fetch_address(&state.db_pool, path.into_inner()).await?;
  auth_service::require_self_or_admin(&auth_user.0, address.user_id)?;

  sqlx::query("DELETE FROM addresses WHERE id = $1")
    .bind(address.id)
    .execute(&state.db_pool)
    .await?;
  Ok(HttpResponse::Ok().json(json!({"ok": true})))
}
