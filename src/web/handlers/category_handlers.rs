// src/web/handlers/category_handlers.rs

use actix_web::{web, HttpResponse};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::instrument;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::Category;
use crate::state::AppState;

#[derive(Deserialize, Debug)]
pub struct CategoryPayload {
  pub name: String,
}

#[derive(Deserialize, Debug)]
pub struct CategoryPatchPayload {
  #[serde(default)]
  pub name: Option<String>,
}

#[derive(Serialize, Debug)]
pub struct CategoryOut {
  pub id: Uuid,
  pub name: String,
}

impl From<Category> for CategoryOut {
  fn from(category: Category) -> Self {
    Self { id: category.id, name: category.name }
  }
}

async fn fetch_category(state: &AppState, id: Uuid) -> Result<Category, AppError> {
  let category: Option<Category> = sqlx::query_as("SELECT id, name, created_at, updated_at FROM categories WHERE id = $1")
    .bind(id)
    .fetch_optional(&state.db_pool)
    .await?;
  category.ok_or_else(|| AppError::NotFound("Not found".to_string()))
}

#[instrument(name = "handler::create_category", skip(state, payload))]
pub async fn create_category_handler(
  state: web::Data<AppState>,
  payload: web::Json<CategoryPayload>,
) -> Result<HttpResponse, AppError> {
  let id = Uuid::new_v4();
  sqlx::query("INSERT INTO categories (id, name) VALUES ($1, $2)")
    .bind(id)
    .bind(&payload.name)
    .execute(&state.db_pool)
    .await?;
  Ok(HttpResponse::Created().json(CategoryOut { id, name: payload.name.clone() }))
}

#[instrument(name = "handler::list_categories", skip(state))]
pub async fn list_categories_handler(state: web::Data<AppState>) -> Result<HttpResponse, AppError> {
  let categories: Vec<Category> = sqlx::query_as("SELECT id, name, created_at, updated_at FROM categories ORDER BY name ASC")
    .fetch_all(&state.db_pool)
    .await?;
  let out: Vec<CategoryOut> = categories.into_iter().map(CategoryOut::from).collect();
  Ok(HttpResponse::Ok().json(out))
}

#[instrument(name = "handler::get_category", skip(state, path), fields(category_id = %path.as_ref()))]
pub async fn get_category_handler(
  state: web::Data<AppState>,
  path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
  let category = fetch_category(&state, path.into_inner()).await?;
  Ok(HttpResponse::Ok().json(CategoryOut::from(category)))
}

#[instrument(name = "handler::patch_category", skip(state, path, payload), fields(category_id = %path.as_ref()))]
pub async fn patch_category_handler(
  state: web::Data<AppState>,
  path: web::Path<Uuid>,
  payload: web::Json<CategoryPatchPayload>,
) -> Result<HttpResponse, AppError> {
  let mut category = fetch_category(&state, path.into_inner()).await?;
  if let Some(name) = &payload.name {
    category.name = name.clone();
    sqlx::query("UPDATE categories SET name = $1, updated_at = now() WHERE id = $2")
      .bind(&category.name)
      .bind(category.id)
      .execute(&state.db_pool)
      .await?;
  }
  Ok(HttpResponse::Ok().json(CategoryOut::from(category)))
}

#[instrument(name = "handler::delete_category", skip(state, path), fields(category_id = %path.as_ref()))]
pub async fn delete_category_handler(
  state: web::Data<AppState>,
  path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
  let category = fetch_category(&state, path.into_inner()).await?;
  sqlx::query("DELETE FROM categories WHERE id = $1")
    .bind(category.id)
    .execute(&state.db_pool)
    .await?;
  Ok(HttpResponse::Ok().json(json!({"ok": true})))
}
