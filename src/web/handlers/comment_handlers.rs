// src/web/handlers/comment_handlers.rs

use actix_web::{web, HttpResponse};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::instrument;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::Comment;
use crate::state::AppState;
use crate::web::extractors::AuthenticatedUser;
use crate::web::handlers::product_handlers::fetch_product;

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct CommentCreatePayload {
  pub product_id: Uuid,
  pub content: String,
}

#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct CommentOut {
  pub id: Uuid,
  pub product_id: Uuid,
  pub user_id: Uuid,
  pub content: String,
  pub created_at: DateTime<Utc>,
}

impl From<Comment> for CommentOut {
  fn from(c: Comment) -> Self {
    Self {
      id: c.id,
      product_id: c.product_id,
      user_id: c.user_id,
      content: c.content,
      created_at: c.created_at,
    }
  }
}

const COMMENT_COLUMNS: &str = "id, product_id, user_id, content, created_at, updated_at";

#[instrument(name = "handler::list_product_comments", skip(state, path), fields(product_id = %path.as_ref()))]
pub async fn list_product_comments_handler(
  state: web::Data<AppState>,
  path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
  let product = fetch_product(&state.db_pool, path.into_inner()).await?;
  let comments: Vec<Comment> = sqlx::query_as(&format!(
    "SELECT {} FROM comments WHERE product_id = $1 ORDER BY created_at DESC",
    COMMENT_COLUMNS
  ))
  .bind(product.id)
  .fetch_all(&state.db_pool)
  .await?;
  let out: Vec<CommentOut> = comments.into_iter().map(CommentOut::from).collect();
  Ok(HttpResponse::Ok().json(out))
}

#[instrument(name = "handler::create_comment", skip(state, payload, auth_user), fields(user_id = %auth_user.0.id, product_id = %payload.product_id))]
pub async fn create_comment_handler(
  state: web::Data<AppState>,
  payload: web::Json<CommentCreatePayload>,
  auth_user: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
  let product = fetch_product(&state.db_pool, payload.product_id).await?;

  let id = Uuid::new_v4();
  sqlx::query("INSERT INTO comments (id, product_id, user_id, content) VALUES ($1, $2, $3, $4)")
    .bind(id)
    .bind(product.id)
    .bind(auth_user.0.id)
    .bind(&payload.content)
    .execute(&state.db_pool)
    .await?;

  let comment: Comment = sqlx::query_as(&format!("SELECT {} FROM comments WHERE id = $1", COMMENT_COLUMNS))
    .bind(id)
    .fetch_one(&state.db_pool)
    .await?;
  Ok(HttpResponse::Created().json(CommentOut::from(comment)))
}

#[instrument(name = "handler::delete_comment", skip(state, path, auth_user), fields(comment_id = %path.as_ref(), user_id = %auth_user.0.id))]
pub async fn delete_comment_handler(
  state: web::Data<AppState>,
  path: web::Path<Uuid>,
  auth_user: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
  let comment: Option<Comment> = sqlx::query_as(&format!("SELECT {} FROM comments WHERE id = $1", COMMENT_COLUMNS))
    .bind(path.into_inner())
    .fetch_optional(&state.db_pool)
    .await?;
  let comment = comment.ok_or_else(|| AppError::NotFound("Not found".to_string()))?;

  let user = auth_user.0;
  if !user.has_admin_override() && comment.user_id != user.id {
    return Err(AppError::Forbidden("Not allowed".to_string()));
  }

  sqlx::query("DELETE FROM comments WHERE id = $1")
    .bind(comment.id)
    .execute(&state.db_pool)
    .await?;
  Ok(HttpResponse::Ok().json(json!({"ok": true})))
}
