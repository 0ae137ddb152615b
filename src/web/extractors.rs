// src/web/extractors.rs

//! Actix extractors turning the bearer token into a caller identity. The
//! handlers only ever see an already-authenticated (or explicitly absent)
//! user; credential parsing stays here.

use actix_web::http::header;
use actix_web::{web, FromRequest, HttpRequest};
use futures_util::future::LocalBoxFuture;
use sqlx::PgPool;
use tracing::warn;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::User;
use crate::services::token_service;
use crate::state::AppState;

/// Caller identity for endpoints that require authentication.
#[derive(Debug)]
pub struct AuthenticatedUser(pub User);

/// Caller identity for endpoints that also serve anonymous traffic, such as
/// guest checkout. A missing Authorization header yields `None`; a present
/// but invalid token is still rejected.
#[derive(Debug)]
pub struct MaybeUser(pub Option<User>);

fn bearer_token(req: &HttpRequest) -> Option<String> {
  let header_value = req.headers().get(header::AUTHORIZATION)?.to_str().ok()?;
  let mut parts = header_value.splitn(2, ' ');
  match (parts.next(), parts.next()) {
    (Some(scheme), Some(token)) if scheme.eq_ignore_ascii_case("bearer") => Some(token.trim().to_string()),
    _ => None,
  }
}

fn app_state(req: &HttpRequest) -> Result<web::Data<AppState>, AppError> {
  req
    .app_data::<web::Data<AppState>>()
    .cloned()
    .ok_or_else(|| AppError::Internal("Application state is not configured.".to_string()))
}

async fn fetch_user(pool: &PgPool, id: Uuid) -> Result<Option<User>, AppError> {
  let user: Option<User> = sqlx::query_as(
    "SELECT id, username, password_hash, first_name, last_name, is_admin, roles, created_at, updated_at \
     FROM users WHERE id = $1",
  )
  .bind(id)
  .fetch_optional(pool)
  .await?;
  Ok(user)
}

impl FromRequest for AuthenticatedUser {
  type Error = AppError;
  type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

  fn from_request(req: &HttpRequest, _payload: &mut actix_web::dev::Payload) -> Self::Future {
    let state = app_state(req);
    let token = bearer_token(req);
    Box::pin(async move {
      let state = state?;
      let token = token.ok_or_else(|| AppError::Auth("Missing token".to_string()))?;
      let claims = token_service::decode_token(&token, &state.config)?;
      let user = fetch_user(&state.db_pool, claims.sub).await?.ok_or_else(|| {
        warn!(subject = %claims.sub, "Token subject no longer exists.");
        AppError::NotFound("User not found".to_string())
      })?;
      Ok(AuthenticatedUser(user))
    })
  }
}

impl FromRequest for MaybeUser {
  type Error = AppError;
  type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

  fn from_request(req: &HttpRequest, _payload: &mut actix_web::dev::Payload) -> Self::Future {
    let state = app_state(req);
    let token = bearer_token(req);
    Box::pin(async move {
      let Some(token) = token else {
        return Ok(MaybeUser(None));
      };
      let state = state?;
      let claims = token_service::decode_token(&token, &state.config)?;
      let user = fetch_user(&state.db_pool, claims.sub).await?;
      Ok(MaybeUser(user))
    })
  }
}
