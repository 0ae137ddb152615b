// src/db.rs

//! Startup-time schema bootstrap. Creates the application tables if they do
//! not exist yet; safe to run on every boot. Full migration tooling is out
//! of scope here.

use crate::errors::Result;
use sqlx::PgPool;

const SCHEMA_SQL: &str = include_str!("../schema.sql");

pub async fn ensure_schema(pool: &PgPool) -> Result<()> {
  sqlx::raw_sql(SCHEMA_SQL).execute(pool).await?;
  tracing::info!("Database schema ensured.");
  Ok(())
}
