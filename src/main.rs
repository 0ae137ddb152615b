// src/main.rs

use marketplace_app::config::AppConfig;
use marketplace_app::services::order_service::OrderService;
use marketplace_app::services::payment::{PaymentGateway, StripeGateway};
use marketplace_app::state::AppState;
use marketplace_app::{db, web as app_web};

use actix_web::{middleware, web as actix_data, App, HttpServer};
use sqlx::PgPool;
use std::sync::Arc;
use tracing::Level;
use tracing_subscriber::fmt::format::FmtSpan;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
  tracing_subscriber::fmt()
    .with_max_level(Level::INFO)
    .with_env_filter(tracing_subscriber::EnvFilter::from_default_env()) // Allow RUST_LOG override
    .with_span_events(FmtSpan::CLOSE)
    .init();

  tracing::info!("Starting marketplace application server...");

  let app_config = match AppConfig::from_env() {
    Ok(cfg) => Arc::new(cfg),
    Err(e) => {
      tracing::error!(error = %e, "Failed to load application configuration.");
      panic!("Configuration error: {}", e);
    }
  };

  let db_pool = match PgPool::connect(&app_config.database_url).await {
    Ok(pool) => {
      tracing::info!("Successfully connected to the database.");
      pool
    }
    Err(e) => {
      tracing::error!(error = %e, "Failed to connect to the database.");
      panic!("Database connection error: {}", e);
    }
  };

  if app_config.ensure_schema {
    if let Err(e) = db::ensure_schema(&db_pool).await {
      tracing::error!(error = %e, "Failed to ensure database schema.");
      panic!("Schema bootstrap error: {}", e);
    }
  }

  // The gateway exists only when a credential is configured; stripe-mode
  // orders placed without one simply skip intent creation.
  let gateway: Option<Arc<dyn PaymentGateway>> = app_config
    .stripe_secret_key
    .clone()
    .map(|secret_key| Arc::new(StripeGateway::new(secret_key)) as Arc<dyn PaymentGateway>);

  let orders = Arc::new(OrderService::new(
    db_pool.clone(),
    gateway,
    app_config.currency.clone(),
  ));

  let app_state = AppState {
    db_pool,
    config: app_config.clone(),
    orders,
  };

  let server_address = format!("{}:{}", app_config.server_host, app_config.server_port);
  tracing::info!("Attempting to bind server to {}...", server_address);

  HttpServer::new(move || {
    App::new()
      .app_data(actix_data::Data::new(app_state.clone()))
      .wrap(middleware::NormalizePath::trim())
      .wrap(tracing_actix_web::TracingLogger::default())
      .configure(app_web::configure_app_routes)
  })
  .bind(&server_address)?
  .run()
  .await
}
