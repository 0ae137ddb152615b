// src/web/routes.rs

use actix_web::{web, HttpResponse};

use crate::web::handlers::{
  address_handlers, auth_handlers, category_handlers, comment_handlers, inventory_handlers, order_handlers,
  product_handlers, seller_handlers,
};

async fn root_handler() -> HttpResponse {
  HttpResponse::Ok().json(serde_json::json!({ "ok": true }))
}

async fn liveness_handler() -> HttpResponse {
  HttpResponse::Ok().json(serde_json::json!({ "status": "ok" }))
}

async fn readiness_handler() -> HttpResponse {
  HttpResponse::Ok().json(serde_json::json!({ "status": "ok" }))
}

// Called in `main.rs` to configure services for the Actix App.
pub fn configure_app_routes(cfg: &mut web::ServiceConfig) {
  cfg.route("/", web::get().to(root_handler)).service(
    web::scope("/api")
      // Health Check Routes
      .service(
        web::scope("/_health")
          .route("/live", web::get().to(liveness_handler))
          .route("/ready", web::get().to(readiness_handler)),
      )
      // Authentication Routes
      .route("/login", web::post().to(auth_handlers::login_handler))
      .route("/signup", web::post().to(auth_handlers::signup_handler))
      .route("/me", web::get().to(auth_handlers::me_handler))
      .route(
        "/upgrade-to-seller",
        web::post().to(auth_handlers::upgrade_to_seller_handler),
      )
      // Category Routes
      .service(
        web::scope("/categories")
          .route("", web::post().to(category_handlers::create_category_handler))
          .route("", web::get().to(category_handlers::list_categories_handler))
          .route("/{id}", web::get().to(category_handlers::get_category_handler))
          .route("/{id}", web::patch().to(category_handlers::patch_category_handler))
          .route("/{id}", web::delete().to(category_handlers::delete_category_handler)),
      )
      // Product Routes
      .service(
        web::scope("/products")
          .route("", web::post().to(product_handlers::create_product_handler))
          .route("", web::get().to(product_handlers::list_products_handler))
          .route(
            "/{id}/comments",
            web::get().to(comment_handlers::list_product_comments_handler),
          )
          .route("/{id}", web::get().to(product_handlers::get_product_handler))
          .route("/{id}", web::patch().to(product_handlers::patch_product_handler))
          .route("/{id}", web::delete().to(product_handlers::delete_product_handler)),
      )
      // Order Routes
      .service(
        web::scope("/orders")
          .route("", web::post().to(order_handlers::create_order_handler))
          .route("", web::get().to(order_handlers::list_orders_handler))
          .route("/{id}", web::get().to(order_handlers::get_order_handler))
          .route("/{id}", web::patch().to(order_handlers::patch_order_handler)),
      )
      // Inventory Routes
      .service(
        web::scope("/inventory")
          .route("/{product_id}", web::get().to(inventory_handlers::get_stock_handler))
          .route(
            "/{product_id}",
            web::patch().to(inventory_handlers::update_stock_handler),
          ),
      )
      // Address Routes
      .service(
        web::scope("/addresses")
          .route("", web::post().to(address_handlers::create_address_handler))
          .route(
            "/user/{user_id}",
            web::get().to(address_handlers::list_user_addresses_handler),
          )
          .route("/{id}", web::patch().to(address_handlers::patch_address_handler))
          .route("/{id}", web::delete().to(address_handlers::delete_address_handler)),
      )
      // Comment Routes
      .service(
        web::scope("/comments")
          .route("", web::post().to(comment_handlers::create_comment_handler))
          .route(
            "/product/{product_id}",
            web::get().to(comment_handlers::list_product_comments_handler),
          )
          .route(
            "/{comment_id}",
            web::delete().to(comment_handlers::delete_comment_handler),
          ),
      )
      // Seller Routes
      .service(web::scope("/sellers").route(
        "/{username}/products",
        web::get().to(seller_handlers::list_seller_products_handler),
      )),
  );
}
