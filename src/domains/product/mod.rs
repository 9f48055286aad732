pub mod handlers;
pub mod service;

use axum::{routing::get, Router};

use crate::app_state::AppState;

pub use service::ProductService;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route(
            "/product",
            get(handlers::list_products).post(handlers::create_product),
        )
        .route(
            "/product/user",
            get(handlers::list_user_products)
                .patch(handlers::update_user_product)
                .delete(handlers::delete_user_product),
        )
        .route("/product/{slug}", get(handlers::get_product))
}
