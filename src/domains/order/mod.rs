// Orders (table `commands`); payment is handled elsewhere

pub mod handlers;
pub mod service;

use axum::{routing::get, Router};

use crate::app_state::AppState;

pub use service::OrderService;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route(
            "/orders",
            get(handlers::list_orders).post(handlers::place_order),
        )
        .route(
            "/cart",
            get(handlers::list_orders).post(handlers::place_order),
        )
        .route("/orders/user", get(handlers::list_my_orders))
        .route("/orders/professional", get(handlers::list_received_orders))
}
