pub mod handlers;
pub mod service;

use axum::{routing::get, Router};

use crate::app_state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new().route("/professional/{id}", get(handlers::get_professional))
}
