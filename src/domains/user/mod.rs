// Accounts and sessions

pub mod handlers;
pub mod service;

use axum::{
    routing::{delete, get, post},
    Router,
};

use crate::app_state::AppState;

pub use service::AccountService;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/user/register", post(handlers::register))
        .route("/user/login", post(handlers::login))
        .route("/user/logout", post(handlers::logout))
        .route("/user/me", get(handlers::me))
        .route("/user/delete", delete(handlers::delete_account))
}
