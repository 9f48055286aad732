// Threaded product reviews: root reviews carry a 1-5 rating, replies nest
// beneath them up to a bounded depth

pub mod handlers;
pub mod input;
pub mod rating;
pub mod service;
pub mod thread;
pub mod validator;

use axum::{routing::get, Router};

use crate::app_state::AppState;

pub use service::ReviewService;
pub use thread::{ReviewNode, ReviewThread};

/// Review routes, relative to the API root
pub fn routes() -> Router<AppState> {
    Router::new()
        .route(
            "/product/{slug}/reviews",
            get(handlers::list_reviews)
                .post(handlers::create_review)
                .patch(handlers::update_review)
                .delete(handlers::delete_review),
        )
        .route(
            "/product/{slug}/reviews/replies",
            get(handlers::list_replies).post(handlers::create_reply),
        )
}
