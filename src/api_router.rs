// HTTP surface: every domain's routes under /api, behind the viewer context

use axum::{middleware, Router};
use tower_http::trace::TraceLayer;

use crate::{
    app_state::AppState,
    domains::{order, product, professional, review, user},
    infrastructure::middleware::viewer_context_middleware,
};

pub fn create_api_router(state: AppState) -> Router {
    let api = Router::new()
        .merge(user::routes())
        .merge(product::routes())
        .merge(review::routes())
        .merge(order::routes())
        .merge(professional::routes());

    Router::new()
        .nest("/api", api)
        .layer(middleware::from_fn_with_state(
            state.clone(),
            viewer_context_middleware,
        ))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
