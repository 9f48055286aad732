// ViewerContext Middleware - decodes the session cookie into a request-scoped viewer
// Injects Arc<ViewerContext> into request extensions for the Vc extractor

use axum::{
    extract::{Request, State},
    http::HeaderMap,
    middleware::Next,
    response::Response,
};
use std::sync::Arc;
use uuid::Uuid;

use crate::{
    app_state::AppState,
    infrastructure::{security::extract_session_token, viewer::ViewerContext},
    models::CurrentUser,
};

/// ViewerContext middleware that creates request-scoped viewer context
pub async fn viewer_context_middleware(
    State(app_state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    let request_id = format!("req-{}", Uuid::new_v4());
    let viewer_context = create_viewer_context(&app_state, request.headers(), request_id).await;

    request.extensions_mut().insert(Arc::new(viewer_context));

    next.run(request).await
}

/// Resolve the caller. Every failure degrades to an anonymous viewer.
pub async fn create_viewer_context(
    app_state: &AppState,
    headers: &HeaderMap,
    request_id: String,
) -> ViewerContext {
    match resolve_current_user(app_state, headers).await {
        Some(user) => ViewerContext::authenticated(user, request_id),
        None => ViewerContext::anonymous(request_id),
    }
}

async fn resolve_current_user(app_state: &AppState, headers: &HeaderMap) -> Option<CurrentUser> {
    let token = extract_session_token(headers)?;

    let claims = match app_state.security.validate_session(&token) {
        Ok(claims) => claims,
        Err(e) => {
            tracing::warn!("Ignoring session token: {}", e);
            return None;
        }
    };

    match app_state.database.get_user(&claims.user_id).await {
        Ok(Some(user)) => Some(user.into()),
        Ok(None) => {
            tracing::warn!("Session refers to missing user {}", claims.user_id);
            None
        }
        Err(e) => {
            tracing::error!("Failed to load session user {}: {}", claims.user_id, e);
            None
        }
    }
}
