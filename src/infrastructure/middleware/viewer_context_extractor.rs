// ViewerContext Extractor - hands the request-scoped viewer to handlers

use crate::infrastructure::viewer::ViewerContext;
use axum::{extract::FromRequestParts, http::request::Parts};
use std::sync::Arc;

use crate::error::AppError;

/// Cheap-to-clone handle on the request's ViewerContext.
///
/// ## Usage:
/// ```rust,ignore
/// async fn handler(vc: Vc, Json(data): Json<RequestData>) -> AppResult<Json<Value>> {
///     let user = vc.require_user("You need to be signed in")?;
///     // ...
/// }
/// ```
#[derive(Debug, Clone)]
pub struct Vc(Arc<ViewerContext>);

impl Vc {
    pub fn new(vc: Arc<ViewerContext>) -> Self {
        Self(vc)
    }

    /// Get the inner Arc<ViewerContext> (rarely needed)
    pub fn arc(self) -> Arc<ViewerContext> {
        self.0
    }
}

// Access ViewerContext fields directly: vc.user, vc.request_id, vc.require_user(..)
impl std::ops::Deref for Vc {
    type Target = ViewerContext;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl AsRef<ViewerContext> for Vc {
    fn as_ref(&self) -> &ViewerContext {
        &self.0
    }
}

// Extract Vc from request extensions populated by viewer_context_middleware
impl<S> FromRequestParts<S> for Vc
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Arc<ViewerContext>>()
            .map(|vc| Vc(vc.clone()))
            .ok_or_else(|| {
                AppError::Internal("Viewer context missing, is the middleware installed?".to_string())
            })
    }
}
