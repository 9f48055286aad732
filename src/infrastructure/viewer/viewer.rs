use crate::error::{AppError, AppResult};
use crate::models::CurrentUser;

/// Request-scoped view of who is calling. Anonymous when no valid session
/// cookie was presented.
#[derive(Debug, Clone)]
pub struct ViewerContext {
    pub request_id: String,
    pub user: Option<CurrentUser>,
}

impl ViewerContext {
    pub fn anonymous(request_id: String) -> Self {
        ViewerContext {
            request_id,
            user: None,
        }
    }

    pub fn authenticated(user: CurrentUser, request_id: String) -> Self {
        ViewerContext {
            request_id,
            user: Some(user),
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.user.is_some()
    }

    pub fn user_id(&self) -> Option<&str> {
        self.user.as_ref().map(|u| u.id.as_str())
    }

    /// The signed-in user, or a 401 carrying `message`
    pub fn require_user(&self, message: &str) -> AppResult<&CurrentUser> {
        self.user
            .as_ref()
            .ok_or_else(|| AppError::Unauthorized(message.to_string()))
    }
}
