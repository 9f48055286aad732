use chrono::{DateTime, Utc};
use serde::Serialize;

#[derive(Debug, Clone)]
pub struct User {
    pub id: String,
    pub email: String,
    pub password_hash: String,
    pub name: Option<String>,
    pub country: Option<String>,
    pub birthday: Option<DateTime<Utc>>,
    pub vendor_id: Option<String>,
    pub created: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: String,
    pub password_hash: String,
    pub name: String,
    pub country: String,
    pub birthday: Option<DateTime<Utc>>,
}

/// The signed-in user as exposed to handlers and `/api/user/me`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CurrentUser {
    pub id: String,
    pub name: Option<String>,
    pub email: String,
    pub country: Option<String>,
    pub birthday: Option<String>,
    pub vendor_id: Option<String>,
}

impl From<User> for CurrentUser {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            name: user.name,
            email: user.email,
            country: user.country,
            birthday: user.birthday.map(|b| b.to_rfc3339()),
            vendor_id: user.vendor_id,
        }
    }
}
