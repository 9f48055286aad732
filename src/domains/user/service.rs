// Account service - registration and password login

use std::sync::Arc;

use chrono::{DateTime, NaiveDate, Utc};
use serde::Deserialize;
use tracing::info;

use crate::app_state::AppState;
use crate::domains::review::rating::recompute_product_rating;
use crate::error::{AppError, AppResult};
use crate::infrastructure::security::IssuedSession;
use crate::infrastructure::{DatabaseInterface, SecurityService};
use crate::models::{NewUser, User};

#[derive(Debug, Default, Deserialize)]
pub struct RegisterPayload {
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub birthday: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct LoginPayload {
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
}

/// A user together with the session just opened for them
pub struct SignedIn {
    pub user: User,
    pub session: IssuedSession,
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

/// Accepts a full RFC 3339 timestamp or a bare `YYYY-MM-DD` date
pub fn parse_birthday(raw: &str) -> AppResult<DateTime<Utc>> {
    let invalid = || AppError::BadRequest("Invalid birthday format".to_string());

    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Ok(ts.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .map_err(|_| invalid())?
        .and_hms_opt(0, 0, 0)
        .map(|dt| dt.and_utc())
        .ok_or_else(invalid)
}

#[derive(Clone)]
pub struct AccountService {
    db: Arc<dyn DatabaseInterface>,
    security: Arc<SecurityService>,
}

impl AccountService {
    pub fn new(db: Arc<dyn DatabaseInterface>, security: Arc<SecurityService>) -> Self {
        Self { db, security }
    }

    pub fn from_state(state: &AppState) -> Self {
        Self::new(state.database.clone(), state.security.clone())
    }

    pub async fn register(&self, payload: RegisterPayload) -> AppResult<SignedIn> {
        let fields = [
            ("email", non_empty(&payload.email)),
            ("password", payload.password.as_deref().filter(|p| !p.is_empty())),
            ("country", non_empty(&payload.country)),
            ("name", non_empty(&payload.name)),
        ];
        let [(_, Some(email)), (_, Some(password)), (_, Some(country)), (_, Some(name))] = fields
        else {
            let missing: Vec<&str> = fields
                .iter()
                .filter(|(_, value)| value.is_none())
                .map(|(field, _)| *field)
                .collect();
            return Err(AppError::BadRequest(format!(
                "Missing required fields: {}",
                missing.join(", ")
            )));
        };

        let birthday = non_empty(&payload.birthday).map(parse_birthday).transpose()?;
        let email = email.to_lowercase();

        if self.db.get_user_by_email(&email).await?.is_some() {
            return Err(AppError::Conflict("Email already registered".to_string()));
        }

        let password_hash = self.security.hash_password(password).await?;
        let user = self
            .db
            .create_user(NewUser {
                email,
                password_hash,
                name: name.to_string(),
                country: country.to_string(),
                birthday,
            })
            .await
            .map_err(|e| match e {
                AppError::Conflict(_) => AppError::Conflict("Email already registered".to_string()),
                other => other,
            })?;

        let session = self.security.issue_session(&user.id)?;
        info!("Registered user {}", user.id);
        Ok(SignedIn { user, session })
    }

    pub async fn login(&self, payload: LoginPayload) -> AppResult<SignedIn> {
        let (email, password) = match (non_empty(&payload.email), payload.password.as_deref()) {
            (Some(email), Some(password)) if !password.is_empty() => (email.to_lowercase(), password),
            _ => {
                return Err(AppError::BadRequest(
                    "Email and password are required".to_string(),
                ))
            }
        };

        let invalid = || AppError::Unauthorized("Invalid credentials".to_string());
        let user = self.db.get_user_by_email(&email).await?.ok_or_else(invalid)?;

        if !self
            .security
            .verify_password(password, &user.password_hash)
            .await?
        {
            return Err(invalid());
        }

        let session = self.security.issue_session(&user.id)?;
        info!("User {} signed in", user.id);
        Ok(SignedIn { user, session })
    }

    /// Removes the account with everything it owns. Products the user had
    /// rated elsewhere get their aggregate recomputed afterwards.
    pub async fn delete_account(&self, user_id: &str) -> AppResult<()> {
        let rated = self.db.list_rated_product_ids(user_id).await?;

        if !self.db.delete_user(user_id).await? {
            return Err(AppError::NotFound("User not found".to_string()));
        }

        // Products the user owned are already gone; updating them is a no-op
        for product_id in &rated {
            recompute_product_rating(self.db.as_ref(), product_id).await?;
        }

        info!("Deleted user {} ({} rated products refreshed)", user_id, rated.len());
        Ok(())
    }
}
