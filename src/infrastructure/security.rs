// Session and credential handling
// Password hashing, signed session tokens and the session cookie

use argon2::password_hash::{rand_core::OsRng, SaltString};
use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier};
use axum::http::{header, HeaderMap};
use chrono::{DateTime, Duration, Utc};
use cookie::{time::OffsetDateTime, Cookie, SameSite};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::config::SessionConfig;
use crate::error::{AppError, AppResult};

/// Cookie carrying the signed session token
pub const SESSION_COOKIE_NAME: &str = "session";

/// JWT claims stored in the session cookie
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionClaims {
    pub sub: String,
    #[serde(rename = "userId")]
    pub user_id: String,
    #[serde(rename = "expiresAt")]
    pub expires_at: String,
    pub iat: i64,
    pub exp: i64,
}

/// A freshly issued session token and the moment it stops being valid
#[derive(Debug, Clone)]
pub struct IssuedSession {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

/// Authentication service: credentials and sessions
pub struct SecurityService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    session_ttl: Duration,
    cookie_secure: bool,
}

impl SecurityService {
    pub fn new(config: &SessionConfig) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;
        validation.leeway = 0;

        Self {
            encoding_key: EncodingKey::from_secret(config.secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(config.secret.as_bytes()),
            validation,
            session_ttl: Duration::days(config.ttl_days),
            cookie_secure: config.cookie_secure,
        }
    }

    /// Hash password with Argon2 on the blocking pool
    #[instrument(skip_all)]
    pub async fn hash_password(&self, password: &str) -> AppResult<String> {
        let password = password.to_string();
        tokio::task::spawn_blocking(move || {
            let salt = SaltString::generate(&mut OsRng);
            Argon2::default()
                .hash_password(password.as_bytes(), &salt)
                .map(|hash| hash.to_string())
                .map_err(|e| AppError::Internal(format!("Failed to hash password: {}", e)))
        })
        .await
        .map_err(|e| AppError::Internal(format!("Password hashing task failed: {}", e)))?
    }

    /// Verify password against a stored hash. Unparseable hashes never match.
    #[instrument(skip_all)]
    pub async fn verify_password(&self, password: &str, hash: &str) -> AppResult<bool> {
        let password = password.to_string();
        let hash = hash.to_string();
        tokio::task::spawn_blocking(move || match PasswordHash::new(&hash) {
            Ok(parsed) => Argon2::default()
                .verify_password(password.as_bytes(), &parsed)
                .is_ok(),
            Err(e) => {
                tracing::warn!("Stored password hash is malformed: {}", e);
                false
            }
        })
        .await
        .map_err(|e| AppError::Internal(format!("Password verification task failed: {}", e)))
    }

    /// Sign a session token for `user_id`
    pub fn issue_session(&self, user_id: &str) -> AppResult<IssuedSession> {
        let now = Utc::now();
        let expires_at = now + self.session_ttl;

        let claims = SessionClaims {
            sub: user_id.to_string(),
            user_id: user_id.to_string(),
            expires_at: expires_at.to_rfc3339(),
            iat: now.timestamp(),
            exp: expires_at.timestamp(),
        };

        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| AppError::Internal(format!("Failed to create session token: {}", e)))?;

        Ok(IssuedSession { token, expires_at })
    }

    /// Validate a session token and return its claims
    pub fn validate_session(&self, token: &str) -> AppResult<SessionClaims> {
        let data = decode::<SessionClaims>(token, &self.decoding_key, &self.validation)
            .map_err(|e| AppError::Unauthorized(format!("Invalid session: {}", e)))?;

        if data.claims.user_id.is_empty() {
            return Err(AppError::Unauthorized("Session has no user".to_string()));
        }
        Ok(data.claims)
    }

    /// `Set-Cookie` value for an issued session
    pub fn session_cookie(&self, session: &IssuedSession) -> String {
        let expires = OffsetDateTime::from_unix_timestamp(session.expires_at.timestamp())
            .unwrap_or_else(|_| OffsetDateTime::now_utc() + cookie::time::Duration::days(7));

        Cookie::build((SESSION_COOKIE_NAME, session.token.clone()))
            .path("/")
            .http_only(true)
            .secure(self.cookie_secure)
            .same_site(SameSite::Lax)
            .expires(expires)
            .build()
            .to_string()
    }

    /// `Set-Cookie` value that removes the session cookie
    pub fn logout_cookie(&self) -> String {
        Cookie::build((SESSION_COOKIE_NAME, ""))
            .path("/")
            .http_only(true)
            .secure(self.cookie_secure)
            .same_site(SameSite::Lax)
            .max_age(cookie::time::Duration::ZERO)
            .expires(OffsetDateTime::UNIX_EPOCH)
            .build()
            .to_string()
    }
}

/// Pull the session token from the `session` cookie, falling back to a
/// `Authorization: Bearer` header.
pub fn extract_session_token(headers: &HeaderMap) -> Option<String> {
    let from_cookie = headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(Cookie::split_parse)
        .filter_map(Result::ok)
        .find(|c| c.name() == SESSION_COOKIE_NAME && !c.value().is_empty())
        .map(|c| c.value().to_string());

    from_cookie.or_else(|| {
        headers
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.strip_prefix("Bearer "))
            .map(|token| token.trim().to_string())
            .filter(|token| !token.is_empty())
    })
}
