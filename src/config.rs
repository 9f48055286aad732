use serde::{Deserialize, Serialize};
use std::env;

use crate::domains::review::validator::DEFAULT_MAX_REPLY_DEPTH;

/// Development-only signing key, mirrors the fallback used outside production.
const FALLBACK_SESSION_SECRET: &str = "session-secret-fallback";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub database: DatabaseConfig,
    pub server: ServerConfig,
    pub session: SessionConfig,
    pub reviews: ReviewConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    #[serde(skip_serializing)]
    pub secret: String,
    pub ttl_days: i64,
    pub cookie_secure: bool,
}

/// A thread needs a root and at least one reply level.
pub const MIN_REPLY_DEPTH: usize = 2;

/// `MAX_REPLY_DEPTH` below the minimum, or unparseable, falls back to the default.
fn parse_max_reply_depth(raw: Option<String>) -> usize {
    match raw.and_then(|v| v.trim().parse::<usize>().ok()) {
        Some(depth) if depth >= MIN_REPLY_DEPTH => depth,
        Some(depth) => {
            tracing::warn!(
                "MAX_REPLY_DEPTH={} is below {}, using {}",
                depth,
                MIN_REPLY_DEPTH,
                DEFAULT_MAX_REPLY_DEPTH
            );
            DEFAULT_MAX_REPLY_DEPTH
        }
        None => DEFAULT_MAX_REPLY_DEPTH,
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReviewConfig {
    pub max_reply_depth: usize,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        let production = env::var("APP_ENV")
            .map(|v| v.eq_ignore_ascii_case("production"))
            .unwrap_or(false);

        let secret = match env::var("SESSION_SECRET") {
            Ok(secret) if !secret.is_empty() => secret,
            _ if production => anyhow::bail!("SESSION_SECRET is not defined"),
            _ => {
                tracing::warn!("SESSION_SECRET not set, using development fallback");
                FALLBACK_SESSION_SECRET.to_string()
            }
        };

        Ok(Self {
            database: DatabaseConfig {
                url: env::var("DATABASE_URL")
                    .unwrap_or_else(|_| "sqlite:data/skillset.db".to_string()),
            },
            server: ServerConfig {
                host: env::var("SERVER_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
                port: env::var("SERVER_PORT")
                    .unwrap_or_else(|_| "3000".to_string())
                    .parse()
                    .unwrap_or(3000),
            },
            session: SessionConfig {
                secret,
                ttl_days: env::var("SESSION_TTL_DAYS")
                    .ok()
                    .and_then(|v| v.parse().ok())
                    .filter(|days| *days > 0)
                    .unwrap_or(7),
                cookie_secure: env::var("COOKIE_SECURE")
                    .map(|v| !matches!(v.to_ascii_lowercase().as_str(), "0" | "false" | "no"))
                    .unwrap_or(true),
            },
            reviews: ReviewConfig {
                max_reply_depth: parse_max_reply_depth(env::var("MAX_REPLY_DEPTH").ok()),
            },
        })
    }

    /// Settings for tests and local tooling: in-memory database, insecure cookies.
    pub fn for_testing() -> Self {
        Self {
            database: DatabaseConfig {
                url: "sqlite::memory:".to_string(),
            },
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 0,
            },
            session: SessionConfig {
                secret: FALLBACK_SESSION_SECRET.to_string(),
                ttl_days: 7,
                cookie_secure: false,
            },
            reviews: ReviewConfig {
                max_reply_depth: DEFAULT_MAX_REPLY_DEPTH,
            },
        }
    }

    pub fn server_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}
