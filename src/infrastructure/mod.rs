// Core infrastructure modules
pub mod database;              // Database interface
pub mod sqlite_database;       // SQLite implementation of the database interface
pub mod security;              // Passwords, session tokens and cookies
pub mod viewer;                // Viewer context
pub mod middleware;            // Request-scoped viewer context injection

// Re-export core infrastructure components
pub use database::DatabaseInterface;
pub use sqlite_database::SqliteDatabase;
pub use security::{SecurityService, SessionClaims, SESSION_COOKIE_NAME};
pub use viewer::ViewerContext;
