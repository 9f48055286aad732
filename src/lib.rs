// Skillset marketplace backend

// Environment-driven settings
pub mod config;

// Shared state handed to every handler
pub mod app_state;

// Storage, sessions and request-scoped viewer context
pub mod infrastructure;

// Plain data types exchanged between layers
pub mod models;

// Users, products and threaded reviews
pub mod domains;

// Route table
pub mod api_router;

// Common utilities
pub mod error;

// Re-exports for convenience
pub use api_router::create_api_router;
pub use app_state::AppState;
pub use config::Config;
pub use error::{AppError, AppResult};
