// Skillset API server

use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tracing_subscriber::EnvFilter;

use skillset::{app_state::AppState, config::Config, create_api_router};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("skillset=info,tower_http=info")),
        )
        .init();

    // Load configuration
    let config = Config::from_env()?;

    // Initialize application state
    let app_state = AppState::new(config.clone()).await?;

    let app = create_api_router(app_state).layer(CorsLayer::permissive());

    let addr = config.server_address();
    tracing::info!("Skillset API listening on http://{}", addr);
    tracing::info!("  /api/user/{{register,login,logout,me}}");
    tracing::info!("  /api/product, /api/product/user, /api/product/{{slug}}");
    tracing::info!("  /api/product/{{slug}}/reviews, /api/product/{{slug}}/reviews/replies");

    let listener = TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
