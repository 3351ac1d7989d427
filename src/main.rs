// Filmgraph server - REST API for films, likes and friend relations

use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tracing::info;

use filmgraph::{api::create_router, app_state::AppState, config::Config};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    // Load configuration
    let config = Config::from_env()?;

    // Initialize application state (pool, schema, storage backend)
    let app_state = AppState::new(config.clone()).await?;

    let app = create_router(app_state).layer(CorsLayer::permissive());

    let addr = config.server_address();
    info!("filmgraph server listening on http://{}", addr);

    let listener = TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
