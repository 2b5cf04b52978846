pub mod routes;
pub mod state;

use axum::Router;
use quantlens_core::DataProvider;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

/// Build the Axum application router.
pub fn build_router(provider: Box<dyn DataProvider>) -> Router {
    let app_state = Arc::new(state::AppState::new(provider));

    Router::new()
        .nest("/api", routes::api_routes())
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(app_state)
}

/// Start the API server.
pub async fn start_server(provider: Box<dyn DataProvider>, bind_addr: &str) -> anyhow::Result<()> {
    let provider_name = provider.name().to_string();
    let app = build_router(provider);
    let listener = tokio::net::TcpListener::bind(bind_addr).await?;
    tracing::info!(provider = %provider_name, "API server listening on {}", bind_addr);
    axum::serve(listener, app).await?;
    Ok(())
}
