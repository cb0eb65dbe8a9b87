use axum::{routing::get, Router};
use std::net::SocketAddr;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::handlers::{catalog, health, not_found, product};
use crate::revalidate::revalidate_handler;
use crate::state::AppState;

/// All routes of the site.
pub fn create_router(state: AppState) -> Router {
    let static_dir = state.config.site.static_dir.clone();

    Router::new()
        .route("/", get(catalog))
        .route("/productos/:slug", get(product))
        .route("/api/revalidate", get(revalidate_handler).post(revalidate_handler))
        .route("/health", get(health))
        .nest_service("/static", ServeDir::new(static_dir))
        .fallback(not_found)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Serves the site on `port` until Ctrl-C.
pub async fn start_server(state: AppState, port: u16) -> std::io::Result<()> {
    let app = create_router(state);
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = tokio::net::TcpListener::bind(addr).await?;

    info!("catalog listening on http://localhost:{}", port);
    info!("revalidation webhook: http://localhost:{}/api/revalidate", port);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        info!("shutting down");
    }
}
